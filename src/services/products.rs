use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{product, product_category, stock_ledger, stock_location};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::StockOverviewRow;

const RECENT_LEDGER_LIMIT: u64 = 20;

#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit_of_measure: Option<String>,
    pub reorder_level: Option<i32>,
    pub reorder_quantity: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductCommand {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<Uuid>>,
    pub unit_of_measure: Option<String>,
    pub reorder_level: Option<Option<i32>>,
    pub reorder_quantity: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductWithTotals {
    #[serde(flatten)]
    pub product: product::Model,
    pub category: Option<product_category::Model>,
    pub total_stock: i64,
    pub total_available: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: product::Model,
    pub category: Option<product_category::Model>,
    pub stock_locations: Vec<StockOverviewRow>,
    pub recent_ledger: Vec<stock_ledger::Model>,
}

/// Service for the product catalog
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    /// Creates a new product service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Active products with per-product stock totals.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ProductWithTotals>, ServiceError> {
        let db = self.db_pool.as_ref();

        let products = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Name)
            .all(db)
            .await?;

        let category_ids: Vec<Uuid> = products.iter().filter_map(|p| p.category_id).collect();
        let categories: HashMap<Uuid, product_category::Model> = product_category::Entity::find()
            .filter(product_category::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let stock_rows = stock_location::Entity::find()
            .filter(stock_location::Column::ProductId.is_in(product_ids))
            .all(db)
            .await?;

        let mut totals: HashMap<Uuid, (i64, i64)> = HashMap::new();
        for stock in stock_rows {
            let entry = totals.entry(stock.product_id).or_default();
            entry.0 += stock.quantity as i64;
            entry.1 += stock.available as i64;
        }

        Ok(products
            .into_iter()
            .map(|p| {
                let (total_stock, total_available) = totals.remove(&p.id).unwrap_or_default();
                ProductWithTotals {
                    category: p.category_id.and_then(|id| categories.get(&id).cloned()),
                    total_stock,
                    total_available,
                    product: p,
                }
            })
            .collect())
    }

    /// One product with stock rows and its most recent ledger entries.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: Uuid,
        stock_service: &crate::services::stock::StockService,
    ) -> Result<ProductDetail, ServiceError> {
        let db = self.db_pool.as_ref();

        let product = product::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let category = match product.category_id {
            Some(category_id) => {
                product_category::Entity::find_by_id(category_id)
                    .one(db)
                    .await?
            }
            None => None,
        };

        let overview = stock_service
            .overview(crate::services::stock::StockOverviewFilter {
                product_id: Some(id),
                ..Default::default()
            })
            .await?;

        let recent_ledger = product
            .find_related(stock_ledger::Entity)
            .order_by_desc(stock_ledger::Column::CreatedAt)
            .limit(RECENT_LEDGER_LIMIT)
            .all(db)
            .await?;

        Ok(ProductDetail {
            category,
            stock_locations: overview.stock_locations,
            recent_ledger,
            product,
        })
    }

    /// Create a product. SKUs must be unique.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        command: CreateProductCommand,
    ) -> Result<product::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = product::Entity::find()
            .filter(product::Column::Sku.eq(command.sku.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(
                "Product SKU already exists".to_string(),
            ));
        }

        if let Some(category_id) = command.category_id {
            let category = product_category::Entity::find_by_id(category_id)
                .one(db)
                .await?;
            if category.is_none() {
                return Err(ServiceError::InvalidInput(
                    "Product category not found".to_string(),
                ));
            }
        }

        let row = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(command.name),
            sku: Set(command.sku),
            description: Set(command.description),
            category_id: Set(command.category_id),
            unit_of_measure: Set(command.unit_of_measure.unwrap_or_else(|| "unit".to_string())),
            reorder_level: Set(command.reorder_level),
            reorder_quantity: Set(command.reorder_quantity),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = row.insert(db).await?;

        info!(product_id = %created.id, sku = %created.sku, "Product created");

        self.event_sender
            .send(Event::ProductCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Update product fields, including deactivation.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateProductCommand,
    ) -> Result<product::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = product::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        if let Some(sku) = &command.sku {
            if *sku != existing.sku {
                let conflict = product::Entity::find()
                    .filter(product::Column::Sku.eq(sku.clone()))
                    .one(db)
                    .await?;
                if conflict.is_some() {
                    return Err(ServiceError::InvalidInput(
                        "Product SKU already exists".to_string(),
                    ));
                }
            }
        }

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = command.name {
            active.name = Set(name);
        }
        if let Some(sku) = command.sku {
            active.sku = Set(sku);
        }
        if let Some(description) = command.description {
            active.description = Set(description);
        }
        if let Some(category_id) = command.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(unit_of_measure) = command.unit_of_measure {
            active.unit_of_measure = Set(unit_of_measure);
        }
        if let Some(reorder_level) = command.reorder_level {
            active.reorder_level = Set(reorder_level);
        }
        if let Some(reorder_quantity) = command.reorder_quantity {
            active.reorder_quantity = Set(reorder_quantity);
        }
        if let Some(is_active) = command.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    /// Hard-delete a product.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = product::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        existing.delete(db).await?;

        self.event_sender
            .send(Event::ProductDeleted(id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    /// All product categories.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<product_category::Model>, ServiceError> {
        Ok(product_category::Entity::find()
            .order_by_asc(product_category::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    /// Create a product category. Names must be unique.
    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        name: String,
    ) -> Result<product_category::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = product_category::Entity::find()
            .filter(product_category::Column::Name.eq(name.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(
                "Category with this name already exists".to_string(),
            ));
        }

        let row = product_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(Utc::now()),
        };
        Ok(row.insert(db).await?)
    }
}
