use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{location, stock_location, warehouse};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::{stock_lines_for_locations, StockLineSummary};

#[derive(Debug, Clone)]
pub struct CreateWarehouseCommand {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WarehouseStats {
    pub total_stock: i64,
    pub total_products: usize,
    pub total_locations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseWithStats {
    #[serde(flatten)]
    pub warehouse: warehouse::Model,
    pub stats: WarehouseStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationWithStock {
    #[serde(flatten)]
    pub location: location::Model,
    pub stock: Vec<StockLineSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseDetail {
    #[serde(flatten)]
    pub warehouse: warehouse::Model,
    pub locations: Vec<LocationWithStock>,
}

/// Service for warehouses
#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl WarehouseService {
    /// Creates a new warehouse service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Active warehouses with per-warehouse stock statistics.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<WarehouseWithStats>, ServiceError> {
        let db = self.db_pool.as_ref();

        let warehouses = warehouse::Entity::find()
            .filter(warehouse::Column::IsActive.eq(true))
            .order_by_asc(warehouse::Column::Name)
            .all(db)
            .await?;

        let warehouse_ids: Vec<Uuid> = warehouses.iter().map(|w| w.id).collect();
        let locations = location::Entity::find()
            .filter(location::Column::WarehouseId.is_in(warehouse_ids))
            .filter(location::Column::IsActive.eq(true))
            .all(db)
            .await?;

        let location_ids: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
        let stock_rows = stock_location::Entity::find()
            .filter(stock_location::Column::LocationId.is_in(location_ids))
            .all(db)
            .await?;

        let location_to_warehouse: HashMap<Uuid, Uuid> =
            locations.iter().map(|l| (l.id, l.warehouse_id)).collect();

        let mut totals: HashMap<Uuid, (i64, HashSet<Uuid>)> = HashMap::new();
        for stock in &stock_rows {
            if let Some(warehouse_id) = location_to_warehouse.get(&stock.location_id) {
                let entry = totals.entry(*warehouse_id).or_default();
                entry.0 += stock.quantity as i64;
                entry.1.insert(stock.product_id);
            }
        }

        let mut location_counts: HashMap<Uuid, usize> = HashMap::new();
        for location in &locations {
            *location_counts.entry(location.warehouse_id).or_default() += 1;
        }

        Ok(warehouses
            .into_iter()
            .map(|w| {
                let (total_stock, products) = totals.remove(&w.id).unwrap_or_default();
                let total_locations = location_counts.get(&w.id).copied().unwrap_or(0);
                WarehouseWithStats {
                    stats: WarehouseStats {
                        total_stock,
                        total_products: products.len(),
                        total_locations,
                    },
                    warehouse: w,
                }
            })
            .collect())
    }

    /// One warehouse with its locations and their stock.
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<WarehouseDetail, ServiceError> {
        let db = self.db_pool.as_ref();

        let warehouse = warehouse::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Warehouse not found".to_string()))?;

        let locations = location::Entity::find()
            .filter(location::Column::WarehouseId.eq(id))
            .order_by_asc(location::Column::Name)
            .all(db)
            .await?;

        let location_ids: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
        let mut stock_by_location = stock_lines_for_locations(db, location_ids).await?;

        Ok(WarehouseDetail {
            warehouse,
            locations: locations
                .into_iter()
                .map(|l| LocationWithStock {
                    stock: stock_by_location.remove(&l.id).unwrap_or_default(),
                    location: l,
                })
                .collect(),
        })
    }

    /// Create a warehouse. Codes are stored uppercased and must be unique.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        command: CreateWarehouseCommand,
    ) -> Result<warehouse::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let code = command.code.to_uppercase();

        let existing = warehouse::Entity::find()
            .filter(warehouse::Column::Code.eq(code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(
                "Warehouse with this code already exists".to_string(),
            ));
        }

        let row = warehouse::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(command.name),
            code: Set(code),
            address: Set(command.address),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = row.insert(db).await?;

        info!(warehouse_id = %created.id, code = %created.code, "Warehouse created");

        self.event_sender
            .send(Event::WarehouseCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Update a warehouse; code conflicts with other warehouses are rejected.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        command: CreateWarehouseCommand,
    ) -> Result<warehouse::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = warehouse::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Warehouse not found".to_string()))?;

        let code = command.code.to_uppercase();
        if code != existing.code {
            let conflict = warehouse::Entity::find()
                .filter(warehouse::Column::Code.eq(code.clone()))
                .one(db)
                .await?;
            if conflict.is_some() {
                return Err(ServiceError::InvalidInput(
                    "Another warehouse with this code already exists".to_string(),
                ));
            }
        }

        let mut active: warehouse::ActiveModel = existing.into();
        active.name = Set(command.name);
        active.code = Set(code);
        active.address = Set(command.address);
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    /// Soft-delete a warehouse. Refused while any of its locations holds stock.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = warehouse::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Warehouse not found".to_string()))?;

        let location_ids: Vec<Uuid> = location::Entity::find()
            .filter(location::Column::WarehouseId.eq(id))
            .all(db)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();

        let has_stock = stock_location::Entity::find()
            .filter(stock_location::Column::LocationId.is_in(location_ids))
            .filter(stock_location::Column::Quantity.gt(0))
            .one(db)
            .await?
            .is_some();

        if has_stock {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete warehouse with existing stock. Please move or adjust stock first."
                    .to_string(),
            ));
        }

        let mut active: warehouse::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.event_sender
            .send(Event::WarehouseDeactivated(id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}
