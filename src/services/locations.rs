use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{location, stock_location, warehouse};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::{stock_lines_for_locations, StockLineSummary};

/// What a location is used for inside a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationKind {
    Storage,
    Production,
    Receiving,
    Shipping,
    Damaged,
    Quarantine,
}

impl LocationKind {
    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        Self::from_str(value)
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid location type: {}", value)))
    }
}

#[derive(Debug, Clone)]
pub struct CreateLocationCommand {
    pub name: String,
    pub code: String,
    pub warehouse_id: Uuid,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationStats {
    pub total_stock: i64,
    pub total_products: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationWithStats {
    #[serde(flatten)]
    pub location: location::Model,
    pub warehouse: Option<warehouse::Model>,
    pub stats: LocationStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationDetail {
    #[serde(flatten)]
    pub location: location::Model,
    pub warehouse: Option<warehouse::Model>,
    pub stock: Vec<StockLineSummary>,
}

/// Service for warehouse locations
#[derive(Clone)]
pub struct LocationService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LocationService {
    /// Creates a new location service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Active locations, optionally restricted to one warehouse, with stats.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        warehouse_id: Option<Uuid>,
    ) -> Result<Vec<LocationWithStats>, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = location::Entity::find()
            .filter(location::Column::IsActive.eq(true))
            .order_by_asc(location::Column::Name);
        if let Some(warehouse_id) = warehouse_id {
            query = query.filter(location::Column::WarehouseId.eq(warehouse_id));
        }
        let locations = query.all(db).await?;

        let warehouse_ids: Vec<Uuid> = locations.iter().map(|l| l.warehouse_id).collect();
        let warehouses: std::collections::HashMap<Uuid, warehouse::Model> =
            warehouse::Entity::find()
                .filter(warehouse::Column::Id.is_in(warehouse_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|w| (w.id, w))
                .collect();

        let location_ids: Vec<Uuid> = locations.iter().map(|l| l.id).collect();
        let mut stock_by_location = stock_lines_for_locations(db, location_ids).await?;

        Ok(locations
            .into_iter()
            .map(|l| {
                let stock = stock_by_location.remove(&l.id).unwrap_or_default();
                LocationWithStats {
                    warehouse: warehouses.get(&l.warehouse_id).cloned(),
                    stats: LocationStats {
                        total_stock: stock.iter().map(|s| s.quantity as i64).sum(),
                        total_products: stock.len(),
                    },
                    location: l,
                }
            })
            .collect())
    }

    /// One location with its warehouse and stock rows.
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<LocationDetail, ServiceError> {
        let db = self.db_pool.as_ref();

        let location = location::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Location not found".to_string()))?;

        let warehouse = warehouse::Entity::find_by_id(location.warehouse_id)
            .one(db)
            .await?;

        let mut stock_by_location = stock_lines_for_locations(db, vec![id]).await?;

        Ok(LocationDetail {
            warehouse,
            stock: stock_by_location.remove(&id).unwrap_or_default(),
            location,
        })
    }

    /// Create a location. Codes are stored uppercased and must be unique;
    /// the owning warehouse must exist.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        command: CreateLocationCommand,
    ) -> Result<location::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let kind = LocationKind::parse(&command.kind)?;

        let warehouse = warehouse::Entity::find_by_id(command.warehouse_id)
            .one(db)
            .await?;
        if warehouse.is_none() {
            return Err(ServiceError::InvalidInput(
                "Warehouse not found".to_string(),
            ));
        }

        let code = command.code.to_uppercase();
        let existing = location::Entity::find()
            .filter(location::Column::Code.eq(code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(
                "Location with this code already exists".to_string(),
            ));
        }

        let row = location::ActiveModel {
            id: Set(Uuid::new_v4()),
            warehouse_id: Set(command.warehouse_id),
            name: Set(command.name),
            code: Set(code),
            kind: Set(kind.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = row.insert(db).await?;

        info!(location_id = %created.id, code = %created.code, "Location created");

        self.event_sender
            .send(Event::LocationCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Update a location; code conflicts with other locations are rejected.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        command: CreateLocationCommand,
    ) -> Result<location::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = location::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Location not found".to_string()))?;

        let kind = LocationKind::parse(&command.kind)?;

        let warehouse = warehouse::Entity::find_by_id(command.warehouse_id)
            .one(db)
            .await?;
        if warehouse.is_none() {
            return Err(ServiceError::InvalidInput(
                "Warehouse not found".to_string(),
            ));
        }

        let code = command.code.to_uppercase();
        if code != existing.code {
            let conflict = location::Entity::find()
                .filter(location::Column::Code.eq(code.clone()))
                .one(db)
                .await?;
            if conflict.is_some() {
                return Err(ServiceError::InvalidInput(
                    "Another location with this code already exists".to_string(),
                ));
            }
        }

        let mut active: location::ActiveModel = existing.into();
        active.warehouse_id = Set(command.warehouse_id);
        active.name = Set(command.name);
        active.code = Set(code);
        active.kind = Set(kind.to_string());
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    /// Soft-delete a location. Refused while it holds stock.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = location::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Location not found".to_string()))?;

        let has_stock = stock_location::Entity::find()
            .filter(stock_location::Column::LocationId.eq(id))
            .filter(stock_location::Column::Quantity.gt(0))
            .one(db)
            .await?
            .is_some();

        if has_stock {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete location with existing stock. Please move or adjust stock first."
                    .to_string(),
            ));
        }

        let mut active: location::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.event_sender
            .send(Event::LocationDeactivated(id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_kind_parsing() {
        assert_eq!(
            LocationKind::parse("STORAGE").unwrap(),
            LocationKind::Storage
        );
        assert_eq!(
            LocationKind::parse("QUARANTINE").unwrap(),
            LocationKind::Quarantine
        );
        assert!(LocationKind::parse("BASEMENT").is_err());
        assert_eq!(LocationKind::Receiving.to_string(), "RECEIVING");
    }
}
