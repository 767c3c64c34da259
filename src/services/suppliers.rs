use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::supplier;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone)]
pub struct CreateSupplierCommand {
    pub name: String,
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSupplierCommand {
    pub name: Option<String>,
    pub code: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Service for suppliers
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SupplierService {
    /// Creates a new supplier service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Active suppliers ordered by name.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .filter(supplier::Column::IsActive.eq(true))
            .order_by_asc(supplier::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    /// Gets a supplier by ID
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))
    }

    /// Create a supplier. Codes must be unique.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        command: CreateSupplierCommand,
    ) -> Result<supplier::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = supplier::Entity::find()
            .filter(supplier::Column::Code.eq(command.code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(
                "Supplier code already exists".to_string(),
            ));
        }

        let row = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(command.name),
            code: Set(command.code),
            email: Set(command.email),
            phone: Set(command.phone),
            address: Set(command.address),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = row.insert(db).await?;

        info!(supplier_id = %created.id, code = %created.code, "Supplier created");

        self.event_sender
            .send(Event::SupplierCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Update supplier fields, including deactivation.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateSupplierCommand,
    ) -> Result<supplier::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = supplier::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

        if let Some(code) = &command.code {
            if *code != existing.code {
                let conflict = supplier::Entity::find()
                    .filter(supplier::Column::Code.eq(code.clone()))
                    .one(db)
                    .await?;
                if conflict.is_some() {
                    return Err(ServiceError::InvalidInput(
                        "Supplier code already exists".to_string(),
                    ));
                }
            }
        }

        let mut active: supplier::ActiveModel = existing.into();
        if let Some(name) = command.name {
            active.name = Set(name);
        }
        if let Some(code) = command.code {
            active.code = Set(code);
        }
        if let Some(email) = command.email {
            active.email = Set(email);
        }
        if let Some(phone) = command.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = command.address {
            active.address = Set(address);
        }
        if let Some(is_active) = command.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    /// Hard-delete a supplier.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = supplier::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

        existing.delete(db).await?;
        Ok(())
    }
}
