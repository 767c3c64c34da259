use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{customer, delivery_order};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

const RECENT_DELIVERIES_LIMIT: u64 = 10;

#[derive(Debug, Clone)]
pub struct CreateCustomerCommand {
    pub name: String,
    pub code: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerCommand {
    pub name: Option<String>,
    pub code: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: customer::Model,
    pub deliveries: Vec<delivery_order::Model>,
}

/// Service for customers
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CustomerService {
    /// Creates a new customer service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Active customers ordered by name.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<customer::Model>, ServiceError> {
        Ok(customer::Entity::find()
            .filter(customer::Column::IsActive.eq(true))
            .order_by_asc(customer::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    /// One customer with their most recent deliveries.
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<CustomerDetail, ServiceError> {
        let db = self.db_pool.as_ref();

        let customer = customer::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

        let deliveries = customer
            .find_related(delivery_order::Entity)
            .order_by_desc(delivery_order::Column::CreatedAt)
            .limit(RECENT_DELIVERIES_LIMIT)
            .all(db)
            .await?;

        Ok(CustomerDetail {
            customer,
            deliveries,
        })
    }

    /// Create a customer. Codes must be unique.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        command: CreateCustomerCommand,
    ) -> Result<customer::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = customer::Entity::find()
            .filter(customer::Column::Code.eq(command.code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(
                "Customer code already exists".to_string(),
            ));
        }

        let row = customer::ActiveModel {
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

        info!(customer_id = %created.id, code = %created.code, "Customer created");

        self.event_sender
            .send(Event::CustomerCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Update customer fields, including deactivation.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateCustomerCommand,
    ) -> Result<customer::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = customer::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

        if let Some(code) = &command.code {
            if *code != existing.code {
                let conflict = customer::Entity::find()
                    .filter(customer::Column::Code.eq(code.clone()))
                    .one(db)
                    .await?;
                if conflict.is_some() {
                    return Err(ServiceError::InvalidInput(
                        "Customer code already exists".to_string(),
                    ));
                }
            }
        }

        let mut active: customer::ActiveModel = existing.into();
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

    /// Hard-delete a customer.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = customer::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

        existing.delete(db).await?;
        Ok(())
    }
}
