use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::{self, UserRole};
use crate::db::DbPool;
use crate::entities::user;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Option<String>,
}

/// Service for user accounts
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    /// Creates a new user service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Register a new user. Emails must be unique; the password is hashed
    /// with Argon2 before it touches the database.
    #[instrument(skip(self, command), fields(email = %command.email))]
    pub async fn register(&self, command: RegisterUserCommand) -> Result<user::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(command.email.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(
                "User with this email already exists".to_string(),
            ));
        }

        let role = match command.role {
            Some(raw) => UserRole::from_str(&raw)
                .map_err(|_| ServiceError::InvalidInput(format!("Invalid role: {}", raw)))?,
            None => UserRole::WarehouseStaff,
        };

        let password_hash = auth::hash_password(&command.password)?;

        let row = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(command.email),
            password_hash: Set(password_hash),
            name: Set(command.name),
            role: Set(role.as_str().to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = row.insert(db).await?;

        info!(user_id = %created.id, "User registered");

        self.event_sender
            .send(Event::UserRegistered(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Verify credentials for login. All failure modes collapse into the
    /// same error so callers cannot probe for accounts.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(ServiceError::Unauthorized(
                "Account is deactivated".to_string(),
            ));
        }

        if !auth::verify_password(password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }

    /// Gets a user by ID
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?)
    }

    /// Gets a user by email
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db_pool.as_ref())
            .await?)
    }

    /// Replace a user's password with a fresh hash.
    #[instrument(skip(self, new_password))]
    pub async fn set_password(&self, id: Uuid, new_password: &str) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let user = user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let password_hash = auth::hash_password(new_password)?;

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.event_sender
            .send(Event::PasswordReset(id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}
