use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::otp_token;
use crate::errors::ServiceError;

/// Lifetime of a password-reset code.
const OTP_EXPIRY_MINUTES: i64 = 10;

/// Generate a 6-digit one-time password.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Store for one-time password-reset codes, backed by the otp_tokens table.
#[derive(Clone)]
pub struct OtpService {
    db: Arc<DbPool>,
}

impl OtpService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Issue a fresh OTP for the user, replacing any previously issued code.
    #[instrument(skip(self))]
    pub async fn issue(&self, user_id: Uuid) -> Result<String, ServiceError> {
        let db = self.db.as_ref();

        otp_token::Entity::delete_many()
            .filter(otp_token::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        let token = generate_otp();
        let record = otp_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token: Set(token.clone()),
            expires_at: Set(Utc::now() + Duration::minutes(OTP_EXPIRY_MINUTES)),
            created_at: Set(Utc::now()),
        };
        record.insert(db).await?;

        Ok(token)
    }

    /// Check whether the given OTP is valid (exists and not expired).
    #[instrument(skip(self, token))]
    pub async fn verify(&self, user_id: Uuid, token: &str) -> Result<bool, ServiceError> {
        let found = otp_token::Entity::find()
            .filter(otp_token::Column::UserId.eq(user_id))
            .filter(otp_token::Column::Token.eq(token))
            .filter(otp_token::Column::ExpiresAt.gt(Utc::now()))
            .one(self.db.as_ref())
            .await?;

        Ok(found.is_some())
    }

    /// Delete the OTP after successful use.
    #[instrument(skip(self, token))]
    pub async fn consume(&self, user_id: Uuid, token: &str) -> Result<(), ServiceError> {
        otp_token::Entity::delete_many()
            .filter(otp_token::Column::UserId.eq(user_id))
            .filter(otp_token::Column::Token.eq(token))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    /// Remove expired codes.
    #[instrument(skip(self))]
    pub async fn cleanup_expired(&self) -> Result<u64, ServiceError> {
        let result = otp_token::Entity::delete_many()
            .filter(otp_token::Column::ExpiresAt.lt(Utc::now()))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert!(!otp.starts_with('0'));
        }
    }
}
