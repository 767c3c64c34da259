mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Set};
use std::time::Duration as StdDuration;
use uuid::Uuid;

use stockmaster_api::auth::{AuthConfig, AuthService};
use stockmaster_api::entities::{otp_token, user};
use stockmaster_api::errors::ServiceError;
use stockmaster_api::services::users::RegisterUserCommand;

use common::{setup, TestApp};

fn auth_service(app: &TestApp) -> AuthService {
    AuthService::new(
        AuthConfig::new(
            "integration_test_signing_material_long_enough".to_string(),
            "stockmaster-api".to_string(),
            "stockmaster".to_string(),
            StdDuration::from_secs(900),
            StdDuration::from_secs(604800),
        ),
        app.db.clone(),
    )
}

fn register_command(email: &str) -> RegisterUserCommand {
    RegisterUserCommand {
        email: email.to_string(),
        password: "correct-horse-battery".to_string(),
        name: "Warehouse Staff".to_string(),
        role: None,
    }
}

#[tokio::test]
async fn register_login_and_token_round_trip() {
    let app = setup().await;
    let auth = auth_service(&app);

    let user = app
        .services
        .users
        .register(register_command("staff@example.com"))
        .await
        .unwrap();
    assert_eq!(user.role, "WAREHOUSE_STAFF");

    // Password verification
    let authenticated = app
        .services
        .users
        .authenticate("staff@example.com", "correct-horse-battery")
        .await
        .unwrap();
    assert_eq!(authenticated.id, user.id);

    assert_matches!(
        app.services
            .users
            .authenticate("staff@example.com", "wrong-password")
            .await
            .unwrap_err(),
        ServiceError::Unauthorized(_)
    );
    assert_matches!(
        app.services
            .users
            .authenticate("nobody@example.com", "correct-horse-battery")
            .await
            .unwrap_err(),
        ServiceError::Unauthorized(_)
    );

    // Token pair round trip
    let pair = auth.generate_token_pair(&user).unwrap();
    let claims = auth.validate_access_token(&pair.access_token).await.unwrap();
    assert_eq!(claims.sub, user.id.to_string());

    // Refresh rotates: the new pair works, the old refresh token is spent
    let rotated = auth.refresh_token_pair(&pair.refresh_token).await.unwrap();
    assert!(auth
        .validate_access_token(&rotated.access_token)
        .await
        .is_ok());
    assert!(auth.refresh_token_pair(&pair.refresh_token).await.is_err());

    // An access token cannot be used as a refresh token
    assert!(auth.refresh_token_pair(&rotated.access_token).await.is_err());
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let app = setup().await;

    app.services
        .users
        .register(register_command("dup@example.com"))
        .await
        .unwrap();

    assert_matches!(
        app.services
            .users
            .register(register_command("dup@example.com"))
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );
}

#[tokio::test]
async fn invalid_role_rejected() {
    let app = setup().await;

    let err = app
        .services
        .users
        .register(RegisterUserCommand {
            role: Some("SUPERUSER".to_string()),
            ..register_command("role@example.com")
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));
}

#[tokio::test]
async fn deactivated_users_cannot_authenticate_or_refresh() {
    let app = setup().await;
    let auth = auth_service(&app);

    let registered = app
        .services
        .users
        .register(register_command("inactive@example.com"))
        .await
        .unwrap();
    let pair = auth.generate_token_pair(&registered).unwrap();

    let mut active: user::ActiveModel = registered.into();
    active.is_active = Set(false);
    active.update(app.db.as_ref()).await.unwrap();

    assert_matches!(
        app.services
            .users
            .authenticate("inactive@example.com", "correct-horse-battery")
            .await
            .unwrap_err(),
        ServiceError::Unauthorized(_)
    );
    assert!(auth.refresh_token_pair(&pair.refresh_token).await.is_err());
}

#[tokio::test]
async fn otp_reset_flow() {
    let app = setup().await;

    let user = app
        .services
        .users
        .register(register_command("reset@example.com"))
        .await
        .unwrap();

    let otp = app.services.otp.issue(user.id).await.unwrap();
    assert_eq!(otp.len(), 6);

    // Issuing again replaces the previous code
    let otp2 = app.services.otp.issue(user.id).await.unwrap();
    assert!(!app.services.otp.verify(user.id, &otp).await.unwrap() || otp == otp2);
    assert!(app.services.otp.verify(user.id, &otp2).await.unwrap());

    // Reset and consume
    app.services
        .users
        .set_password(user.id, "new-password-123")
        .await
        .unwrap();
    app.services.otp.consume(user.id, &otp2).await.unwrap();
    assert!(!app.services.otp.verify(user.id, &otp2).await.unwrap());

    app.services
        .users
        .authenticate("reset@example.com", "new-password-123")
        .await
        .unwrap();
    assert_matches!(
        app.services
            .users
            .authenticate("reset@example.com", "correct-horse-battery")
            .await
            .unwrap_err(),
        ServiceError::Unauthorized(_)
    );
}

#[tokio::test]
async fn expired_otp_is_rejected_and_cleaned_up() {
    let app = setup().await;

    let user = app
        .services
        .users
        .register(register_command("expired@example.com"))
        .await
        .unwrap();

    let stale = otp_token::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        token: Set("123456".to_string()),
        expires_at: Set(Utc::now() - Duration::minutes(1)),
        created_at: Set(Utc::now() - Duration::minutes(11)),
    };
    stale.insert(app.db.as_ref()).await.unwrap();

    assert!(!app.services.otp.verify(user.id, "123456").await.unwrap());

    let removed = app.services.otp.cleanup_expired().await.unwrap();
    assert_eq!(removed, 1);
}
