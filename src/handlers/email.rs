use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser, UserRole};
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::notifications::MailKind;
use crate::ApiResponse;

fn default_kind() -> String {
    "welcome".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TestEmailRequest {
    #[validate(email(message = "Email address is required"))]
    pub email: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test-connection", get(test_connection))
        .route("/test-email", post(test_email))
        .with_role(UserRole::Admin.as_str())
}

async fn test_connection(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.mailer.test_connection().await?;
    Ok(Json(ApiResponse::with_message(
        serde_json::json!(null),
        "Email connection verified successfully",
    )))
}

async fn test_email(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<TestEmailRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if state.config.is_production() {
        return Err(ServiceError::Forbidden(
            "Test email endpoint is disabled in production".to_string(),
        ));
    }

    payload.validate()?;

    let kind = MailKind::parse(&payload.kind).ok_or_else(|| {
        ServiceError::InvalidInput(
            "Invalid email type. Use: welcome, otp, password-change".to_string(),
        )
    })?;

    let message = state
        .services
        .mailer
        .message_for(kind, &payload.email, "Test User");
    state.services.mailer.send(message).await?;

    Ok(Json(ApiResponse::with_message(
        serde_json::json!(null),
        &format!("Test {} email sent successfully", payload.kind),
    )))
}
