use axum::{
    extract::{Json, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{AuthRouterExt, AuthUser, TokenPair};
use crate::entities::user;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::users::RegisterUserCommand;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: user::Model,
    pub tokens: TokenPair,
}

pub fn routes() -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/verify-otp", post(verify_otp))
        .route("/reset-password", post(reset_password));

    let protected = Router::new().route("/profile", get(profile)).with_auth();

    public.merge(protected)
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let user = state
        .services
        .users
        .register(RegisterUserCommand {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            role: payload.role,
        })
        .await?;

    let tokens = state.auth.generate_token_pair(&user)?;

    // Best effort; registration succeeds even if the mail gateway is down
    state
        .services
        .mailer
        .send_async(state.services.mailer.welcome_message(&user.email, &user.name));

    Ok((StatusCode::CREATED, Json(AuthResponse { user, tokens })))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let user = state
        .services
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;

    let tokens = state.auth.generate_token_pair(&user)?;

    Ok(Json(AuthResponse { user, tokens }))
}

async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tokens = state.auth.refresh_token_pair(&payload.refresh_token).await?;
    Ok(Json(serde_json::json!({ "tokens": tokens })))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ServiceError> {
    // Revoke whichever tokens the client presented
    if let Some(auth_value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth_value.strip_prefix("Bearer ") {
            let _ = state.auth.revoke_token(token.trim()).await;
        }
    }
    if let Some(Json(body)) = payload {
        let _ = state.auth.revoke_token(&body.refresh_token).await;
    }

    Ok(Json(serde_json::json!({ "message": "Logout successful" })))
}

async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state
        .services
        .users
        .get(user.user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    // The response never reveals whether the account exists
    if let Some(user) = state.services.users.find_by_email(&payload.email).await? {
        if user.is_active {
            let otp = state.services.otp.issue(user.id).await?;
            state
                .services
                .mailer
                .send_async(state.services.mailer.otp_message(&user.email, &otp, &user.name));
        }
    }

    Ok(Json(serde_json::json!({
        "message": "If an account with that email exists, we have sent a password reset code."
    })))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let user = state
        .services
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    if !state.services.otp.verify(user.id, &payload.otp).await? {
        return Err(ServiceError::InvalidInput(
            "Invalid or expired OTP".to_string(),
        ));
    }

    Ok(Json(serde_json::json!({ "message": "OTP verified successfully" })))
}

async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let user = state
        .services
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

    if !state.services.otp.verify(user.id, &payload.otp).await? {
        return Err(ServiceError::InvalidInput(
            "Invalid or expired OTP".to_string(),
        ));
    }

    state
        .services
        .users
        .set_password(user.id, &payload.new_password)
        .await?;
    state.services.otp.consume(user.id, &payload.otp).await?;

    state
        .services
        .mailer
        .send_async(
            state
                .services
                .mailer
                .password_changed_message(&user.email, &user.name),
        );

    Ok(Json(serde_json::json!({ "message": "Password reset successfully" })))
}
