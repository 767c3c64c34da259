use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::deliveries::{
    CreateDeliveryCommand, NewDeliveryLine, UpdateDeliveryCommand,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeliveryLineRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Line quantity must be at least 1"))]
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDeliveryRequest {
    pub customer_id: Option<Uuid>,
    pub location_id: Uuid,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    // Emptiness is rejected by the service; per-line rules validate here
    #[validate]
    pub lines: Vec<DeliveryLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeliveryRequest {
    pub customer_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_deliveries))
        .route("/", post(create_delivery))
        .route("/:id", get(get_delivery))
        .route("/:id", put(update_delivery))
        .route("/:id", delete(delete_delivery))
        .route("/:id/status", patch(update_status))
        .route("/:id/confirm", post(confirm_delivery))
        .route("/:id/pick", post(pick_delivery))
        .route("/:id/pack", post(pack_delivery))
        .route("/:id/validate", post(validate_delivery))
}

/// List deliveries, newest first
#[utoipa::path(
    get,
    path = "/api/deliveries",
    responses(
        (status = 200, description = "Delivery list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn list_deliveries(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let deliveries = state.services.deliveries.list().await?;
    Ok(Json(deliveries))
}

async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let delivery = state.services.deliveries.get(id).await?;
    Ok(Json(delivery))
}

/// Create a delivery order in DRAFT
#[utoipa::path(
    post,
    path = "/api/deliveries",
    request_body = CreateDeliveryRequest,
    responses(
        (status = 201, description = "Delivery created"),
        (status = 400, description = "Missing location or lines", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn create_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let delivery = state
        .services
        .deliveries
        .create(CreateDeliveryCommand {
            customer_id: payload.customer_id,
            location_id: payload.location_id,
            scheduled_date: payload.scheduled_date,
            notes: payload.notes,
            user_id: Some(user.user_id),
            lines: payload
                .lines
                .into_iter()
                .map(|line| NewDeliveryLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    notes: line.notes,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(delivery)))
}

async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(payload): Json<UpdateDeliveryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    // PUT replaces the header: absent customer/schedule/notes clear the field
    let delivery = state
        .services
        .deliveries
        .update(
            id,
            UpdateDeliveryCommand {
                customer_id: Some(payload.customer_id),
                location_id: payload.location_id,
                scheduled_date: Some(payload.scheduled_date),
                notes: Some(payload.notes),
            },
        )
        .await?;

    Ok(Json(delivery))
}

/// Explicit status transition
#[utoipa::path(
    patch,
    path = "/api/deliveries/{id}/status",
    params(("id" = Uuid, Path, description = "Delivery ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status or transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let delivery = state
        .services
        .deliveries
        .set_status(id, &payload.status)
        .await?;
    Ok(Json(delivery))
}

async fn confirm_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let delivery = state.services.deliveries.confirm(id).await?;
    Ok(Json(delivery))
}

async fn pick_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let delivery = state.services.deliveries.pick(id).await?;
    Ok(Json(delivery))
}

async fn pack_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let delivery = state.services.deliveries.pack(id).await?;
    Ok(Json(delivery))
}

/// Validate a READY delivery, decrementing stock
#[utoipa::path(
    post,
    path = "/api/deliveries/{id}/validate",
    params(("id" = Uuid, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery validated and stock decremented"),
        (status = 400, description = "Delivery is not READY", body = crate::errors::ErrorResponse),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    tag = "deliveries"
)]
pub async fn validate_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let delivery = state.services.deliveries.validate(id).await?;
    Ok(Json(delivery))
}

async fn delete_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.deliveries.delete(id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Delivery deleted successfully" }),
    ))
}
