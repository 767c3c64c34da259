use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::warehouses::CreateWarehouseCommand;
use crate::ApiResponse;

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Z0-9_-]+$").unwrap());

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WarehouseRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 20, message = "Code is required"),
        regex(
            path = "CODE_RE",
            message = "Code must contain only uppercase letters, numbers, hyphens, and underscores"
        )
    )]
    pub code: String,
    pub address: Option<String>,
}

impl From<WarehouseRequest> for CreateWarehouseCommand {
    fn from(req: WarehouseRequest) -> Self {
        Self {
            name: req.name,
            code: req.code,
            address: req.address,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_warehouses))
        .route("/", post(create_warehouse))
        .route("/:id", get(get_warehouse))
        .route("/:id", put(update_warehouse))
        .route("/:id", delete(delete_warehouse))
}

async fn list_warehouses(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouses = state.services.warehouses.list().await?;
    Ok(Json(ApiResponse::success(warehouses)))
}

async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouse = state.services.warehouses.get(id).await?;
    Ok(Json(ApiResponse::success(warehouse)))
}

async fn create_warehouse(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<WarehouseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let warehouse = state.services.warehouses.create(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            warehouse,
            "Warehouse created successfully",
        )),
    ))
}

async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(payload): Json<WarehouseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let warehouse = state.services.warehouses.update(id, payload.into()).await?;
    Ok(Json(ApiResponse::with_message(
        warehouse,
        "Warehouse updated successfully",
    )))
}

async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.warehouses.delete(id).await?;
    Ok(Json(ApiResponse::with_message(
        serde_json::json!(null),
        "Warehouse deleted successfully",
    )))
}
