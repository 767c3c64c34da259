use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::suppliers::{CreateSupplierCommand, UpdateSupplierCommand};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SupplierRequest {
    #[validate(length(min = 1, max = 100, message = "Name and code are required"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Name and code are required"))]
    pub code: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers))
        .route("/", post(create_supplier))
        .route("/:id", get(get_supplier))
        .route("/:id", put(update_supplier))
        .route("/:id", delete(delete_supplier))
}

async fn list_suppliers(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state.services.suppliers.list().await?;
    Ok(Json(suppliers))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.suppliers.get(id).await?;
    Ok(Json(supplier))
}

async fn create_supplier(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let supplier = state
        .services
        .suppliers
        .create(CreateSupplierCommand {
            name: payload.name,
            code: payload.code,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    // PUT is a full replace: absent optional fields clear the column
    let supplier = state
        .services
        .suppliers
        .update(
            id,
            UpdateSupplierCommand {
                name: Some(payload.name),
                code: Some(payload.code),
                email: Some(payload.email),
                phone: Some(payload.phone),
                address: Some(payload.address),
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(supplier))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.delete(id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Supplier deleted successfully" }),
    ))
}
