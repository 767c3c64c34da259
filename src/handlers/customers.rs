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
use crate::services::customers::{CreateCustomerCommand, UpdateCustomerCommand};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CustomerRequest {
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
        .route("/", get(list_customers))
        .route("/", post(create_customer))
        .route("/:id", get(get_customer))
        .route("/:id", put(update_customer))
        .route("/:id", delete(delete_customer))
}

async fn list_customers(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let customers = state.services.customers.list().await?;
    Ok(Json(customers))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.get(id).await?;
    Ok(Json(customer))
}

async fn create_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let customer = state
        .services
        .customers
        .create(CreateCustomerCommand {
            name: payload.name,
            code: payload.code,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(payload): Json<CustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    // PUT is a full replace: absent optional fields clear the column
    let customer = state
        .services
        .customers
        .update(
            id,
            UpdateCustomerCommand {
                name: Some(payload.name),
                code: Some(payload.code),
                email: Some(payload.email),
                phone: Some(payload.phone),
                address: Some(payload.address),
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.delete(id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Customer deleted successfully" }),
    ))
}
