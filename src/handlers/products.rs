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
use crate::services::products::{CreateProductCommand, UpdateProductCommand};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name and SKU are required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Name and SKU are required"))]
    pub sku: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit_of_measure: Option<String>,
    pub reorder_level: Option<i32>,
    pub reorder_quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub sku: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit_of_measure: Option<String>,
    pub reorder_level: Option<i32>,
    pub reorder_quantity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/categories", get(list_categories))
        .route("/categories", post(create_category))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}

/// List active products with stock totals
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Product list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list().await?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .get(id, &state.services.stock)
        .await?;
    Ok(Json(product))
}

async fn create_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let product = state
        .services
        .products
        .create(CreateProductCommand {
            name: payload.name,
            sku: payload.sku,
            description: payload.description,
            category_id: payload.category_id,
            unit_of_measure: payload.unit_of_measure,
            reorder_level: payload.reorder_level,
            reorder_quantity: payload.reorder_quantity,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    // PUT is a full replace: absent optional fields clear the column
    let product = state
        .services
        .products
        .update(
            id,
            UpdateProductCommand {
                name: Some(payload.name),
                sku: Some(payload.sku),
                description: Some(payload.description),
                category_id: Some(payload.category_id),
                unit_of_measure: payload.unit_of_measure,
                reorder_level: Some(payload.reorder_level),
                reorder_quantity: Some(payload.reorder_quantity),
                is_active: payload.is_active,
            },
        )
        .await?;

    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Product deleted successfully" }),
    ))
}

async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.products.list_categories().await?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let category = state.services.products.create_category(payload.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
