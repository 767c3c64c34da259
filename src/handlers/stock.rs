use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::{PaginatedResponse, PaginationParams};
use crate::handlers::AppState;
use crate::services::stock::{
    AdjustStockCommand, AdjustmentKind, ReceiveStockCommand, ReceiveStockItem,
    StockOverviewFilter, TransferStockCommand,
};
use crate::ApiResponse;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StockOverviewParams {
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub low_stock: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LedgerParams {
    pub product_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    pub product_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: i32,
    pub adjustment: AdjustmentKind,
    pub reason: Option<String>,
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferStockRequest {
    pub product_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveItemRequest {
    pub product_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0.0, message = "Unit cost must be non-negative"))]
    pub unit_cost: f64,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveStockRequest {
    pub supplier_id: Uuid,
    // Emptiness is rejected by the service; per-item rules validate here
    #[validate]
    pub items: Vec<ReceiveItemRequest>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stock_overview))
        .route("/ledger", get(stock_ledger))
        .route("/product/:product_id", get(product_stock))
        .route("/adjust", post(adjust_stock))
        .route("/transfer", post(transfer_stock))
        .route("/receive", post(receive_stock))
}

/// Stock overview across warehouses
#[utoipa::path(
    get,
    path = "/api/inventory/stock",
    params(StockOverviewParams),
    responses(
        (status = 200, description = "Stock overview returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn stock_overview(
    State(state): State<AppState>,
    Query(params): Query<StockOverviewParams>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let overview = state
        .services
        .stock
        .overview(StockOverviewFilter {
            warehouse_id: params.warehouse_id,
            location_id: params.location_id,
            product_id: params.product_id,
            low_stock: params.low_stock.unwrap_or(false),
        })
        .await?;

    Ok(Json(ApiResponse::success(overview)))
}

/// Paginated stock ledger, newest first
#[utoipa::path(
    get,
    path = "/api/inventory/stock/ledger",
    params(LedgerParams),
    responses(
        (status = 200, description = "Ledger page returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn stock_ledger(
    State(state): State<AppState>,
    Query(params): Query<LedgerParams>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: params.page.unwrap_or(defaults.page),
        per_page: params.per_page.unwrap_or(defaults.per_page),
    };

    let (entries, total) = state
        .services
        .stock
        .ledger(params.product_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        entries,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Stock for a single product
#[utoipa::path(
    get,
    path = "/api/inventory/stock/product/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product stock returned"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn product_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let stock = state.services.stock.product_stock(product_id).await?;
    Ok(Json(ApiResponse::success(stock)))
}

/// Adjust stock (increase / decrease / set)
#[utoipa::path(
    post,
    path = "/api/inventory/stock/adjust",
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or location not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let kind = payload.adjustment;
    let updated = state
        .services
        .stock
        .adjust(AdjustStockCommand {
            product_id: payload.product_id,
            location_id: payload.location_id,
            quantity: payload.quantity,
            kind,
            reason: payload.reason,
            unit_cost: payload.unit_cost,
            user_id: Some(user.user_id),
        })
        .await?;

    let verb = match kind {
        AdjustmentKind::Increase => "increase",
        AdjustmentKind::Decrease => "decrease",
        AdjustmentKind::Set => "set",
    };

    Ok(Json(ApiResponse::with_message(
        updated,
        &format!("Stock {} completed successfully", verb),
    )))
}

/// Transfer stock between locations
#[utoipa::path(
    post,
    path = "/api/inventory/stock/transfer",
    request_body = TransferStockRequest,
    responses(
        (status = 200, description = "Stock transferred"),
        (status = 400, description = "Invalid transfer or insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn transfer_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TransferStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let (source, destination) = state
        .services
        .stock
        .transfer(TransferStockCommand {
            product_id: payload.product_id,
            from_location_id: payload.from_location_id,
            to_location_id: payload.to_location_id,
            quantity: payload.quantity,
            user_id: Some(user.user_id),
        })
        .await?;

    Ok(Json(ApiResponse::with_message(
        serde_json::json!({ "source": source, "destination": destination }),
        "Stock transfer completed successfully",
    )))
}

/// Receive stock from a supplier
#[utoipa::path(
    post,
    path = "/api/inventory/stock/receive",
    request_body = ReceiveStockRequest,
    responses(
        (status = 201, description = "Stock receipt processed"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReceiveStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;

    let items = payload
        .items
        .into_iter()
        .map(|item| {
            Decimal::try_from(item.unit_cost)
                .map_err(|_| {
                    ServiceError::ValidationError("Unit cost is not a valid number".to_string())
                })
                .map(|unit_cost| ReceiveStockItem {
                    product_id: item.product_id,
                    location_id: item.location_id,
                    quantity: item.quantity,
                    unit_cost,
                    expiry_date: item.expiry_date,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result = state
        .services
        .stock
        .receive(ReceiveStockCommand {
            supplier_id: payload.supplier_id,
            items,
            user_id: Some(user.user_id),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            result,
            "Stock receipt processed successfully",
        )),
    ))
}
