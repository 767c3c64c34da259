use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StockMaster API",
        version = "0.1.0",
        description = r#"
# StockMaster Warehouse Management API

REST backend for managing products, warehouses, locations, stock levels, and
delivery orders.

## Authentication

All endpoints except `/health` and the `/api/auth` entry points require a JWT
access token:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Errors use a consistent envelope with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Insufficient stock at source location",
  "timestamp": "2025-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "stock", description = "Stock levels, adjustments, transfers, receipts, and the ledger"),
        (name = "deliveries", description = "Outbound delivery orders"),
        (name = "products", description = "Product catalog")
    ),
    paths(
        // Stock
        crate::handlers::stock::stock_overview,
        crate::handlers::stock::stock_ledger,
        crate::handlers::stock::product_stock,
        crate::handlers::stock::adjust_stock,
        crate::handlers::stock::transfer_stock,
        crate::handlers::stock::receive_stock,

        // Deliveries
        crate::handlers::deliveries::list_deliveries,
        crate::handlers::deliveries::create_delivery,
        crate::handlers::deliveries::update_status,
        crate::handlers::deliveries::validate_delivery,

        // Products
        crate::handlers::products::list_products,
    ),
    components(
        schemas(
            // Requests
            crate::handlers::stock::AdjustStockRequest,
            crate::handlers::stock::TransferStockRequest,
            crate::handlers::stock::ReceiveStockRequest,
            crate::handlers::stock::ReceiveItemRequest,
            crate::handlers::deliveries::CreateDeliveryRequest,
            crate::handlers::deliveries::DeliveryLineRequest,
            crate::handlers::deliveries::UpdateStatusRequest,

            // Domain types
            crate::services::stock::AdjustmentKind,
            crate::services::stock::StockOverview,
            crate::services::stock::StockOverviewRow,
            crate::services::stock::StockStatistics,
            crate::services::deliveries::DeliveryStatus,

            // Error type
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("StockMaster API"));
        assert!(json.contains("/api/inventory/stock/adjust"));
        assert!(json.contains("/api/deliveries"));
    }
}
