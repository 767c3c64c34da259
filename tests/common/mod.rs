//! Shared setup for integration tests: an isolated in-memory SQLite database
//! with the embedded migrations applied, plus the service container.
#![allow(dead_code)]

use std::sync::Arc;
use uuid::Uuid;

use stockmaster_api::db::DbPool;
use stockmaster_api::handlers::AppServices;
use stockmaster_api::notifications::Mailer;
use stockmaster_api::services::locations::CreateLocationCommand;
use stockmaster_api::services::products::CreateProductCommand;
use stockmaster_api::services::suppliers::CreateSupplierCommand;
use stockmaster_api::services::warehouses::CreateWarehouseCommand;

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
}

/// Fresh database + services. Each call gets its own named in-memory
/// database so tests cannot observe each other.
pub async fn setup() -> TestApp {
    let url = format!(
        "sqlite:file:{}?mode=memory&cache=shared",
        Uuid::new_v4().simple()
    );
    let db = Arc::new(
        stockmaster_api::db::establish_connection(&url)
            .await
            .expect("failed to open test database"),
    );
    stockmaster_api::db::run_migrations(db.as_ref())
        .await
        .expect("failed to run migrations");

    let (event_sender, event_rx) = stockmaster_api::events::channel(256);
    tokio::spawn(stockmaster_api::events::process_events(event_rx));

    let services = AppServices::new(
        db.clone(),
        Arc::new(event_sender),
        Mailer::new(None, None, "no-reply@stockmaster.test".to_string()),
    );

    TestApp { db, services }
}

pub async fn create_warehouse(app: &TestApp, name: &str, code: &str) -> Uuid {
    app.services
        .warehouses
        .create(CreateWarehouseCommand {
            name: name.to_string(),
            code: code.to_string(),
            address: None,
        })
        .await
        .expect("failed to create warehouse")
        .id
}

pub async fn create_location(app: &TestApp, warehouse_id: Uuid, name: &str, code: &str) -> Uuid {
    app.services
        .locations
        .create(CreateLocationCommand {
            name: name.to_string(),
            code: code.to_string(),
            warehouse_id,
            kind: "STORAGE".to_string(),
        })
        .await
        .expect("failed to create location")
        .id
}

pub async fn create_product(app: &TestApp, name: &str, sku: &str) -> Uuid {
    app.services
        .products
        .create(CreateProductCommand {
            name: name.to_string(),
            sku: sku.to_string(),
            description: None,
            category_id: None,
            unit_of_measure: Some("piece".to_string()),
            reorder_level: Some(10),
            reorder_quantity: Some(100),
        })
        .await
        .expect("failed to create product")
        .id
}

pub async fn create_supplier(app: &TestApp, name: &str, code: &str) -> Uuid {
    app.services
        .suppliers
        .create(CreateSupplierCommand {
            name: name.to_string(),
            code: code.to_string(),
            email: None,
            phone: None,
            address: None,
        })
        .await
        .expect("failed to create supplier")
        .id
}
