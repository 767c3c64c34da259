mod common;

use assert_matches::assert_matches;
use uuid::Uuid;

use stockmaster_api::errors::ServiceError;
use stockmaster_api::services::customers::CreateCustomerCommand;
use stockmaster_api::services::locations::CreateLocationCommand;
use stockmaster_api::services::products::CreateProductCommand;
use stockmaster_api::services::stock::{AdjustStockCommand, AdjustmentKind};
use stockmaster_api::services::suppliers::CreateSupplierCommand;
use stockmaster_api::services::warehouses::CreateWarehouseCommand;

use common::{create_location, create_product, create_warehouse, setup, TestApp};

async fn seed_stock(app: &TestApp, product_id: Uuid, location_id: Uuid, quantity: i32) {
    app.services
        .stock
        .adjust(AdjustStockCommand {
            product_id,
            location_id,
            quantity,
            kind: AdjustmentKind::Increase,
            reason: None,
            unit_cost: None,
            user_id: None,
        })
        .await
        .expect("failed to seed stock");
}

#[tokio::test]
async fn warehouse_delete_blocked_while_stock_present() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let product = create_product(&app, "Wireless Mouse", "WM-001").await;
    seed_stock(&app, product, location, 25).await;

    assert_matches!(
        app.services.warehouses.delete(warehouse).await.unwrap_err(),
        ServiceError::InvalidOperation(_)
    );

    // Draining the stock unblocks the soft delete
    app.services
        .stock
        .adjust(AdjustStockCommand {
            product_id: product,
            location_id: location,
            quantity: 0,
            kind: AdjustmentKind::Set,
            reason: Some("drain".to_string()),
            unit_cost: None,
            user_id: None,
        })
        .await
        .unwrap();

    app.services.warehouses.delete(warehouse).await.unwrap();

    // Soft deleted: gone from the active list but still fetchable by id
    let active = app.services.warehouses.list().await.unwrap();
    assert!(active.iter().all(|w| w.warehouse.id != warehouse));
    let detail = app.services.warehouses.get(warehouse).await.unwrap();
    assert!(!detail.warehouse.is_active);
}

#[tokio::test]
async fn location_delete_blocked_while_stock_present() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let product = create_product(&app, "Stapler", "ST-006").await;
    seed_stock(&app, product, location, 5).await;

    assert_matches!(
        app.services.locations.delete(location).await.unwrap_err(),
        ServiceError::InvalidOperation(_)
    );

    app.services
        .stock
        .adjust(AdjustStockCommand {
            product_id: product,
            location_id: location,
            quantity: 5,
            kind: AdjustmentKind::Decrease,
            reason: None,
            unit_cost: None,
            user_id: None,
        })
        .await
        .unwrap();

    app.services.locations.delete(location).await.unwrap();
    let active = app.services.locations.list(None).await.unwrap();
    assert!(active.iter().all(|l| l.location.id != location));
}

#[tokio::test]
async fn duplicate_codes_are_rejected() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    create_location(&app, warehouse, "A-01", "MW-A-01").await;
    create_product(&app, "Wireless Mouse", "WM-001").await;

    // Codes are compared case-insensitively because they are stored uppercased
    assert_matches!(
        app.services
            .warehouses
            .create(CreateWarehouseCommand {
                name: "Duplicate".to_string(),
                code: "mw01".to_string(),
                address: None,
            })
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );

    assert_matches!(
        app.services
            .locations
            .create(CreateLocationCommand {
                name: "Duplicate".to_string(),
                code: "MW-A-01".to_string(),
                warehouse_id: warehouse,
                kind: "STORAGE".to_string(),
            })
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );

    assert_matches!(
        app.services
            .products
            .create(CreateProductCommand {
                name: "Duplicate".to_string(),
                sku: "WM-001".to_string(),
                description: None,
                category_id: None,
                unit_of_measure: None,
                reorder_level: None,
                reorder_quantity: None,
            })
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );

    app.services
        .customers
        .create(CreateCustomerCommand {
            name: "Acme".to_string(),
            code: "ACME".to_string(),
            email: None,
            phone: None,
            address: None,
        })
        .await
        .unwrap();
    assert_matches!(
        app.services
            .customers
            .create(CreateCustomerCommand {
                name: "Acme Again".to_string(),
                code: "ACME".to_string(),
                email: None,
                phone: None,
                address: None,
            })
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );

    app.services
        .suppliers
        .create(CreateSupplierCommand {
            name: "TechCorp".to_string(),
            code: "TECH001".to_string(),
            email: None,
            phone: None,
            address: None,
        })
        .await
        .unwrap();
    assert_matches!(
        app.services
            .suppliers
            .create(CreateSupplierCommand {
                name: "TechCorp Again".to_string(),
                code: "TECH001".to_string(),
                email: None,
                phone: None,
                address: None,
            })
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );
}

#[tokio::test]
async fn location_create_requires_existing_warehouse_and_known_kind() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;

    assert_matches!(
        app.services
            .locations
            .create(CreateLocationCommand {
                name: "Orphan".to_string(),
                code: "ORPH-01".to_string(),
                warehouse_id: Uuid::new_v4(),
                kind: "STORAGE".to_string(),
            })
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );

    assert_matches!(
        app.services
            .locations
            .create(CreateLocationCommand {
                name: "Basement".to_string(),
                code: "BSMT-01".to_string(),
                warehouse_id: warehouse,
                kind: "BASEMENT".to_string(),
            })
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );
}

#[tokio::test]
async fn warehouse_stats_aggregate_stock() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location_a = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let location_b = create_location(&app, warehouse, "B-01", "MW-B-01").await;
    let product_a = create_product(&app, "Copy Paper", "CP-004").await;
    let product_b = create_product(&app, "Ballpoint Pen", "BP-005").await;

    seed_stock(&app, product_a, location_a, 100).await;
    seed_stock(&app, product_a, location_b, 20).await;
    seed_stock(&app, product_b, location_b, 50).await;

    let warehouses = app.services.warehouses.list().await.unwrap();
    let main = warehouses
        .iter()
        .find(|w| w.warehouse.id == warehouse)
        .unwrap();
    assert_eq!(main.stats.total_stock, 170);
    assert_eq!(main.stats.total_products, 2);
    assert_eq!(main.stats.total_locations, 2);

    let detail = app.services.warehouses.get(warehouse).await.unwrap();
    assert_eq!(detail.locations.len(), 2);
    let location_b_detail = detail
        .locations
        .iter()
        .find(|l| l.location.id == location_b)
        .unwrap();
    assert_eq!(location_b_detail.stock.len(), 2);

    let locations = app.services.locations.list(Some(warehouse)).await.unwrap();
    let b_stats = locations
        .iter()
        .find(|l| l.location.id == location_b)
        .unwrap();
    assert_eq!(b_stats.stats.total_stock, 70);
    assert_eq!(b_stats.stats.total_products, 2);
}

#[tokio::test]
async fn product_detail_includes_recent_ledger() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let product = create_product(&app, "Hard Drive", "HD-008").await;

    seed_stock(&app, product, location, 10).await;
    seed_stock(&app, product, location, 15).await;

    let detail = app
        .services
        .products
        .get(product, &app.services.stock)
        .await
        .unwrap();
    assert_eq!(detail.recent_ledger.len(), 2);
    assert_eq!(detail.stock_locations.len(), 1);
    assert_eq!(detail.stock_locations[0].quantity, 25);

    // Unknown product is a 404, matching the API contract
    assert_matches!(
        app.services
            .products
            .get(Uuid::new_v4(), &app.services.stock)
            .await
            .unwrap_err(),
        ServiceError::NotFound(_)
    );
}
