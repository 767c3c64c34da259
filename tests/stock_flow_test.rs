mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use stockmaster_api::entities::stock_ledger;
use stockmaster_api::errors::ServiceError;
use stockmaster_api::services::stock::{
    AdjustStockCommand, AdjustmentKind, ReceiveStockCommand, ReceiveStockItem,
    StockOverviewFilter, TransferStockCommand,
};

use common::{create_location, create_product, create_supplier, create_warehouse, setup};

fn adjust(
    product_id: Uuid,
    location_id: Uuid,
    quantity: i32,
    kind: AdjustmentKind,
) -> AdjustStockCommand {
    AdjustStockCommand {
        product_id,
        location_id,
        quantity,
        kind,
        reason: Some("test".to_string()),
        unit_cost: None,
        user_id: None,
    }
}

async fn ledger_for(
    app: &common::TestApp,
    product_id: Uuid,
    location_id: Uuid,
) -> Vec<stock_ledger::Model> {
    stock_ledger::Entity::find()
        .filter(stock_ledger::Column::ProductId.eq(product_id))
        .filter(stock_ledger::Column::LocationId.eq(location_id))
        .order_by_asc(stock_ledger::Column::CreatedAt)
        .all(app.db.as_ref())
        .await
        .expect("failed to query ledger")
}

#[tokio::test]
async fn adjustments_update_stock_and_ledger() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let product = create_product(&app, "Wireless Mouse", "WM-001").await;

    // First increase creates the stock row lazily
    let stock = app
        .services
        .stock
        .adjust(adjust(product, location, 100, AdjustmentKind::Increase))
        .await
        .unwrap();
    assert_eq!(stock.quantity, 100);
    assert_eq!(stock.available, 100);
    assert_eq!(stock.reserved, 0);

    // Decrease within bounds
    let stock = app
        .services
        .stock
        .adjust(adjust(product, location, 30, AdjustmentKind::Decrease))
        .await
        .unwrap();
    assert_eq!(stock.quantity, 70);

    // Decrease past zero clamps
    let stock = app
        .services
        .stock
        .adjust(adjust(product, location, 1000, AdjustmentKind::Decrease))
        .await
        .unwrap();
    assert_eq!(stock.quantity, 0);
    assert_eq!(stock.available, 0);

    // Set to an absolute level
    let stock = app
        .services
        .stock
        .adjust(adjust(product, location, 55, AdjustmentKind::Set))
        .await
        .unwrap();
    assert_eq!(stock.quantity, 55);

    // Ledger records every step with real balances and effective deltas
    let ledger = ledger_for(&app, product, location).await;
    assert_eq!(ledger.len(), 4);

    assert_eq!(ledger[0].quantity, 100);
    assert_eq!(ledger[0].balance_before, 0);
    assert_eq!(ledger[0].balance_after, 100);
    assert_eq!(ledger[0].movement, "ADJUSTMENT");
    assert_eq!(ledger[0].document_type, "ADJUSTMENT");

    assert_eq!(ledger[1].quantity, -30);
    assert_eq!(ledger[1].balance_after, 70);

    // Clamped decrease records only what actually left
    assert_eq!(ledger[2].quantity, -70);
    assert_eq!(ledger[2].balance_before, 70);
    assert_eq!(ledger[2].balance_after, 0);

    assert_eq!(ledger[3].quantity, 55);
    assert_eq!(ledger[3].balance_after, 55);
}

#[tokio::test]
async fn adjust_requires_existing_product_and_location() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let product = create_product(&app, "Stapler", "ST-006").await;

    let err = app
        .services
        .stock
        .adjust(adjust(Uuid::new_v4(), location, 5, AdjustmentKind::Increase))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = app
        .services
        .stock
        .adjust(adjust(product, Uuid::new_v4(), 5, AdjustmentKind::Increase))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn transfer_moves_stock_between_locations() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let source = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let dest = create_location(&app, warehouse, "B-01", "MW-B-01").await;
    let product = create_product(&app, "Desk Lamp", "DL-010").await;

    app.services
        .stock
        .adjust(AdjustStockCommand {
            unit_cost: Some(dec!(12.50)),
            ..adjust(product, source, 100, AdjustmentKind::Increase)
        })
        .await
        .unwrap();

    let (from, to) = app
        .services
        .stock
        .transfer(TransferStockCommand {
            product_id: product,
            from_location_id: source,
            to_location_id: dest,
            quantity: 40,
            user_id: None,
        })
        .await
        .unwrap();

    assert_eq!(from.quantity, 60);
    assert_eq!(to.quantity, 40);
    // Destination row was created lazily and inherits the source cost
    assert_eq!(to.average_cost, dec!(12.50));

    let out_rows = ledger_for(&app, product, source).await;
    let last_out = out_rows.last().unwrap();
    assert_eq!(last_out.movement, "TRANSFER_OUT");
    assert_eq!(last_out.quantity, -40);
    assert_eq!(last_out.balance_before, 100);
    assert_eq!(last_out.balance_after, 60);

    let in_rows = ledger_for(&app, product, dest).await;
    assert_eq!(in_rows.len(), 1);
    assert_eq!(in_rows[0].movement, "TRANSFER_IN");
    assert_eq!(in_rows[0].quantity, 40);
    assert_eq!(in_rows[0].balance_before, 0);
    assert_eq!(in_rows[0].balance_after, 40);
}

#[tokio::test]
async fn transfer_rejects_bad_requests() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let source = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let dest = create_location(&app, warehouse, "B-01", "MW-B-01").await;
    let product = create_product(&app, "Office Chair", "OC-009").await;

    let err = app
        .services
        .stock
        .transfer(TransferStockCommand {
            product_id: product,
            from_location_id: source,
            to_location_id: source,
            quantity: 1,
            user_id: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));

    app.services
        .stock
        .adjust(adjust(product, source, 5, AdjustmentKind::Increase))
        .await
        .unwrap();

    let err = app
        .services
        .stock
        .transfer(TransferStockCommand {
            product_id: product,
            from_location_id: source,
            to_location_id: dest,
            quantity: 10,
            user_id: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // Failed transfer must not leave partial writes behind
    let overview = app
        .services
        .stock
        .overview(StockOverviewFilter {
            product_id: Some(product),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(overview.statistics.total_stock, 5);
    assert_eq!(overview.statistics.total_locations, 1);
}

#[tokio::test]
async fn receipts_number_sequentially_and_write_ledger() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "REC-01", "MW-REC-01").await;
    let product_a = create_product(&app, "Copy Paper", "CP-004").await;
    let product_b = create_product(&app, "Ballpoint Pen", "BP-005").await;
    let supplier = create_supplier(&app, "Office Essentials Inc", "OFFC003").await;

    let result = app
        .services
        .stock
        .receive(ReceiveStockCommand {
            supplier_id: supplier,
            items: vec![
                ReceiveStockItem {
                    product_id: product_a,
                    location_id: location,
                    quantity: 200,
                    unit_cost: dec!(3.20),
                    expiry_date: None,
                },
                ReceiveStockItem {
                    product_id: product_b,
                    location_id: location,
                    quantity: 500,
                    unit_cost: dec!(0.35),
                    expiry_date: None,
                },
            ],
            user_id: None,
        })
        .await
        .unwrap();

    assert_eq!(result.receipt.receipt_number, "WH/IN/0001");
    assert_eq!(result.receipt.status, "COMPLETED");
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items[0].quantity_received, 200);

    let ledger = ledger_for(&app, product_a, location).await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].document_type, "RECEIPT");
    assert_eq!(ledger[0].movement, "IN");
    assert_eq!(ledger[0].balance_before, 0);
    assert_eq!(ledger[0].balance_after, 200);
    assert_eq!(ledger[0].reference.as_deref(), Some("WH/IN/0001"));
    assert_eq!(ledger[0].unit_cost, Some(dec!(3.20)));

    // Second receipt continues the sequence and accumulates quantities
    let result = app
        .services
        .stock
        .receive(ReceiveStockCommand {
            supplier_id: supplier,
            items: vec![ReceiveStockItem {
                product_id: product_a,
                location_id: location,
                quantity: 50,
                unit_cost: dec!(3.40),
                expiry_date: None,
            }],
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(result.receipt.receipt_number, "WH/IN/0002");

    let ledger = ledger_for(&app, product_a, location).await;
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[1].balance_before, 200);
    assert_eq!(ledger[1].balance_after, 250);

    let stock = app
        .services
        .stock
        .product_stock(product_a)
        .await
        .unwrap();
    assert_eq!(stock.total_stock, 250);
}

#[tokio::test]
async fn receive_rejects_unknown_supplier_and_empty_items() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "REC-01", "MW-REC-01").await;
    let product = create_product(&app, "Laptop Stand", "LS-007").await;
    let supplier = create_supplier(&app, "TechCorp Supplies", "TECH001").await;

    let err = app
        .services
        .stock
        .receive(ReceiveStockCommand {
            supplier_id: Uuid::new_v4(),
            items: vec![ReceiveStockItem {
                product_id: product,
                location_id: location,
                quantity: 1,
                unit_cost: dec!(1.00),
                expiry_date: None,
            }],
            user_id: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = app
        .services
        .stock
        .receive(ReceiveStockCommand {
            supplier_id: supplier,
            items: vec![],
            user_id: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));
}

#[tokio::test]
async fn overview_filters_and_statistics() {
    let app = setup().await;
    let warehouse_a = create_warehouse(&app, "Main", "MW01").await;
    let warehouse_b = create_warehouse(&app, "North", "NDC02").await;
    let location_a = create_location(&app, warehouse_a, "A-01", "MW-A-01").await;
    let location_b = create_location(&app, warehouse_b, "Zone A-1", "NDC-A-01").await;
    let product_a = create_product(&app, "Wireless Mouse", "WM-001").await;
    let product_b = create_product(&app, "USB-C Cable", "UC-002").await;

    for (product, location, quantity) in [
        (product_a, location_a, 100),
        (product_a, location_b, 30),
        (product_b, location_b, 4), // below the reorder level of 10
    ] {
        app.services
            .stock
            .adjust(adjust(product, location, quantity, AdjustmentKind::Increase))
            .await
            .unwrap();
    }

    let overview = app
        .services
        .stock
        .overview(StockOverviewFilter::default())
        .await
        .unwrap();
    assert_eq!(overview.stock_locations.len(), 3);
    assert_eq!(overview.statistics.total_stock, 134);
    assert_eq!(overview.statistics.total_products, 2);
    assert_eq!(overview.statistics.total_locations, 2);
    assert_eq!(overview.statistics.low_stock_items, 1);

    // Warehouse filter narrows rows but keeps warehouse context
    let overview = app
        .services
        .stock
        .overview(StockOverviewFilter {
            warehouse_id: Some(warehouse_b),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(overview.stock_locations.len(), 2);
    assert!(overview
        .stock_locations
        .iter()
        .all(|r| r.warehouse_code == "NDC02"));

    // Low-stock filter keeps statistics over the full set
    let overview = app
        .services
        .stock
        .overview(StockOverviewFilter {
            low_stock: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(overview.stock_locations.len(), 1);
    assert_eq!(overview.stock_locations[0].sku, "UC-002");
    assert_eq!(overview.statistics.total_stock, 134);
}

#[tokio::test]
async fn ledger_pagination() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "A-01", "MW-A-01").await;
    let product = create_product(&app, "Hard Drive", "HD-008").await;

    for _ in 0..5 {
        app.services
            .stock
            .adjust(adjust(product, location, 10, AdjustmentKind::Increase))
            .await
            .unwrap();
    }

    let (page, total) = app.services.stock.ledger(None, 1, 2).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);

    let (page, _) = app.services.stock.ledger(None, 3, 2).await.unwrap();
    assert_eq!(page.len(), 1);

    let (page, total) = app
        .services
        .stock
        .ledger(Some(Uuid::new_v4()), 1, 10)
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(page.is_empty());
}
