mod common;

use assert_matches::assert_matches;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use stockmaster_api::entities::stock_ledger;
use stockmaster_api::errors::ServiceError;
use stockmaster_api::services::deliveries::{
    CreateDeliveryCommand, NewDeliveryLine, UpdateDeliveryCommand,
};
use stockmaster_api::services::stock::{AdjustStockCommand, AdjustmentKind};

use common::{create_location, create_product, create_warehouse, setup, TestApp};

async fn seed_stock(app: &TestApp, product_id: Uuid, location_id: Uuid, quantity: i32) {
    app.services
        .stock
        .adjust(AdjustStockCommand {
            product_id,
            location_id,
            quantity,
            kind: AdjustmentKind::Increase,
            reason: Some("seed".to_string()),
            unit_cost: None,
            user_id: None,
        })
        .await
        .expect("failed to seed stock");
}

fn one_line(product_id: Uuid, quantity: i32) -> Vec<NewDeliveryLine> {
    vec![NewDeliveryLine {
        product_id,
        quantity,
        notes: None,
    }]
}

fn create_command(location_id: Uuid, lines: Vec<NewDeliveryLine>) -> CreateDeliveryCommand {
    CreateDeliveryCommand {
        customer_id: None,
        location_id,
        scheduled_date: None,
        notes: None,
        user_id: None,
        lines,
    }
}

#[tokio::test]
async fn full_lifecycle_decrements_stock() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "SHIP-01", "MW-SHIP-01").await;
    let product = create_product(&app, "Wireless Mouse", "WM-001").await;
    seed_stock(&app, product, location, 100).await;

    let delivery = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 30)))
        .await
        .unwrap();
    assert_eq!(delivery.order.delivery_number, "WH/OUT/0001");
    assert_eq!(delivery.order.status, "DRAFT");
    assert_eq!(delivery.lines.len(), 1);
    assert_eq!(delivery.lines[0].line.quantity, 30);
    assert_eq!(delivery.lines[0].line.picked, 0);

    let delivery = app.services.deliveries.confirm(delivery.order.id).await.unwrap();
    assert_eq!(delivery.order.status, "WAITING");

    let delivery = app.services.deliveries.pick(delivery.order.id).await.unwrap();
    assert_eq!(delivery.order.status, "READY");
    assert_eq!(delivery.lines[0].line.picked, 30);

    let delivery = app.services.deliveries.pack(delivery.order.id).await.unwrap();
    assert_eq!(delivery.order.status, "READY");
    assert_eq!(delivery.lines[0].line.packed, 30);

    let delivery = app
        .services
        .deliveries
        .validate(delivery.order.id)
        .await
        .unwrap();
    assert_eq!(delivery.order.status, "DONE");
    assert!(delivery.order.delivered_date.is_some());
    assert_eq!(delivery.lines[0].line.delivered, 30);

    // Stock dropped and the ledger carries the outbound movement
    let stock = app.services.stock.product_stock(product).await.unwrap();
    assert_eq!(stock.total_stock, 70);

    let ledger = stock_ledger::Entity::find()
        .filter(stock_ledger::Column::DocumentType.eq("DELIVERY"))
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].movement, "OUT");
    assert_eq!(ledger[0].quantity, -30);
    assert_eq!(ledger[0].balance_before, 100);
    assert_eq!(ledger[0].balance_after, 70);
    assert_eq!(ledger[0].reference.as_deref(), Some("WH/OUT/0001"));
    assert_eq!(ledger[0].document_id, Some(delivery.order.id));
}

#[tokio::test]
async fn validate_clamps_stock_at_zero() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "SHIP-01", "MW-SHIP-01").await;
    let product = create_product(&app, "Office Chair", "OC-009").await;
    seed_stock(&app, product, location, 10).await;

    let delivery = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 25)))
        .await
        .unwrap();

    app.services.deliveries.confirm(delivery.order.id).await.unwrap();
    app.services.deliveries.pick(delivery.order.id).await.unwrap();
    let delivery = app
        .services
        .deliveries
        .validate(delivery.order.id)
        .await
        .unwrap();

    // The full line counts as delivered, the stock row clamps at zero
    assert_eq!(delivery.lines[0].line.delivered, 25);
    let stock = app.services.stock.product_stock(product).await.unwrap();
    assert_eq!(stock.total_stock, 0);

    let ledger = stock_ledger::Entity::find()
        .filter(stock_ledger::Column::DocumentType.eq("DELIVERY"))
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(ledger[0].quantity, -10);
    assert_eq!(ledger[0].balance_after, 0);
}

#[tokio::test]
async fn delivery_numbers_increment() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "SHIP-01", "MW-SHIP-01").await;
    let product = create_product(&app, "Desk Lamp", "DL-010").await;

    let first = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 1)))
        .await
        .unwrap();
    let second = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 2)))
        .await
        .unwrap();

    assert_eq!(first.order.delivery_number, "WH/OUT/0001");
    assert_eq!(second.order.delivery_number, "WH/OUT/0002");

    // Newest first
    let all = app.services.deliveries.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].order.delivery_number, "WH/OUT/0002");
}

#[tokio::test]
async fn lifecycle_guards_reject_out_of_order_steps() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "SHIP-01", "MW-SHIP-01").await;
    let product = create_product(&app, "Stapler", "ST-006").await;
    seed_stock(&app, product, location, 50).await;

    let delivery = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 5)))
        .await
        .unwrap();
    let id = delivery.order.id;

    // DRAFT: cannot pick or validate yet
    assert_matches!(
        app.services.deliveries.pick(id).await.unwrap_err(),
        ServiceError::InvalidStatus(_)
    );
    assert_matches!(
        app.services.deliveries.validate(id).await.unwrap_err(),
        ServiceError::InvalidStatus(_)
    );

    // Status endpoint: unknown names and illegal jumps are rejected
    assert_matches!(
        app.services
            .deliveries
            .set_status(id, "SHIPPED")
            .await
            .unwrap_err(),
        ServiceError::InvalidInput(_)
    );
    assert_matches!(
        app.services
            .deliveries
            .set_status(id, "READY")
            .await
            .unwrap_err(),
        ServiceError::InvalidStatus(_)
    );
    // DONE only through validation
    assert_matches!(
        app.services
            .deliveries
            .set_status(id, "DONE")
            .await
            .unwrap_err(),
        ServiceError::InvalidOperation(_)
    );

    app.services.deliveries.confirm(id).await.unwrap();

    // WAITING: confirming twice is an illegal transition
    assert_matches!(
        app.services.deliveries.confirm(id).await.unwrap_err(),
        ServiceError::InvalidStatus(_)
    );

    // Cancel from WAITING is allowed and terminal
    let delivery = app
        .services
        .deliveries
        .set_status(id, "CANCELED")
        .await
        .unwrap();
    assert_eq!(delivery.order.status, "CANCELED");
    assert_matches!(
        app.services.deliveries.confirm(id).await.unwrap_err(),
        ServiceError::InvalidStatus(_)
    );

    // Stock untouched throughout
    let stock = app.services.stock.product_stock(product).await.unwrap();
    assert_eq!(stock.total_stock, 50);
}

#[tokio::test]
async fn pack_without_pick_packs_full_quantities() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "SHIP-01", "MW-SHIP-01").await;
    let product = create_product(&app, "Copy Paper", "CP-004").await;
    seed_stock(&app, product, location, 40).await;

    let delivery = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 12)))
        .await
        .unwrap();
    app.services.deliveries.confirm(delivery.order.id).await.unwrap();

    // Pack directly from WAITING: lines are picked and packed in full
    let delivery = app.services.deliveries.pack(delivery.order.id).await.unwrap();
    assert_eq!(delivery.order.status, "READY");
    assert_eq!(delivery.lines[0].line.picked, 12);
    assert_eq!(delivery.lines[0].line.packed, 12);
}

#[tokio::test]
async fn done_deliveries_cannot_be_deleted() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "SHIP-01", "MW-SHIP-01").await;
    let product = create_product(&app, "Headphones", "BH-003").await;
    seed_stock(&app, product, location, 20).await;

    let delivery = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 5)))
        .await
        .unwrap();
    let id = delivery.order.id;

    app.services.deliveries.confirm(id).await.unwrap();
    app.services.deliveries.pick(id).await.unwrap();
    app.services.deliveries.validate(id).await.unwrap();

    assert_matches!(
        app.services.deliveries.delete(id).await.unwrap_err(),
        ServiceError::InvalidOperation(_)
    );

    // A draft delivery deletes cleanly, lines included
    let draft = app
        .services
        .deliveries
        .create(create_command(location, one_line(product, 2)))
        .await
        .unwrap();
    app.services.deliveries.delete(draft.order.id).await.unwrap();
    assert_matches!(
        app.services.deliveries.get(draft.order.id).await.unwrap_err(),
        ServiceError::NotFound(_)
    );
}

#[tokio::test]
async fn update_replaces_header_fields() {
    let app = setup().await;
    let warehouse = create_warehouse(&app, "Main", "MW01").await;
    let location = create_location(&app, warehouse, "SHIP-01", "MW-SHIP-01").await;
    let product = create_product(&app, "USB-C Cable", "UC-002").await;

    let delivery = app
        .services
        .deliveries
        .create(CreateDeliveryCommand {
            notes: Some("rush order".to_string()),
            ..create_command(location, one_line(product, 3))
        })
        .await
        .unwrap();

    let updated = app
        .services
        .deliveries
        .update(
            delivery.order.id,
            UpdateDeliveryCommand {
                customer_id: Some(None),
                location_id: None,
                scheduled_date: Some(None),
                notes: Some(None),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.order.notes, None);

    assert_matches!(
        app.services
            .deliveries
            .update(Uuid::new_v4(), UpdateDeliveryCommand::default())
            .await
            .unwrap_err(),
        ServiceError::NotFound(_)
    );
}
