//! Demo-data seeder: admin user, suppliers, categories, products,
//! warehouses, locations, and initial stock with ledger history.

use clap::Parser;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use stockmaster_api as api;

use api::services::stock::{AdjustStockCommand, AdjustmentKind};
use api::services::users::RegisterUserCommand;

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Seed the StockMaster database with demo data")]
struct Args {
    /// Database URL override (defaults to the configured database)
    #[arg(long)]
    database_url: Option<String>,

    /// Admin password (do not use the default outside development)
    #[arg(long, default_value = "admin123admin")]
    admin_password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let database_url = args
        .database_url
        .unwrap_or_else(|| cfg.database_url().to_string());
    let db = Arc::new(api::db::establish_connection(&database_url).await?);
    api::db::run_migrations(db.as_ref()).await?;

    let (event_sender, event_rx) = api::events::channel(1024);
    tokio::spawn(api::events::process_events(event_rx));

    let services = api::handlers::AppServices::new(
        db.clone(),
        Arc::new(event_sender),
        api::notifications::Mailer::from_config(&cfg),
    );

    info!("Starting seed process");

    // Admin user
    let admin_email = "admin@stockmaster.com";
    if services.users.find_by_email(admin_email).await?.is_none() {
        services
            .users
            .register(RegisterUserCommand {
                email: admin_email.to_string(),
                password: args.admin_password,
                name: "Admin User".to_string(),
                role: Some("ADMIN".to_string()),
            })
            .await?;
        info!("Admin user created: {}", admin_email);
    }

    // Suppliers
    for (name, code, email, phone, address) in [
        (
            "TechCorp Supplies",
            "TECH001",
            "orders@techcorp.com",
            "+1-555-0101",
            "123 Tech Street, Silicon Valley, CA 94000",
        ),
        (
            "Global Electronics",
            "ELEC002",
            "supply@globalelectronics.com",
            "+1-555-0102",
            "456 Circuit Avenue, Austin, TX 73301",
        ),
        (
            "Office Essentials Inc",
            "OFFC003",
            "procurement@officeessentials.com",
            "+1-555-0103",
            "789 Business Blvd, Chicago, IL 60601",
        ),
    ] {
        let result = services
            .suppliers
            .create(api::services::suppliers::CreateSupplierCommand {
                name: name.to_string(),
                code: code.to_string(),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
                address: Some(address.to_string()),
            })
            .await;
        skip_existing(result)?;
    }
    info!("Suppliers seeded");

    // Categories
    let mut categories: HashMap<&str, Uuid> = HashMap::new();
    for name in [
        "Electronics",
        "Office Supplies",
        "Furniture",
        "IT Equipment",
        "Consumables",
    ] {
        match services.products.create_category(name.to_string()).await {
            Ok(category) => {
                categories.insert(name, category.id);
            }
            Err(api::errors::ServiceError::InvalidInput(_)) => {
                if let Some(existing) = services
                    .products
                    .list_categories()
                    .await?
                    .into_iter()
                    .find(|c| c.name == name)
                {
                    categories.insert(name, existing.id);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
    info!("Categories seeded");

    // Products
    let products: [(&str, &str, &str, &str, &str, i32, i32); 10] = [
        ("Wireless Mouse", "WM-001", "Ergonomic wireless mouse with USB receiver", "Electronics", "piece", 50, 500),
        ("USB-C Cable 6ft", "UC-002", "High-speed USB-C to USB-A cable, 6 feet length", "Electronics", "piece", 100, 1000),
        ("Bluetooth Headphones", "BH-003", "Noise-cancelling Bluetooth headphones", "Electronics", "piece", 20, 200),
        ("A4 Copy Paper", "CP-004", "500 sheets white A4 copy paper, 80gsm", "Office Supplies", "ream", 100, 1000),
        ("Blue Ballpoint Pen", "BP-005", "Medium tip blue ballpoint pen", "Office Supplies", "piece", 200, 2000),
        ("Stapler", "ST-006", "Heavy-duty desktop stapler", "Office Supplies", "piece", 10, 100),
        ("Laptop Stand", "LS-007", "Adjustable aluminum laptop stand", "IT Equipment", "piece", 15, 150),
        ("External Hard Drive 1TB", "HD-008", "Portable USB 3.0 external hard drive, 1TB capacity", "IT Equipment", "piece", 25, 250),
        ("Office Chair", "OC-009", "Ergonomic office chair with lumbar support", "Furniture", "piece", 5, 50),
        ("Desk Lamp", "DL-010", "LED desk lamp with adjustable brightness", "Furniture", "piece", 20, 200),
    ];
    let mut product_ids = Vec::new();
    for (name, sku, description, category, uom, reorder_level, reorder_quantity) in products {
        let result = services
            .products
            .create(api::services::products::CreateProductCommand {
                name: name.to_string(),
                sku: sku.to_string(),
                description: Some(description.to_string()),
                category_id: categories.get(category).copied(),
                unit_of_measure: Some(uom.to_string()),
                reorder_level: Some(reorder_level),
                reorder_quantity: Some(reorder_quantity),
            })
            .await;
        match skip_existing(result)? {
            Some(product) => product_ids.push(product.id),
            None => {
                if let Some(existing) = services
                    .products
                    .list()
                    .await?
                    .into_iter()
                    .find(|p| p.product.sku == sku)
                {
                    product_ids.push(existing.product.id);
                }
            }
        }
    }
    info!("Products seeded");

    // Warehouses and locations
    let warehouses = [
        ("Main Warehouse", "MW01", "1000 Storage Way, Distribution City, TX 75001"),
        ("North Distribution Center", "NDC02", "500 Northern Blvd, Northville, NY 10001"),
        ("West Coast Facility", "WCF03", "2000 Pacific Drive, Los Angeles, CA 90001"),
    ];
    let mut warehouse_ids: HashMap<&str, Uuid> = HashMap::new();
    for (name, code, address) in warehouses {
        let result = services
            .warehouses
            .create(api::services::warehouses::CreateWarehouseCommand {
                name: name.to_string(),
                code: code.to_string(),
                address: Some(address.to_string()),
            })
            .await;
        match skip_existing(result)? {
            Some(warehouse) => {
                warehouse_ids.insert(code, warehouse.id);
            }
            None => {
                if let Some(existing) = services
                    .warehouses
                    .list()
                    .await?
                    .into_iter()
                    .find(|w| w.warehouse.code == code)
                {
                    warehouse_ids.insert(code, existing.warehouse.id);
                }
            }
        }
    }

    let locations: [(&str, &str, &str, &str); 14] = [
        ("A-01-01", "MW-A-01-01", "MW01", "STORAGE"),
        ("A-01-02", "MW-A-01-02", "MW01", "STORAGE"),
        ("A-02-01", "MW-A-02-01", "MW01", "STORAGE"),
        ("B-01-01", "MW-B-01-01", "MW01", "STORAGE"),
        ("Receiving Bay 1", "MW-REC-01", "MW01", "RECEIVING"),
        ("Shipping Dock 1", "MW-SHIP-01", "MW01", "SHIPPING"),
        ("Zone A-1", "NDC-A-01", "NDC02", "STORAGE"),
        ("Zone A-2", "NDC-A-02", "NDC02", "STORAGE"),
        ("Zone B-1", "NDC-B-01", "NDC02", "STORAGE"),
        ("Receiving", "NDC-REC-01", "NDC02", "RECEIVING"),
        ("Section 1A", "WCF-1A", "WCF03", "STORAGE"),
        ("Section 1B", "WCF-1B", "WCF03", "STORAGE"),
        ("Section 2A", "WCF-2A", "WCF03", "STORAGE"),
        ("Quarantine", "WCF-QUAR-01", "WCF03", "QUARANTINE"),
    ];
    let mut location_ids = Vec::new();
    for (name, code, warehouse_code, kind) in locations {
        let Some(warehouse_id) = warehouse_ids.get(warehouse_code).copied() else {
            continue;
        };
        let result = services
            .locations
            .create(api::services::locations::CreateLocationCommand {
                name: name.to_string(),
                code: code.to_string(),
                warehouse_id,
                kind: kind.to_string(),
            })
            .await;
        match skip_existing(result)? {
            Some(location) => location_ids.push(location.id),
            None => {
                if let Some(existing) = services
                    .locations
                    .list(Some(warehouse_id))
                    .await?
                    .into_iter()
                    .find(|l| l.location.code == code)
                {
                    location_ids.push(existing.location.id);
                }
            }
        }
    }
    info!("Warehouses and locations seeded");

    // Initial stock: each product lands in a few storage locations, via the
    // adjustment path so the ledger carries matching history.
    let mut stocked = 0usize;
    for (index, product_id) in product_ids.iter().enumerate() {
        for offset in 0..3usize {
            let slot = index * 2 + offset;
            let Some(location_id) = location_ids.get(slot % location_ids.len()) else {
                continue;
            };
            let quantity = 50 + ((index * 37 + offset * 53) % 200) as i32;
            services
                .stock
                .adjust(AdjustStockCommand {
                    product_id: *product_id,
                    location_id: *location_id,
                    quantity,
                    kind: AdjustmentKind::Increase,
                    reason: Some("Initial stock load".to_string()),
                    unit_cost: Some(dec!(10.00)),
                    user_id: None,
                })
                .await?;
            stocked += 1;
        }
    }
    info!(rows = stocked, "Initial stock seeded");

    info!(
        "Seed completed: {} products, {} warehouses, {} locations, admin {}",
        product_ids.len(),
        warehouse_ids.len(),
        location_ids.len(),
        admin_email
    );

    Ok(())
}

/// Treat duplicate-code errors as "already seeded".
fn skip_existing<T>(
    result: Result<T, api::errors::ServiceError>,
) -> Result<Option<T>, api::errors::ServiceError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(api::errors::ServiceError::InvalidInput(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
