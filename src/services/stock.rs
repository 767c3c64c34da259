//! Stock mutation and reporting: adjustments, transfers, receipts, and the
//! stock overview. Every mutation updates the affected stock rows and appends
//! ledger entries inside a single database transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    location, product, receipt, receipt_item, stock_ledger, stock_location, supplier, warehouse,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::numbering;

/// Ledger document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Adjustment,
    Transfer,
    Receipt,
    Delivery,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adjustment => "ADJUSTMENT",
            Self::Transfer => "TRANSFER",
            Self::Receipt => "RECEIPT",
            Self::Delivery => "DELIVERY",
        }
    }
}

/// Ledger movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    In,
    Out,
    TransferIn,
    TransferOut,
    Adjustment,
}

impl Movement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

/// How an adjustment changes the on-hand quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    Increase,
    Decrease,
    Set,
}

#[derive(Debug, Clone)]
pub struct AdjustStockCommand {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub kind: AdjustmentKind,
    pub reason: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct TransferStockCommand {
    pub product_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub quantity: i32,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ReceiveStockItem {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ReceiveStockCommand {
    pub supplier_id: Uuid,
    pub items: Vec<ReceiveStockItem>,
    pub user_id: Option<Uuid>,
}

/// One product-at-location row in the stock overview.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockOverviewRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub unit_of_measure: String,
    pub reorder_level: Option<i32>,
    pub location_id: Uuid,
    pub location_name: String,
    pub location_code: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockStatistics {
    pub total_products: usize,
    pub total_stock: i64,
    pub low_stock_items: usize,
    pub total_locations: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockOverview {
    pub stock_locations: Vec<StockOverviewRow>,
    pub statistics: StockStatistics,
}

#[derive(Debug, Clone, Default)]
pub struct StockOverviewFilter {
    pub warehouse_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub low_stock: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductStock {
    pub product: product::Model,
    pub total_stock: i64,
    pub locations: Vec<StockOverviewRow>,
}

/// Result of a stock receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptResult {
    pub receipt: receipt::Model,
    pub items: Vec<receipt_item::Model>,
}

/// Pending ledger row, written by [`append_ledger_entry`].
pub(crate) struct LedgerEntry {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub document_type: DocumentType,
    pub document_id: Option<Uuid>,
    pub movement: Movement,
    pub quantity: i32,
    pub balance_before: i32,
    pub balance_after: i32,
    pub unit_cost: Option<Decimal>,
    pub reason: Option<String>,
    pub reference: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Append one row to the stock ledger. Rows are never updated afterwards.
pub(crate) async fn append_ledger_entry<C: ConnectionTrait>(
    conn: &C,
    entry: LedgerEntry,
) -> Result<stock_ledger::Model, ServiceError> {
    let row = stock_ledger::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(entry.product_id),
        location_id: Set(entry.location_id),
        document_type: Set(entry.document_type.as_str().to_string()),
        document_id: Set(entry.document_id),
        movement: Set(entry.movement.as_str().to_string()),
        quantity: Set(entry.quantity),
        balance_before: Set(entry.balance_before),
        balance_after: Set(entry.balance_after),
        unit_cost: Set(entry.unit_cost),
        reason: Set(entry.reason),
        reference: Set(entry.reference),
        user_id: Set(entry.user_id),
        created_at: Set(Utc::now()),
    };

    row.insert(conn).await.map_err(ServiceError::DatabaseError)
}

/// Look up the stock row for a (product, location) pair.
pub(crate) async fn find_stock_row<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    location_id: Uuid,
) -> Result<Option<stock_location::Model>, ServiceError> {
    stock_location::Entity::find()
        .filter(stock_location::Column::ProductId.eq(product_id))
        .filter(stock_location::Column::LocationId.eq(location_id))
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

/// Clamped availability: on-hand minus reservations, never negative.
pub(crate) fn available_for(quantity: i32, reserved: i32) -> i32 {
    (quantity - reserved).max(0)
}

/// A stock row summarized for embedding under a location.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockLineSummary {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub unit_of_measure: String,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
}

/// Stock rows for a set of locations, keyed by location id.
pub(crate) async fn stock_lines_for_locations<C: ConnectionTrait>(
    conn: &C,
    location_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<StockLineSummary>>, ServiceError> {
    let stock_rows = stock_location::Entity::find()
        .filter(stock_location::Column::LocationId.is_in(location_ids))
        .all(conn)
        .await?;

    let product_ids: Vec<Uuid> = stock_rows.iter().map(|s| s.product_id).collect();
    let products: HashMap<Uuid, product::Model> = product::Entity::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut by_location: HashMap<Uuid, Vec<StockLineSummary>> = HashMap::new();
    for stock in stock_rows {
        let Some(product) = products.get(&stock.product_id) else {
            continue;
        };
        by_location
            .entry(stock.location_id)
            .or_default()
            .push(StockLineSummary {
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                unit_of_measure: product.unit_of_measure.clone(),
                quantity: stock.quantity,
                reserved: stock.reserved,
                available: stock.available,
            });
    }

    Ok(by_location)
}

/// Service for stock levels and the ledger
#[derive(Clone, Debug)]
pub struct StockService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StockService {
    /// Creates a new stock service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Stock overview across warehouses with aggregate statistics.
    #[instrument(skip(self))]
    pub async fn overview(
        &self,
        filter: StockOverviewFilter,
    ) -> Result<StockOverview, ServiceError> {
        let db = self.db_pool.as_ref();

        let mut query = stock_location::Entity::find();
        if let Some(product_id) = filter.product_id {
            query = query.filter(stock_location::Column::ProductId.eq(product_id));
        }
        if let Some(location_id) = filter.location_id {
            query = query.filter(stock_location::Column::LocationId.eq(location_id));
        }
        let stock_rows = query.all(db).await?;

        let product_ids: Vec<Uuid> = stock_rows.iter().map(|s| s.product_id).collect();
        let location_ids: Vec<Uuid> = stock_rows.iter().map(|s| s.location_id).collect();

        let products: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .filter(product::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let locations: HashMap<Uuid, location::Model> = location::Entity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .filter(location::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        let warehouse_ids: Vec<Uuid> = locations.values().map(|l| l.warehouse_id).collect();
        let warehouses: HashMap<Uuid, warehouse::Model> = warehouse::Entity::find()
            .filter(warehouse::Column::Id.is_in(warehouse_ids))
            .filter(warehouse::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|w| (w.id, w))
            .collect();

        let mut rows = Vec::new();
        for stock in &stock_rows {
            let Some(product) = products.get(&stock.product_id) else {
                continue;
            };
            let Some(location) = locations.get(&stock.location_id) else {
                continue;
            };
            let Some(warehouse) = warehouses.get(&location.warehouse_id) else {
                continue;
            };
            if let Some(warehouse_id) = filter.warehouse_id {
                if warehouse.id != warehouse_id {
                    continue;
                }
            }

            rows.push(StockOverviewRow {
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                unit_of_measure: product.unit_of_measure.clone(),
                reorder_level: product.reorder_level,
                location_id: location.id,
                location_name: location.name.clone(),
                location_code: location.code.clone(),
                warehouse_id: warehouse.id,
                warehouse_name: warehouse.name.clone(),
                warehouse_code: warehouse.code.clone(),
                quantity: stock.quantity,
                reserved: stock.reserved,
                available: stock.available,
            });
        }

        rows.sort_by(|a, b| {
            (&a.warehouse_name, &a.location_name, &a.product_name).cmp(&(
                &b.warehouse_name,
                &b.location_name,
                &b.product_name,
            ))
        });

        // Statistics cover the unfiltered-by-low-stock view
        let statistics = StockStatistics {
            total_products: rows
                .iter()
                .map(|r| r.product_id)
                .collect::<HashSet<_>>()
                .len(),
            total_stock: rows.iter().map(|r| r.quantity as i64).sum(),
            low_stock_items: rows
                .iter()
                .filter(|r| r.quantity <= r.reorder_level.unwrap_or(0))
                .count(),
            total_locations: rows
                .iter()
                .map(|r| r.location_id)
                .collect::<HashSet<_>>()
                .len(),
        };

        let stock_locations = if filter.low_stock {
            rows.into_iter()
                .filter(|r| r.quantity <= r.reorder_level.unwrap_or(0))
                .collect()
        } else {
            rows
        };

        Ok(StockOverview {
            stock_locations,
            statistics,
        })
    }

    /// Stock for one product across all locations holding it.
    #[instrument(skip(self))]
    pub async fn product_stock(&self, product_id: Uuid) -> Result<ProductStock, ServiceError> {
        let db = self.db_pool.as_ref();

        let product = product::Entity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let overview = self
            .overview(StockOverviewFilter {
                product_id: Some(product_id),
                ..Default::default()
            })
            .await?;

        let locations: Vec<StockOverviewRow> = overview
            .stock_locations
            .into_iter()
            .filter(|r| r.quantity > 0)
            .collect();
        let total_stock = locations.iter().map(|r| r.quantity as i64).sum();

        Ok(ProductStock {
            product,
            total_stock,
            locations,
        })
    }

    /// Ledger entries, newest first, optionally filtered by product.
    #[instrument(skip(self))]
    pub async fn ledger(
        &self,
        product_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<stock_ledger::Model>, u64), ServiceError> {
        use sea_orm::PaginatorTrait;

        let db = self.db_pool.as_ref();
        let mut query =
            stock_ledger::Entity::find().order_by_desc(stock_ledger::Column::CreatedAt);
        if let Some(product_id) = product_id {
            query = query.filter(stock_ledger::Column::ProductId.eq(product_id));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    /// Adjust the on-hand quantity of a product at a location.
    ///
    /// DECREASE clamps at zero; the ledger delta records what actually left
    /// the location.
    #[instrument(skip(self))]
    pub async fn adjust(
        &self,
        command: AdjustStockCommand,
    ) -> Result<stock_location::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let product = product::Entity::find_by_id(command.product_id).one(db).await?;
        if product.is_none() {
            return Err(ServiceError::NotFound("Product not found".to_string()));
        }
        let location = location::Entity::find_by_id(command.location_id).one(db).await?;
        if location.is_none() {
            return Err(ServiceError::NotFound("Location not found".to_string()));
        }

        let cmd = command.clone();
        let (updated, previous_quantity) = db
            .transaction::<_, (stock_location::Model, i32), ServiceError>(move |txn| {
                Box::pin(async move {
                    let current = find_stock_row(txn, cmd.product_id, cmd.location_id).await?;
                    let current_quantity = current.as_ref().map(|s| s.quantity).unwrap_or(0);

                    let new_quantity = match cmd.kind {
                        AdjustmentKind::Increase => current_quantity + cmd.quantity,
                        AdjustmentKind::Decrease => (current_quantity - cmd.quantity).max(0),
                        AdjustmentKind::Set => cmd.quantity,
                    };

                    let updated = match current {
                        Some(existing) => {
                            let reserved = existing.reserved;
                            let mut active: stock_location::ActiveModel = existing.into();
                            active.quantity = Set(new_quantity);
                            active.available = Set(available_for(new_quantity, reserved));
                            active.updated_at = Set(Utc::now());
                            active.update(txn).await?
                        }
                        None => {
                            let row = stock_location::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                product_id: Set(cmd.product_id),
                                location_id: Set(cmd.location_id),
                                quantity: Set(new_quantity),
                                reserved: Set(0),
                                available: Set(new_quantity),
                                average_cost: Set(cmd.unit_cost.unwrap_or(Decimal::ZERO)),
                                updated_at: Set(Utc::now()),
                            };
                            row.insert(txn).await?
                        }
                    };

                    // The delta records what actually changed, not what was requested
                    let delta = match cmd.kind {
                        AdjustmentKind::Increase => cmd.quantity,
                        AdjustmentKind::Decrease => -cmd.quantity.min(current_quantity),
                        AdjustmentKind::Set => new_quantity - current_quantity,
                    };

                    append_ledger_entry(
                        txn,
                        LedgerEntry {
                            product_id: cmd.product_id,
                            location_id: cmd.location_id,
                            document_type: DocumentType::Adjustment,
                            document_id: None,
                            movement: Movement::Adjustment,
                            quantity: delta,
                            balance_before: current_quantity,
                            balance_after: new_quantity,
                            unit_cost: cmd.unit_cost,
                            reason: cmd.reason.clone(),
                            reference: None,
                            user_id: cmd.user_id,
                        },
                    )
                    .await?;

                    Ok((updated, current_quantity))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            product_id = %command.product_id,
            location_id = %command.location_id,
            quantity = updated.quantity,
            "Stock adjusted"
        );

        self.event_sender
            .send(Event::StockAdjusted {
                product_id: command.product_id,
                location_id: command.location_id,
                old_quantity: previous_quantity,
                new_quantity: updated.quantity,
                reason: command.reason,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Move stock between two locations of the same or different warehouses.
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        command: TransferStockCommand,
    ) -> Result<(stock_location::Model, stock_location::Model), ServiceError> {
        if command.from_location_id == command.to_location_id {
            return Err(ServiceError::InvalidInput(
                "From and to locations cannot be the same".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let cmd = command.clone();

        let (source, dest) = db
            .transaction::<_, (stock_location::Model, stock_location::Model), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let source = find_stock_row(txn, cmd.product_id, cmd.from_location_id)
                            .await?
                            .filter(|s| s.quantity >= cmd.quantity)
                            .ok_or_else(|| {
                                ServiceError::InsufficientStock(
                                    "Insufficient stock at source location".to_string(),
                                )
                            })?;

                        let source_before = source.quantity;
                        let source_after = source_before - cmd.quantity;
                        let average_cost = source.average_cost;

                        let source_reserved = source.reserved;
                        let mut active_source: stock_location::ActiveModel = source.into();
                        active_source.quantity = Set(source_after);
                        active_source.available = Set(available_for(source_after, source_reserved));
                        active_source.updated_at = Set(Utc::now());
                        let updated_source = active_source.update(txn).await?;

                        let dest = find_stock_row(txn, cmd.product_id, cmd.to_location_id).await?;
                        let dest_before = dest.as_ref().map(|d| d.quantity).unwrap_or(0);
                        let dest_after = dest_before + cmd.quantity;

                        let updated_dest = match dest {
                            Some(existing) => {
                                let reserved = existing.reserved;
                                let mut active: stock_location::ActiveModel = existing.into();
                                active.quantity = Set(dest_after);
                                active.available = Set(available_for(dest_after, reserved));
                                active.updated_at = Set(Utc::now());
                                active.update(txn).await?
                            }
                            None => {
                                let row = stock_location::ActiveModel {
                                    id: Set(Uuid::new_v4()),
                                    product_id: Set(cmd.product_id),
                                    location_id: Set(cmd.to_location_id),
                                    quantity: Set(dest_after),
                                    reserved: Set(0),
                                    available: Set(dest_after),
                                    average_cost: Set(average_cost),
                                    updated_at: Set(Utc::now()),
                                };
                                row.insert(txn).await?
                            }
                        };

                        append_ledger_entry(
                            txn,
                            LedgerEntry {
                                product_id: cmd.product_id,
                                location_id: cmd.from_location_id,
                                document_type: DocumentType::Transfer,
                                document_id: None,
                                movement: Movement::TransferOut,
                                quantity: -cmd.quantity,
                                balance_before: source_before,
                                balance_after: source_after,
                                unit_cost: Some(average_cost),
                                reason: Some(format!("Transfer to {}", cmd.to_location_id)),
                                reference: None,
                                user_id: cmd.user_id,
                            },
                        )
                        .await?;

                        append_ledger_entry(
                            txn,
                            LedgerEntry {
                                product_id: cmd.product_id,
                                location_id: cmd.to_location_id,
                                document_type: DocumentType::Transfer,
                                document_id: None,
                                movement: Movement::TransferIn,
                                quantity: cmd.quantity,
                                balance_before: dest_before,
                                balance_after: dest_after,
                                unit_cost: Some(average_cost),
                                reason: Some(format!("Transfer from {}", cmd.from_location_id)),
                                reference: None,
                                user_id: cmd.user_id,
                            },
                        )
                        .await?;

                        Ok((updated_source, updated_dest))
                    })
                },
            )
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            product_id = %command.product_id,
            from = %command.from_location_id,
            to = %command.to_location_id,
            quantity = command.quantity,
            "Stock transferred"
        );

        self.event_sender
            .send(Event::StockTransferred {
                product_id: command.product_id,
                from_location_id: command.from_location_id,
                to_location_id: command.to_location_id,
                quantity: command.quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok((source, dest))
    }

    /// Receive stock from a supplier: one receipt document, one receipt item
    /// and one ledger row per received line.
    #[instrument(skip(self, command), fields(supplier_id = %command.supplier_id, items = command.items.len()))]
    pub async fn receive(&self, command: ReceiveStockCommand) -> Result<ReceiptResult, ServiceError> {
        if command.items.is_empty() {
            return Err(ServiceError::InvalidInput(
                "At least one item is required".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();

        let supplier = supplier::Entity::find_by_id(command.supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

        let cmd = command.clone();
        let supplier_name = supplier.name.clone();

        let result = db
            .transaction::<_, ReceiptResult, ServiceError>(move |txn| {
                Box::pin(async move {
                    let last_number = receipt::Entity::find()
                        .order_by_desc(receipt::Column::CreatedAt)
                        .limit(1)
                        .one(txn)
                        .await?
                        .map(|r| r.receipt_number);
                    let receipt_number = numbering::format_document_number(
                        numbering::RECEIPT_PREFIX,
                        numbering::next_sequence(last_number.as_deref()),
                    );

                    let receipt_row = receipt::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        receipt_number: Set(receipt_number),
                        supplier_id: Set(cmd.supplier_id),
                        status: Set("COMPLETED".to_string()),
                        received_at: Set(Utc::now()),
                        user_id: Set(cmd.user_id),
                        created_at: Set(Utc::now()),
                    };
                    let receipt_row = receipt_row.insert(txn).await?;

                    let mut items = Vec::with_capacity(cmd.items.len());
                    for item in &cmd.items {
                        let receipt_item_row = receipt_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            receipt_id: Set(receipt_row.id),
                            product_id: Set(item.product_id),
                            location_id: Set(item.location_id),
                            quantity_ordered: Set(item.quantity),
                            quantity_received: Set(item.quantity),
                            unit_cost: Set(item.unit_cost),
                            expiry_date: Set(item.expiry_date),
                            created_at: Set(Utc::now()),
                        };
                        items.push(receipt_item_row.insert(txn).await?);

                        let current = find_stock_row(txn, item.product_id, item.location_id).await?;
                        let before = current.as_ref().map(|s| s.quantity).unwrap_or(0);
                        let after = before + item.quantity;

                        match current {
                            Some(existing) => {
                                let reserved = existing.reserved;
                                let mut active: stock_location::ActiveModel = existing.into();
                                active.quantity = Set(after);
                                active.available = Set(available_for(after, reserved));
                                // Simplified cost model: last receipt wins
                                active.average_cost = Set(item.unit_cost);
                                active.updated_at = Set(Utc::now());
                                active.update(txn).await?;
                            }
                            None => {
                                let row = stock_location::ActiveModel {
                                    id: Set(Uuid::new_v4()),
                                    product_id: Set(item.product_id),
                                    location_id: Set(item.location_id),
                                    quantity: Set(after),
                                    reserved: Set(0),
                                    available: Set(after),
                                    average_cost: Set(item.unit_cost),
                                    updated_at: Set(Utc::now()),
                                };
                                row.insert(txn).await?;
                            }
                        }

                        append_ledger_entry(
                            txn,
                            LedgerEntry {
                                product_id: item.product_id,
                                location_id: item.location_id,
                                document_type: DocumentType::Receipt,
                                document_id: Some(receipt_row.id),
                                movement: Movement::In,
                                quantity: item.quantity,
                                balance_before: before,
                                balance_after: after,
                                unit_cost: Some(item.unit_cost),
                                reason: Some(format!("Receipt from {}", supplier_name)),
                                reference: Some(receipt_row.receipt_number.clone()),
                                user_id: cmd.user_id,
                            },
                        )
                        .await?;
                    }

                    Ok(ReceiptResult {
                        receipt: receipt_row,
                        items,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            receipt_number = %result.receipt.receipt_number,
            supplier_id = %command.supplier_id,
            items = result.items.len(),
            "Stock receipt processed"
        );

        self.event_sender
            .send(Event::StockReceived {
                receipt_id: result.receipt.id,
                supplier_id: command.supplier_id,
                item_count: result.items.len(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_never_negative() {
        assert_eq!(available_for(10, 3), 7);
        assert_eq!(available_for(3, 10), 0);
        assert_eq!(available_for(0, 0), 0);
    }

    #[test]
    fn movement_and_document_strings() {
        assert_eq!(Movement::TransferOut.as_str(), "TRANSFER_OUT");
        assert_eq!(Movement::In.as_str(), "IN");
        assert_eq!(DocumentType::Delivery.as_str(), "DELIVERY");
    }

    #[test]
    fn adjustment_kind_deserializes_screaming_case() {
        let kind: AdjustmentKind = serde_json::from_str("\"INCREASE\"").unwrap();
        assert_eq!(kind, AdjustmentKind::Increase);
        let kind: AdjustmentKind = serde_json::from_str("\"SET\"").unwrap();
        assert_eq!(kind, AdjustmentKind::Set);
        assert!(serde_json::from_str::<AdjustmentKind>("\"increase\"").is_err());
    }
}
