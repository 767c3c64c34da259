//! Delivery orders: outbound shipments walking a fixed status sequence.
//! Validation is the stock-mutating step; everything before it only touches
//! the order and its lines.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    customer, delivery_order, delivery_order_line, location, product, stock_location, warehouse,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::numbering;
use crate::services::stock::{
    append_ledger_entry, available_for, find_stock_row, DocumentType, LedgerEntry, Movement,
};

/// Delivery order lifecycle.
///
/// DRAFT → WAITING → READY → DONE, with CANCELED reachable from every
/// non-terminal state. DONE is only reachable through validation, which is
/// the step that decrements stock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Draft,
    Waiting,
    Ready,
    Done,
    Canceled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Waiting => "WAITING",
            Self::Ready => "READY",
            Self::Done => "DONE",
            Self::Canceled => "CANCELED",
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, next),
            (Draft, Waiting)
                | (Waiting, Ready)
                | (Ready, Done)
                | (Draft, Canceled)
                | (Waiting, Canceled)
                | (Ready, Canceled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

fn parse_status(model_status: &str) -> Result<DeliveryStatus, ServiceError> {
    DeliveryStatus::from_str(model_status)
        .map_err(|_| ServiceError::InternalError(format!("Corrupt delivery status: {}", model_status)))
}

#[derive(Debug, Clone)]
pub struct NewDeliveryLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateDeliveryCommand {
    pub customer_id: Option<Uuid>,
    pub location_id: Uuid,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
    pub lines: Vec<NewDeliveryLine>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDeliveryCommand {
    pub customer_id: Option<Option<Uuid>>,
    pub location_id: Option<Uuid>,
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    pub notes: Option<Option<String>>,
}

/// A delivery line joined with its product.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryLineDetail {
    #[serde(flatten)]
    pub line: delivery_order_line::Model,
    pub product: Option<product::Model>,
}

/// A delivery order with its related records, as served by the API.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryDetail {
    #[serde(flatten)]
    pub order: delivery_order::Model,
    pub customer: Option<customer::Model>,
    pub location: Option<location::Model>,
    pub warehouse: Option<warehouse::Model>,
    pub lines: Vec<DeliveryLineDetail>,
}

/// Service for delivery orders
#[derive(Clone)]
pub struct DeliveryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl DeliveryService {
    /// Creates a new delivery service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// All deliveries, newest first, with customer/location/lines attached.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<DeliveryDetail>, ServiceError> {
        let db = self.db_pool.as_ref();
        let orders = delivery_order::Entity::find()
            .order_by_desc(delivery_order::Column::CreatedAt)
            .all(db)
            .await?;
        self.assemble_details(orders).await
    }

    /// One delivery with related records.
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<DeliveryDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let order = delivery_order::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Delivery not found".to_string()))?;

        let mut details = self.assemble_details(vec![order]).await?;
        Ok(details.remove(0))
    }

    async fn assemble_details(
        &self,
        orders: Vec<delivery_order::Model>,
    ) -> Result<Vec<DeliveryDetail>, ServiceError> {
        let db = self.db_pool.as_ref();

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let customer_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.customer_id).collect();
        let location_ids: Vec<Uuid> = orders.iter().map(|o| o.location_id).collect();

        let lines = delivery_order_line::Entity::find()
            .filter(delivery_order_line::Column::DeliveryId.is_in(order_ids))
            .all(db)
            .await?;

        let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let products: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let customers: HashMap<Uuid, customer::Model> = customer::Entity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let locations: HashMap<Uuid, location::Model> = location::Entity::find()
            .filter(location::Column::Id.is_in(location_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        let warehouse_ids: Vec<Uuid> = locations.values().map(|l| l.warehouse_id).collect();
        let warehouses: HashMap<Uuid, warehouse::Model> = warehouse::Entity::find()
            .filter(warehouse::Column::Id.is_in(warehouse_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|w| (w.id, w))
            .collect();

        let mut lines_by_order: HashMap<Uuid, Vec<DeliveryLineDetail>> = HashMap::new();
        for line in lines {
            let product = products.get(&line.product_id).cloned();
            lines_by_order
                .entry(line.delivery_id)
                .or_default()
                .push(DeliveryLineDetail { line, product });
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let customer = order.customer_id.and_then(|id| customers.get(&id).cloned());
                let location = locations.get(&order.location_id).cloned();
                let warehouse = location
                    .as_ref()
                    .and_then(|l| warehouses.get(&l.warehouse_id).cloned());
                let lines = lines_by_order.remove(&order.id).unwrap_or_default();
                DeliveryDetail {
                    order,
                    customer,
                    location,
                    warehouse,
                    lines,
                }
            })
            .collect())
    }

    /// Create a delivery order in DRAFT with its lines.
    #[instrument(skip(self, command), fields(location_id = %command.location_id, lines = command.lines.len()))]
    pub async fn create(&self, command: CreateDeliveryCommand) -> Result<DeliveryDetail, ServiceError> {
        if command.lines.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Location and at least one line item are required".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let location = location::Entity::find_by_id(command.location_id).one(db).await?;
        if location.is_none() {
            return Err(ServiceError::NotFound("Location not found".to_string()));
        }

        let cmd = command.clone();
        let order = db
            .transaction::<_, delivery_order::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let last_number = delivery_order::Entity::find()
                        .order_by_desc(delivery_order::Column::CreatedAt)
                        .limit(1)
                        .one(txn)
                        .await?
                        .map(|d| d.delivery_number);
                    let delivery_number = numbering::format_document_number(
                        numbering::DELIVERY_PREFIX,
                        numbering::next_sequence(last_number.as_deref()),
                    );

                    let order = delivery_order::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        delivery_number: Set(delivery_number),
                        customer_id: Set(cmd.customer_id),
                        location_id: Set(cmd.location_id),
                        status: Set(DeliveryStatus::Draft.as_str().to_string()),
                        scheduled_date: Set(cmd.scheduled_date),
                        delivered_date: Set(None),
                        notes: Set(cmd.notes.clone()),
                        user_id: Set(cmd.user_id),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };
                    let order = order.insert(txn).await?;

                    for line in &cmd.lines {
                        let row = delivery_order_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            delivery_id: Set(order.id),
                            product_id: Set(line.product_id),
                            quantity: Set(line.quantity),
                            picked: Set(0),
                            packed: Set(0),
                            delivered: Set(0),
                            notes: Set(line.notes.clone()),
                            created_at: Set(Utc::now()),
                        };
                        row.insert(txn).await?;
                    }

                    Ok(order)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(delivery_number = %order.delivery_number, "Delivery created");

        self.event_sender
            .send(Event::DeliveryCreated(order.id))
            .await
            .map_err(ServiceError::EventError)?;

        self.get(order.id).await
    }

    /// Update header fields of a delivery order.
    #[instrument(skip(self, command))]
    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateDeliveryCommand,
    ) -> Result<DeliveryDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let order = delivery_order::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Delivery not found".to_string()))?;

        if let Some(location_id) = command.location_id {
            let location = location::Entity::find_by_id(location_id).one(db).await?;
            if location.is_none() {
                return Err(ServiceError::NotFound("Location not found".to_string()));
            }
        }

        let mut active: delivery_order::ActiveModel = order.into();
        if let Some(customer_id) = command.customer_id {
            active.customer_id = Set(customer_id);
        }
        if let Some(location_id) = command.location_id {
            active.location_id = Set(location_id);
        }
        if let Some(scheduled_date) = command.scheduled_date {
            active.scheduled_date = Set(scheduled_date);
        }
        if let Some(notes) = command.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.get(id).await
    }

    /// Explicit status transition through the lifecycle machine.
    ///
    /// DONE is rejected here: it is only reachable through [`Self::validate`],
    /// which performs the stock decrement.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<DeliveryDetail, ServiceError> {
        let target = DeliveryStatus::from_str(status)
            .map_err(|_| ServiceError::InvalidInput("Invalid status".to_string()))?;

        if target == DeliveryStatus::Done {
            return Err(ServiceError::InvalidOperation(
                "Deliveries are completed by validating them".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        let order = delivery_order::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Delivery not found".to_string()))?;

        let current = parse_status(&order.status)?;
        if !current.can_transition_to(target) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move delivery from {} to {}",
                current, target
            )));
        }

        let mut active: delivery_order::ActiveModel = order.into();
        active.status = Set(target.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        self.event_sender
            .send(Event::DeliveryStatusChanged {
                delivery_id: id,
                old_status: current.as_str().to_string(),
                new_status: target.as_str().to_string(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        self.get(id).await
    }

    /// Confirm a draft delivery (DRAFT → WAITING).
    #[instrument(skip(self))]
    pub async fn confirm(&self, id: Uuid) -> Result<DeliveryDetail, ServiceError> {
        self.set_status(id, DeliveryStatus::Waiting.as_str()).await
    }

    /// Pick all lines in full (WAITING → READY).
    #[instrument(skip(self))]
    pub async fn pick(&self, id: Uuid) -> Result<DeliveryDetail, ServiceError> {
        let db = self.db_pool.as_ref();

        let old_status = db
            .transaction::<_, DeliveryStatus, ServiceError>(move |txn| {
                Box::pin(async move {
                    let order = delivery_order::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound("Delivery not found".to_string()))?;

                    let current = parse_status(&order.status)?;
                    if current != DeliveryStatus::Waiting {
                        return Err(ServiceError::InvalidStatus(
                            "Delivery must be in WAITING status to pick items".to_string(),
                        ));
                    }

                    let lines = order
                        .find_related(delivery_order_line::Entity)
                        .all(txn)
                        .await?;
                    for line in lines {
                        let quantity = line.quantity;
                        let mut active: delivery_order_line::ActiveModel = line.into();
                        active.picked = Set(quantity);
                        active.update(txn).await?;
                    }

                    let mut active: delivery_order::ActiveModel = order.into();
                    active.status = Set(DeliveryStatus::Ready.as_str().to_string());
                    active.updated_at = Set(Some(Utc::now()));
                    active.update(txn).await?;

                    Ok(current)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        self.event_sender
            .send(Event::DeliveryStatusChanged {
                delivery_id: id,
                old_status: old_status.as_str().to_string(),
                new_status: DeliveryStatus::Ready.as_str().to_string(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        self.get(id).await
    }

    /// Pack picked lines; unpicked lines are packed in full (→ READY).
    #[instrument(skip(self))]
    pub async fn pack(&self, id: Uuid) -> Result<DeliveryDetail, ServiceError> {
        let db = self.db_pool.as_ref();

        let old_status = db
            .transaction::<_, DeliveryStatus, ServiceError>(move |txn| {
                Box::pin(async move {
                    let order = delivery_order::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound("Delivery not found".to_string()))?;

                    let current = parse_status(&order.status)?;
                    if current != DeliveryStatus::Waiting && current != DeliveryStatus::Ready {
                        return Err(ServiceError::InvalidStatus(
                            "Delivery must be in WAITING or READY status to pack items".to_string(),
                        ));
                    }

                    let lines = order
                        .find_related(delivery_order_line::Entity)
                        .all(txn)
                        .await?;
                    for line in lines {
                        let amount = if line.picked > 0 {
                            line.picked
                        } else {
                            line.quantity
                        };
                        let mut active: delivery_order_line::ActiveModel = line.into();
                        active.picked = Set(amount);
                        active.packed = Set(amount);
                        active.update(txn).await?;
                    }

                    let mut active: delivery_order::ActiveModel = order.into();
                    active.status = Set(DeliveryStatus::Ready.as_str().to_string());
                    active.updated_at = Set(Some(Utc::now()));
                    active.update(txn).await?;

                    Ok(current)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        self.event_sender
            .send(Event::DeliveryStatusChanged {
                delivery_id: id,
                old_status: old_status.as_str().to_string(),
                new_status: DeliveryStatus::Ready.as_str().to_string(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        self.get(id).await
    }

    /// Validate a READY delivery: record delivered quantities, decrement
    /// stock at the delivery location (clamped at zero), append one ledger
    /// row per line, and mark the order DONE.
    #[instrument(skip(self))]
    pub async fn validate(&self, id: Uuid) -> Result<DeliveryDetail, ServiceError> {
        let db = self.db_pool.as_ref();

        let line_count = db
            .transaction::<_, usize, ServiceError>(move |txn| {
                Box::pin(async move {
                    let order = delivery_order::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound("Delivery not found".to_string()))?;

                    let current = parse_status(&order.status)?;
                    if current != DeliveryStatus::Ready {
                        return Err(ServiceError::InvalidStatus(
                            "Delivery must be in READY status to validate".to_string(),
                        ));
                    }

                    let lines = order
                        .find_related(delivery_order_line::Entity)
                        .all(txn)
                        .await?;
                    let line_count = lines.len();

                    for line in lines {
                        let to_deliver = if line.packed > 0 {
                            line.packed
                        } else {
                            line.quantity
                        };
                        let product_id = line.product_id;

                        let mut active_line: delivery_order_line::ActiveModel = line.into();
                        active_line.delivered = Set(to_deliver);
                        active_line.update(txn).await?;

                        let stock = find_stock_row(txn, product_id, order.location_id).await?;
                        let (stock, before) = match stock {
                            Some(s) => {
                                let before = s.quantity;
                                (s, before)
                            }
                            None => {
                                // Lazily created so the ledger has a row to describe
                                let row = stock_location::ActiveModel {
                                    id: Set(Uuid::new_v4()),
                                    product_id: Set(product_id),
                                    location_id: Set(order.location_id),
                                    quantity: Set(0),
                                    reserved: Set(0),
                                    available: Set(0),
                                    average_cost: Set(rust_decimal::Decimal::ZERO),
                                    updated_at: Set(Utc::now()),
                                };
                                (row.insert(txn).await?, 0)
                            }
                        };

                        let after = (before - to_deliver).max(0);
                        let reserved = stock.reserved;
                        let mut active_stock: stock_location::ActiveModel = stock.into();
                        active_stock.quantity = Set(after);
                        active_stock.available = Set(available_for(after, reserved));
                        active_stock.updated_at = Set(Utc::now());
                        active_stock.update(txn).await?;

                        append_ledger_entry(
                            txn,
                            LedgerEntry {
                                product_id,
                                location_id: order.location_id,
                                document_type: DocumentType::Delivery,
                                document_id: Some(order.id),
                                movement: Movement::Out,
                                quantity: after - before,
                                balance_before: before,
                                balance_after: after,
                                unit_cost: None,
                                reason: None,
                                reference: Some(order.delivery_number.clone()),
                                user_id: order.user_id,
                            },
                        )
                        .await?;
                    }

                    let mut active: delivery_order::ActiveModel = order.into();
                    active.status = Set(DeliveryStatus::Done.as_str().to_string());
                    active.delivered_date = Set(Some(Utc::now()));
                    active.updated_at = Set(Some(Utc::now()));
                    active.update(txn).await?;

                    Ok(line_count)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(delivery_id = %id, lines = line_count, "Delivery validated");

        self.event_sender
            .send(Event::DeliveryValidated {
                delivery_id: id,
                line_count,
            })
            .await
            .map_err(ServiceError::EventError)?;

        self.get(id).await
    }

    /// Delete a delivery that has not been completed. Lines cascade.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let order = delivery_order::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Delivery not found".to_string()))?;

        if parse_status(&order.status)? == DeliveryStatus::Done {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete a completed delivery".to_string(),
            ));
        }

        order.delete(db).await?;

        self.event_sender
            .send(Event::DeliveryDeleted(id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(DeliveryStatus::Draft, DeliveryStatus::Waiting, true; "draft to waiting")]
    #[test_case(DeliveryStatus::Waiting, DeliveryStatus::Ready, true; "waiting to ready")]
    #[test_case(DeliveryStatus::Ready, DeliveryStatus::Done, true; "ready to done")]
    #[test_case(DeliveryStatus::Draft, DeliveryStatus::Canceled, true; "draft to canceled")]
    #[test_case(DeliveryStatus::Ready, DeliveryStatus::Canceled, true; "ready to canceled")]
    #[test_case(DeliveryStatus::Draft, DeliveryStatus::Ready, false; "no skipping to ready")]
    #[test_case(DeliveryStatus::Draft, DeliveryStatus::Done, false; "no skipping to done")]
    #[test_case(DeliveryStatus::Done, DeliveryStatus::Canceled, false; "done is terminal")]
    #[test_case(DeliveryStatus::Canceled, DeliveryStatus::Waiting, false; "canceled is terminal")]
    #[test_case(DeliveryStatus::Waiting, DeliveryStatus::Waiting, false; "no self transition")]
    fn status_transitions(from: DeliveryStatus, to: DeliveryStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn status_string_round_trip() {
        for status in [
            DeliveryStatus::Draft,
            DeliveryStatus::Waiting,
            DeliveryStatus::Ready,
            DeliveryStatus::Done,
            DeliveryStatus::Canceled,
        ] {
            assert_eq!(
                DeliveryStatus::from_str(status.as_str()).unwrap(),
                status
            );
        }
        assert!(DeliveryStatus::from_str("SHIPPED").is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(DeliveryStatus::Done.is_terminal());
        assert!(DeliveryStatus::Canceled.is_terminal());
        assert!(!DeliveryStatus::Ready.is_terminal());
    }
}
