use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Domain events emitted by the service layer after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // User events
    UserRegistered(Uuid),
    PasswordReset(Uuid),

    // Inventory structure events
    WarehouseCreated(Uuid),
    WarehouseDeactivated(Uuid),
    LocationCreated(Uuid),
    LocationDeactivated(Uuid),
    ProductCreated(Uuid),
    ProductDeleted(Uuid),
    CustomerCreated(Uuid),
    SupplierCreated(Uuid),

    // Stock events
    StockAdjusted {
        product_id: Uuid,
        location_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
        reason: Option<String>,
    },
    StockTransferred {
        product_id: Uuid,
        from_location_id: Uuid,
        to_location_id: Uuid,
        quantity: i32,
    },
    StockReceived {
        receipt_id: Uuid,
        supplier_id: Uuid,
        item_count: usize,
    },

    // Delivery events
    DeliveryCreated(Uuid),
    DeliveryStatusChanged {
        delivery_id: Uuid,
        old_status: String,
        new_status: String,
    },
    DeliveryValidated {
        delivery_id: Uuid,
        line_count: usize,
    },
    DeliveryDeleted(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel with the given capacity.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Background task draining the event channel. Events are logged; this is the
/// single seam where external fan-out (webhooks, queues) would attach.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::StockAdjusted {
                product_id,
                location_id,
                old_quantity,
                new_quantity,
                ..
            } => {
                info!(
                    product_id = %product_id,
                    location_id = %location_id,
                    old_quantity,
                    new_quantity,
                    "Stock adjusted"
                );
            }
            Event::DeliveryStatusChanged {
                delivery_id,
                old_status,
                new_status,
            } => {
                info!(
                    delivery_id = %delivery_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "Delivery status changed"
                );
            }
            other => debug!(event = ?other, "Domain event"),
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_and_receive_event() {
        let (sender, mut rx) = channel(8);
        let id = Uuid::new_v4();
        sender.send(Event::DeliveryCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::DeliveryCreated(received)) => assert_eq!(received, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_after_receiver_dropped() {
        let (sender, rx) = channel(1);
        drop(rx);
        assert!(sender.send(Event::UserRegistered(Uuid::new_v4())).await.is_err());
    }
}
