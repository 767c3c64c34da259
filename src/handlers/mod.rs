pub mod auth;
pub mod common;
pub mod customers;
pub mod deliveries;
pub mod email;
pub mod locations;
pub mod products;
pub mod stock;
pub mod suppliers;
pub mod warehouses;

use std::sync::Arc;

use crate::auth::OtpService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::notifications::Mailer;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<crate::services::users::UserService>,
    pub otp: Arc<OtpService>,
    pub warehouses: Arc<crate::services::warehouses::WarehouseService>,
    pub locations: Arc<crate::services::locations::LocationService>,
    pub products: Arc<crate::services::products::ProductService>,
    pub customers: Arc<crate::services::customers::CustomerService>,
    pub suppliers: Arc<crate::services::suppliers::SupplierService>,
    pub stock: Arc<crate::services::stock::StockService>,
    pub deliveries: Arc<crate::services::deliveries::DeliveryService>,
    pub mailer: Arc<Mailer>,
}

impl AppServices {
    /// Build the AppServices container over a shared pool and event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, mailer: Mailer) -> Self {
        Self {
            users: Arc::new(crate::services::users::UserService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            otp: Arc::new(OtpService::new(db_pool.clone())),
            warehouses: Arc::new(crate::services::warehouses::WarehouseService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            locations: Arc::new(crate::services::locations::LocationService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            products: Arc::new(crate::services::products::ProductService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            customers: Arc::new(crate::services::customers::CustomerService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            suppliers: Arc::new(crate::services::suppliers::SupplierService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            stock: Arc::new(crate::services::stock::StockService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            deliveries: Arc::new(crate::services::deliveries::DeliveryService::new(
                db_pool,
                event_sender,
            )),
            mailer: Arc::new(mailer),
        }
    }
}
