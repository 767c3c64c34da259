//! StockMaster API Library
//!
//! Warehouse inventory management backend: products, warehouses, locations,
//! stock levels, and delivery orders over a relational schema.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod notifications;
pub mod openapi;
pub mod services;

use axum::{extract::State, response::Json, routing::get};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::AuthRouterExt;

pub type Router = axum::Router<AppState>;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    pub auth: Arc<auth::AuthService>,
}

// Common response wrapper
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Full API surface under `/api`.
pub fn api_routes() -> Router {
    let inventory = axum::Router::new()
        .nest("/warehouses", handlers::warehouses::routes())
        .nest("/locations", handlers::locations::routes())
        .nest("/stock", handlers::stock::routes())
        .with_auth();

    axum::Router::new()
        .route("/status", get(api_status))
        .nest("/auth", handlers::auth::routes())
        .nest("/inventory", inventory)
        // Convenience alias kept for the location pages
        .nest("/locations", handlers::locations::routes().with_auth())
        .nest("/products", handlers::products::routes().with_auth())
        .nest("/customers", handlers::customers::routes().with_auth())
        .nest("/suppliers", handlers::suppliers::routes().with_auth())
        .nest("/deliveries", handlers::deliveries::routes().with_auth())
        .nest("/email", handlers::email::routes())
}

async fn api_status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "stockmaster-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string()),
    }))
}

/// Liveness endpoint: reports database reachability.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<Value>, errors::ServiceError> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(json!({
        "status": if db_status == "healthy" { "OK" } else { "DEGRADED" },
        "message": "StockMaster API is running",
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
