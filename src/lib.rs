//! BizDesk Backend
//!
//! REST backend for customers, vendors, vehicles, employees, quotations,
//! invoices, purchase orders, receipts and payslips, with PIN-code login and a
//! role based permission table. SQLite is the only store.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod hydration;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::{Repository, SettingsRepository, UserRepository};
use models::{
    Customer, Employee, Entity, Invoice, Payslip, PurchaseOrder, Quotation, Receipt, Vehicle,
    Vendor,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub users: Arc<UserRepository>,
    pub settings: Arc<SettingsRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            settings: Arc::new(SettingsRepository::new(pool.clone())),
            config: Arc::new(config),
            pool,
        }
    }

    /// Repository for entity `T` over the shared pool.
    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.pool.clone())
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Auth
        .route("/auth/login", post(api::login))
        .route("/auth/logout", post(api::logout))
        .route("/auth/session", get(api::current_session))
        // Users
        .route("/users", get(api::list_users).post(api::create_user))
        .route("/users/{id}", delete(api::delete_user))
        // Settings
        .route("/settings", get(api::get_settings).put(api::update_settings))
        // Business entities
        .merge(api::resource::<Customer>())
        .merge(api::resource::<Vendor>())
        .merge(api::resource::<Vehicle>())
        .merge(api::resource::<Employee>())
        .merge(api::resource::<Quotation>())
        .merge(api::resource::<Invoice>())
        .merge(api::resource::<PurchaseOrder>())
        .merge(api::resource::<Receipt>())
        .merge(api::resource::<Payslip>());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .fallback(api::route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
