pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod ports;
pub mod pricing;
pub mod services;
pub mod startup;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::ledger::LedgerClient;
use crate::ports::Store;
use crate::services::ReconciliationService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub ledger: Option<LedgerClient>,
    pub reconciliation: Arc<ReconciliationService>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, ledger: Option<LedgerClient>, config: Config) -> Self {
        let reconciliation = Arc::new(ReconciliationService::new(store.clone(), ledger.clone()));
        Self {
            store,
            ledger,
            reconciliation,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/api/settings", post(handlers::settings::update_settings))
        .route("/api/customers", get(handlers::customers::list_customers))
        .route(
            "/api/transactions/export",
            get(handlers::export::export_transactions),
        )
        .route("/api/admin/sync-all", post(handlers::admin::sync_all))
        .layer(axum::middleware::from_fn_with_state(
            state.config.clone(),
            middleware::auth::admin_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/settings", get(handlers::settings::get_settings))
        .route("/api/customers/login", post(handlers::customers::login))
        .route(
            "/api/transactions/calculate",
            post(handlers::transactions::calculate),
        )
        .route(
            "/api/transactions",
            post(handlers::transactions::create).get(handlers::transactions::list),
        )
        .route(
            "/api/transactions/:id/otp-poll",
            get(handlers::transactions::otp_poll),
        )
        .route(
            "/api/transactions/:id/reset",
            post(handlers::transactions::reset),
        )
        .route(
            "/api/transactions/:id/verify",
            post(handlers::transactions::verify),
        )
        .route("/api/otps/refresh", post(handlers::otps::refresh))
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
