use std::net::SocketAddr;
use std::sync::Arc;

use fuelpay_core::adapters::MemoryStore;
use fuelpay_core::config::Config;
use fuelpay_core::ledger::LedgerClient;
use fuelpay_core::ports::Store;
use fuelpay_core::{create_app, AppState};

pub const ADMIN_KEY: &str = "test-admin-key";

pub fn test_config(ledger_webhook_url: Option<String>) -> Config {
    Config {
        server_port: 0,
        database_url: None,
        ledger_webhook_url,
        admin_api_key: ADMIN_KEY.to_string(),
    }
}

/// Binds the app on an ephemeral port over a fresh in-memory store and
/// returns its base URL plus the store for direct seeding/inspection.
pub async fn setup_test_app(ledger_url: Option<String>) -> (String, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn Store> = store.clone();
    let ledger = ledger_url.clone().map(LedgerClient::new);

    let state = AppState::new(dyn_store, ledger, test_config(ledger_url));
    let app = create_app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let actual_addr = server.local_addr();

    tokio::spawn(async move {
        server.await.unwrap();
    });

    (format!("http://{}", actual_addr), store)
}
