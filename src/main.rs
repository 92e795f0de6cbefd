use clap::Parser;
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fuelpay_core::adapters::{MemoryStore, PostgresStore};
use fuelpay_core::cli::{Cli, Commands, DbCommands};
use fuelpay_core::config::Config;
use fuelpay_core::domain::SettingsPatch;
use fuelpay_core::ledger::LedgerClient;
use fuelpay_core::ports::Store;
use fuelpay_core::{create_app, startup, AppState};

/// Codes seeded into the local pool on first start without a ledger.
const DEFAULT_OTP_SEED: &[&str] = &["1234", "5678", "9012", "3456", "7890"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => migrate(config).await,
        Commands::Config => validate_config(config).await,
    }
}

async fn init_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            let store = PostgresStore::connect(database_url).await?;
            let migrator = Migrator::new(Path::new("./migrations")).await?;
            migrator.run(store.pool()).await?;
            tracing::info!("Database migrations completed");
            Arc::new(store)
        }
        None => {
            tracing::info!("No DATABASE_URL set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Persist default pricing on first start.
    store.update_settings(SettingsPatch::default()).await?;

    // Local-fallback mode assigns codes from the pool; make sure it has
    // some on a fresh store.
    if config.ledger_webhook_url.is_none() && store.next_unused_otp().await?.is_none() {
        let codes: Vec<String> = DEFAULT_OTP_SEED.iter().map(|s| s.to_string()).collect();
        store.seed_otps(&codes).await?;
        tracing::info!(count = codes.len(), "seeded local OTP pool");
    }

    Ok(store)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = init_store(&config).await?;

    let ledger = config.ledger_webhook_url.clone().map(|url| {
        tracing::info!(url = %url, "External Ledger client initialized");
        LedgerClient::new(url)
    });
    if ledger.is_none() {
        tracing::info!("No LEDGER_WEBHOOK_URL set, running in local-fallback mode");
    }

    let state = AppState::new(store, ledger, config.clone());
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn migrate(config: Config) -> anyhow::Result<()> {
    let database_url = config
        .database_url
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for db migrate"))?;

    let store = PostgresStore::connect(&database_url).await?;
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(store.pool()).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

async fn validate_config(config: Config) -> anyhow::Result<()> {
    let store = init_store(&config).await?;
    let report = startup::validate_environment(&config, &store).await?;
    report.print();

    if !report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}
