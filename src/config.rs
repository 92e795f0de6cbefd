use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Postgres connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,
    /// External Ledger webhook URL. When absent the engine runs in
    /// local-fallback mode and assigns codes from the local OTP pool.
    pub ledger_webhook_url: Option<String>,
    pub admin_api_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL").ok(),
            ledger_webhook_url: env::var("LEDGER_WEBHOOK_URL").ok(),
            admin_api_key: env::var("ADMIN_API_KEY")
                .unwrap_or_else(|_| "admin-secret-key".to_string()),
        })
    }
}
