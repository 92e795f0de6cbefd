use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::ledger::LedgerClient;
use crate::ports::Store;

pub struct ValidationReport {
    pub environment: bool,
    pub store: bool,
    pub ledger: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.store && self.ledger
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        println!("Store Connectivity:    {}", status(self.store));
        println!("Ledger Connectivity:   {}", status(self.ledger));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!(
            "\nOverall Status: {}",
            if self.is_valid() { "✅ PASS" } else { "❌ FAIL" }
        );
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok {
        "✅ OK"
    } else {
        "❌ FAIL"
    }
}

pub async fn validate_environment(
    config: &Config,
    store: &Arc<dyn Store>,
) -> Result<ValidationReport> {
    let mut report = ValidationReport {
        environment: true,
        store: true,
        ledger: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {}", e));
    }

    if let Err(e) = store.ping().await {
        report.store = false;
        report.errors.push(format!("Store: {}", e));
    }

    if let Err(e) = validate_ledger(config).await {
        report.ledger = false;
        report.errors.push(format!("Ledger: {}", e));
    }

    Ok(report)
}

fn validate_env_vars(config: &Config) -> Result<()> {
    if config.server_port == 0 {
        anyhow::bail!("SERVER_PORT must be non-zero");
    }
    if config.admin_api_key.trim().is_empty() {
        anyhow::bail!("ADMIN_API_KEY must not be empty");
    }
    if let Some(url) = &config.ledger_webhook_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("LEDGER_WEBHOOK_URL must be an http(s) URL");
        }
    }
    Ok(())
}

async fn validate_ledger(config: &Config) -> Result<()> {
    let url = match &config.ledger_webhook_url {
        Some(url) => url,
        // No ledger configured: local-fallback mode is a valid setup.
        None => return Ok(()),
    };

    let client = LedgerClient::new(url.clone());
    client
        .fetch_otp_records()
        .await
        .map_err(|e| anyhow::anyhow!("ledger unreachable: {}", e))?;
    Ok(())
}
