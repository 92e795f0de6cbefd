use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use super::rows::{parse_rows, LedgerCustomer, LedgerTransaction, OtpRecord};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid response from ledger: {0}")]
    InvalidResponse(String),
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
}

/// Row payload returned by the ledger webhook.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<Value>,
}

/// HTTP client for the External Ledger webhook.
///
/// The ledger is an append-only spreadsheet behind a web-app endpoint:
/// `GET ?type={customer|transaction|otp-data}` reads rows, `POST
/// {type, data}` appends one. Rows are never updated or deleted. Requests
/// carry a bounded timeout, and a circuit breaker keeps a dead ledger from
/// being hammered on every poll.
#[derive(Clone)]
pub struct LedgerClient {
    client: Client,
    base_url: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl LedgerClient {
    /// Creates a new LedgerClient for the given webhook URL.
    pub fn new(base_url: String) -> Self {
        Self::with_circuit_breaker(base_url, 3, 60)
    }

    /// Creates a new LedgerClient with custom circuit breaker configuration.
    pub fn with_circuit_breaker(
        base_url: String,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        LedgerClient {
            client,
            base_url,
            circuit_breaker,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the current state of the circuit breaker.
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    /// Fetches all operator-entered OTP rows. Unparseable rows are dropped.
    pub async fn fetch_otp_records(&self) -> Result<Vec<OtpRecord>, LedgerError> {
        let rows = self.fetch_rows("otp-data", &[]).await?;
        Ok(parse_rows(&rows, "otp-data", OtpRecord::from_row))
    }

    /// Fetches mirrored customers, optionally filtered by phone.
    pub async fn fetch_customers(
        &self,
        phone: Option<&str>,
    ) -> Result<Vec<LedgerCustomer>, LedgerError> {
        let query: Vec<(&str, String)> = match phone {
            Some(phone) => vec![("phone", phone.to_string())],
            None => Vec::new(),
        };
        let rows = self.fetch_rows("customer", &query).await?;
        Ok(parse_rows(&rows, "customer", LedgerCustomer::from_row))
    }

    /// Fetches mirrored transactions for one customer.
    pub async fn fetch_transactions(
        &self,
        customer_id: i64,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let query = vec![("customerId", customer_id.to_string())];
        let rows = self.fetch_rows("transaction", &query).await?;
        Ok(parse_rows(&rows, "transaction", LedgerTransaction::from_row))
    }

    /// Appends one row. The ledger offers no update or delete.
    pub async fn append(&self, kind: &str, data: Value) -> Result<(), LedgerError> {
        let client = self.client.clone();
        let url = self.base_url.clone();
        let body = json!({
            "type": kind,
            "data": data,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.post(&url).json(&body).send().await?;
                if !response.status().is_success() {
                    return Err(LedgerError::InvalidResponse(format!(
                        "append returned status {}",
                        response.status()
                    )));
                }
                Ok(())
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(FailsafeError::Rejected) => Err(LedgerError::CircuitBreakerOpen(
                "ledger circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }

    async fn fetch_rows(
        &self,
        kind: &str,
        extra_query: &[(&str, String)],
    ) -> Result<Vec<Value>, LedgerError> {
        let client = self.client.clone();
        let url = self.base_url.clone();
        let mut query: Vec<(String, String)> = vec![("type".to_string(), kind.to_string())];
        for (key, value) in extra_query {
            query.push((key.to_string(), value.clone()));
        }

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.get(&url).query(&query).send().await?;
                if !response.status().is_success() {
                    return Err(LedgerError::InvalidResponse(format!(
                        "read returned status {}",
                        response.status()
                    )));
                }

                let envelope = response.json::<Envelope>().await?;
                Ok(envelope.data)
            })
            .await;

        match result {
            Ok(rows) => Ok(rows),
            Err(FailsafeError::Rejected) => Err(LedgerError::CircuitBreakerOpen(
                "ledger circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}
