//! Storage contract. The reconciliation engine and the HTTP handlers
//! depend only on this trait; the concrete backend (in-memory or
//! Postgres) is selected at startup.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    Customer, NewTransaction, Otp, Settings, SettingsPatch, Transaction, TransactionStatus,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_settings(&self) -> StoreResult<Settings>;
    async fn update_settings(&self, patch: SettingsPatch) -> StoreResult<Settings>;

    /// Idempotent lookup-or-insert keyed on phone. A new non-empty vehicle
    /// number replaces the stored one.
    async fn get_or_create_customer(
        &self,
        phone: &str,
        vehicle_number: Option<&str>,
    ) -> StoreResult<Customer>;
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;

    async fn create_transaction(&self, input: NewTransaction) -> StoreResult<Transaction>;
    async fn get_transaction(&self, id: i64) -> StoreResult<Transaction>;
    /// In-place mutation. Writes for one transaction id are serialized by
    /// the backend so a poll-driven update and a concurrent reset cannot
    /// lose each other's write.
    async fn update_transaction_status(
        &self,
        id: i64,
        status: TransactionStatus,
        auth_code: Option<&str>,
    ) -> StoreResult<Transaction>;
    /// Newest-first by creation instant, optionally filtered by customer.
    async fn list_transactions(&self, customer_id: Option<i64>) -> StoreResult<Vec<Transaction>>;

    async fn next_unused_otp(&self) -> StoreResult<Option<Otp>>;
    async fn mark_otp_used(&self, id: i64) -> StoreResult<()>;
    async fn seed_otps(&self, codes: &[String]) -> StoreResult<()>;

    /// Backend liveness probe for the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}
