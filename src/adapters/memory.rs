//! In-memory implementation of the store contract.
//!
//! Uses `Arc<RwLock<..>>` for shared concurrent access. The single write
//! lock serializes all mutations, which covers the per-transaction write
//! ordering the contract requires. This is the authoritative store when no
//! database is configured.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{
    Customer, NewTransaction, Otp, Settings, SettingsPatch, Transaction, TransactionStatus,
};
use crate::ports::{Store, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    settings: Option<Settings>,
    customers: Vec<Customer>,
    transactions: Vec<Transaction>,
    otps: Vec<Otp>,
    customer_seq: i64,
    transaction_seq: i64,
    otp_seq: i64,
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_settings(&self) -> StoreResult<Settings> {
        let inner = self.inner.read().await;
        Ok(inner.settings.clone().unwrap_or_default())
    }

    async fn update_settings(&self, patch: SettingsPatch) -> StoreResult<Settings> {
        let mut inner = self.inner.write().await;
        let updated = inner.settings.clone().unwrap_or_default().apply(patch);
        inner.settings = Some(updated.clone());
        Ok(updated)
    }

    async fn get_or_create_customer(
        &self,
        phone: &str,
        vehicle_number: Option<&str>,
    ) -> StoreResult<Customer> {
        let mut inner = self.inner.write().await;
        if let Some(customer) = inner.customers.iter_mut().find(|c| c.phone == phone) {
            if let Some(vehicle) = vehicle_number.filter(|v| !v.is_empty()) {
                customer.vehicle_number = Some(vehicle.to_string());
            }
            return Ok(customer.clone());
        }

        inner.customer_seq += 1;
        let customer = Customer::new(
            inner.customer_seq,
            phone.to_string(),
            vehicle_number
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string()),
        );
        inner.customers.push(customer.clone());
        Ok(customer)
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let inner = self.inner.read().await;
        Ok(inner.customers.clone())
    }

    async fn create_transaction(&self, input: NewTransaction) -> StoreResult<Transaction> {
        let mut inner = self.inner.write().await;
        inner.transaction_seq += 1;
        let tx = Transaction::new(inner.transaction_seq, input);
        inner.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn get_transaction(&self, id: i64) -> StoreResult<Transaction> {
        let inner = self.inner.read().await;
        inner
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Transaction {}", id)))
    }

    async fn update_transaction_status(
        &self,
        id: i64,
        status: TransactionStatus,
        auth_code: Option<&str>,
    ) -> StoreResult<Transaction> {
        let mut inner = self.inner.write().await;
        let tx = inner
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Transaction {}", id)))?;
        tx.status = status;
        if let Some(code) = auth_code {
            tx.auth_code = code.to_string();
        }
        Ok(tx.clone())
    }

    async fn list_transactions(&self, customer_id: Option<i64>) -> StoreResult<Vec<Transaction>> {
        let inner = self.inner.read().await;
        let mut transactions: Vec<Transaction> = inner
            .transactions
            .iter()
            .filter(|t| customer_id.is_none() || t.customer_id == customer_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(transactions)
    }

    async fn next_unused_otp(&self) -> StoreResult<Option<Otp>> {
        let inner = self.inner.read().await;
        Ok(inner.otps.iter().find(|o| !o.is_used).cloned())
    }

    async fn mark_otp_used(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let otp = inner
            .otps
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Otp {}", id)))?;
        otp.is_used = true;
        Ok(())
    }

    async fn seed_otps(&self, codes: &[String]) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        for code in codes {
            inner.otp_seq += 1;
            let otp = Otp {
                id: inner.otp_seq,
                code: code.clone(),
                is_used: false,
                created_at: chrono::Utc::now(),
            };
            inner.otps.push(otp);
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
