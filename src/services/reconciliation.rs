//! Authorization-code reconciliation.
//!
//! A transaction is created with the sentinel code and resolved by
//! matching it against operator-entered OTP rows on the External Ledger.
//! The engine owns the pending/resolved transition and the bounded reset
//! policy. Without a configured ledger it degrades to the local
//! single-use OTP pool and assigns codes synchronously at creation.

use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{Transaction, TransactionStatus, AUTH_CODE_PENDING};
use crate::error::AppError;
use crate::ledger::LedgerClient;
use crate::ports::Store;

/// Resets allowed per transaction before the caller is told to restart
/// the flow with station staff.
pub const MAX_RESET_ATTEMPTS: u32 = 3;

/// Codes seeded into the local pool when it runs dry.
const POOL_REFILL_SIZE: usize = 5;

pub struct ReconciliationService {
    store: Arc<dyn Store>,
    ledger: Option<LedgerClient>,
    reset_attempts: Mutex<HashMap<i64, u32>>,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn Store>, ledger: Option<LedgerClient>) -> Self {
        Self {
            store,
            ledger,
            reset_attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_local_mode(&self) -> bool {
        self.ledger.is_none()
    }

    /// Resolves the authorization code for a transaction.
    ///
    /// Fast path: an already-resolved code is returned without touching
    /// the ledger. Otherwise the ledger's OTP rows are filtered to those
    /// strictly newer than the transaction's creation instant and the
    /// latest one wins. Ledger failures are downgraded to "no candidate":
    /// the caller polls again.
    pub async fn poll_auth_code(&self, transaction_id: i64) -> Result<String, AppError> {
        let tx = self.store.get_transaction(transaction_id).await?;
        if tx.is_resolved() {
            return Ok(tx.auth_code);
        }

        let ledger = match &self.ledger {
            Some(ledger) => ledger,
            None => return Ok(AUTH_CODE_PENDING.to_string()),
        };

        let records = match ledger.fetch_otp_records().await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(transaction_id, error = %err, "ledger poll failed, returning sentinel");
                return Ok(AUTH_CODE_PENDING.to_string());
            }
        };

        let candidate = records
            .into_iter()
            .filter(|record| record.timestamp > tx.created_at)
            .max_by_key(|record| record.timestamp);

        match candidate {
            Some(record) => {
                let updated = self
                    .store
                    .update_transaction_status(
                        transaction_id,
                        TransactionStatus::Paid,
                        Some(&record.code),
                    )
                    .await?;
                tracing::info!(
                    transaction_id,
                    code = %record.code,
                    entered_at = %record.timestamp,
                    "authorization code resolved"
                );
                Ok(updated.auth_code)
            }
            None => Ok(AUTH_CODE_PENDING.to_string()),
        }
    }

    /// Reverts a transaction to the sentinel so polling can match again.
    ///
    /// Bounded to [`MAX_RESET_ATTEMPTS`] per transaction. The creation
    /// instant is left untouched, so the newer-than filter can re-match a
    /// code that was already consumed until a newer ledger row arrives.
    pub async fn reset_auth_code(&self, transaction_id: i64) -> Result<Transaction, AppError> {
        let tx = self.store.get_transaction(transaction_id).await?;

        {
            let mut attempts = self.reset_attempts.lock().await;
            let count = attempts.entry(transaction_id).or_insert(0);
            if *count >= MAX_RESET_ATTEMPTS {
                return Err(AppError::RetryLimitExceeded(
                    "reset limit reached, please re-initiate the transaction with the attendant"
                        .to_string(),
                ));
            }
            *count += 1;
        }

        let updated = self
            .store
            .update_transaction_status(transaction_id, tx.status, Some(AUTH_CODE_PENDING))
            .await?;
        tracing::info!(transaction_id, "authorization code reset to sentinel");
        Ok(updated)
    }

    /// Local-fallback assignment: pops the first unused code from the
    /// pool (refilling it when dry) and resolves the transaction
    /// synchronously.
    pub async fn assign_local_code(&self, transaction_id: i64) -> Result<Transaction, AppError> {
        let otp = match self.store.next_unused_otp().await? {
            Some(otp) => otp,
            None => {
                let codes = generate_codes(POOL_REFILL_SIZE);
                tracing::info!(count = codes.len(), "otp pool exhausted, reseeding");
                self.store.seed_otps(&codes).await?;
                self.store
                    .next_unused_otp()
                    .await?
                    .ok_or_else(|| AppError::Internal("otp pool empty after reseed".to_string()))?
            }
        };

        self.store.mark_otp_used(otp.id).await?;
        let updated = self
            .store
            .update_transaction_status(transaction_id, TransactionStatus::Paid, Some(&otp.code))
            .await?;
        Ok(updated)
    }
}

/// Random 4-digit codes for the local pool.
pub fn generate_codes(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| rng.gen_range(1000..10000).to_string())
        .collect()
}
