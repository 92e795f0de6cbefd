//! Fire-and-forget mirror writes to the External Ledger.
//!
//! The local store stays authoritative: a mirror failure is logged and
//! never surfaced to the payer, and the write never blocks the response
//! that triggered it.

use serde_json::json;

use crate::domain::{Customer, Transaction};
use crate::ledger::{LedgerClient, LedgerError};

pub async fn mirror_customer(ledger: &LedgerClient, customer: &Customer) -> Result<(), LedgerError> {
    let data = json!({
        "id": customer.id,
        "phone": customer.phone,
        "vehicleNumber": customer.vehicle_number.clone().unwrap_or_default(),
        "createdAt": customer.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    });
    ledger.append("customer", data).await
}

pub async fn mirror_transaction(
    ledger: &LedgerClient,
    tx: &Transaction,
) -> Result<(), LedgerError> {
    let data = json!({
        "id": tx.id,
        "customerId": tx.customer_id,
        "originalAmount": tx.original_amount.to_string(),
        "discountAmount": tx.discount_amount.to_string(),
        "finalAmount": tx.final_amount.to_string(),
        "savings": tx.savings.to_string(),
        "paymentMethod": tx.payment_method.as_str(),
        "authCode": tx.auth_code,
        "status": tx.status.as_str(),
        "createdAt": tx.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        "timestampStr": tx.timestamp_str,
    });
    ledger.append("transaction", data).await
}

/// Spawns a mirror write for a freshly created transaction.
pub fn spawn_transaction_mirror(ledger: Option<LedgerClient>, tx: Transaction) {
    if let Some(ledger) = ledger {
        tokio::spawn(async move {
            if let Err(err) = mirror_transaction(&ledger, &tx).await {
                tracing::warn!(transaction_id = tx.id, error = %err, "transaction mirror write failed");
            }
        });
    }
}

/// Spawns a mirror write for a newly registered customer.
pub fn spawn_customer_mirror(ledger: Option<LedgerClient>, customer: Customer) {
    if let Some(ledger) = ledger {
        tokio::spawn(async move {
            if let Err(err) = mirror_customer(&ledger, &customer).await {
                tracing::warn!(customer_id = customer.id, error = %err, "customer mirror write failed");
            }
        });
    }
}
