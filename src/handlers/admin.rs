use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::error::AppError;
use crate::services::mirror;
use crate::AppState;

/// Re-mirrors every customer and transaction to the External Ledger.
/// Per-record failures are logged and skipped; the sync keeps going.
pub async fn sync_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let ledger = state.ledger.clone().ok_or_else(|| {
        AppError::Validation("no external ledger configured".to_string())
    })?;

    let customers = state.store.list_customers().await?;
    let transactions = state.store.list_transactions(None).await?;

    let mut synced_customers = 0usize;
    for customer in &customers {
        match mirror::mirror_customer(&ledger, customer).await {
            Ok(()) => synced_customers += 1,
            Err(err) => {
                tracing::warn!(customer_id = customer.id, error = %err, "customer sync failed")
            }
        }
    }

    let mut synced_transactions = 0usize;
    for tx in &transactions {
        match mirror::mirror_transaction(&ledger, tx).await {
            Ok(()) => synced_transactions += 1,
            Err(err) => {
                tracing::warn!(transaction_id = tx.id, error = %err, "transaction sync failed")
            }
        }
    }

    tracing::info!(synced_customers, synced_transactions, "manual ledger sync finished");
    Ok(Json(json!({
        "message": "Sync completed",
        "customers": synced_customers,
        "transactions": synced_transactions,
    })))
}
