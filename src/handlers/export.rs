use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::Transaction;
use crate::error::AppError;
use crate::AppState;

/// Query parameters for the export endpoint
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Export format: "csv" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

/// CSV row representation - amounts as strings to keep fixed-point text
#[derive(Serialize)]
struct TransactionCsvRow {
    id: i64,
    customer_id: String,
    original_amount: String,
    discount_amount: String,
    final_amount: String,
    savings: String,
    payment_method: String,
    auth_code: String,
    status: String,
    created_at: String,
}

impl From<&Transaction> for TransactionCsvRow {
    fn from(tx: &Transaction) -> Self {
        TransactionCsvRow {
            id: tx.id,
            customer_id: tx
                .customer_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            original_amount: tx.original_amount.to_string(),
            discount_amount: tx.discount_amount.to_string(),
            final_amount: tx.final_amount.to_string(),
            savings: tx.savings.to_string(),
            payment_method: tx.payment_method.as_str().to_string(),
            auth_code: tx.auth_code.clone(),
            status: tx.status.as_str().to_string(),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

pub async fn export_transactions(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let transactions = state.store.list_transactions(None).await?;

    match query.format.as_str() {
        "json" => Ok(Json(transactions).into_response()),
        "csv" => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for tx in &transactions {
                writer
                    .serialize(TransactionCsvRow::from(tx))
                    .map_err(|e| AppError::Internal(e.to_string()))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| AppError::Internal(e.to_string()))?;

            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"transactions.csv\"",
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        other => Err(AppError::Validation(format!(
            "unsupported export format: {}",
            other
        ))),
    }
}
