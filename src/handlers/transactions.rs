use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{NewTransaction, TransactionStatus, AUTH_CODE_PENDING};
use crate::error::AppError;
use crate::pricing;
use crate::services::mirror;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CalculatePayload {
    pub amount: BigDecimal,
}

pub async fn calculate(
    State(state): State<AppState>,
    Json(payload): Json<CalculatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.store.get_settings().await?;
    let quote = pricing::quote(&payload.amount, &settings)?;
    Ok(Json(quote))
}

fn validate_amounts(input: &NewTransaction) -> Result<(), AppError> {
    let zero = BigDecimal::from(0);
    if input.original_amount < zero || input.discount_amount < zero || input.final_amount < zero {
        return Err(AppError::Validation(
            "amounts must be non-negative".to_string(),
        ));
    }
    let original = input.original_amount.with_scale(2);
    let discount = input.discount_amount.with_scale(2);
    let final_amount = input.final_amount.with_scale(2);
    if &final_amount + &discount != original {
        return Err(AppError::Validation(
            "finalAmount + discountAmount must equal originalAmount".to_string(),
        ));
    }
    if input.savings.with_scale(2) != discount {
        return Err(AppError::Validation(
            "savings must equal discountAmount".to_string(),
        ));
    }
    Ok(())
}

/// Records a paid transaction. With a ledger configured the record is
/// mirrored out asynchronously and the code arrives later via polling;
/// in local-fallback mode a pool code is assigned before responding.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewTransaction>,
) -> Result<impl IntoResponse, AppError> {
    validate_amounts(&input)?;

    let tx = state.store.create_transaction(input).await?;
    tracing::info!(transaction_id = tx.id, customer_id = ?tx.customer_id, "transaction created");

    let tx = if state.reconciliation.is_local_mode() {
        state.reconciliation.assign_local_code(tx.id).await?
    } else {
        mirror::spawn_transaction_mirror(state.ledger.clone(), tx.clone());
        tx
    };

    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn otp_poll(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let auth_code = state.reconciliation.poll_auth_code(id).await?;
    Ok(Json(json!({ "authCode": auth_code })))
}

pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.reconciliation.reset_auth_code(id).await?;
    Ok(Json(json!({
        "message": "Transaction reset",
        "authCode": AUTH_CODE_PENDING,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPayload {
    pub auth_code: String,
}

/// Marks a transaction verified when the presented code matches the
/// resolved one.
pub async fn verify(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<VerifyPayload>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.store.get_transaction(id).await?;
    if !tx.is_resolved() {
        return Err(AppError::Validation(
            "transaction has no authorization code yet".to_string(),
        ));
    }
    if tx.auth_code != payload.auth_code {
        return Err(AppError::Validation(
            "authorization code does not match".to_string(),
        ));
    }

    let updated = state
        .store
        .update_transaction_status(id, TransactionStatus::Verified, None)
        .await?;
    Ok(Json(json!({ "success": true, "authCode": updated.auth_code })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub customer_id: Option<i64>,
    pub today: Option<bool>,
}

/// Lists transactions newest-first. With a customer filter and a
/// configured ledger, a non-empty mirrored copy is preferred over the
/// local set; the local store remains authoritative otherwise.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let today_only = query.today.unwrap_or(false);

    if !today_only {
        if let (Some(customer_id), Some(ledger)) = (query.customer_id, &state.ledger) {
            match ledger.fetch_transactions(customer_id).await {
                Ok(rows) if !rows.is_empty() => return Ok(Json(rows).into_response()),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(customer_id, error = %err, "ledger transaction lookup failed, using local data");
                }
            }
        }
    }

    let mut transactions = state.store.list_transactions(query.customer_id).await?;
    if today_only {
        let today = Utc::now().date_naive();
        transactions.retain(|tx| tx.created_at.date_naive() == today);
    }
    Ok(Json(transactions).into_response())
}
