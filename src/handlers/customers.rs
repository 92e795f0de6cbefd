use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::mirror;
use crate::validation::{sanitize_string, validate_phone, validate_vehicle_number};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub phone: String,
    pub vehicle_number: Option<String>,
}

/// Customer login by phone. The ledger is consulted first so a customer
/// registered on another station instance is recognized; a genuinely new
/// customer is created locally and mirrored out.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate_phone(&payload.phone)?;
    if let Some(vehicle) = &payload.vehicle_number {
        validate_vehicle_number(vehicle)?;
    }
    let phone = sanitize_string(&payload.phone);

    let mut known_to_ledger = false;
    let mut ledger_vehicle = None;
    if let Some(ledger) = &state.ledger {
        match ledger.fetch_customers(Some(&phone)).await {
            Ok(rows) if !rows.is_empty() => {
                known_to_ledger = true;
                ledger_vehicle = rows[0].vehicle_number.clone();
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "ledger customer lookup failed, using local data");
            }
        }
    }

    let vehicle = payload
        .vehicle_number
        .filter(|v| !v.is_empty())
        .or(ledger_vehicle);
    let customer = state
        .store
        .get_or_create_customer(&phone, vehicle.as_deref())
        .await?;

    if !known_to_ledger {
        mirror::spawn_customer_mirror(state.ledger.clone(), customer.clone());
    }

    Ok(Json(customer))
}

pub async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let customers = state.store.list_customers().await?;
    Ok(Json(customers))
}
