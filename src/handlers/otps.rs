use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::error::AppError;
use crate::services::reconciliation::generate_codes;
use crate::AppState;

/// Reseeds the local OTP pool with freshly generated codes.
pub async fn refresh(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let codes = generate_codes(2);
    state.store.seed_otps(&codes).await?;
    Ok(Json(json!({ "message": "OTPs refreshed" })))
}
