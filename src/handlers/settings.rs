use axum::{extract::State, response::IntoResponse, Json};

use crate::domain::SettingsPatch;
use crate::error::AppError;
use crate::AppState;

pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = state.store.get_settings().await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.store.update_settings(patch).await?;
    tracing::info!(
        fuel_price = %settings.fuel_price,
        discount_per_liter = %settings.discount_per_liter,
        "pricing settings updated"
    );
    Ok(Json(settings))
}
