//! Settings handlers. Settings are a singleton stored only in the primary store.

use axum::{extract::State, Json};

use super::{error::ApiError, hub::ChangeEvent, AppState};
use crate::models::Fields;

/// `GET /api/settings`
pub async fn get(State(state): State<AppState>) -> Result<Json<Fields>, ApiError> {
    let settings = state
        .stores
        .read_settings()
        .await
        .map_err(ApiError::store("Failed to fetch settings"))?;
    Ok(Json(settings))
}

/// `PATCH /api/settings`
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<Fields>,
) -> Result<Json<Fields>, ApiError> {
    let settings = state
        .stores
        .merge_settings(body)
        .await
        .map_err(ApiError::store("Failed to update settings"))?;

    state.hub.publish(ChangeEvent::settings(settings.clone()));

    Ok(Json(settings))
}
