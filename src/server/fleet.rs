//! Fleet handlers. The fleet only exists in the primary store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;

use super::{error::ApiError, hub::{ChangeEvent, Channel}, AppState};
use crate::models::{prepare_vehicle, vehicle_patch, Fields, Record};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    success: bool,
}

/// `GET /api/fleet`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    let fleet = state
        .stores
        .list_fleet()
        .await
        .map_err(ApiError::store("Failed to fetch fleet"))?;
    Ok(Json(fleet))
}

/// `POST /api/fleet`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Fields>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let vehicle = state
        .stores
        .create_vehicle(prepare_vehicle(body, Utc::now()))
        .await
        .map_err(ApiError::store("Failed to create vehicle"))?;

    state
        .hub
        .publish(ChangeEvent::created(Channel::Fleet, vehicle.clone()));

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// `PATCH /api/fleet/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Fields>,
) -> Result<Json<Record>, ApiError> {
    let vehicle = state
        .stores
        .patch_vehicle(&id, vehicle_patch(body))
        .await
        .map_err(ApiError::store("Failed to update vehicle"))?
        .ok_or(ApiError::NotFound("Vehicle not found"))?;

    state
        .hub
        .publish(ChangeEvent::updated(Channel::Fleet, vehicle.clone()));

    Ok(Json(vehicle))
}

/// `DELETE /api/fleet/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state
        .stores
        .remove_vehicle(&id)
        .await
        .map_err(ApiError::store("Failed to delete vehicle"))?;
    if !removed {
        return Err(ApiError::NotFound("Vehicle not found"));
    }

    tracing::info!("Removed vehicle {}", id);
    state.hub.publish(ChangeEvent::deleted(Channel::Fleet, id));

    Ok(Json(DeleteResponse { success: true }))
}
