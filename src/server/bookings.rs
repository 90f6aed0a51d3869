//! Booking handlers.
//!
//! Bookings are the only collection that survives a primary outage: reads and
//! writes fall back to the local bookings file.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::{error::ApiError, hub::{ChangeEvent, Channel}, AppState};
use crate::models::{prepare_booking, status_patch, Fields, Record};

/// `GET /api/bookings`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    let bookings = state
        .stores
        .list_bookings()
        .await
        .map_err(ApiError::store("Failed to fetch bookings"))?;
    Ok(Json(bookings))
}

/// `POST /api/bookings`
///
/// `photos` holds filenames already stored by the upload endpoint.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Fields>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let fields = prepare_booking(body, Utc::now());
    let booking = state
        .stores
        .create_booking(fields)
        .await
        .map_err(ApiError::store("Failed to create booking"))?;

    tracing::info!("Created booking {}", booking.id);
    state
        .hub
        .publish(ChangeEvent::created(Channel::Bookings, booking.clone()));

    Ok((StatusCode::CREATED, Json(booking)))
}

/// `PATCH /api/bookings/{id}`: only `status` is applied.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Fields>,
) -> Result<Json<Record>, ApiError> {
    let patch = status_patch(&body).ok_or(ApiError::BadRequest("status must be a string"))?;
    let booking = state
        .stores
        .patch_booking(&id, patch)
        .await
        .map_err(ApiError::store("Failed to update booking"))?
        .ok_or(ApiError::NotFound("Booking not found"))?;

    state
        .hub
        .publish(ChangeEvent::updated(Channel::Bookings, booking.clone()));

    Ok(Json(booking))
}
