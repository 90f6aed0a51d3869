//! User handlers.

use axum::{extract::State, Json};

use super::AppState;
use crate::models::Record;

/// `GET /api/users`: read-only, empty unless the primary store answers.
pub async fn list(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.stores.list_users().await)
}
