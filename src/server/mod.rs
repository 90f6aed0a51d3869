//! HTTP API and realtime channel.
//!
//! # Endpoints
//!
//! - `GET /health`
//! - `GET|POST /api/bookings`, `PATCH /api/bookings/{id}`
//! - `GET|POST /api/fleet`, `PATCH|DELETE /api/fleet/{id}`
//! - `GET|PATCH /api/settings`
//! - `GET /api/users`
//! - `GET /ws`: WebSocket push of `booking_update`, `fleet_update` and
//!   `settings_update` events
//!
//! Anything else is served from the public directory, if one is given.

use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::store::StoreSelector;

pub mod bookings;
pub mod error;
pub mod fleet;
pub mod hub;
pub mod settings;
pub mod users;
pub mod ws;

pub use error::ApiError;
pub use hub::{ChangeEvent, ChangeHub, ChangeKind, ChangePayload, Channel};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<StoreSelector>,
    pub hub: Arc<ChangeHub>,
}

impl AppState {
    pub fn new(stores: StoreSelector) -> Self {
        Self {
            stores: Arc::new(stores),
            hub: Arc::new(ChangeHub::default()),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    mode: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        mode: if state.stores.has_primary() {
            "cloud"
        } else {
            "local"
        },
    })
}

/// Builds the application router.
pub fn router(state: AppState, public_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/api/bookings", get(bookings::list).post(bookings::create))
        .route("/api/bookings/{id}", patch(bookings::update_status))
        .route("/api/fleet", get(fleet::list).post(fleet::create))
        .route("/api/fleet/{id}", patch(fleet::update).delete(fleet::remove))
        .route("/api/settings", get(settings::get).patch(settings::update))
        .route("/api/users", get(users::list))
        .route("/ws", get(ws::handler));

    if let Some(dir) = public_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
