//! Shaping of booking payloads before they reach a store.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::record::{timestamp, Fields};

/// Status every booking starts with.
pub const PENDING_CONFIRMATION: &str = "Pending Confirmation";

/// Builds the stored fields of a new booking from the request body.
///
/// Caller fields are kept, then `photos`, `status` and `createdAt` are
/// overwritten. A caller-supplied `id` is discarded since identifiers are
/// assigned by the store.
pub fn prepare_booking(mut body: Fields, now: DateTime<Utc>) -> Fields {
    body.remove("id");

    let photos: Vec<Value> = match body.remove("photos") {
        Some(Value::Array(items)) => items.into_iter().filter(Value::is_string).collect(),
        Some(Value::String(name)) => vec![Value::String(name)],
        _ => Vec::new(),
    };

    body.insert("photos".to_string(), Value::Array(photos));
    body.insert(
        "status".to_string(),
        Value::String(PENDING_CONFIRMATION.to_string()),
    );
    body.insert("createdAt".to_string(), Value::String(timestamp(now)));
    body
}

/// Extracts the status-only patch from a request body.
///
/// Returns `None` when `status` is missing or not a string.
pub fn status_patch(body: &Fields) -> Option<Fields> {
    let status = body.get("status")?.as_str()?;
    let mut patch = Fields::new();
    patch.insert("status".to_string(), Value::String(status.to_string()));
    Some(patch)
}
