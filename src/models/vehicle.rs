use chrono::{DateTime, Utc};
use serde_json::Value;

use super::record::{timestamp, Fields};

/// Builds the stored fields of a new fleet vehicle.
pub fn prepare_vehicle(mut body: Fields, now: DateTime<Utc>) -> Fields {
    body.remove("id");
    body.insert("createdAt".to_string(), Value::String(timestamp(now)));
    body
}

/// Any field of a vehicle may be patched except its identifier.
pub fn vehicle_patch(mut body: Fields) -> Fields {
    body.remove("id");
    body
}
