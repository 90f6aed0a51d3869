use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied fields of a record, kept as an open JSON object.
pub type Fields = Map<String, Value>;

/// A stored record: its identifier plus whatever fields it carries.
///
/// Serializes flat, as `{"id": ..., ...fields}`, which is both the wire shape
/// and the shape of each entry in the bookings fallback file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        // The key is the identifier; a stored copy under "id" must not shadow it.
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns a field's string value, if present and a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// ISO-8601 timestamp with millisecond precision, e.g. `2026-01-05T10:00:00.000Z`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
