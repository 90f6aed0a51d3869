use serde_json::Value;

use super::record::Fields;

/// Settings served when none have been stored yet, or no store exists.
pub fn default_settings() -> Fields {
    let mut settings = Fields::new();
    settings.insert("registration".to_string(), Value::Bool(true));
    settings.insert("maintenance".to_string(), Value::Bool(false));
    settings.insert("invoicing".to_string(), Value::Bool(true));
    settings
}
