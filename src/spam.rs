use std::collections::BTreeMap;

use serde_json::Value;

/// Check if the honeypot field is filled. Returns true if spam detected.
/// The field lives in the form's extras: legitimate browsers leave the
/// hidden input empty or omit it entirely.
pub fn is_spam(extras: &BTreeMap<String, Value>, honeypot_field: Option<&str>) -> bool {
    let Some(field) = honeypot_field else {
        return false;
    };

    if field.is_empty() {
        return false;
    }

    match extras.get(field) {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}
