//! Payload pre-steps
//!
//! Some destinations expect the members of a nested attributes object to be
//! mapped as if they were top-level fields. That reshaping happens here,
//! before evaluation, so evaluation itself never rewrites its input.

use super::types::Object;
use serde_json::Value;

/// Copy `payload` and spread the members of the object under `key` over it
///
/// Nested members win over top-level fields with the same name. The nested
/// object itself stays in place. Nothing changes when `key` is missing or
/// does not hold an object.
pub fn spread_nested_object(payload: &Object, key: &str) -> Object {
    let mut spread = payload.clone();
    if let Some(Value::Object(nested)) = payload.get(key) {
        for (name, value) in nested {
            spread.insert(name.clone(), value.clone());
        }
    }
    spread
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_spread_overrides_top_level() {
        let payload = object(json!({"id": 1, "name": "top", "attributes": {"name": "nested", "plan": "pro"}}));
        let spread = spread_nested_object(&payload, "attributes");
        assert_eq!(
            Value::Object(spread),
            json!({"id": 1, "name": "nested", "attributes": {"name": "nested", "plan": "pro"}, "plan": "pro"})
        );
        assert_eq!(payload["name"], json!("top"));
    }

    #[test]
    fn test_spread_ignores_missing_and_non_objects() {
        let payload = object(json!({"attributes": [1, 2]}));
        assert_eq!(spread_nested_object(&payload, "attributes"), payload);
        assert_eq!(spread_nested_object(&payload, "other"), payload);
    }
}
