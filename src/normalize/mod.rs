//! Normalization of loosely-shaped backend JSON into stable records.
//!
//! The upstream backend has grown several generations of field names for the
//! same data (`id` vs `key`, `call_sid` vs `CallSid`, snake_case vs
//! camelCase). Each submodule knows the candidate fields for one record kind
//! and reduces whatever the backend sends to a single canonical shape, so the
//! rest of the crate never touches raw payloads.
//!
//! Shared rules live here:
//! - a field is *present* when the key exists and its value is not null
//! - only scalars coerce to strings; arrays and objects never do
//! - empty strings are treated as missing wherever a field is optional

pub mod call;
pub mod conversation;
pub mod prompt;

pub use call::{categorize_calls, normalize_call, CallGroups, CallRecord};
pub use conversation::{extract_conversation_list, normalize_conversation, ConversationRecord};
pub use prompt::{extract_prompt_list, normalize_prompt, PromptRecord};

use serde_json::Value;

/// First candidate field that exists with a non-null value.
///
/// The value itself is returned untouched; callers decide how to interpret
/// it. Once a candidate is chosen, later candidates are not consulted even if
/// the chosen value turns out to be unusable.
pub(crate) fn first_present<'a>(record: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// Coerce a scalar JSON value to its string form.
///
/// Numbers and booleans stringify the way they appear in JSON. Null, arrays
/// and objects yield `None`: a record whose `id` is an object has no usable
/// identifier, and stringifying it would only smuggle garbage downstream.
pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// First candidate field that coerces to a non-empty string.
///
/// Unlike [`first_present`], unusable candidates fall through to the next
/// one: `{"id": "", "key": "k1"}` resolves to `"k1"`.
pub(crate) fn first_string(record: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|key| record.get(*key))
        .filter_map(coerce_string)
        .find(|text| !text.is_empty())
}

/// Optional string field: present, scalar and non-empty, or absent.
pub(crate) fn optional_string(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(coerce_string)
        .filter(|text| !text.is_empty())
}

/// JSON truthiness for flag fields that arrive as bools, numbers or strings.
///
/// `"false"` and `"0"` count as false even though they are non-empty: several
/// backend revisions serialized booleans through string formatting.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "false" && text != "0",
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_present_skips_null_candidates() {
        let record = json!({"id": null, "key": "k1"});
        assert_eq!(first_present(&record, &["id", "key"]), Some(&json!("k1")));
    }

    #[test]
    fn test_first_present_stops_at_first_non_null() {
        // An unusable-but-present candidate still wins over a later one.
        let record = json!({"start_time": "garbage", "startTime": "2024-01-01T00:00:00Z"});
        assert_eq!(
            first_present(&record, &["start_time", "startTime"]),
            Some(&json!("garbage"))
        );
    }

    #[test]
    fn test_first_present_missing() {
        let record = json!({"other": 1});
        assert_eq!(first_present(&record, &["id", "key"]), None);
    }

    #[test]
    fn test_coerce_string_scalars() {
        assert_eq!(coerce_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(coerce_string(&json!(42)), Some("42".to_string()));
        assert_eq!(coerce_string(&json!(true)), Some("true".to_string()));
    }

    #[test]
    fn test_coerce_string_rejects_containers_and_null() {
        assert_eq!(coerce_string(&json!(null)), None);
        assert_eq!(coerce_string(&json!([1, 2])), None);
        assert_eq!(coerce_string(&json!({"a": 1})), None);
    }

    #[test]
    fn test_first_string_falls_through_empty() {
        let record = json!({"id": "", "key": "k1"});
        assert_eq!(first_string(&record, &["id", "key"]), Some("k1".to_string()));
    }

    #[test]
    fn test_optional_string_empty_is_absent() {
        let record = json!({"created_at": ""});
        assert_eq!(optional_string(&record, "created_at"), None);
    }

    #[test]
    fn test_truthy_variants() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("yes")));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!("false")));
        assert!(!truthy(&json!("0")));
        assert!(!truthy(&json!(null)));
    }
}
