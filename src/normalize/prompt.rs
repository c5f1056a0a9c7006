//! System prompt records.
//!
//! Prompt payloads are the least consistent in the backend: single objects,
//! bare arrays, and `{prompts: [...]}` / `{data: [...]}` wrappers all occur
//! depending on which endpoint and backend revision answered.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{first_string, optional_string, truthy};

/// Candidate fields for the prompt identifier, in priority order.
const ID_FIELDS: &[&str] = &["id", "key"];
/// Candidate fields for the display name.
const NAME_FIELDS: &[&str] = &["name", "key"];
/// Flags that have meant "this prompt is the active one" across revisions.
/// A record is active when any present flag is truthy.
const ACTIVE_FLAGS: &[&str] = &["is_active", "isDefault", "is_active_prompt", "is_default"];

const UNTITLED_PROMPT: &str = "Untitled Prompt";

/// A system prompt in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Stable identifier, never empty
    pub id: String,
    /// Display name, falls back to "Untitled Prompt"
    pub name: String,
    /// Prompt text, empty string when the backend sent none
    pub prompt: String,
    /// Greeting played at call start, absent when unset or empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    /// Whether this prompt is currently active
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Reduce one raw payload to a [`PromptRecord`].
///
/// Returns `None` for non-objects and for records where no non-empty
/// identifier can be derived; everything else gets defaults for the missing
/// pieces.
pub fn normalize_prompt(raw: &Value) -> Option<PromptRecord> {
    if !raw.is_object() {
        return None;
    }
    let id = first_string(raw, ID_FIELDS)?;

    let is_active = ACTIVE_FLAGS
        .iter()
        .filter_map(|key| raw.get(*key))
        .filter(|value| !value.is_null())
        .any(truthy);

    Some(PromptRecord {
        id,
        name: first_string(raw, NAME_FIELDS).unwrap_or_else(|| UNTITLED_PROMPT.to_string()),
        prompt: optional_string(raw, "prompt").unwrap_or_default(),
        welcome_message: optional_string(raw, "welcome_message"),
        is_active,
        created_at: optional_string(raw, "created_at"),
        updated_at: optional_string(raw, "updated_at"),
    })
}

/// Extract a list of prompts from any of the known payload shapes.
///
/// Tried in order: a bare array, a single prompt object, a `prompts` array
/// wrapper, a `data` array wrapper. Entries that do not normalize are
/// dropped; unrecognized shapes yield an empty list rather than an error.
pub fn extract_prompt_list(payload: &Value) -> Vec<PromptRecord> {
    match payload {
        Value::Array(items) => items.iter().filter_map(normalize_prompt).collect(),
        Value::Object(map) => {
            // A derivable id means the payload IS a prompt, not a wrapper.
            if first_string(payload, ID_FIELDS).is_some() {
                return normalize_prompt(payload).into_iter().collect();
            }
            if let Some(Value::Array(items)) = map.get("prompts") {
                return items.iter().filter_map(normalize_prompt).collect();
            }
            if let Some(Value::Array(items)) = map.get("data") {
                return items.iter().filter_map(normalize_prompt).collect();
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}
