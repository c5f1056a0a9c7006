//! Conversation records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{first_string, optional_string};

/// Candidate fields for the conversation identifier, in priority order.
const ID_FIELDS: &[&str] = &["id", "conversation_id", "conversationId"];

/// A conversation in canonical form.
///
/// `lead_data` is whatever structured data the assistant collected during the
/// call; it passes through untouched as long as it is a JSON object.
/// `transcript` is only populated on the detail endpoint and is relayed
/// verbatim, whatever shape the backend stores it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Stable identifier, never empty
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<Value>,
}

/// Reduce one raw payload to a [`ConversationRecord`].
///
/// Returns `None` for non-objects and for records with no derivable
/// identifier.
pub fn normalize_conversation(raw: &Value) -> Option<ConversationRecord> {
    if !raw.is_object() {
        return None;
    }
    let id = first_string(raw, ID_FIELDS)?;

    Some(ConversationRecord {
        id,
        call_sid: optional_string(raw, "call_sid"),
        lead_status: optional_string(raw, "lead_status"),
        created_at: optional_string(raw, "created_at"),
        updated_at: optional_string(raw, "updated_at"),
        lead_data: raw.get("lead_data").and_then(Value::as_object).cloned(),
        transcript: raw.get("transcript").filter(|v| !v.is_null()).cloned(),
    })
}

/// Extract a list of conversations from the known payload shapes.
///
/// Only a bare array or a `{conversations: [...]}` wrapper is recognized;
/// anything else yields an empty list. Narrower than the prompt extractor on
/// purpose: the conversations endpoint never returned single objects or
/// `data` wrappers.
pub fn extract_conversation_list(payload: &Value) -> Vec<ConversationRecord> {
    match payload {
        Value::Array(items) => items.iter().filter_map(normalize_conversation).collect(),
        Value::Object(map) => match map.get("conversations") {
            Some(Value::Array(items)) => {
                items.iter().filter_map(normalize_conversation).collect()
            }
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
