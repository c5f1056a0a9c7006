//! Conversation views

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::normalize::{extract_conversation_list, normalize_conversation, ConversationRecord};
use crate::proxy::GatewayState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct ConversationListQuery {
    /// Restrict results to one organization
    pub organization_id: Option<String>,
    /// Maximum number of conversations to return
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationDetailQuery {
    pub organization_id: Option<String>,
}

/// GET /api/view/conversations - recent conversations, normalized.
pub async fn list_conversations(
    State(state): State<GatewayState>,
    Query(params): Query<ConversationListQuery>,
) -> Result<Json<Vec<ConversationRecord>>, ApiError> {
    let payload = state
        .upstream
        .get_json(
            "/api/conversations",
            &[
                ("organization_id", params.organization_id),
                ("limit", params.limit.map(|n| n.to_string())),
            ],
        )
        .await?;
    let conversations = payload
        .as_ref()
        .map(extract_conversation_list)
        .unwrap_or_default();
    Ok(Json(conversations))
}

/// GET /api/view/conversations/:id - one conversation with its transcript.
///
/// A payload that does not normalize into a conversation answers as 404;
/// from the caller's point of view the record does not exist.
pub async fn get_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Query(params): Query<ConversationDetailQuery>,
) -> Result<Json<ConversationRecord>, ApiError> {
    let payload = state
        .upstream
        .get_json(
            &format!("/api/conversations/{}", id),
            &[("organization_id", params.organization_id)],
        )
        .await?;
    payload
        .as_ref()
        .and_then(normalize_conversation)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("conversation {} not found", id)))
}
