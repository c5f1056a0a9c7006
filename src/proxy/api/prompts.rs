//! System prompt views

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::normalize::{extract_prompt_list, normalize_prompt, PromptRecord};
use crate::proxy::GatewayState;
use crate::upstream::UpstreamError;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    /// Restrict results to one organization
    pub organization_id: Option<String>,
}

/// GET /api/view/prompts - every configured prompt, normalized.
pub async fn list_prompts(
    State(state): State<GatewayState>,
    Query(params): Query<PromptQuery>,
) -> Result<Json<Vec<PromptRecord>>, ApiError> {
    let payload = state
        .upstream
        .get_json(
            "/api/system-prompt/list",
            &[("organization_id", params.organization_id)],
        )
        .await?;
    let prompts = payload.as_ref().map(extract_prompt_list).unwrap_or_default();
    Ok(Json(prompts))
}

/// GET /api/view/prompts/active - the currently active prompt.
///
/// A backend 404 means no prompt is active right now; that answers as JSON
/// null rather than an error.
pub async fn get_active_prompt(
    State(state): State<GatewayState>,
    Query(params): Query<PromptQuery>,
) -> Result<Json<Option<PromptRecord>>, ApiError> {
    let payload = match state
        .upstream
        .get_json(
            "/api/system-prompt",
            &[("organization_id", params.organization_id)],
        )
        .await
    {
        Ok(payload) => payload,
        Err(UpstreamError::Status { status: 404, .. }) => None,
        Err(err) => return Err(err.into()),
    };
    Ok(Json(payload.as_ref().and_then(normalize_prompt)))
}
