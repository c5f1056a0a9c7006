//! Call status views

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::normalize::{categorize_calls, CallGroups};
use crate::proxy::GatewayState;

use super::ApiError;

/// How many recent calls the summary endpoint returns by default.
const DEFAULT_CALL_LIMIT: u32 = 15;

#[derive(Debug, Deserialize)]
pub struct CallStatusQuery {
    pub limit: Option<u32>,
}

/// GET /api/view/calls - current calls grouped by status.
///
/// The summary endpoint usually answers pre-grouped as
/// `{ongoing, completed, declined, others}`; older backend revisions send
/// flat payloads that need the categorization cascade instead.
pub async fn get_call_groups(
    State(state): State<GatewayState>,
    Query(params): Query<CallStatusQuery>,
) -> Result<Json<CallGroups>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_CALL_LIMIT);
    let payload = state
        .upstream
        .get_json(
            "/api/twilio/call-status/summary",
            &[("limit", Some(limit.to_string()))],
        )
        .await?;

    let groups = match &payload {
        Some(value) => {
            CallGroups::from_summary(value).unwrap_or_else(|| categorize_calls(value))
        }
        None => CallGroups::default(),
    };
    Ok(Json(groups))
}
