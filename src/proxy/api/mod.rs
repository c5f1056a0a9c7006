// View API module - normalized read endpoints for dashboard clients
//
// Everything under /api/view/ answers from the backend but through the
// normalization layer, so clients get stable record shapes no matter which
// backend revision is running. Writes and anything not covered here go
// through the transparent forwarder instead.
//
// All endpoints return JSON. Security: binds to 127.0.0.1 by default
// (localhost only).

mod calls;
mod conversations;
mod meta;
mod prompts;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::upstream::UpstreamError;

// Re-export endpoint handlers
pub use calls::get_call_groups;
pub use conversations::{get_conversation, list_conversations};
pub use meta::{get_gateway_info, get_health};
pub use prompts::{get_active_prompt, list_prompts};

/// Errors a view endpoint can answer with
pub enum ApiError {
    /// Upstream trouble of any kind: transport, bad status, undecodable body
    Upstream(UpstreamError),
    /// The requested entity does not exist or could not be read
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Upstream(err) => (StatusCode::BAD_GATEWAY, "Upstream error", err.to_string()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "Not found", message),
        };
        (
            status,
            Json(json!({ "error": error, "message": message })),
        )
            .into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}
