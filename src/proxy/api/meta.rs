//! Health relay and gateway info

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::config::VERSION;
use crate::proxy::GatewayState;

use super::ApiError;

/// GET /api/view/health - backend health, relayed as-is.
pub async fn get_health(State(state): State<GatewayState>) -> Result<Json<Value>, ApiError> {
    let payload = state.upstream.get_json("/health", &[]).await?;
    Ok(Json(payload.unwrap_or(Value::Null)))
}

/// What a dashboard client needs to know to reach the rest of the system.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayInfo {
    /// Backend base URL requests are forwarded to
    pub upstream_url: String,
    /// WebSocket endpoint for live call audio status
    pub ws_url: String,
    /// Gateway version
    pub version: &'static str,
}

/// GET /api/view/config - connection info for dashboard clients.
pub async fn get_gateway_info(State(state): State<GatewayState>) -> Json<GatewayInfo> {
    Json(GatewayInfo {
        upstream_url: state.config.upstream_url.clone(),
        ws_url: state.config.ws_url.clone(),
        version: VERSION,
    })
}
