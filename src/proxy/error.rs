//! Forwarder error types and response handling

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::forward::CORS_HEADERS;

/// Errors that can occur while forwarding a request
#[derive(Debug, PartialEq)]
pub(crate) enum ProxyError {
    /// The backend path could not be determined from the request
    BadPath,
    /// The request to the upstream failed outright
    Upstream(String),
    /// Building the relay response failed
    ResponseBuild(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ProxyError::BadPath => (
                StatusCode::BAD_REQUEST,
                "Invalid request path",
                "Could not determine backend path".to_string(),
            ),
            ProxyError::Upstream(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Proxy error", message)
            }
            ProxyError::ResponseBuild(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Proxy error", message)
            }
        };

        tracing::error!("Forwarder error ({}): {}", status, message);

        (
            status,
            CORS_HEADERS,
            Json(json!({ "error": error, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    #[tokio::test]
    async fn test_bad_path_response_shape() {
        let response = ProxyError::BadPath.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"], "Invalid request path");
        assert_eq!(parsed["message"], "Could not determine backend path");
    }

    #[tokio::test]
    async fn test_upstream_error_is_500_with_message() {
        let response = ProxyError::Upstream("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"], "Proxy error");
        assert_eq!(parsed["message"], "connection refused");
    }
}
