//! Transparent request forwarder
//!
//! Relays anything under `/api/proxy/...` to the backend unchanged: method,
//! query string and body pass through, and the response keeps the status the
//! backend chose. Browsers only ever talk to the gateway origin, so every
//! response carries a permissive CORS header set and OPTIONS preflights are
//! answered locally without bothering the backend.

use axum::body::{to_bytes, Body};
use axum::extract::{Path, State};
use axum::http::{header, Method, Request, Response, StatusCode};
use bytes::Bytes;
use serde_json::Value;

use super::error::ProxyError;
use super::state::GatewayState;

/// CORS headers attached to every forwarder response.
pub(super) const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

/// Handler mounted at `/api/proxy` and `/api/proxy/*path` for every method.
pub(crate) async fn forward_request(
    State(state): State<GatewayState>,
    path: Option<Path<String>>,
    request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = request.headers().clone();

    // Preflights are answered here; the backend never sees them.
    if method == Method::OPTIONS {
        return cors_preflight();
    }

    let backend_path = resolve_backend_path(path.map(|Path(p)| p), uri.path())?;
    let forward_url = build_forward_url(&state.config.upstream_url, &backend_path, uri.query());

    tracing::debug!("Forwarding {} {} -> {}", method, uri.path(), forward_url);

    let mut upstream_request = state.client.request(method.clone(), &forward_url);
    for (name, value) in headers.iter() {
        if !should_forward_header(name.as_str()) {
            continue;
        }
        if let Ok(value) = value.to_str() {
            upstream_request = upstream_request.header(name.as_str(), value);
        }
    }
    // The backend speaks JSON only; whatever content type the caller sent
    // is replaced rather than relayed.
    upstream_request = upstream_request.header(header::CONTENT_TYPE, "application/json");

    if method != Method::GET && method != Method::DELETE {
        // An unreadable body forwards the same as an empty one.
        if let Ok(bytes) = to_bytes(request.into_body(), usize::MAX).await {
            if !bytes.is_empty() {
                upstream_request = upstream_request.body(bytes);
            }
        }
    }

    let upstream_response = upstream_request.send().await.map_err(|e| {
        tracing::error!("Failed to reach upstream at {}: {}", forward_url, e);
        ProxyError::Upstream(e.to_string())
    })?;

    relay_response(upstream_response).await
}

/// Relay an upstream response: status verbatim, JSON re-serialized when the
/// upstream says JSON, everything else passed through as opaque bytes.
async fn relay_response(upstream: reqwest::Response) -> Result<Response<Body>, ProxyError> {
    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = upstream
        .bytes()
        .await
        .map_err(|e| ProxyError::Upstream(e.to_string()))?;

    let body = if content_type.contains("application/json") {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Bytes::from(
                serde_json::to_vec(&value).map_err(|e| ProxyError::ResponseBuild(e.to_string()))?,
            ),
            // Claimed JSON but is not; relay the bytes untouched.
            Err(_) => body,
        }
    } else {
        body
    };

    let reply_content_type = if content_type.is_empty() {
        "application/json"
    } else {
        content_type.as_str()
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder
        .header(header::CONTENT_TYPE, reply_content_type)
        .body(Body::from(body))
        .map_err(|e| ProxyError::ResponseBuild(e.to_string()))
}

/// 204 answer for OPTIONS preflights, CORS headers only.
fn cors_preflight() -> Result<Response<Body>, ProxyError> {
    let mut builder = Response::builder().status(StatusCode::NO_CONTENT);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::empty())
        .map_err(|e| ProxyError::ResponseBuild(e.to_string()))
}

/// Backend path: the captured wildcard when present, otherwise the request
/// path with the `/api/proxy` mount stripped. A request matching neither has
/// no meaningful destination.
fn resolve_backend_path(captured: Option<String>, uri_path: &str) -> Result<String, ProxyError> {
    if let Some(path) = captured {
        if !path.is_empty() {
            return Ok(path);
        }
    }
    uri_path
        .strip_prefix("/api/proxy")
        .map(|rest| rest.trim_start_matches('/').to_string())
        .ok_or(ProxyError::BadPath)
}

/// Outbound URL from the backend base, the relative path and the original
/// query string. An empty path targets the backend root.
fn build_forward_url(base: &str, path: &str, query: Option<&str>) -> String {
    let base = base.trim_end_matches('/');
    let mut url = if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    };
    if let Some(query) = query {
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
    }
    url
}

/// Hop-scoped headers stay behind; content-type is replaced wholesale.
/// Header names from the http crate are already lowercase.
fn should_forward_header(name: &str) -> bool {
    !matches!(name, "host" | "content-length" | "content-type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> GatewayState {
        GatewayState::new(reqwest::Client::new(), Config::default())
    }

    #[test]
    fn test_build_forward_url_joins_path_and_query() {
        assert_eq!(
            build_forward_url("http://localhost:8000", "api/conversations", Some("limit=5")),
            "http://localhost:8000/api/conversations?limit=5"
        );
    }

    #[test]
    fn test_build_forward_url_strips_trailing_slash() {
        assert_eq!(
            build_forward_url("http://localhost:8000/", "health", None),
            "http://localhost:8000/health"
        );
    }

    #[test]
    fn test_build_forward_url_without_path() {
        assert_eq!(build_forward_url("http://b:8000", "", None), "http://b:8000");
        assert_eq!(
            build_forward_url("http://b:8000", "", Some("a=1")),
            "http://b:8000?a=1"
        );
    }

    #[test]
    fn test_build_forward_url_ignores_empty_query() {
        assert_eq!(build_forward_url("http://b:8000", "x", Some("")), "http://b:8000/x");
    }

    #[test]
    fn test_resolve_backend_path() {
        assert_eq!(
            resolve_backend_path(Some("api/health".to_string()), "/api/proxy/api/health").unwrap(),
            "api/health"
        );
        assert_eq!(resolve_backend_path(None, "/api/proxy").unwrap(), "");
        assert_eq!(resolve_backend_path(None, "/api/proxy/foo/bar").unwrap(), "foo/bar");
        assert_eq!(resolve_backend_path(Some(String::new()), "/api/proxy/").unwrap(), "");
        assert_eq!(resolve_backend_path(None, "/elsewhere"), Err(ProxyError::BadPath));
    }

    #[test]
    fn test_should_forward_header() {
        assert!(!should_forward_header("host"));
        assert!(!should_forward_header("content-length"));
        assert!(!should_forward_header("content-type"));
        assert!(should_forward_header("authorization"));
        assert!(should_forward_header("accept"));
        assert!(should_forward_header("x-request-id"));
    }

    #[tokio::test]
    async fn test_options_preflight_is_answered_locally() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/proxy/api/conversations")
            .body(Body::empty())
            .unwrap();
        let response = forward_request(
            State(test_state()),
            Some(Path("api/conversations".to_string())),
            request,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            response.headers().get("access-control-allow-methods").unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            response.headers().get("access-control-allow-headers").unwrap(),
            "Content-Type, Authorization"
        );
        assert!(response.headers().get("content-type").is_none());
    }

    #[tokio::test]
    async fn test_unmatched_path_is_rejected() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/elsewhere")
            .body(Body::empty())
            .unwrap();
        let err = forward_request(State(test_state()), None, request)
            .await
            .unwrap_err();
        assert_eq!(err, ProxyError::BadPath);
    }
}
