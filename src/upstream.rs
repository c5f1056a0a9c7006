//! Typed JSON client for the voice-assistant backend.
//!
//! The view endpoints go through this instead of the raw forwarder so that
//! upstream quirks are handled once: no-content statuses, error bodies with a
//! `message` field, HTML error pages served where JSON was expected, and
//! JSON served with a text content-type.

use std::fmt;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;

use crate::normalize::coerce_string;

/// Upstream error detail is capped at this many characters when relayed.
const DETAIL_LIMIT: usize = 500;

/// Shared client bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug)]
pub enum UpstreamError {
    /// Request never completed (connection refused, reset, timeout)
    Transport(String),
    /// Upstream answered with a non-success status
    Status { status: u16, detail: String },
    /// Upstream served an HTML page where JSON was expected
    Html { endpoint: String },
    /// Upstream claimed JSON but the body would not parse
    Decode(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport(message) => {
                write!(f, "upstream request failed: {}", message)
            }
            UpstreamError::Status { status, detail } if detail.is_empty() => {
                write!(f, "upstream returned status {}", status)
            }
            UpstreamError::Status { status, detail } => {
                write!(f, "upstream returned status {}: {}", status, detail)
            }
            UpstreamError::Html { endpoint } => {
                write!(f, "upstream served an HTML page for {}", endpoint)
            }
            UpstreamError::Decode(message) => {
                write!(f, "upstream sent undecodable JSON: {}", message)
            }
        }
    }
}

impl UpstreamClient {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// GET `endpoint` and decode the response.
    ///
    /// Query pairs with a `None` or empty value are skipped entirely; the
    /// backend treats an empty `organization_id=` differently from an absent
    /// one. Returns `Ok(None)` for 204/205 responses.
    pub async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, Option<String>)],
    ) -> Result<Option<Value>, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.client.get(&url).header(CONTENT_TYPE, "application/json");
        for (key, value) in query {
            if let Some(value) = value {
                if !value.is_empty() {
                    request = request.query(&[(key, value.as_str())]);
                }
            }
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Upstream request to {} failed: {}", endpoint, e);
            UpstreamError::Transport(e.to_string())
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Upstream {} returned {}", endpoint, status);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail: extract_error_detail(&body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if content_type.contains("application/json") {
            return serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| UpstreamError::Decode(e.to_string()));
        }

        if looks_like_html(&body) {
            tracing::warn!("Upstream {} served HTML instead of JSON", endpoint);
            return Err(UpstreamError::Html {
                endpoint: endpoint.to_string(),
            });
        }

        // Some backend routes send JSON with a text/plain content-type.
        // Anything that still fails to parse is relayed as a plain string.
        match serde_json::from_str(&body) {
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(Some(Value::String(body))),
        }
    }
}

/// Error detail from an upstream failure body: the `message` field when the
/// body is a JSON object carrying one, otherwise the raw body. Capped to
/// keep log lines and relayed errors bounded.
fn extract_error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|parsed| parsed.get("message").cloned())
        .filter(|message| !message.is_null())
        .and_then(|message| coerce_string(&message))
        .unwrap_or_else(|| body.to_string());
    detail.chars().take(DETAIL_LIMIT).collect()
}

/// True when a body is an HTML document rather than data. Checked before any
/// JSON fallback parse so error pages surface as a clear failure instead of
/// a syntax error.
pub(crate) fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim().to_lowercase();
    trimmed.starts_with("<!doctype html") || trimmed.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_html_doctype() {
        assert!(looks_like_html("<!DOCTYPE html><html><body>404</body></html>"));
        assert!(looks_like_html("  \n<!doctype HTML>"));
        assert!(looks_like_html("<html lang=\"en\"><head></head></html>"));
        assert!(looks_like_html("<HTML>"));
    }

    #[test]
    fn test_looks_like_html_ignores_embedded_markup() {
        // Only a document prefix counts; JSON mentioning HTML is fine.
        assert!(!looks_like_html("{\"body\": \"<html>\"}"));
        assert!(!looks_like_html("plain text with <html> inside"));
        assert!(!looks_like_html("{\"status\": \"ok\"}"));
        assert!(!looks_like_html(""));
    }

    #[test]
    fn test_extract_error_detail_prefers_message_field() {
        assert_eq!(
            extract_error_detail("{\"message\": \"prompt not found\", \"code\": 4}"),
            "prompt not found"
        );
        // Numeric messages stringify.
        assert_eq!(extract_error_detail("{\"message\": 42}"), "42");
    }

    #[test]
    fn test_extract_error_detail_falls_back_to_raw_body() {
        assert_eq!(extract_error_detail("Internal Server Error"), "Internal Server Error");
        assert_eq!(extract_error_detail("{\"error\": \"no message field\"}"), "{\"error\": \"no message field\"}");
        assert_eq!(extract_error_detail(""), "");
    }

    #[test]
    fn test_extract_error_detail_is_capped() {
        let body = format!("{{\"message\": \"{}\"}}", "x".repeat(2000));
        assert_eq!(extract_error_detail(&body).len(), DETAIL_LIMIT);
    }

    #[test]
    fn test_upstream_client_strips_trailing_slash() {
        let client = UpstreamClient::new(reqwest::Client::new(), "http://localhost:8000/".to_string());
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_upstream_error_display() {
        let err = UpstreamError::Status { status: 404, detail: "missing".to_string() };
        assert_eq!(err.to_string(), "upstream returned status 404: missing");
        let err = UpstreamError::Status { status: 503, detail: String::new() };
        assert_eq!(err.to_string(), "upstream returned status 503");
    }
}
