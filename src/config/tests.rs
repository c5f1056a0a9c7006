//! Configuration tests
//!
//! These tests serve as compile-time guards to ensure every config field is
//! serialized to the template and parses back. When you add a new field,
//! these tests will fail until you update all the necessary places.

use super::*;

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// Verify that serialized config can be parsed back.
/// This catches TOML syntax errors in the hand-written template.
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    // Should parse without error
    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

/// Verify the VALUES survive the round-trip, not just the syntax.
#[test]
fn test_config_roundtrip_preserves_values() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let file_config: FileConfig = toml::from_str(&toml_str).expect("template should parse");

    assert_eq!(file_config.bind_addr, Some(DEFAULT_BIND_ADDR.to_string()));
    assert_eq!(
        file_config.upstream_url,
        Some(DEFAULT_UPSTREAM_URL.to_string())
    );
    assert_eq!(
        file_config.ws_url,
        Some(derive_ws_url(DEFAULT_UPSTREAM_URL))
    );

    let logging = file_config.logging.expect("logging section should parse");
    assert_eq!(logging.level, Some("info".to_string()));
    assert_eq!(logging.file_enabled, Some(false));
    assert_eq!(logging.file_rotation, Some("daily".to_string()));
    assert_eq!(logging.file_prefix, Some("voxgate".to_string()));
}

/// Every section and field the loader understands must appear in the
/// template, or users have no way to discover it.
#[test]
fn test_template_documents_all_fields() {
    let toml_str = Config::default().to_toml();

    for key in [
        "bind_addr",
        "upstream_url",
        "ws_url",
        "[logging]",
        "level",
        "file_enabled",
        "file_dir",
        "file_rotation",
        "file_prefix",
    ] {
        assert!(
            toml_str.contains(key),
            "{} missing from TOML template!\n\
             Did you forget to serialize it in to_toml()?\n\
             TOML output:\n{}",
            key,
            toml_str
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_default_config_values() {
    let config = Config::default();

    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3100");
    assert_eq!(config.upstream_url, "http://localhost:8000");
    assert_eq!(config.ws_url, "ws://localhost:8000");
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.file_enabled);
}

// ─────────────────────────────────────────────────────────────────────────────
// WebSocket URL derivation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_derive_ws_url_http() {
    assert_eq!(derive_ws_url("http://localhost:8000"), "ws://localhost:8000");
}

#[test]
fn test_derive_ws_url_https() {
    assert_eq!(
        derive_ws_url("https://api.example.com"),
        "wss://api.example.com"
    );
}

#[test]
fn test_derive_ws_url_preserves_path_and_port() {
    assert_eq!(
        derive_ws_url("https://api.example.com:8443/backend"),
        "wss://api.example.com:8443/backend"
    );
}

#[test]
fn test_derive_ws_url_non_http_scheme_unchanged() {
    // Already a websocket URL, or something unrecognized: leave it alone.
    assert_eq!(derive_ws_url("ws://localhost:9000"), "ws://localhost:9000");
    assert_eq!(derive_ws_url("unix:///tmp/backend.sock"), "unix:///tmp/backend.sock");
}

// ─────────────────────────────────────────────────────────────────────────────
// Log rotation parsing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_log_rotation_from_str() {
    assert_eq!(LogRotation::from_str("hourly"), LogRotation::Hourly);
    assert_eq!(LogRotation::from_str("daily"), LogRotation::Daily);
    assert_eq!(LogRotation::from_str("never"), LogRotation::Never);
    assert_eq!(LogRotation::from_str("HOURLY"), LogRotation::Hourly);

    // Unknown values fall back to daily rather than failing startup.
    assert_eq!(LogRotation::from_str("weekly"), LogRotation::Daily);
    assert_eq!(LogRotation::from_str(""), LogRotation::Daily);
}

#[test]
fn test_log_rotation_as_str_roundtrip() {
    for rotation in [LogRotation::Hourly, LogRotation::Daily, LogRotation::Never] {
        assert_eq!(LogRotation::from_str(rotation.as_str()), rotation);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File config parsing
// ─────────────────────────────────────────────────────────────────────────────

/// A partial file only overrides the keys it names.
#[test]
fn test_partial_file_config() {
    let file_config: FileConfig = toml::from_str(
        r#"
        upstream_url = "https://backend.example.com"
        "#,
    )
    .expect("partial config should parse");

    assert_eq!(
        file_config.upstream_url,
        Some("https://backend.example.com".to_string())
    );
    assert_eq!(file_config.bind_addr, None);
    assert_eq!(file_config.ws_url, None);
    assert!(file_config.logging.is_none());
}

#[test]
fn test_partial_logging_section() {
    let file_config: FileConfig = toml::from_str(
        r#"
        [logging]
        level = "debug"
        "#,
    )
    .expect("partial logging section should parse");

    let file_logging = file_config.logging.expect("logging section present");
    assert_eq!(file_logging.level, Some("debug".to_string()));
    assert_eq!(file_logging.file_enabled, None);

    // Merging keeps defaults for everything the file left out.
    let logging = LoggingConfig::from_file(Some(file_logging));
    assert_eq!(logging.level, "debug");
    assert!(!logging.file_enabled);
    assert_eq!(logging.file_rotation, LogRotation::Daily);
}

#[test]
fn test_unknown_keys_are_tolerated() {
    // Old config files may carry keys from removed features.
    let parsed: Result<FileConfig, _> = toml::from_str(
        r#"
        upstream_url = "http://localhost:8000"
        retired_option = true

        [logging]
        level = "warn"
        colour = "green"
        "#,
    );
    assert!(
        parsed.is_ok(),
        "Unknown keys should not fail parsing: {:?}",
        parsed.err()
    );
}
