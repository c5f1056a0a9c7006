//! Configuration for the gateway
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/voxgate/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod serialization;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend reached when nothing else is configured
const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8000";

/// Local-only listener by default
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3100";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the gateway server to
    pub bind_addr: SocketAddr,

    /// Backend base URL, stored without a trailing slash
    pub upstream_url: String,

    /// WebSocket URL advertised to dashboard clients
    pub ws_url: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.parse().unwrap(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            ws_url: derive_ws_url(DEFAULT_UPSTREAM_URL),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub bind_addr: Option<String>,
    pub upstream_url: Option<String>,
    pub ws_url: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/voxgate/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("voxgate").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        // Create parent directory
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Use Config::default().to_toml() as single source of truth
        let template = Self::default().to_toml();

        // Write config (ignore errors - config is optional)
        let _ = std::fs::write(&path, template);
    }

    /// Load file config if it exists
    ///
    /// # Panics
    /// If config file exists but cannot be parsed. This is intentional -
    /// a broken config should fail fast with a clear error, not silently
    /// fall back to defaults while the user debugs the wrong thing.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                match toml::from_str(&contents) {
                    Ok(config) => config,
                    Err(e) => {
                        // Fatal error - config exists but is invalid
                        // Print a clear, actionable error message
                        eprintln!(
                            "\n╔══════════════════════════════════════════════════════════════╗"
                        );
                        eprintln!(
                            "║  CONFIG ERROR - Failed to parse configuration file          ║"
                        );
                        eprintln!(
                            "╚══════════════════════════════════════════════════════════════╝\n"
                        );
                        eprintln!("  File: {}\n", path.display());
                        eprintln!("  Error: {}\n", e);
                        eprintln!("  Tip: Check for:\n");
                        eprintln!("    - Missing quotes around string values");
                        eprintln!("    - Invalid boolean values (use true/false)");
                        eprintln!("    - Typos in section names\n");
                        eprintln!("  To reset, delete the file and restart voxgate.\n");
                        std::process::exit(1);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Config file doesn't exist - use defaults
                FileConfig::default()
            }
            Err(e) => {
                // File exists but can't be read (permissions, etc.)
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();

        // Upstream URL: env > legacy env > file > default.
        // BACKEND_URL is the name older deployments exported; it keeps working.
        let upstream_url = env_nonempty("VOXGATE_UPSTREAM_URL")
            .or_else(|| env_nonempty("BACKEND_URL"))
            .or(file.upstream_url.filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        let upstream_url = upstream_url.trim_end_matches('/').to_string();

        // WebSocket URL: env > file > derived from the upstream scheme
        let ws_url = env_nonempty("VOXGATE_WS_URL")
            .or(file.ws_url.filter(|v| !v.is_empty()))
            .unwrap_or_else(|| derive_ws_url(&upstream_url));

        // Bind address: env > file > default
        let bind_addr = env_nonempty("VOXGATE_BIND")
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .expect("Invalid bind address");

        Self {
            bind_addr,
            upstream_url,
            ws_url,
            logging: LoggingConfig::from_file(file.logging),
        }
    }
}

/// Environment variable value, with unset and set-but-empty treated alike.
fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// WebSocket URL from an HTTP base URL: http -> ws, https -> wss.
/// Non-HTTP schemes pass through unchanged.
pub(crate) fn derive_ws_url(upstream_url: &str) -> String {
    if let Some(rest) = upstream_url.strip_prefix("https:") {
        format!("wss:{}", rest)
    } else if let Some(rest) = upstream_url.strip_prefix("http:") {
        format!("ws:{}", rest)
    } else {
        upstream_url.to_string()
    }
}
