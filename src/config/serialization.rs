//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize config to TOML string (single source of truth for format)
    pub fn to_toml(&self) -> String {
        format!(
            r#"# voxgate configuration

# Gateway bind address
bind_addr = "{bind}"

# Backend base URL that /api/proxy requests are forwarded to
# (VOXGATE_UPSTREAM_URL or the legacy BACKEND_URL env var overrides)
upstream_url = "{upstream}"

# WebSocket URL advertised to dashboard clients
# Defaults to upstream_url with the scheme switched to ws/wss
ws_url = "{ws}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to stdout)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            bind = self.bind_addr,
            upstream = self.upstream_url,
            ws = self.ws_url,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
