//! Shared state for request handlers

use std::sync::Arc;

use crate::config::Config;
use crate::upstream::UpstreamClient;

/// State shared by every handler. Cheap to clone: the reqwest client is
/// internally reference-counted and the config sits behind an Arc.
#[derive(Clone)]
pub struct GatewayState {
    /// Raw HTTP client used by the transparent forwarder
    pub(crate) client: reqwest::Client,

    /// Typed backend client used by the view endpoints
    pub(crate) upstream: UpstreamClient,

    /// Resolved configuration, immutable after startup
    pub(crate) config: Arc<Config>,
}

impl GatewayState {
    /// Build state around one shared connection pool: the forwarder and the
    /// view endpoints reuse the same upstream connections.
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        let upstream = UpstreamClient::new(client.clone(), config.upstream_url.clone());
        Self {
            client,
            upstream,
            config: Arc::new(config),
        }
    }
}
