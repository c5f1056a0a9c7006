//! Gateway server setup and initialization

use anyhow::{Context, Result};
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;

use super::api;
use super::forward::forward_request;
use super::state::GatewayState;

/// Start the gateway server
pub async fn start_gateway(
    config: Config,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    let bind_addr = config.bind_addr;

    // Build the HTTP client with connection pooling.
    // NOTE: No request timeout is set - the backend holds requests open for
    // the duration of live calls, and the deadline is the backend's to impose.
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        // Force HTTP/1.1 to avoid HTTP/2 connection reset issues with some backends
        .http1_only()
        .build()
        .context("Failed to create HTTP client")?;

    let state = GatewayState::new(client, config);

    // Build the router - view endpoints + transparent forwarder
    let app = Router::new()
        // Normalized read endpoints
        .route("/api/view/prompts", get(api::list_prompts))
        .route("/api/view/prompts/active", get(api::get_active_prompt))
        .route("/api/view/conversations", get(api::list_conversations))
        .route("/api/view/conversations/:id", get(api::get_conversation))
        .route("/api/view/calls", get(api::get_call_groups))
        // Health relay and client config
        .route("/api/view/health", get(api::get_health))
        .route("/api/view/config", get(api::get_gateway_info))
        // Transparent forwarder (all methods, with and without a path)
        .route("/api/proxy", any(forward_request))
        .route("/api/proxy/*path", any(forward_request))
        .with_state(state);

    tracing::info!("Starting gateway on {}", bind_addr);

    // Bind and serve
    let listener = TcpListener::bind(bind_addr)
        .await
        .context("Failed to bind to address")?;

    tracing::info!("Gateway listening on {}", bind_addr);

    // Start serving requests with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .context("Server error")?;

    tracing::info!("Gateway shut down gracefully");
    Ok(())
}
