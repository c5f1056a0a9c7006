// Gateway module - HTTP server between dashboard clients and the backend
//
// Two surfaces share one listener: a transparent forwarder that relays
// anything under /api/proxy to the backend byte-for-byte, and a set of
// /api/view endpoints that answer with normalized records instead of raw
// backend payloads.

pub mod api;
mod error;
mod forward;
mod server;
mod state;

pub use server::start_gateway;
pub use state::GatewayState;
