//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, rpc};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health))
        // JSON-RPC, accepted on the root path and on /rpc
        .route("/", post(rpc))
        .route("/rpc", post(rpc))
}
