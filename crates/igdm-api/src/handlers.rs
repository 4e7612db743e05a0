//! HTTP API handlers

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::server::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// JSON-RPC endpoint
///
/// The body is taken as raw bytes so that malformed JSON still gets a
/// JSON-RPC parse error instead of axum's plain-text rejection.
pub async fn rpc(State(state): State<AppState>, body: Bytes) -> Response {
    debug!("RPC request: {} bytes", body.len());

    match state.dispatcher.handle_raw(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
