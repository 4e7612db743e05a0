//! igdm-api: JSON-RPC front-end for the Instagram DM tools
//!
//! Maps an incoming method name to a registered tool and shapes the
//! JSON-RPC response. Requests arrive over HTTP (axum) or as
//! newline-delimited JSON on stdin.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod rpc;
pub mod server;
pub mod stdio;

pub use error::{ApiError, Result};
pub use rpc::{RpcDispatcher, RpcError, RpcRequest, RpcResponse};
pub use server::{app, start_server};
pub use stdio::{serve_lines, serve_stdio};
