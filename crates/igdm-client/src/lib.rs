//! igdm-client: command-line client for the Instagram DM server
//!
//! Turns `read`, `send`, `greet` and `health` commands into JSON-RPC calls
//! over HTTP and prints the results.

pub mod command;
pub mod error;
pub mod repl;
pub mod rpc;

pub use command::{Command, HELP_TEXT};
pub use error::{ClientError, Result};
pub use repl::{execute, run_interactive};
pub use rpc::{RpcClient, DEFAULT_SERVER_URL};
