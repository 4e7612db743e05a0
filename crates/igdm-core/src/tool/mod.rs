//! Tool system
//!
//! Tools are the operations reachable through the RPC front-end. Each one
//! advertises a name, a description and a JSON schema for its arguments.

pub mod definition;
pub mod manager;
pub mod traits;

pub use definition::{SchemaBuilder, ToolDefinition};
pub use manager::ToolManager;
pub use traits::{parse_arguments, Tool};
