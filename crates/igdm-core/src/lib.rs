//! igdm-core: Instagram DM server core library
//!
//! Credential resolution, configuration, the inbox data model and the
//! tool system shared by the server, the tool handlers and the RPC
//! front-end.

pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod tool;

pub use config::{Config, InstagramConfig, ServerConfig, Transport};
pub use credentials::{Credential, CredentialResolver, CredentialSource, ResolvedCredential};
pub use error::{Error, Result};
pub use model::{Message, Participant, Thread, ThreadSummary};
pub use tool::{SchemaBuilder, Tool, ToolDefinition, ToolManager};
