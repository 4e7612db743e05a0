//! igdm-tools: Instagram DM tool handlers
//!
//! Every handler contains its own failures: Instagram errors come back as
//! `{"status": "error", "message": ...}` rather than as `Err`.

use std::fmt::Display;
use std::sync::Arc;

use igdm_core::ToolManager;
use igdm_instagram::InstagramSession;
use serde_json::{json, Value};

pub mod greeting;
pub mod health;
pub mod read_dms;
pub mod send_dm;

pub use greeting::{greeting, GreetingTool};
pub use health::{HealthCheckTool, SERVICE_NAME, VERSION};
pub use read_dms::{inbox_entries, InboxEntry, ReadDmsTool};
pub use send_dm::SendDmTool;

/// Register the four DM tools with the tool manager
pub fn register_default_tools(manager: &mut ToolManager, session: Arc<InstagramSession>) {
    manager.register(Arc::new(ReadDmsTool::new(Arc::clone(&session))));
    manager.register(Arc::new(SendDmTool::new(Arc::clone(&session))));
    manager.register(Arc::new(GreetingTool));
    manager.register(Arc::new(HealthCheckTool::new(session)));
}

/// `{"status": "error", "message": ...}`
pub(crate) fn error_status(message: impl Display) -> Value {
    json!({"status": "error", "message": message.to_string()})
}

#[cfg(test)]
mod tests {
    use super::*;
    use igdm_instagram::MockDirectApi;

    #[test]
    fn test_register_default_tools() {
        let session = Arc::new(InstagramSession::unauthenticated(Arc::new(MockDirectApi::new())));
        let mut manager = ToolManager::new();
        register_default_tools(&mut manager, session);

        assert_eq!(
            manager.tool_names(),
            vec!["get_greeting", "health_check", "read_dms", "send_dm"]
        );
    }
}
