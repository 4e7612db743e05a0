//! Direct message sending tool

use std::sync::Arc;

use async_trait::async_trait;
use igdm_core::tool::parse_arguments;
use igdm_core::{Result, SchemaBuilder, Tool};
use igdm_instagram::InstagramSession;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SendDmInput {
    username: String,
    message: String,
}

/// Sends a text message to one user
pub struct SendDmTool {
    session: Arc<InstagramSession>,
}

impl SendDmTool {
    pub fn new(session: Arc<InstagramSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for SendDmTool {
    fn name(&self) -> &str {
        "send_dm"
    }

    fn description(&self) -> &str {
        "Send a direct message to an Instagram user."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(vec![
            ("username", "string", "Instagram username of the recipient", true),
            ("message", "string", "Message content to send", true),
        ])
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let SendDmInput { username, message } = parse_arguments(input)?;

        if username.is_empty() || message.is_empty() {
            return Ok(crate::error_status("Username and message are required"));
        }

        match self.session.send_text(&username, &message).await {
            Ok(receipt) => {
                info!(thread_id = ?receipt.thread_id, "Successfully sent DM to {}", username);
                Ok(json!({
                    "status": "success",
                    "message": format!("Sent DM to {}", username),
                }))
            }
            Err(e) => {
                error!("Error sending DM to {}: {}", username, e);
                Ok(crate::error_status(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use igdm_instagram::{MockCall, MockDirectApi};

    fn tool(api: MockDirectApi) -> (SendDmTool, Arc<MockDirectApi>) {
        let api = Arc::new(api);
        let session = InstagramSession::unauthenticated(api.clone());
        (SendDmTool::new(Arc::new(session)), api)
    }

    #[tokio::test]
    async fn test_send() {
        let (tool, api) = tool(MockDirectApi::new().with_user("bob", "987"));

        let output = tool
            .execute(json!({"username": "bob", "message": "hi there"}))
            .await
            .unwrap();

        assert_eq!(output, json!({"status": "success", "message": "Sent DM to bob"}));
        assert_eq!(
            api.calls().last(),
            Some(&MockCall::DirectSend {
                text: "hi there".to_string(),
                user_ids: vec!["987".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn test_empty_arguments_skip_client() {
        let (tool, api) = tool(MockDirectApi::new().with_user("bob", "987"));

        for input in [
            json!({"username": "", "message": "hi"}),
            json!({"username": "bob", "message": ""}),
        ] {
            let output = tool.execute(input).await.unwrap();
            assert_eq!(
                output,
                json!({"status": "error", "message": "Username and message are required"})
            );
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (tool, _) = tool(MockDirectApi::new());

        let output = tool
            .execute(json!({"username": "ghost", "message": "hi"}))
            .await
            .unwrap();
        assert_eq!(output["status"], "error");
        assert_eq!(output["message"], "User not found: ghost");
    }

    #[tokio::test]
    async fn test_missing_argument_is_dispatch_error() {
        let (tool, api) = tool(MockDirectApi::new());

        assert!(tool.execute(json!({"username": "bob"})).await.is_err());
        assert!(api.calls().is_empty());
    }
}
