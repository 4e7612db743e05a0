//! Authenticated session handle
//!
//! The session is established once at startup and handed explicitly to every
//! tool. Its login state never changes afterwards; a failed login leaves an
//! unauthenticated session that still serves requests (which then fail with
//! the client's own error).

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use igdm_core::{Credential, Thread};

use crate::api::{DirectApi, DirectSendReceipt};
use crate::error::Result;

/// Shared handle to one Instagram account
pub struct InstagramSession {
    api: Arc<dyn DirectApi>,
    user_id: Option<String>,
    /// Serializes calls into the client, which is not safe for concurrent use
    gate: Mutex<()>,
}

impl InstagramSession {
    /// Log in with the resolved credential, if any
    ///
    /// Never fails: login errors are logged and yield an unauthenticated
    /// session.
    pub async fn establish(api: Arc<dyn DirectApi>, credential: Option<&Credential>) -> Self {
        let Some(credential) = credential else {
            warn!("No valid Instagram session found. You need to set cookies.");
            return Self::unauthenticated(api);
        };

        match api.login_by_session_id(credential).await {
            Ok(user_id) => {
                info!("Successfully logged in with session ID (user id {})", user_id);
                Self {
                    api,
                    user_id: Some(user_id),
                    gate: Mutex::new(()),
                }
            }
            Err(e) => {
                error!("Failed to initialize Instagram client: {}", e);
                Self::unauthenticated(api)
            }
        }
    }

    /// A session that never logged in
    pub fn unauthenticated(api: Arc<dyn DirectApi>) -> Self {
        Self {
            api,
            user_id: None,
            gate: Mutex::new(()),
        }
    }

    /// Whether login succeeded at startup
    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Id of the logged-in account
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Fetch up to `amount` inbox threads
    pub async fn direct_threads(&self, amount: usize) -> Result<Vec<Thread>> {
        let _guard = self.gate.lock().await;
        self.api.direct_threads(amount).await
    }

    /// Resolve `username` and send it `text`
    pub async fn send_text(&self, username: &str, text: &str) -> Result<DirectSendReceipt> {
        let _guard = self.gate.lock().await;
        let recipient_id = self.api.user_id_from_username(username).await?;
        self.api.direct_send(text, &[recipient_id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockDirectApi};

    #[tokio::test]
    async fn test_establish_without_credential() {
        let api = Arc::new(MockDirectApi::new());
        let session = InstagramSession::establish(api.clone(), None).await;

        assert!(!session.is_logged_in());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_establish_logs_in() {
        let api = Arc::new(MockDirectApi::new().with_account_id("42"));
        let credential = Credential::new("42%3Axyz");
        let session = InstagramSession::establish(api.clone(), Some(&credential)).await;

        assert!(session.is_logged_in());
        assert_eq!(session.user_id(), Some("42"));
        assert_eq!(api.calls(), vec![MockCall::Login("42%3Axyz".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_login_stays_unauthenticated() {
        let api = Arc::new(MockDirectApi::new().failing_login());
        let credential = Credential::new("expired");
        let session = InstagramSession::establish(api, Some(&credential)).await;

        assert!(!session.is_logged_in());
        assert!(session.user_id().is_none());
    }

    #[tokio::test]
    async fn test_send_text_resolves_recipient() {
        let api = Arc::new(MockDirectApi::new().with_user("bob", "987"));
        let session = InstagramSession::unauthenticated(api.clone());

        session.send_text("bob", "hi").await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                MockCall::UserIdFromUsername("bob".to_string()),
                MockCall::DirectSend {
                    text: "hi".to_string(),
                    user_ids: vec!["987".to_string()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_send_text_unknown_user() {
        let api = Arc::new(MockDirectApi::new());
        let session = InstagramSession::unauthenticated(api.clone());

        let err = session.send_text("ghost", "hi").await.unwrap_err();
        assert_eq!(err.to_string(), "User not found: ghost");
        assert!(!api.calls().iter().any(|c| matches!(c, MockCall::DirectSend { .. })));
    }
}
