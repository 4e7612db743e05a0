//! Scripted in-memory [`DirectApi`] for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use igdm_core::{Credential, Thread};

use crate::api::{DirectApi, DirectSendReceipt};
use crate::error::{InstagramError, Result};

/// A call received by [`MockDirectApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Login(String),
    DirectThreads(usize),
    UserIdFromUsername(String),
    DirectSend { text: String, user_ids: Vec<String> },
}

/// Fake Instagram client serving canned threads and users
#[derive(Default)]
pub struct MockDirectApi {
    account_id: Option<String>,
    threads: Vec<Thread>,
    users: HashMap<String, String>,
    fail_login: bool,
    failure: Option<String>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockDirectApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// User id returned by a successful login
    pub fn with_account_id(mut self, user_id: impl Into<String>) -> Self {
        self.account_id = Some(user_id.into());
        self
    }

    /// Add an inbox thread (inbox order follows insertion order)
    pub fn with_thread(mut self, thread: Thread) -> Self {
        self.threads.push(thread);
        self
    }

    /// Make `username` resolvable to `user_id`
    pub fn with_user(mut self, username: &str, user_id: &str) -> Self {
        self.users.insert(username.to_string(), user_id.to_string());
        self
    }

    /// Reject every login
    pub fn failing_login(mut self) -> Self {
        self.fail_login = true;
        self
    }

    /// Fail every inbox and messaging call with an API error
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: MockCall) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);

        match &self.failure {
            Some(message) => Err(InstagramError::Api(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectApi for MockDirectApi {
    async fn login_by_session_id(&self, credential: &Credential) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(MockCall::Login(credential.session_id.clone()));

        if self.fail_login {
            return Err(InstagramError::LoginRequired);
        }
        Ok(self
            .account_id
            .clone()
            .or_else(|| credential.user_id.clone())
            .unwrap_or_else(|| "1".to_string()))
    }

    async fn direct_threads(&self, amount: usize) -> Result<Vec<Thread>> {
        self.record(MockCall::DirectThreads(amount))?;
        Ok(self.threads.iter().take(amount).cloned().collect())
    }

    async fn user_id_from_username(&self, username: &str) -> Result<String> {
        self.record(MockCall::UserIdFromUsername(username.to_string()))?;
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| InstagramError::UserNotFound(username.to_string()))
    }

    async fn direct_send(&self, text: &str, user_ids: &[String]) -> Result<DirectSendReceipt> {
        self.record(MockCall::DirectSend {
            text: text.to_string(),
            user_ids: user_ids.to_vec(),
        })?;
        Ok(DirectSendReceipt {
            thread_id: Some(format!("thread-{}", user_ids.join("-"))),
            item_id: Some("item-1".to_string()),
        })
    }
}
