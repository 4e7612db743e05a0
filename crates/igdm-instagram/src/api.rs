//! Instagram private API client implementation

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, error, info};

use igdm_core::{Credential, InstagramConfig, Message, Participant, Thread};

use crate::error::{InstagramError, Result};

/// Android app id expected by the private API
const INSTAGRAM_APP_ID: &str = "567067343352427";

/// Threads requested per inbox page
const INBOX_PAGE_SIZE: usize = 20;

/// Messages returned per thread in the inbox listing
const THREAD_MESSAGE_LIMIT: usize = 10;

/// Operations the DM tools need from an Instagram client
#[async_trait]
pub trait DirectApi: Send + Sync {
    /// Authenticate with a session cookie and return the account's user id
    async fn login_by_session_id(&self, credential: &Credential) -> Result<String>;

    /// Fetch up to `amount` inbox threads, newest first
    async fn direct_threads(&self, amount: usize) -> Result<Vec<Thread>>;

    /// Resolve a username to its numeric user id
    async fn user_id_from_username(&self, username: &str) -> Result<String>;

    /// Send a text message to the given users
    async fn direct_send(&self, text: &str, user_ids: &[String]) -> Result<DirectSendReceipt>;
}

/// Identifiers of a sent message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectSendReceipt {
    pub thread_id: Option<String>,
    pub item_id: Option<String>,
}

/// Instagram private API client
///
/// The session credential is stored on the first successful login and
/// never replaced.
pub struct InstagramApi {
    client: Client,
    base_url: String,
    user_agent: String,
    credential: OnceLock<Credential>,
}

impl InstagramApi {
    /// Create a new, unauthenticated client
    pub fn new(config: &InstagramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InstagramError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            credential: OnceLock::new(),
        })
    }

    /// Whether a session credential has been accepted
    pub fn is_authenticated(&self) -> bool {
        self.credential.get().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        let request = request
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .header("X-IG-App-ID", INSTAGRAM_APP_ID)
            .header(reqwest::header::COOKIE, credential.cookie_header());

        match &credential.csrf_token {
            Some(token) => request.header("X-CSRFToken", token),
            None => request,
        }
    }

    fn credential(&self) -> Result<&Credential> {
        self.credential.get().ok_or(InstagramError::LoginRequired)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<JsonValue> {
        let credential = self.credential()?;
        let request = self.client.get(self.url(path)).query(query);
        let response = self.authorize(request, credential).send().await?;
        Self::read_json(response).await
    }

    async fn read_json(response: Response) -> Result<JsonValue> {
        let status = response.status();
        let body = response.text().await?;

        debug!("Instagram API response: {} - {}", status, body);

        if !status.is_success() {
            error!("Instagram API error: {} - {}", status, body);
            if body.contains("login_required") {
                return Err(InstagramError::LoginRequired);
            }
            return Err(InstagramError::Api(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let json: JsonValue = serde_json::from_str(&body)?;
        if json["status"].as_str() == Some("fail") {
            let message = json["message"].as_str().unwrap_or("request failed");
            if message == "login_required" {
                return Err(InstagramError::LoginRequired);
            }
            return Err(InstagramError::Api(message.to_string()));
        }

        Ok(json)
    }
}

/// Extract the user id encoded at the start of a session id
fn user_id_from_session(session_id: &str) -> Option<&str> {
    let prefix = session_id.split("%3A").next()?.split(':').next()?;
    (!prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit())).then_some(prefix)
}

/// Numeric ids go out as JSON numbers, e.g. `[[987]]`
fn recipient_ids(user_ids: &[String]) -> Vec<JsonValue> {
    user_ids
        .iter()
        .map(|id| match id.parse::<u64>() {
            Ok(n) => JsonValue::from(n),
            Err(_) => JsonValue::from(id.as_str()),
        })
        .collect()
}

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

#[async_trait]
impl DirectApi for InstagramApi {
    async fn login_by_session_id(&self, credential: &Credential) -> Result<String> {
        let user_id = user_id_from_session(&credential.session_id)
            .map(String::from)
            .or_else(|| credential.user_id.clone())
            .ok_or_else(|| {
                InstagramError::InvalidSession("cannot determine user id from session".to_string())
            })?;

        info!("Verifying session for user id {}", user_id);

        let request = self
            .client
            .get(self.url(&format!("users/{}/info/", user_id)));
        let response = self.authorize(request, credential).send().await?;
        let json = Self::read_json(response).await?;

        let info: UserInfoResponse = serde_json::from_value(json)?;
        if info.user.pk != user_id {
            return Err(InstagramError::InvalidSession(format!(
                "session belongs to {}, expected {}",
                info.user.pk, user_id
            )));
        }

        if self.credential.set(credential.clone()).is_err() {
            debug!("Session already established, keeping the existing credential");
        }

        Ok(info.user.pk)
    }

    async fn direct_threads(&self, amount: usize) -> Result<Vec<Thread>> {
        let mut threads = Vec::new();
        if amount == 0 {
            return Ok(threads);
        }

        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("visual_message_return_type", "unseen".to_string()),
                ("thread_message_limit", THREAD_MESSAGE_LIMIT.to_string()),
                ("persistentBadging", "true".to_string()),
                ("limit", INBOX_PAGE_SIZE.min(amount).to_string()),
            ];
            if let Some(cursor) = &cursor {
                query.push(("cursor", cursor.clone()));
            }

            let json = self.get_json("direct_v2/inbox/", &query).await?;
            let response: InboxResponse = serde_json::from_value(json)?;
            let inbox = response.inbox;

            threads.extend(inbox.threads.into_iter().map(RawThread::into_thread));

            if threads.len() >= amount || !inbox.has_older {
                break;
            }
            match inbox.oldest_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        threads.truncate(amount);
        Ok(threads)
    }

    async fn user_id_from_username(&self, username: &str) -> Result<String> {
        let username = username.trim().to_lowercase();
        if !is_valid_username(&username) {
            return Err(InstagramError::UserNotFound(username));
        }

        let json = self
            .get_json(&format!("users/{}/usernameinfo/", username), &[])
            .await
            .map_err(|e| match e {
                InstagramError::Api(msg) if msg.contains("404") || msg.contains("User not found") => {
                    InstagramError::UserNotFound(username.clone())
                }
                other => other,
            })?;

        let info: UserInfoResponse = serde_json::from_value(json)?;
        Ok(info.user.pk)
    }

    async fn direct_send(&self, text: &str, user_ids: &[String]) -> Result<DirectSendReceipt> {
        let credential = self.credential()?;
        info!("Sending direct message to {} recipient(s)", user_ids.len());

        let recipients = serde_json::to_string(&[recipient_ids(user_ids)])?;
        let client_context = uuid::Uuid::new_v4().to_string();
        let device_uuid = uuid::Uuid::new_v4().to_string();
        let mut form = vec![
            ("recipient_users", recipients),
            ("text", text.to_string()),
            ("action", "send_item".to_string()),
            ("client_context", client_context),
            ("_uuid", device_uuid),
        ];
        if let Some(token) = &credential.csrf_token {
            form.push(("_csrftoken", token.clone()));
        }

        let request = self
            .client
            .post(self.url("direct_v2/threads/broadcast/text/"))
            .form(&form);
        let response = self.authorize(request, credential).send().await?;
        let json = Self::read_json(response).await?;

        let payload = &json["payload"];
        Ok(DirectSendReceipt {
            thread_id: payload["thread_id"].as_str().map(String::from),
            item_id: payload["item_id"].as_str().map(String::from),
        })
    }
}

// ============================================================================
// Raw response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct InboxResponse {
    inbox: RawInbox,
}

#[derive(Debug, Deserialize)]
struct RawInbox {
    #[serde(default)]
    threads: Vec<RawThread>,
    #[serde(default)]
    has_older: bool,
    oldest_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawThread {
    #[serde(deserialize_with = "de_id")]
    thread_id: String,
    thread_title: Option<String>,
    #[serde(default)]
    users: Vec<RawUser>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(deserialize_with = "de_id")]
    pk: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(deserialize_with = "de_id")]
    user_id: String,
    #[serde(default)]
    timestamp: Option<JsonValue>,
    text: Option<String>,
}

impl RawThread {
    fn into_thread(self) -> Thread {
        let thread_id = self.thread_id;
        let messages = self
            .items
            .into_iter()
            .map(|item| Message {
                thread_id: thread_id.clone(),
                sender_id: item.user_id,
                text: item.text,
                timestamp: item.timestamp.as_ref().and_then(parse_timestamp),
            })
            .collect();

        Thread {
            id: thread_id,
            title: self.thread_title,
            participants: self
                .users
                .into_iter()
                .map(|u| Participant {
                    user_id: u.pk,
                    username: u.username,
                })
                .collect(),
            messages,
        }
    }
}

/// Ids arrive as either JSON strings or numbers
fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Direct item timestamps are microseconds since the epoch; older payloads
/// use milliseconds or seconds.
fn parse_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    let raw = match value {
        JsonValue::String(s) => s.parse::<i64>().ok()?,
        JsonValue::Number(n) => n.as_i64()?,
        _ => return None,
    };

    if raw >= 100_000_000_000_000 {
        DateTime::from_timestamp_micros(raw)
    } else if raw >= 100_000_000_000 {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}
