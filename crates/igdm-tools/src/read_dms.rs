//! Inbox reading tool

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use igdm_core::tool::parse_arguments;
use igdm_core::{Result, SchemaBuilder, Thread, ThreadSummary, Tool};
use igdm_instagram::InstagramSession;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadDmsInput {
    #[serde(default = "default_limit")]
    limit: usize,
}

/// One message as returned by `read_dms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub thread: ThreadSummary,
    pub sender_id: String,
    /// Username of the sender when they appear in the thread's user list
    pub sender: Option<String>,
    pub text: Option<String>,
    /// ISO 8601 timestamp
    pub timestamp: Option<String>,
}

/// ISO 8601 with a `+00:00` offset; fractions are always six digits and
/// omitted entirely on whole seconds
fn iso_timestamp(ts: DateTime<Utc>) -> String {
    let format = if ts.nanosecond() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    ts.to_rfc3339_opts(format, false)
}

/// Flatten threads into entries, thread order first, then message order
pub fn inbox_entries(threads: &[Thread]) -> Vec<InboxEntry> {
    threads
        .iter()
        .flat_map(|thread| {
            let summary = thread.summary();
            thread.messages.iter().map(move |message| InboxEntry {
                thread: summary.clone(),
                sender_id: message.sender_id.clone(),
                sender: thread.username_of(&message.sender_id).map(String::from),
                text: message.text.clone(),
                timestamp: message.timestamp.map(iso_timestamp),
            })
        })
        .collect()
}

/// Reads recent messages from the inbox
pub struct ReadDmsTool {
    session: Arc<InstagramSession>,
}

impl ReadDmsTool {
    pub fn new(session: Arc<InstagramSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ReadDmsTool {
    fn name(&self) -> &str {
        "read_dms"
    }

    fn description(&self) -> &str {
        "Read recent Instagram DMs from the inbox. Returns messages with sender, text, and timestamp."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(vec![(
            "limit",
            "integer",
            "Number of threads to fetch (default: 10)",
            false,
        )])
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: ReadDmsInput = parse_arguments(input)?;

        match self.session.direct_threads(input.limit).await {
            Ok(threads) => Ok(json!({
                "status": "success",
                "messages": inbox_entries(&threads),
            })),
            Err(e) => {
                error!("Error reading DMs: {}", e);
                Ok(crate::error_status(e))
            }
        }
    }
}
