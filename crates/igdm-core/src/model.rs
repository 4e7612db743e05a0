//! Inbox data model
//!
//! Threads and messages are rebuilt from the Instagram API on every read and
//! never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member of a direct-message thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub username: Option<String>,
}

impl Participant {
    pub fn new(user_id: impl Into<String>, username: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.map(String::from),
        }
    }
}

/// A single direct message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub thread_id: String,
    pub sender_id: String,
    /// `None` for non-text items (media, likes, shares)
    pub text: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A direct-message conversation with its most recent messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: Option<String>,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
}

/// Thread identity attached to every entry returned by `read_dms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub thread_title: Option<String>,
    pub users: Vec<String>,
}

impl Thread {
    /// Usernames of participants that have one, in participant order
    pub fn participant_usernames(&self) -> Vec<String> {
        self.participants
            .iter()
            .filter_map(|p| p.username.clone())
            .collect()
    }

    /// Username of the participant with the given id
    pub fn username_of(&self, user_id: &str) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.user_id == user_id)
            .and_then(|p| p.username.as_deref())
    }

    pub fn summary(&self) -> ThreadSummary {
        ThreadSummary {
            thread_id: self.id.clone(),
            thread_title: self.title.clone(),
            users: self.participant_usernames(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> Thread {
        Thread {
            id: "t1".to_string(),
            title: Some("Weekend plans".to_string()),
            participants: vec![
                Participant::new("1", Some("alice")),
                Participant::new("2", None),
                Participant::new("3", Some("carol")),
            ],
            messages: Vec::new(),
        }
    }

    #[test]
    fn test_participant_usernames_skip_missing() {
        assert_eq!(thread().participant_usernames(), vec!["alice", "carol"]);
    }

    #[test]
    fn test_username_of() {
        let thread = thread();
        assert_eq!(thread.username_of("3"), Some("carol"));
        assert_eq!(thread.username_of("2"), None);
        assert_eq!(thread.username_of("404"), None);
    }

    #[test]
    fn test_summary_serialization() {
        let json = serde_json::to_value(thread().summary()).unwrap();
        assert_eq!(json["thread_id"], "t1");
        assert_eq!(json["thread_title"], "Weekend plans");
        assert_eq!(json["users"], serde_json::json!(["alice", "carol"]));
    }
}
