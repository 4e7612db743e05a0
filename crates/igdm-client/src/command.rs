//! Client commands

use crate::error::{ClientError, Result};

/// Inbox size used by `read` without an argument
pub const DEFAULT_READ_LIMIT: usize = 10;

pub const HELP_TEXT: &str = "\
Instagram DM MCP Client
Available commands:
  read [limit]                - Read recent DMs (default limit: 10)
  send <username> <message>   - Send a DM to a user
  greet <name>                - Get a greeting for a name
  health                      - Check server health
  help                        - Show this help information
  exit                        - Exit the client";

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Read { limit: usize },
    Send { username: String, message: String },
    Greet { name: String },
    Health,
    Help,
    Exit,
}

impl Command {
    /// Parse a line typed at the prompt
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(None);
        }
        Self::parse_words(&words).map(Some)
    }

    /// Parse already-split words; the first one names the command
    ///
    /// The message of `send` is every remaining word joined by single spaces.
    pub fn parse_words<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let Some((name, rest)) = words.split_first() else {
            return Err(ClientError::UnknownCommand);
        };

        match (name.as_ref().to_lowercase().as_str(), rest) {
            ("read", []) => Ok(Self::Read {
                limit: DEFAULT_READ_LIMIT,
            }),
            ("read", [limit, ..]) => {
                let limit = limit.as_ref();
                limit
                    .parse()
                    .map(|limit| Self::Read { limit })
                    .map_err(|_| ClientError::InvalidLimit(limit.to_string()))
            }
            ("send", [username, message @ ..]) if !message.is_empty() => Ok(Self::Send {
                username: username.as_ref().to_string(),
                message: message
                    .iter()
                    .map(|w| w.as_ref())
                    .collect::<Vec<_>>()
                    .join(" "),
            }),
            ("greet", [name, ..]) => Ok(Self::Greet {
                name: name.as_ref().to_string(),
            }),
            ("health", _) => Ok(Self::Health),
            ("help", _) => Ok(Self::Help),
            ("exit", _) => Ok(Self::Exit),
            _ => Err(ClientError::UnknownCommand),
        }
    }
}
