//! Instagram session credential resolution
//!
//! Credentials are looked up once at startup, in strict order:
//!
//! 1. `INSTAGRAM_SESSION_ID`, `INSTAGRAM_CSRF_TOKEN` and `INSTAGRAM_DS_USER_ID`
//!    (all three must be set)
//! 2. a complete credential given on the command line
//! 3. `INSTAGRAM_COOKIES`, a JSON object of cookie values
//! 4. the cookie file (`instagram_cookies.json` by default)
//!
//! Once `INSTAGRAM_COOKIES` is set, the cookie file is never consulted, even
//! when the variable does not parse. Every failure is logged and resolves to
//! "no credential"; nothing here returns an error to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::Result;

/// Session id environment variable
pub const ENV_SESSION_ID: &str = "INSTAGRAM_SESSION_ID";
/// CSRF token environment variable
pub const ENV_CSRF_TOKEN: &str = "INSTAGRAM_CSRF_TOKEN";
/// User id environment variable
pub const ENV_DS_USER_ID: &str = "INSTAGRAM_DS_USER_ID";
/// JSON-encoded cookie mapping environment variable
pub const ENV_COOKIES: &str = "INSTAGRAM_COOKIES";
/// Cookie file consulted as the last resort
pub const DEFAULT_COOKIES_FILE: &str = "instagram_cookies.json";

/// Cookie-derived identifiers that authenticate as one Instagram account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "sessionid")]
    pub session_id: String,

    #[serde(rename = "csrftoken", default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,

    #[serde(rename = "ds_user_id", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("session_id", &"<redacted>")
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Credential {
    /// Create a credential holding only a session id
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            csrf_token: None,
            user_id: None,
        }
    }

    /// Set the CSRF token
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Set the account user id
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Build a credential only when all three parts are present and non-empty
    pub fn from_parts(
        session_id: Option<String>,
        csrf_token: Option<String>,
        user_id: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Some(
            Self::new(non_empty(session_id)?)
                .with_csrf_token(non_empty(csrf_token)?)
                .with_user_id(non_empty(user_id)?),
        )
    }

    /// Whether the csrf token and user id are both known
    pub fn is_complete(&self) -> bool {
        self.csrf_token.is_some() && self.user_id.is_some()
    }

    /// Build a credential from a decoded cookie mapping
    ///
    /// Returns `None` unless the value is an object with a non-empty
    /// `sessionid` string. Non-string values for the optional keys are ignored.
    pub fn from_cookie_map(value: &JsonValue) -> Option<Self> {
        let map = value.as_object()?;
        let field = |key: &str| {
            map.get(key)
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        Some(Self {
            session_id: field("sessionid")?,
            csrf_token: field("csrftoken"),
            user_id: field("ds_user_id"),
        })
    }

    /// Value for an HTTP `Cookie` header
    pub fn cookie_header(&self) -> String {
        let mut parts = vec![format!("sessionid={}", self.session_id)];
        if let Some(token) = &self.csrf_token {
            parts.push(format!("csrftoken={}", token));
        }
        if let Some(user_id) = &self.user_id {
            parts.push(format!("ds_user_id={}", user_id));
        }
        parts.join("; ")
    }

    /// Persist the credential as a cookie file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// Where a credential was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The three `INSTAGRAM_*` variables
    Environment,
    /// Command-line flags
    CommandLine,
    /// The `INSTAGRAM_COOKIES` variable
    CookiesVariable,
    /// A cookie file on disk
    CookieFile(PathBuf),
    /// Typed in at the terminal
    Prompt,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => write!(f, "environment variables"),
            Self::CommandLine => write!(f, "command-line arguments"),
            Self::CookiesVariable => write!(f, "{} environment variable", ENV_COOKIES),
            Self::CookieFile(path) => write!(f, "cookies file {}", path.display()),
            Self::Prompt => write!(f, "interactive prompt"),
        }
    }
}

/// A credential together with its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub credential: Credential,
    pub source: CredentialSource,
}

/// Resolves the session credential from the environment or a cookie file
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    cookie_file: PathBuf,
    command_line: Option<Credential>,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIES_FILE)
    }
}

impl CredentialResolver {
    /// Create a resolver that falls back to the given cookie file
    pub fn new(cookie_file: impl Into<PathBuf>) -> Self {
        Self {
            cookie_file: cookie_file.into(),
            command_line: None,
        }
    }

    /// Credential passed as command-line flags, consulted after the
    /// environment triple
    pub fn with_command_line(mut self, credential: Option<Credential>) -> Self {
        self.command_line = credential;
        self
    }

    /// Cookie file consulted as the last source
    pub fn cookie_file(&self) -> &Path {
        &self.cookie_file
    }

    /// Resolve using the process environment
    pub fn resolve(&self) -> Option<ResolvedCredential> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup
    ///
    /// Empty variables count as unset.
    pub fn resolve_with<F>(&self, lookup: F) -> Option<ResolvedCredential>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(credential) = Credential::from_parts(
            lookup(ENV_SESSION_ID),
            lookup(ENV_CSRF_TOKEN),
            lookup(ENV_DS_USER_ID),
        ) {
            info!("Using Instagram credentials from environment variables");
            return Some(ResolvedCredential {
                credential,
                source: CredentialSource::Environment,
            });
        }

        if let Some(credential) = &self.command_line {
            info!("Using Instagram credentials from command-line arguments");
            return Some(ResolvedCredential {
                credential: credential.clone(),
                source: CredentialSource::CommandLine,
            });
        }

        if let Some(raw) = lookup(ENV_COOKIES) {
            return match serde_json::from_str::<JsonValue>(&raw) {
                Ok(value) => {
                    info!("Using Instagram credentials from {} environment variable", ENV_COOKIES);
                    Self::from_value(value, CredentialSource::CookiesVariable)
                }
                Err(e) => {
                    error!("{} environment variable is not valid JSON: {}", ENV_COOKIES, e);
                    None
                }
            };
        }

        if !self.cookie_file.exists() {
            debug!("No cookies file at {}", self.cookie_file.display());
            return None;
        }

        let content = match std::fs::read_to_string(&self.cookie_file) {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to read {}: {}", self.cookie_file.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<JsonValue>(&content) {
            Ok(value) => {
                info!("Using Instagram credentials from cookies file");
                Self::from_value(value, CredentialSource::CookieFile(self.cookie_file.clone()))
            }
            Err(e) => {
                error!("{} is not valid JSON: {}", self.cookie_file.display(), e);
                None
            }
        }
    }

    fn from_value(value: JsonValue, source: CredentialSource) -> Option<ResolvedCredential> {
        if !value.is_object() {
            error!("Credentials from {} are not a JSON object", source);
            return None;
        }

        match Credential::from_cookie_map(&value) {
            Some(credential) => Some(ResolvedCredential { credential, source }),
            None => {
                warn!("Credentials from {} contain no sessionid", source);
                None
            }
        }
    }
}
