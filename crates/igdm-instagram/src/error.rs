//! Error types for igdm-instagram

use thiserror::Error;

/// igdm-instagram error type
#[derive(Error, Debug)]
pub enum InstagramError {
    #[error("login_required")]
    LoginRequired,

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Instagram API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, InstagramError>;
