//! エラー型定義 (igdm-api)

use thiserror::Error;

/// igdm-api のエラー型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
