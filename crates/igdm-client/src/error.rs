//! エラー型定義 (igdm-client)

use thiserror::Error;

/// igdm-client のエラー型
#[derive(Error, Debug)]
pub enum ClientError {
    /// サーバーとの通信に失敗 (接続エラー、HTTP エラーステータス)
    #[error("Error communicating with the server: {0}")]
    Transport(#[from] reqwest::Error),

    /// サーバーが JSON-RPC エラーを返した
    #[error("Error: {message} (code {code})")]
    Rpc { code: i64, message: String },

    /// `result` も `error` も含まないレスポンス
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Unknown command. Type 'help' for available commands.")]
    UnknownCommand,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ClientError>;
