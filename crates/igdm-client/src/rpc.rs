//! JSON-RPC over HTTP

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Server address used when none is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Client for the server's JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl Default for RpcClient {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and return its `result`
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        debug!("POST {} {}", self.url, method);

        let mut response: Value = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(result) = response.get_mut("result") {
            return Ok(result.take());
        }

        match response.get("error") {
            Some(error) => Err(ClientError::Rpc {
                code: error["code"].as_i64().unwrap_or_default(),
                message: match &error["message"] {
                    Value::String(message) => message.clone(),
                    _ => error.to_string(),
                },
            }),
            None => Err(ClientError::InvalidResponse(response.to_string())),
        }
    }

    pub async fn read_dms(&self, limit: usize) -> Result<Value> {
        self.call("read_dms", json!({ "limit": limit })).await
    }

    pub async fn send_dm(&self, username: &str, message: &str) -> Result<Value> {
        self.call("send_dm", json!({ "username": username, "message": message }))
            .await
    }

    pub async fn get_greeting(&self, name: &str) -> Result<Value> {
        self.call("get_greeting", json!({ "name": name })).await
    }

    pub async fn health_check(&self) -> Result<Value> {
        self.call("health_check", json!({})).await
    }
}
