//! JSON-RPC envelope and dispatcher
//!
//! Plain method names (`read_dms`, `send_dm`, ...) call the tool of the same
//! name with `params` as keyword arguments. The tool-calling protocol methods
//! (`initialize`, `tools/list`, `tools/call`, `resources/*`) are served on the
//! same endpoint. Every outcome, including unknown methods and malformed
//! payloads, becomes a response; nothing propagates to the transport.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use igdm_core::{Error as CoreError, ToolManager};

/// JSON-RPC protocol version
pub const JSONRPC_VERSION: &str = "2.0";

/// Tool-calling protocol revision reported by `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const GREETING_SCHEME: &str = "greeting://";
const GREETING_TOOL: &str = "get_greeting";

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Incoming request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: JsonValue, id: impl Into<JsonValue>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            method: method.into(),
            params,
            id: Some(id.into()),
        }
    }

    /// Notifications carry no id and expect no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none() && self.method.starts_with("notifications/")
    }
}

/// Error object of a failed call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<CoreError> for RpcError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownTool(name) => {
                Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", name))
            }
            CoreError::InvalidParams(msg) => {
                Self::new(INVALID_PARAMS, format!("Invalid params: {}", msg))
            }
            other => Self::new(INTERNAL_ERROR, other.to_string()),
        }
    }
}

/// Outgoing response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: JsonValue, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: JsonValue,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

/// Routes requests to registered tools
#[derive(Clone)]
pub struct RpcDispatcher {
    tools: Arc<ToolManager>,
    server_name: String,
    server_version: String,
}

impl RpcDispatcher {
    /// Create a dispatcher over the given tools
    pub fn new(tools: ToolManager) -> Self {
        Self {
            tools: Arc::new(tools),
            server_name: env!("CARGO_PKG_NAME").to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the name and version reported by `initialize`
    pub fn with_server_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.server_name = name.into();
        self.server_version = version.into();
        self
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    /// Decode a raw payload and dispatch it
    ///
    /// Returns `None` for notifications.
    pub async fn handle_raw(&self, payload: &[u8]) -> Option<RpcResponse> {
        let value: JsonValue = match serde_json::from_slice(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!("Rejecting malformed JSON-RPC payload: {}", e);
                return Some(RpcResponse::failure(
                    JsonValue::Null,
                    RpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };

        if value.is_array() {
            return Some(RpcResponse::failure(
                JsonValue::Null,
                RpcError::new(INVALID_REQUEST, "Batch requests are not supported"),
            ));
        }

        let id = value.get("id").cloned().unwrap_or(JsonValue::Null);
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(RpcResponse::failure(
                    id,
                    RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.is_notification() {
            debug!("Received notification: {}", request.method);
            return None;
        }

        Some(self.dispatch(request).await)
    }

    /// Dispatch a decoded request
    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.unwrap_or(JsonValue::Null);
        debug!("Dispatching {}", request.method);

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "tools/call" => self.call_tool(request.params).await,
            "resources/templates/list" => Ok(Self::resource_templates()),
            "resources/read" => self.read_resource(request.params).await,
            method => self
                .tools
                .execute(method, request.params)
                .await
                .map_err(RpcError::from),
        };

        match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => {
                warn!("Request {} failed: {}", request.method, error.message);
                RpcResponse::failure(id, error)
            }
        }
    }

    fn initialize(&self) -> JsonValue {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": self.server_name,
                "version": self.server_version
            }
        })
    }

    async fn call_tool(&self, params: JsonValue) -> Result<JsonValue, RpcError> {
        let params: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))?;

        if !self.tools.contains(&params.name) {
            return Err(RpcError::new(
                INVALID_PARAMS,
                format!("Unknown tool: {}", params.name),
            ));
        }

        let output = self.tools.execute(&params.name, params.arguments).await?;
        let is_error = output["status"].as_str() == Some("error");
        let text = match output {
            JsonValue::String(text) => text,
            other => other.to_string(),
        };

        Ok(json!({
            "content": [{"type": "text", "text": text}],
            "isError": is_error
        }))
    }

    fn resource_templates() -> JsonValue {
        json!({
            "resourceTemplates": [{
                "uriTemplate": format!("{}{{name}}", GREETING_SCHEME),
                "name": "greeting",
                "description": "Get a personalized greeting.",
                "mimeType": "text/plain"
            }]
        })
    }

    async fn read_resource(&self, params: JsonValue) -> Result<JsonValue, RpcError> {
        let params: ResourceReadParams = serde_json::from_value(params)
            .map_err(|e| RpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))?;

        let Some(name) = params.uri.strip_prefix(GREETING_SCHEME) else {
            return Err(RpcError::new(
                INVALID_PARAMS,
                format!("Unknown resource: {}", params.uri),
            ));
        };

        let output = self
            .tools
            .execute(GREETING_TOOL, json!({ "name": name }))
            .await?;

        Ok(json!({
            "contents": [{
                "uri": params.uri,
                "mimeType": "text/plain",
                "text": output.as_str().unwrap_or_default()
            }]
        }))
    }
}
