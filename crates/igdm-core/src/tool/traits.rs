//! Tool trait definition

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::{Error, Result};

/// An operation exposed through the RPC front-end
///
/// `execute` returns `Err` only for dispatch-level failures such as bad
/// arguments. Failures of the operation itself are reported inside the
/// returned value so callers always get a response.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name (the RPC method name)
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the JSON schema for the tool's input parameters
    fn input_schema(&self) -> JsonValue;

    /// Execute the tool with the given keyword arguments
    async fn execute(&self, input: JsonValue) -> Result<JsonValue>;
}

/// Decode a tool's keyword arguments
///
/// A missing (`null`) params value is treated as an empty object.
pub fn parse_arguments<T: DeserializeOwned>(input: JsonValue) -> Result<T> {
    let input = match input {
        JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
        JsonValue::Object(_) => input,
        other => {
            return Err(Error::InvalidParams(format!(
                "expected keyword arguments object, got {}",
                other
            )));
        }
    };

    serde_json::from_value(input).map_err(|e| Error::InvalidParams(e.to_string()))
}
