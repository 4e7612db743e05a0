//! Greeting tool

use async_trait::async_trait;
use igdm_core::tool::parse_arguments;
use igdm_core::{Result, SchemaBuilder, Tool};
use serde::Deserialize;
use serde_json::Value;

/// Format the greeting for `name`
pub fn greeting(name: &str) -> String {
    format!("Hello, {}!", name)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GreetingInput {
    name: String,
}

/// Returns a personalized greeting
pub struct GreetingTool;

#[async_trait]
impl Tool for GreetingTool {
    fn name(&self) -> &str {
        "get_greeting"
    }

    fn description(&self) -> &str {
        "Get a personalized greeting."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object_schema(vec![(
            "name",
            "string",
            "Name to include in the greeting",
            true,
        )])
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let input: GreetingInput = parse_arguments(input)?;
        Ok(Value::String(greeting(&input.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_greeting() {
        assert_eq!(greeting("Ada"), "Hello, Ada!");
        assert_eq!(greeting("Ada"), greeting("Ada"));
    }

    #[tokio::test]
    async fn test_execute() {
        let output = GreetingTool.execute(json!({"name": "Ada"})).await.unwrap();
        assert_eq!(output, json!("Hello, Ada!"));
    }

    #[tokio::test]
    async fn test_missing_name() {
        assert!(GreetingTool.execute(json!({})).await.is_err());
    }
}
