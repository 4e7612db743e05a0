//! Tool manager for registering and executing tools

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::tool::{Tool, ToolDefinition};
use crate::Result;

/// Manager for registered tools
///
/// Handles tool registration, retrieval, and execution.
#[derive(Default, Clone)]
pub struct ToolManager {
    /// Registered tools indexed by name
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolManager {
    /// Create a new empty tool manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All registered tool definitions, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute a tool by name
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownTool`] if the tool is not registered,
    /// or whatever the tool returns for invalid arguments.
    pub async fn execute(&self, name: &str, input: JsonValue) -> Result<JsonValue> {
        let tool = self
            .get(name)
            .ok_or_else(|| crate::Error::UnknownTool(name.to_string()))?;
        tool.execute(input).await
    }

    /// Check if a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all registered tool names, sorted
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::SchemaBuilder;
    use crate::Error;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn input_schema(&self) -> JsonValue {
            SchemaBuilder::empty_object()
        }

        async fn execute(&self, input: JsonValue) -> Result<JsonValue> {
            Ok(input)
        }
    }

    #[tokio::test]
    async fn test_execute_registered_tool() {
        let mut manager = ToolManager::new();
        manager.register(Arc::new(EchoTool("echo")));

        let output = manager.execute("echo", json!({"a": 1})).await.unwrap();
        assert_eq!(output, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let manager = ToolManager::new();
        let err = manager.execute("missing", JsonValue::Null).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "missing"));
    }

    #[test]
    fn test_definitions_are_sorted() {
        let mut manager = ToolManager::new();
        manager.register(Arc::new(EchoTool("zeta")));
        manager.register(Arc::new(EchoTool("alpha")));
        manager.register(Arc::new(EchoTool("alpha")));

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.tool_names(), vec!["alpha", "zeta"]);
        let names: Vec<String> = manager.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
