use crate::client::{MCPClient, MCPTool};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for executing tools
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, tool_name: &str, arguments: &str) -> Result<String>;
    fn list_tools(&self) -> Vec<String>;
}

/// Tool executor that delegates to the bridge subprocess
///
/// Only operations from the loaded catalog are dispatched; anything else
/// is rejected before touching the bridge. Arguments arrive as the raw
/// JSON string the model produced, so a malformed payload fails here as a
/// regular execution error instead of tearing down the caller.
pub struct MCPToolExecutor {
    client: Arc<MCPClient>,
    tool_names: Vec<String>,
}

impl MCPToolExecutor {
    pub fn new(client: Arc<MCPClient>, catalog: &[MCPTool]) -> Self {
        Self {
            client,
            tool_names: catalog.iter().map(|t| t.name.clone()).collect(),
        }
    }
}

#[async_trait]
impl ToolExecutor for MCPToolExecutor {
    async fn execute(&self, tool_name: &str, arguments: &str) -> Result<String> {
        if !self.tool_names.iter().any(|n| n == tool_name) {
            anyhow::bail!("Tool '{}' not found", tool_name);
        }

        let args: serde_json::Value = serde_json::from_str(arguments)
            .with_context(|| format!("invalid arguments for tool '{}'", tool_name))?;

        let result = self.client.call_tool(tool_name, args).await?;
        Ok(result)
    }

    fn list_tools(&self) -> Vec<String> {
        self.tool_names.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Vec<MCPTool> {
        ["find", "count"]
            .iter()
            .map(|name| MCPTool {
                name: name.to_string(),
                description: None,
                input_schema: json!({"type": "object", "properties": {}, "required": []}),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_executor_lists_catalog_names() {
        let client = Arc::new(MCPClient::stub());
        let executor = MCPToolExecutor::new(client, &catalog());

        assert_eq!(executor.list_tools(), vec!["find", "count"]);
    }

    #[tokio::test]
    async fn test_executor_rejects_unknown_tool() {
        let client = Arc::new(MCPClient::stub());
        let executor = MCPToolExecutor::new(client, &catalog());

        let err = executor.execute("drop-database", "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "Tool 'drop-database' not found");
    }

    #[tokio::test]
    async fn test_executor_rejects_malformed_arguments() {
        let client = Arc::new(MCPClient::stub());
        let executor = MCPToolExecutor::new(client, &catalog());

        let err = executor.execute("find", "{not json").await.unwrap_err();
        assert!(err.to_string().contains("invalid arguments"));
    }
}
