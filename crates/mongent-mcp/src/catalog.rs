use crate::client::{MCPClient, MCPTool};
use crate::error::{BridgeError, Result};
use serde_json::{json, Value};

/// Fill in the object-schema fields the chat completions API requires
///
/// Bridge tools may advertise `{"type": "object"}` with no `properties` or
/// `required`; the model side rejects that shape, so both keys are added
/// when absent. Non-object schemas and already-complete schemas pass
/// through untouched, and applying this twice changes nothing.
pub fn normalize_schema(schema: &mut Value) {
    if let Some(obj) = schema.as_object_mut() {
        if obj.get("type").and_then(Value::as_str) == Some("object") {
            if !obj.contains_key("properties") {
                obj.insert("properties".to_string(), json!({}));
            }
            if !obj.contains_key("required") {
                obj.insert("required".to_string(), json!([]));
            }
        }
    }
}

/// Normalize every tool schema in place
pub fn normalize_tools(tools: &mut [MCPTool]) {
    for tool in tools {
        normalize_schema(&mut tool.input_schema);
    }
}

/// Resolve an ordered allow-list against the advertised tools
///
/// The result preserves allow-list order, not advertisement order. Loading
/// is strict: an operation the bridge does not advertise, or one advertised
/// without an input schema, fails the whole resolution rather than
/// producing a partial catalog.
pub fn resolve_allow_list(advertised: Vec<MCPTool>, allow_list: &[&str]) -> Result<Vec<MCPTool>> {
    let mut resolved = Vec::with_capacity(allow_list.len());

    for &name in allow_list {
        let tool = advertised
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| BridgeError::ToolLoad {
                name: name.to_string(),
                reason: "not advertised by the bridge".to_string(),
            })?;

        if tool.input_schema.is_null() {
            return Err(BridgeError::ToolLoad {
                name: name.to_string(),
                reason: "advertised without an input schema".to_string(),
            });
        }

        resolved.push(tool);
    }

    Ok(resolved)
}

/// Load the allowed operations from a connected bridge
///
/// Lists the advertised tools once, resolves the allow-list strictly and
/// normalizes every schema for the model side.
pub async fn load_tools(client: &MCPClient, allow_list: &[&str]) -> Result<Vec<MCPTool>> {
    let advertised = client.list_tools().await?;
    tracing::debug!(
        advertised = advertised.len(),
        allowed = allow_list.len(),
        "resolving bridge tool catalog"
    );

    let mut tools = resolve_allow_list(advertised, allow_list)?;
    normalize_tools(&mut tools);
    Ok(tools)
}

/// Convert bridge tools into the chat completions function-tool shape
pub fn to_llm_tools(tools: &[MCPTool]) -> Vec<mongent_llm::Tool> {
    tools
        .iter()
        .map(|tool| {
            mongent_llm::Tool::new(
                tool.name.clone(),
                tool.description.clone(),
                tool.input_schema.clone(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str, schema: Value) -> MCPTool {
        MCPTool {
            name: name.to_string(),
            description: Some(format!("MongoDB {} operation", name)),
            input_schema: schema,
        }
    }

    #[test]
    fn test_normalize_adds_missing_object_fields() {
        let mut schema = json!({"type": "object"});
        normalize_schema(&mut schema);

        assert_eq!(schema["properties"], json!({}));
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_normalize_preserves_existing_fields() {
        let mut schema = json!({
            "type": "object",
            "properties": {"filter": {"type": "object"}},
            "required": ["filter"]
        });
        let before = schema.clone();
        normalize_schema(&mut schema);

        assert_eq!(schema, before);
    }

    #[test]
    fn test_normalize_ignores_non_object_schemas() {
        let mut schema = json!({"type": "string"});
        normalize_schema(&mut schema);
        assert!(schema.get("properties").is_none());

        let mut schema = json!(["not", "an", "object"]);
        let before = schema.clone();
        normalize_schema(&mut schema);
        assert_eq!(schema, before);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut schema = json!({"type": "object"});
        normalize_schema(&mut schema);
        let once = schema.clone();
        normalize_schema(&mut schema);

        assert_eq!(schema, once);
    }

    #[test]
    fn test_resolve_preserves_allow_list_order() {
        let advertised = vec![
            tool("db-stats", json!({"type": "object"})),
            tool("count", json!({"type": "object"})),
            tool("find", json!({"type": "object"})),
            tool("drop-database", json!({"type": "object"})),
        ];

        let resolved = resolve_allow_list(advertised, &["find", "count", "db-stats"]).unwrap();
        let names: Vec<&str> = resolved.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["find", "count", "db-stats"]);
    }

    #[test]
    fn test_resolve_fails_on_missing_operation() {
        let advertised = vec![tool("find", json!({"type": "object"}))];

        let err = resolve_allow_list(advertised, &["find", "count"]).unwrap_err();
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn test_resolve_fails_on_missing_schema() {
        let advertised = vec![
            tool("find", json!({"type": "object"})),
            tool("count", Value::Null),
        ];

        let err = resolve_allow_list(advertised, &["find", "count"]).unwrap_err();
        assert!(err.to_string().contains("count"));
        assert!(err.to_string().contains("schema"));
    }

    #[test]
    fn test_resolve_produces_no_partial_catalog() {
        let advertised = vec![
            tool("find", json!({"type": "object"})),
            tool("count", json!({"type": "object"})),
        ];

        let result = resolve_allow_list(advertised, &["find", "count", "aggregate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_llm_tools_keeps_names_and_schemas() {
        let tools = vec![tool(
            "find",
            json!({"type": "object", "properties": {}, "required": []}),
        )];

        let llm_tools = to_llm_tools(&tools);
        assert_eq!(llm_tools.len(), 1);
        assert_eq!(llm_tools[0].name(), "find");
        assert_eq!(llm_tools[0].function.parameters["type"], "object");
    }
}
