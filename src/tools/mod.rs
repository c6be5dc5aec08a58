//! Functions registered with the agent host.

mod knowledge;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::KnowledgeError;

pub use knowledge::{KnowledgeTool, QUERY_KNOWLEDGE};

/// Function signature advertised to the host, parameters as JSON Schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A host-issued invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default, alias = "args", alias = "parameters")]
    pub arguments: Value,
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![KnowledgeTool::definition()]
}

pub async fn execute_tool(
    knowledge: &KnowledgeTool,
    tool_name: &str,
    args: &Value,
) -> Result<String, KnowledgeError> {
    match tool_name {
        QUERY_KNOWLEDGE => knowledge.call(args).await,
        _ => Err(KnowledgeError::BadArguments(format!(
            "Unknown tool: {}",
            tool_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_calls_accept_common_argument_keys() {
        let call: ToolCall = serde_json::from_value(json!({
            "name": "query_knowledge",
            "args": { "tokens": "budget" }
        }))
        .unwrap();
        assert_eq!(call.name, QUERY_KNOWLEDGE);
        assert_eq!(call.arguments["tokens"], "budget");

        let bare: ToolCall = serde_json::from_value(json!({ "name": "query_knowledge" })).unwrap();
        assert!(bare.arguments.is_null());
    }

    #[test]
    fn definitions_list_query_knowledge() {
        let names: Vec<String> = definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["query_knowledge"]);
    }
}
