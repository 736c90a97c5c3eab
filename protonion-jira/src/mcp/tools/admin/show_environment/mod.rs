//! Tool showing the masked connection settings

use crate::config::environment_summary;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;

/// Tool for showing the active settings
#[derive(Default)]
pub struct ShowEnvironmentTool;

impl ShowEnvironmentTool {
    /// Creates a new instance of the tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for ShowEnvironmentTool {
    fn name(&self) -> &'static str {
        "show_environment"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let lines: Vec<String> = environment_summary(context.config_source.as_ref())
            .into_iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        Ok(BaseToolImpl::create_success_response(lines.join("\n")))
    }
}
