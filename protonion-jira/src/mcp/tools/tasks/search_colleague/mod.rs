//! Tool resolving a colleague's account by name

use crate::client::UserMatch;
use crate::mcp::error_handling::McpErrorHandler;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::validation::validate_non_empty;
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::Deserialize;

/// Request to find a colleague
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchColleagueRequest {
    /// Full or partial display name
    pub name: String,
}

/// Tool for resolving a colleague's account ID
#[derive(Default)]
pub struct SearchColleagueTool;

impl SearchColleagueTool {
    /// Creates a new instance of the tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for SearchColleagueTool {
    fn name(&self) -> &'static str {
        "search_colleague"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_for::<SearchColleagueRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: SearchColleagueRequest = BaseToolImpl::parse_arguments(arguments)?;
        let name = validate_non_empty(&request.name, "name")
            .map_err(|e| McpErrorHandler::handle_validation_error(e, "search_colleague"))?;

        let found = context
            .colleague_lookup
            .call(&name.to_lowercase())
            .await
            .map_err(|e| McpErrorHandler::handle_backend_error(e, "search_colleague"))?;

        Ok(BaseToolImpl::create_success_response(format_match(
            name,
            found.as_ref(),
        )))
    }
}

fn format_match(name: &str, found: Option<&UserMatch>) -> String {
    match found {
        Some(user) => format!("Found: {} (ID: {})", user.display_name, user.account_id),
        None => format!("No active user found matching '{name}'"),
    }
}
