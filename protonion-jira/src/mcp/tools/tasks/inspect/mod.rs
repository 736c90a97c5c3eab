//! Tool showing a digest of a single issue

use crate::client::IssueDigest;
use crate::mcp::error_handling::McpErrorHandler;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::validation::validate_issue_key;
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::Deserialize;

/// Request to inspect an issue
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InspectTaskRequest {
    /// Issue key such as `CRM-123`
    pub issue_key: String,
}

/// Tool for showing an issue digest
#[derive(Default)]
pub struct InspectTaskTool;

impl InspectTaskTool {
    /// Creates a new instance of the tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for InspectTaskTool {
    fn name(&self) -> &'static str {
        "inspect_task"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_for::<InspectTaskRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: InspectTaskRequest = BaseToolImpl::parse_arguments(arguments)?;
        let key = validate_issue_key(&request.issue_key)
            .map_err(|e| McpErrorHandler::handle_validation_error(e, "inspect_task"))?;

        let client = context.client().await?;
        let digest = client
            .issue_digest(&key)
            .await
            .map_err(|e| McpErrorHandler::handle_backend_error(e, "inspect_task"))?;

        tracing::info!("Inspected {}", key);
        Ok(BaseToolImpl::create_success_response(format_digest(&digest)))
    }
}

/// Render a digest as the tool's text response
pub fn format_digest(digest: &IssueDigest) -> String {
    format!(
        "🆔 {} | {} | {}\n👤 Assigned: {}\n📝 Summary: {}\n📄 Desc Snippet: {}\n💬 Last Comment ({} total): {}",
        digest.key,
        digest.status,
        digest.priority,
        digest.assignee,
        digest.summary,
        digest.description_snippet,
        digest.comments_count,
        digest.last_comment.as_deref().unwrap_or("None"),
    )
}
