//! Tool creating an issue in the configured project

use crate::client::NewIssue;
use crate::mcp::error_handling::McpErrorHandler;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::validation::validate_non_empty;
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::Deserialize;

/// Issue type used when the request names none
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// Request to create an issue
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskRequest {
    /// One-line title
    pub summary: String,
    /// Plain-text description
    #[serde(default)]
    pub description: String,
    /// Issue type name, `Task` when omitted
    #[serde(default)]
    pub issue_type: Option<String>,
}

/// Tool for creating an issue
#[derive(Default)]
pub struct CreateTaskTool;

impl CreateTaskTool {
    /// Creates a new instance of the tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for CreateTaskTool {
    fn name(&self) -> &'static str {
        "create_task"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_for::<CreateTaskRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: CreateTaskRequest = BaseToolImpl::parse_arguments(arguments)?;
        let summary = validate_non_empty(&request.summary, "summary")
            .map_err(|e| McpErrorHandler::handle_validation_error(e, "create_task"))?;
        let issue_type = request
            .issue_type
            .as_deref()
            .map(str::trim)
            .filter(|issue_type| !issue_type.is_empty())
            .unwrap_or(DEFAULT_ISSUE_TYPE);

        let new_issue = NewIssue {
            project_key: context.config.project_key.clone(),
            summary: summary.to_string(),
            description: request.description.trim().to_string(),
            issue_type: issue_type.to_string(),
        };

        let client = context.client().await?;
        let created = client
            .create_issue(&new_issue)
            .await
            .map_err(|e| McpErrorHandler::handle_backend_error(e, "create_task"))?;

        tracing::info!("Created {} in {}", created.key, new_issue.project_key);
        Ok(BaseToolImpl::create_success_response(format!(
            "✅ Created task {}: {}",
            created.key, new_issue.summary
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BackendClient, MockBackendClient};
    use crate::mcp::test_support::{arguments, configured_source, context_from, context_with};
    use crate::mcp::tool_registry::response_text;
    use crate::validation::validate_issue_key;
    use rmcp::model::ErrorCode;

    #[tokio::test]
    async fn test_creates_in_configured_project() {
        let client = MockBackendClient::new();
        let context = context_from(configured_source().with("JIRA_PROJECT_KEY", "OPS"), client.clone());

        let result = CreateTaskTool::new()
            .execute(
                arguments(serde_json::json!({ "summary": "  Rotate keys  " })),
                &context,
            )
            .await
            .unwrap();

        assert_eq!(response_text(&result), Some("✅ Created task OPS-1001: Rotate keys"));
        let key = validate_issue_key("OPS-1001").unwrap();
        let digest = client.issue_digest(&key).await.unwrap();
        assert_eq!(digest.summary, "Rotate keys");
        assert_eq!(digest.status, "To Do");
    }

    #[tokio::test]
    async fn test_blank_summary_is_rejected() {
        let context = context_with(MockBackendClient::new());
        let error = CreateTaskTool::new()
            .execute(arguments(serde_json::json!({ "summary": "   " })), &context)
            .await
            .unwrap_err();

        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
        assert!(error.message.contains("summary"));
    }

    #[tokio::test]
    async fn test_missing_summary_is_rejected() {
        let context = context_with(MockBackendClient::new());
        let result = CreateTaskTool::new()
            .execute(arguments(serde_json::json!({ "description": "x" })), &context)
            .await;
        assert!(result.is_err());
    }
}
