//! Tool listing the agent's open issues on a board

use crate::client::{IssueSummary, MY_OPEN_TASKS_JQL};
use crate::mcp::error_handling::McpErrorHandler;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::validation::{validate_board_id, validate_limit, BoardId, IntegerInput};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::Deserialize;

/// Number of issues listed when the caller gives no limit
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Request to list the agent's open issues
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListMyTasksRequest {
    /// Agile board to read; defaults to the configured board
    #[serde(default)]
    pub board_id: Option<IntegerInput>,
    /// Maximum number of issues to return
    #[serde(default)]
    pub limit: Option<IntegerInput>,
}

/// Tool for listing the caller's board issues
#[derive(Default)]
pub struct ListMyTasksTool;

impl ListMyTasksTool {
    /// Creates a new instance of the tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for ListMyTasksTool {
    fn name(&self) -> &'static str {
        "list_my_tasks"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_for::<ListMyTasksRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: ListMyTasksRequest = BaseToolImpl::parse_arguments(arguments)?;

        let board = validate_board_id(request.board_id.unwrap_or_else(|| {
            IntegerInput::Text(context.config.default_board_id.to_string())
        }))
        .map_err(|e| McpErrorHandler::handle_validation_error(e, "list_my_tasks"))?;

        let max_limit = context.config.max_limit;
        let limit = validate_limit(
            request
                .limit
                .unwrap_or(IntegerInput::Integer(i64::from(DEFAULT_LIST_LIMIT.min(max_limit)))),
            max_limit,
        )
        .map_err(|e| McpErrorHandler::handle_validation_error(e, "list_my_tasks"))?;

        let client = context.client().await?;
        let mut issues = client
            .board_issues(board, Some(MY_OPEN_TASKS_JQL), limit)
            .await
            .map_err(|e| McpErrorHandler::handle_backend_error(e, "list_my_tasks"))?;
        issues.truncate(limit as usize);

        tracing::info!("Listed {} open issues on board {}", issues.len(), board);
        Ok(BaseToolImpl::create_success_response(format_task_list(
            board, &issues,
        )))
    }
}

/// Render the task list shown to the caller
pub fn format_task_list(board: BoardId, issues: &[IssueSummary]) -> String {
    if issues.is_empty() {
        return "No pending tasks found.".to_string();
    }

    let mut lines = vec![format!("📋 PENDING TASKS (Board {board}):")];
    lines.extend(
        issues
            .iter()
            .map(|issue| format!("- [{}] {} ({})", issue.key, issue.summary, issue.status)),
    );
    lines.join("\n")
}
