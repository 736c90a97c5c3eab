//! Tool moving an issue along a legal workflow transition

use crate::client::{safe_transition, TransitionOutcome};
use crate::mcp::error_handling::McpErrorHandler;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::validation::{validate_issue_key, validate_status, IssueKey};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::Deserialize;

/// Prefix marking comments written by the agent
pub const AGENT_COMMENT_PREFIX: &str = "🤖 [Agent]: ";

/// Request to move an issue
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SafeMoveTaskRequest {
    /// Issue key such as `CRM-123`
    pub issue_key: String,
    /// Destination status, matched case-insensitively
    pub target_status: String,
    /// Optional note added after the move
    #[serde(default)]
    pub comment: Option<String>,
}

/// Tool for moving an issue along its workflow
#[derive(Default)]
pub struct SafeMoveTaskTool;

impl SafeMoveTaskTool {
    /// Creates a new instance of the tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for SafeMoveTaskTool {
    fn name(&self) -> &'static str {
        "safe_move_task"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_for::<SafeMoveTaskRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: SafeMoveTaskRequest = BaseToolImpl::parse_arguments(arguments)?;
        let key = validate_issue_key(&request.issue_key)
            .map_err(|e| McpErrorHandler::handle_validation_error(e, "safe_move_task"))?;
        let target = validate_status(&request.target_status)
            .map_err(|e| McpErrorHandler::handle_validation_error(e, "safe_move_task"))?;
        let comment = request
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|comment| !comment.is_empty());

        let client = context.client().await?;
        let outcome = safe_transition(client.as_ref(), &key, target.as_str())
            .await
            .map_err(|e| McpErrorHandler::handle_backend_error(e, "safe_move_task"))?;

        match outcome {
            TransitionOutcome::Moved { new_status } => {
                let mut text = format!("✅ Successfully moved '{key}' to '{new_status}'");
                if let Some(comment) = comment {
                    let body = format!("{AGENT_COMMENT_PREFIX}{comment}");
                    if let Err(e) = client.add_comment(&key, &body).await {
                        tracing::warn!("Moved {} but adding the comment failed: {}", key, e);
                        text.push_str(&format!("\n⚠️ Comment not added: {e}"));
                    }
                }
                Ok(BaseToolImpl::create_success_response(text))
            }
            TransitionOutcome::Blocked {
                requested,
                valid_transitions,
            } => {
                tracing::info!("Refused to move {} to '{}'", key, requested);
                Ok(BaseToolImpl::create_error_response(
                    blocked_message(&key, &requested, &valid_transitions),
                    None,
                ))
            }
        }
    }
}

fn blocked_message(key: &IssueKey, requested: &str, valid_transitions: &[String]) -> String {
    let legal = if valid_transitions.is_empty() {
        "(none)".to_string()
    } else {
        valid_transitions.join(", ")
    };
    format!(
        "⛔ BLOCKER: Cannot move '{key}' to '{requested}'. Legal transitions are: {legal}\n💡 Retry with one of the legal statuses as target_status"
    )
}
