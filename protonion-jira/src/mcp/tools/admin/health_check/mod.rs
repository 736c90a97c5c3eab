//! Tool reporting the agent's health

use crate::health::format_health_report;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;
use schemars::JsonSchema;
use serde::Deserialize;

/// Output format of the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable report
    #[default]
    Text,
    /// Report serialized as JSON
    Json,
}

/// Request to run the health probes
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct HealthCheckRequest {
    /// `text` or `json`
    #[serde(default)]
    pub format: ReportFormat,
}

/// Tool for running the health probes
#[derive(Default)]
pub struct HealthCheckTool;

impl HealthCheckTool {
    /// Creates a new instance of the tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for HealthCheckTool {
    fn name(&self) -> &'static str {
        "health_check"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_for::<HealthCheckRequest>()
    }

    /// Always a successful tool result; an unhealthy report is still a report
    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: HealthCheckRequest = BaseToolImpl::parse_arguments(arguments)?;
        let report = context.health_reporter.run_health_check().await;

        let text = match request.format {
            ReportFormat::Text => format_health_report(&report),
            ReportFormat::Json => report
                .to_json()
                .map_err(|e| McpError::internal_error(format!("Failed to encode report: {e}"), None))?,
        };
        Ok(BaseToolImpl::create_success_response(text))
    }
}
