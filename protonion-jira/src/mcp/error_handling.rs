//! Mapping of library errors onto MCP protocol errors

use crate::error::{BackendError, ValidationError};
use rmcp::Error as McpError;

/// Converts library errors into [`McpError`]s, logging each one
///
/// Caller mistakes (bad input, unknown issues, missing configuration) become
/// `invalid_params`; everything else becomes `internal_error`.
pub struct McpErrorHandler;

impl McpErrorHandler {
    /// Map rejected input to `invalid_params`, attaching the hint
    pub fn handle_validation_error(error: ValidationError, operation: &str) -> McpError {
        tracing::warn!("MCP operation '{}' rejected input: {}", operation, error);
        let data = serde_json::json!({
            "hint": error.hint(),
            "input": error.input(),
        });
        McpError::invalid_params(
            format!("⛔ Validation Error: {error}. Hint: {}", error.hint()),
            Some(data),
        )
    }

    /// Map a backend failure, logging it under `operation`
    pub fn handle_backend_error(error: BackendError, operation: &str) -> McpError {
        tracing::error!("MCP operation '{}' failed: {}", operation, error);

        match error {
            BackendError::NotFound(what) => {
                McpError::invalid_params(format!("Not found: {what}"), None)
            }
            BackendError::ConfigMissing(_) | BackendError::InvalidConfig(_) => {
                McpError::invalid_params(
                    format!("Configuration error: {error}. Run the health_check tool for details"),
                    None,
                )
            }
            BackendError::AuthRejected { .. } | BackendError::PermissionDenied(_) => {
                McpError::internal_error(format!("Jira refused the request: {error}"), None)
            }
            other => McpError::internal_error(format!("System Error: {other}"), None),
        }
    }
}
