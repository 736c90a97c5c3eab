//! MCP tool implementations
//!
//! Task tools operate on Jira issues; admin tools report on the agent itself.
//! Each tool lives in its own directory next to its `description.md`.

pub mod admin;
pub mod tasks;

use super::tool_registry::ToolRegistry;

/// Register every tool with the registry
pub fn register_all_tools(registry: &mut ToolRegistry) {
    tasks::register_task_tools(registry);
    admin::register_admin_tools(registry);
}
