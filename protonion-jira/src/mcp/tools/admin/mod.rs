//! Agent administration tools

pub mod health_check;
pub mod show_environment;

use crate::mcp::tool_registry::ToolRegistry;

/// Register all admin tools with the registry
pub fn register_admin_tools(registry: &mut ToolRegistry) {
    registry.register(health_check::HealthCheckTool::new());
    registry.register(show_environment::ShowEnvironmentTool::new());
}
