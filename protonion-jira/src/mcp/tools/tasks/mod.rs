//! Jira task tools

pub mod create;
pub mod inspect;
pub mod list;
pub mod move_task;
pub mod search_colleague;

use crate::mcp::tool_registry::ToolRegistry;

/// Register all task tools with the registry
pub fn register_task_tools(registry: &mut ToolRegistry) {
    registry.register(list::ListMyTasksTool::new());
    registry.register(inspect::InspectTaskTool::new());
    registry.register(move_task::SafeMoveTaskTool::new());
    registry.register(create::CreateTaskTool::new());
    registry.register(search_colleague::SearchColleagueTool::new());
}
