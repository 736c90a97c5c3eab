//! Model Context Protocol (MCP) server support
//!
//! Tools are registered in a [`ToolRegistry`] and executed by [`McpServer`]
//! against a shared [`ToolContext`].

pub mod error_handling;
pub mod server;
pub mod tool_registry;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use error_handling::McpErrorHandler;
pub use server::McpServer;
pub use tool_registry::{
    response_text, BaseToolImpl, ColleagueLookup, McpTool, ToolContext, ToolRegistry,
    USER_CACHE_TTL,
};
