//! MCP server exposing the Jira tools over rmcp

use crate::cache::ClientSlot;
use crate::client::{ClientFactory, JiraClientFactory};
use crate::config::{ConfigSource, EnvConfigSource, JiraConfig};
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{Error as McpError, RoleServer, ServerHandler};
use std::sync::Arc;

use super::tool_registry::{ToolContext, ToolRegistry};
use super::tools::register_all_tools;

const SERVER_NAME: &str = "Protonion Jira";

const INSTRUCTIONS: &str = "A Jira task agent. Use list_my_tasks to see your open issues, \
inspect_task for the details of one issue, safe_move_task to change status along a legal \
workflow transition, create_task to open a new issue and search_colleague to find a teammate's \
account. Run health_check when a call fails with a configuration or connection error.";

/// MCP server for the Jira task tools
///
/// Owns the single [`ClientSlot`] shared by every tool call.
#[derive(Clone)]
pub struct McpServer {
    tool_registry: Arc<ToolRegistry>,
    /// Tool context containing shared state for tool execution
    pub tool_context: Arc<ToolContext>,
}

impl McpServer {
    /// Create a server whose backend clients come from `factory`
    pub fn new(
        config: JiraConfig,
        config_source: Arc<dyn ConfigSource>,
        factory: Arc<dyn ClientFactory>,
    ) -> Self {
        let client_slot = Arc::new(ClientSlot::with_ttl(factory, config.client_ttl));

        let mut tool_registry = ToolRegistry::new();
        register_all_tools(&mut tool_registry);
        tracing::debug!("Registered {} MCP tools", tool_registry.len());

        Self {
            tool_registry: Arc::new(tool_registry),
            tool_context: Arc::new(ToolContext::new(config, config_source, client_slot)),
        }
    }

    /// Create a server configured from the process environment
    ///
    /// Missing settings do not prevent startup; tools report them when called.
    pub fn from_env() -> Self {
        let source: Arc<dyn ConfigSource> = Arc::new(EnvConfigSource);
        let config = JiraConfig::load(source.as_ref());
        if !config.is_configured() {
            tracing::warn!(
                "Jira settings missing: {}",
                config.missing_required().join(", ")
            );
        }
        let factory = Arc::new(JiraClientFactory::new(config.clone()));
        Self::new(config, source, factory)
    }

    /// Names of the registered tools, sorted
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_registry.list_tool_names()
    }

    /// Execute a tool by name, as `call_tool` does
    pub async fn call_tool_by_name(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let tool = self.tool_registry.get_tool(name).ok_or_else(|| {
            McpError::invalid_request(format!("Unknown tool: {name}"), None)
        })?;

        tracing::debug!("Calling tool '{}'", name);
        tool.execute(arguments, &self.tool_context).await
    }
}

impl ServerHandler for McpServer {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_registry.list_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.call_tool_by_name(&request.name, request.arguments.unwrap_or_default())
            .await
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                prompts: None,
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                resources: None,
                logging: None,
                completions: None,
                experimental: None,
            },
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: crate::VERSION.into(),
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockBackendClient, MockClientFactory};
    use crate::config::MapConfigSource;
    use crate::mcp::test_support::{arguments, configured_source};
    use crate::mcp::tool_registry::response_text;
    use crate::validation::validate_issue_key;

    fn server_with(client: MockBackendClient) -> (McpServer, MockClientFactory) {
        let source = configured_source();
        let config = JiraConfig::load(&source);
        let factory = MockClientFactory::new(client);
        let server = McpServer::new(config, Arc::new(source), Arc::new(factory.clone()));
        (server, factory)
    }

    #[test]
    fn test_all_tools_registered() {
        let (server, _) = server_with(MockBackendClient::new());
        assert_eq!(
            server.tool_names(),
            vec![
                "create_task",
                "health_check",
                "inspect_task",
                "list_my_tasks",
                "safe_move_task",
                "search_colleague",
                "show_environment",
            ]
        );
    }

    #[test]
    fn test_server_info() {
        let (server, _) = server_with(MockBackendClient::new());
        let info = server.get_info();
        assert_eq!(info.server_info.name, "Protonion Jira");
        assert_eq!(info.server_info.version, crate::VERSION);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_none());
    }

    #[tokio::test]
    async fn test_tools_share_one_client() {
        let client = MockBackendClient::new();
        client.add_issue(&validate_issue_key("CRM-1").unwrap(), "Fix login", "To Do");
        let (server, factory) = server_with(client);

        for _ in 0..3 {
            server
                .call_tool_by_name("inspect_task", arguments(serde_json::json!({ "issue_key": "CRM-1" })))
                .await
                .unwrap();
        }
        server
            .call_tool_by_name("list_my_tasks", arguments(serde_json::json!({})))
            .await
            .unwrap();

        assert_eq!(factory.constructions(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rejected() {
        let (server, _) = server_with(MockBackendClient::new());
        let error = server
            .call_tool_by_name("delete_everything", serde_json::Map::new())
            .await
            .unwrap_err();
        assert!(error.message.contains("Unknown tool: delete_everything"));
    }

    #[tokio::test]
    async fn test_unconfigured_server_fails_fast() {
        let source = MapConfigSource::new();
        let config = JiraConfig::load(&source);
        let factory = MockClientFactory::default();
        let server = McpServer::new(config, Arc::new(source), Arc::new(factory.clone()));

        let error = server
            .call_tool_by_name("list_my_tasks", serde_json::Map::new())
            .await
            .unwrap_err();
        assert!(error.message.contains("JIRA_BASE_URL"));
        assert_eq!(factory.constructions(), 0);

        let result = server
            .call_tool_by_name("show_environment", serde_json::Map::new())
            .await
            .unwrap();
        assert!(response_text(&result).unwrap().contains("JIRA_API_TOKEN: Not set"));
    }
}
