//! Tool registry for MCP operations
//!
//! Each tool is a [`McpTool`] registered by name; the server looks tools up
//! here instead of matching on names.

use super::error_handling::McpErrorHandler;
use crate::cache::{ClientSlot, Memoized};
use crate::client::{find_active_user, BackendClient, BackendResult, UserMatch};
use crate::config::{ConfigSource, JiraConfig};
use crate::error::BackendError;
use crate::health::HealthReporter;
use futures_util::future::{BoxFuture, FutureExt};
use rmcp::model::{Annotated, CallToolResult, RawContent, RawTextContent, Tool};
use rmcp::Error as McpError;
use schemars::JsonSchema;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// How long colleague lookups are remembered
pub const USER_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// User search behind [`ColleagueLookup`]
pub type ColleagueSearch =
    Box<dyn Fn(&String) -> BoxFuture<'static, BackendResult<Option<UserMatch>>> + Send + Sync>;

/// Colleague lookups memoized by normalized name; `None` records "no match"
pub type ColleagueLookup = Memoized<String, Option<UserMatch>, ColleagueSearch>;

/// Context shared by all tools during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Settings loaded at startup
    pub config: Arc<JiraConfig>,
    /// Live view of the settings, read by the environment and health tools
    pub config_source: Arc<dyn ConfigSource>,
    /// The single shared backend client
    pub client_slot: Arc<ClientSlot>,
    /// Runs the four health probes
    pub health_reporter: Arc<HealthReporter>,
    /// Memoized colleague search
    pub colleague_lookup: Arc<ColleagueLookup>,
}

impl ToolContext {
    /// Build the context, wiring the reporter and lookup to the shared slot
    pub fn new(
        config: JiraConfig,
        config_source: Arc<dyn ConfigSource>,
        client_slot: Arc<ClientSlot>,
    ) -> Self {
        let health_reporter = HealthReporter::from_config(
            &config,
            Arc::clone(&config_source),
            Arc::clone(&client_slot),
        );
        let config = Arc::new(config);
        let colleague_lookup = colleague_lookup(Arc::clone(&config), Arc::clone(&client_slot));
        Self {
            config,
            config_source,
            client_slot,
            health_reporter: Arc::new(health_reporter),
            colleague_lookup: Arc::new(colleague_lookup),
        }
    }

    /// The shared backend client
    ///
    /// Fails before any network call when required settings are missing.
    pub async fn client(&self) -> Result<Arc<dyn BackendClient>, McpError> {
        shared_client(&self.config, &self.client_slot)
            .await
            .map_err(|e| McpErrorHandler::handle_backend_error(e, "get backend client"))
    }
}

async fn shared_client(
    config: &JiraConfig,
    client_slot: &ClientSlot,
) -> BackendResult<Arc<dyn BackendClient>> {
    let missing = config.missing_required();
    if !missing.is_empty() {
        return Err(BackendError::ConfigMissing(missing));
    }
    client_slot.get_or_create_client().await
}

fn colleague_lookup(config: Arc<JiraConfig>, client_slot: Arc<ClientSlot>) -> ColleagueLookup {
    let search: ColleagueSearch = Box::new(move |name: &String| {
        let config = Arc::clone(&config);
        let client_slot = Arc::clone(&client_slot);
        let name = name.clone();
        async move {
            let client = shared_client(&config, &client_slot).await?;
            let users = client.search_users(&name).await?;
            Ok(find_active_user(&users))
        }
        .boxed()
    });
    Memoized::new(USER_CACHE_TTL, search)
}

/// Trait defining the interface for all MCP tools
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Get the tool's name
    fn name(&self) -> &'static str;

    /// Get the tool's description
    fn description(&self) -> &'static str;

    /// Get the tool's JSON schema for arguments
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments and context
    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError>;
}

/// Registry for managing MCP tools
///
/// Tools are kept sorted by name so listings are stable.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: McpTool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Box::new(tool));
    }

    /// Look up a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// Names of every registered tool, sorted
    pub fn list_tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Get all registered tools as Tool objects for MCP list_tools response
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .values()
            .map(|tool| {
                let schema_map = match tool.schema() {
                    serde_json::Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };

                Tool {
                    name: tool.name().into(),
                    description: Some(tool.description().into()),
                    input_schema: Arc::new(schema_map),
                    annotations: None,
                }
            })
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Common helpers for tool implementations
pub struct BaseToolImpl;

impl BaseToolImpl {
    /// Parse tool arguments from a JSON map into a typed request
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<T, McpError> {
        serde_json::from_value(serde_json::Value::Object(arguments))
            .map_err(|e| McpError::invalid_request(format!("Invalid arguments: {e}"), None))
    }

    /// JSON schema of a request type
    pub fn schema_for<T: JsonSchema>() -> serde_json::Value {
        let schema = schemars::schema_for!(T);
        serde_json::to_value(schema).unwrap_or_else(|_| {
            serde_json::json!({ "type": "object", "properties": {} })
        })
    }

    /// Wrap `content` in a successful text result
    pub fn create_success_response<T: Into<String>>(content: T) -> CallToolResult {
        CallToolResult {
            content: vec![Annotated::new(
                RawContent::Text(RawTextContent {
                    text: content.into(),
                }),
                None,
            )],
            is_error: Some(false),
        }
    }

    /// Create an error result; `details` is appended after a colon
    pub fn create_error_response<T: Into<String>>(
        error: T,
        details: Option<String>,
    ) -> CallToolResult {
        let error_text = match details {
            Some(details) => format!("{}: {}", error.into(), details),
            None => error.into(),
        };

        CallToolResult {
            content: vec![Annotated::new(
                RawContent::Text(RawTextContent { text: error_text }),
                None,
            )],
            is_error: Some(true),
        }
    }
}

/// Text of the first content item of a tool result
pub fn response_text(result: &CallToolResult) -> Option<&str> {
    result.content.first().and_then(|content| match &content.raw {
        RawContent::Text(text) => Some(text.text.as_str()),
        _ => None,
    })
}
