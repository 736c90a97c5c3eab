//! Helpers for tool tests

use super::tool_registry::ToolContext;
use crate::cache::ClientSlot;
use crate::client::{MockBackendClient, MockClientFactory};
use crate::config::{ConfigSource, JiraConfig, MapConfigSource};
use std::sync::Arc;

pub fn configured_source() -> MapConfigSource {
    MapConfigSource::new()
        .with("JIRA_BASE_URL", "https://example.atlassian.net")
        .with("JIRA_EMAIL", "agent@example.com")
        .with("JIRA_API_TOKEN", "abcd-secret")
        .with("JIRA_MAX_LIMIT", "50")
}

/// A fully configured context whose client is `client`
pub fn context_with(client: MockBackendClient) -> ToolContext {
    context_from(configured_source(), client)
}

pub fn context_from(source: MapConfigSource, client: MockBackendClient) -> ToolContext {
    let config = JiraConfig::load(&source);
    let source: Arc<dyn ConfigSource> = Arc::new(source);
    let slot = Arc::new(ClientSlot::new(Arc::new(MockClientFactory::new(client))));
    ToolContext::new(config, source, slot)
}

pub fn arguments(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
