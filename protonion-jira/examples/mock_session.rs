//! Drive the MCP tools against the in-memory backend
//!
//! Run with `cargo run --example mock_session`.

use protonion_jira::client::{MockBackendClient, MockClientFactory};
use protonion_jira::config::{JiraConfig, MapConfigSource};
use protonion_jira::mcp::response_text;
use protonion_jira::validation::validate_issue_key;
use protonion_jira::McpServer;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = MockBackendClient::new();
    client.add_issue(&validate_issue_key("CRM-101")?, "Draft release notes", "To Do");
    client.add_issue(&validate_issue_key("CRM-102")?, "Fix flaky test", "In Progress");

    let source = MapConfigSource::new()
        .with("JIRA_BASE_URL", "https://example.atlassian.net")
        .with("JIRA_EMAIL", "agent@example.com")
        .with("JIRA_API_TOKEN", "demo-token");
    let config = JiraConfig::load(&source);
    let server = McpServer::new(
        config,
        Arc::new(source),
        Arc::new(MockClientFactory::new(client)),
    );

    let calls = [
        ("list_my_tasks", serde_json::json!({})),
        (
            "safe_move_task",
            serde_json::json!({ "issue_key": "CRM-101", "target_status": "Done" }),
        ),
        (
            "safe_move_task",
            serde_json::json!({ "issue_key": "CRM-102", "target_status": "in review" }),
        ),
        ("inspect_task", serde_json::json!({ "issue_key": "CRM-102" })),
        ("health_check", serde_json::json!({})),
    ];

    for (tool, arguments) in calls {
        println!("$ {tool} {arguments}");
        let arguments = arguments.as_object().cloned().unwrap_or_default();
        match server.call_tool_by_name(tool, arguments).await {
            Ok(result) => println!("{}\n", response_text(&result).unwrap_or_default()),
            Err(e) => println!("error: {}\n", e.message),
        }
    }

    Ok(())
}
