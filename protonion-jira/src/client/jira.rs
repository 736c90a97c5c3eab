//! Jira Cloud REST client

use super::{
    adf_paragraph, BackendClient, BackendResult, ClientFactory, CreatedIssue, Identity,
    IssueDigest, IssueSummary, NewIssue, ServerInfo, Transition, UserAccount,
};
use crate::config::JiraConfig;
use crate::error::BackendError;
use crate::validation::{BoardId, IssueKey};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_SEARCH_LIMIT: u32 = 10;
const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP client for the Jira REST v3 and Agile 1.0 APIs
///
/// Authenticates every request with HTTP basic auth (account email and
/// API token).
pub struct JiraClient {
    http: Client,
    api_base: String,
    agile_base: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Build a client from explicit settings
    ///
    /// The base URL must be an absolute `http` or `https` URL. No request is
    /// sent.
    pub fn new(base_url: &str, email: &str, api_token: &str) -> BackendResult<Self> {
        let base = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(base)
            .map_err(|e| BackendError::InvalidConfig(format!("JIRA_BASE_URL '{base}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::InvalidConfig(format!(
                "JIRA_BASE_URL '{base}' must use http or https"
            )));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: format!("{base}/rest/api/3"),
            agile_base: format!("{base}/rest/agile/1.0"),
            email: email.to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Build a client from loaded configuration
    pub fn from_config(config: &JiraConfig) -> BackendResult<Self> {
        let missing = config.missing_required();
        match (&config.base_url, &config.email, &config.api_token) {
            (Some(base_url), Some(email), Some(api_token)) => {
                Self::new(base_url, email, api_token)
            }
            _ => Err(BackendError::ConfigMissing(missing)),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint)
    }

    /// Send a request and decode a JSON body; empty bodies decode as `null`
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!("Jira request failed before a response: {}", e);
            BackendError::Transport(e.to_string())
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            tracing::debug!("Jira returned {} for {}", status, url);
            return Err(map_status(status, &url, &body));
        }

        let text = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(text).map_err(|e| BackendError::Decode(format!("{url}: {e}")))
    }
}

/// Map a non-success HTTP status to a [`BackendError`]
fn map_status(status: StatusCode, path: &str, body: &str) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED => BackendError::AuthRejected {
            status: status.as_u16(),
        },
        StatusCode::FORBIDDEN => BackendError::PermissionDenied(path.to_string()),
        StatusCode::NOT_FOUND => BackendError::NotFound(path.to_string()),
        _ => BackendError::Api {
            status: status.as_u16(),
            message: error_message(body),
        },
    }
}

/// Pull the human-readable part out of a Jira error body
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let mut messages: Vec<String> = value["errorMessages"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|message| message.as_str().map(str::to_string))
            .collect();
        if let Some(errors) = value["errors"].as_object() {
            messages.extend(
                errors
                    .iter()
                    .map(|(field, message)| format!("{field}: {}", message.as_str().unwrap_or(""))),
            );
        }
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }
    super::truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS)
}

#[async_trait]
impl BackendClient for JiraClient {
    async fn ping(&self) -> BackendResult<ServerInfo> {
        self.send_json(self.request(Method::GET, &self.api_url("serverInfo")))
            .await
    }

    async fn current_identity(&self) -> BackendResult<Identity> {
        self.send_json(self.request(Method::GET, &self.api_url("myself")))
            .await
    }

    async fn check_capability(&self, capability: &str) -> BackendResult<bool> {
        let request = self
            .request(Method::GET, &self.api_url("mypermissions"))
            .query(&[("permissions", capability)]);
        let value: Value = self.send_json(request).await?;
        Ok(value["permissions"][capability]["havePermission"]
            .as_bool()
            .unwrap_or(false))
    }

    async fn board_issues(
        &self,
        board: BoardId,
        jql: Option<&str>,
        limit: u32,
    ) -> BackendResult<Vec<IssueSummary>> {
        let url = format!("{}/board/{}/issue", self.agile_base, board);
        let mut request = self
            .request(Method::GET, &url)
            .query(&[("maxResults", limit.to_string())]);
        if let Some(jql) = jql {
            request = request.query(&[("jql", jql)]);
        }

        let value: Value = self.send_json(request).await?;
        Ok(value["issues"]
            .as_array()
            .into_iter()
            .flatten()
            .map(IssueSummary::from_issue_json)
            .collect())
    }

    async fn issue_digest(&self, key: &IssueKey) -> BackendResult<IssueDigest> {
        let value: Value = self
            .send_json(self.request(Method::GET, &self.api_url(&format!("issue/{key}"))))
            .await?;
        Ok(IssueDigest::from_issue_json(&value))
    }

    async fn transitions(&self, key: &IssueKey) -> BackendResult<Vec<Transition>> {
        let value: Value = self
            .send_json(self.request(
                Method::GET,
                &self.api_url(&format!("issue/{key}/transitions")),
            ))
            .await?;
        Ok(value["transitions"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Transition::from_json)
            .collect())
    }

    async fn apply_transition(&self, key: &IssueKey, transition_id: &str) -> BackendResult<()> {
        let request = self
            .request(
                Method::POST,
                &self.api_url(&format!("issue/{key}/transitions")),
            )
            .json(&serde_json::json!({ "transition": { "id": transition_id } }));
        let _: Value = self.send_json(request).await?;
        Ok(())
    }

    async fn add_comment(&self, key: &IssueKey, body: &str) -> BackendResult<()> {
        let request = self
            .request(Method::POST, &self.api_url(&format!("issue/{key}/comment")))
            .json(&serde_json::json!({ "body": adf_paragraph(body) }));
        let _: Value = self.send_json(request).await?;
        Ok(())
    }

    async fn create_issue(&self, issue: &NewIssue) -> BackendResult<CreatedIssue> {
        let request = self
            .request(Method::POST, &self.api_url("issue"))
            .json(&issue.to_request_body());
        self.send_json(request).await
    }

    async fn search_users(&self, query: &str) -> BackendResult<Vec<UserAccount>> {
        let request = self
            .request(Method::GET, &self.api_url("user/search"))
            .query(&[("query", query.to_string()), ("maxResults", USER_SEARCH_LIMIT.to_string())]);
        let users: Option<Vec<UserAccount>> = self.send_json(request).await?;
        Ok(users.unwrap_or_default())
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("api_base", &self.api_base)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// Builds [`JiraClient`]s from a fixed configuration
#[derive(Debug, Clone)]
pub struct JiraClientFactory {
    config: JiraConfig,
}

impl JiraClientFactory {
    /// Create a factory reading credentials from `config`
    pub fn new(config: JiraConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for JiraClientFactory {
    fn construct(&self) -> BackendResult<Arc<dyn BackendClient>> {
        let client = JiraClient::from_config(&self.config)?;
        tracing::info!("Constructed Jira client for {}", client.api_base);
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigSource;

    #[test]
    fn test_new_rejects_bad_base_url() {
        assert!(matches!(
            JiraClient::new("not a url", "a@b.c", "t"),
            Err(BackendError::InvalidConfig(_))
        ));
        assert!(matches!(
            JiraClient::new("ftp://example.com", "a@b.c", "t"),
            Err(BackendError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_derives_api_bases() {
        let client = JiraClient::new("https://example.atlassian.net/", "a@b.c", "t").unwrap();
        assert_eq!(client.api_base, "https://example.atlassian.net/rest/api/3");
        assert_eq!(client.agile_base, "https://example.atlassian.net/rest/agile/1.0");
        assert_eq!(
            client.api_url("issue/CRM-1"),
            "https://example.atlassian.net/rest/api/3/issue/CRM-1"
        );
    }

    #[test]
    fn test_factory_reports_missing_settings() {
        let config = JiraConfig::load(
            &MapConfigSource::new().with("JIRA_BASE_URL", "https://example.atlassian.net"),
        );
        let err = JiraClientFactory::new(config).construct().err().unwrap();
        assert_eq!(
            err,
            BackendError::ConfigMissing(vec![
                "JIRA_EMAIL".to_string(),
                "JIRA_API_TOKEN".to_string()
            ])
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = JiraClient::new("https://example.atlassian.net", "a@b.c", "secret").unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_map_status() {
        assert_eq!(
            map_status(StatusCode::UNAUTHORIZED, "/myself", ""),
            BackendError::AuthRejected { status: 401 }
        );
        assert!(map_status(StatusCode::NOT_FOUND, "/issue/CRM-1", "").is_not_found());
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, "/issue", ""),
            BackendError::PermissionDenied(_)
        ));
        assert_eq!(
            map_status(
                StatusCode::BAD_REQUEST,
                "/issue",
                r#"{"errorMessages":[],"errors":{"summary":"You must specify a summary"}}"#
            ),
            BackendError::Api {
                status: 400,
                message: "summary: You must specify a summary".to_string()
            }
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body_text() {
        assert_eq!(error_message("  Service Unavailable "), "Service Unavailable");
        assert_eq!(
            error_message(r#"{"errorMessages":["Issue does not exist"]}"#),
            "Issue does not exist"
        );
    }
}
