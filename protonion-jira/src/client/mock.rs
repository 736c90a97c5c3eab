//! In-memory backend client for testing
//!
//! [`MockBackendClient`] keeps issues, comments and users in memory and
//! follows a small fixed workflow. [`MockConfig`] switches individual calls
//! to failure, delay or panic so callers can exercise their error paths.
//!
//! ```
//! use protonion_jira::client::{BackendClient, MockBackendClient};
//! use protonion_jira::validation::validate_issue_key;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let client = MockBackendClient::new();
//! let key = validate_issue_key("CRM-1").unwrap();
//! client.add_issue(&key, "Write docs", "To Do");
//!
//! let digest = client.issue_digest(&key).await.unwrap();
//! assert_eq!(digest.status, "To Do");
//! # });
//! ```

use super::{
    BackendClient, BackendResult, ClientFactory, CreatedIssue, Identity, IssueDigest,
    IssueSummary, NewIssue, ServerInfo, Transition, UserAccount,
};
use crate::error::BackendError;
use crate::validation::{BoardId, IssueKey};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Statuses of the mock workflow and the statuses reachable from each
const WORKFLOW: [(&str, &[&str]); 4] = [
    ("To Do", &["In Progress"]),
    ("In Progress", &["To Do", "In Review", "Done"]),
    ("In Review", &["In Progress", "Done"]),
    ("Done", &["To Do"]),
];

/// Controls simulated behavior of [`MockBackendClient`]
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Error returned by `ping`
    pub ping_error: Option<BackendError>,

    /// Error returned by `current_identity`
    pub identity_error: Option<BackendError>,

    /// Error returned by `check_capability`
    pub capability_error: Option<BackendError>,

    /// Error returned by every business operation
    pub operation_error: Option<BackendError>,

    /// Capabilities the mock account holds
    pub capabilities: HashSet<String>,

    /// Panic inside `ping`
    pub panic_on_ping: bool,

    /// Panic inside `current_identity`
    pub panic_on_identity: bool,

    /// Delay applied to `ping` and `current_identity` (in milliseconds)
    pub probe_delay_ms: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            ping_error: None,
            identity_error: None,
            capability_error: None,
            operation_error: None,
            capabilities: ["BROWSE_PROJECTS".to_string()].into_iter().collect(),
            panic_on_ping: false,
            panic_on_identity: false,
            probe_delay_ms: None,
        }
    }
}

#[derive(Debug, Clone)]
struct MockIssue {
    summary: String,
    description: String,
    status: String,
    assignee: Option<String>,
    comments: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
    issues: BTreeMap<String, MockIssue>,
    users: Vec<UserAccount>,
    next_issue_number: u64,
}

/// In-memory [`BackendClient`]
#[derive(Debug, Clone)]
pub struct MockBackendClient {
    state: Arc<Mutex<MockState>>,
    config: Arc<Mutex<MockConfig>>,
    identity: Identity,
    ping_calls: Arc<AtomicUsize>,
    search_calls: Arc<AtomicUsize>,
}

impl Default for MockBackendClient {
    fn default() -> Self {
        Self::new()
    }
}

fn recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBackendClient {
    /// Create an empty mock with default configuration
    pub fn new() -> Self {
        Self::new_with_config(MockConfig::default())
    }

    /// Create an empty mock with the given behavior
    pub fn new_with_config(config: MockConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                next_issue_number: 1000,
                ..MockState::default()
            })),
            config: Arc::new(Mutex::new(config)),
            identity: Identity {
                account_id: "mock-account".to_string(),
                display_name: "Mock Agent".to_string(),
                email_address: Some("agent@example.com".to_string()),
            },
            ping_calls: Arc::new(AtomicUsize::new(0)),
            search_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the configuration; clones of this client observe the change
    pub fn set_config(&self, config: MockConfig) {
        *recover(&self.config) = config;
    }

    /// Current simulated behavior
    pub fn config(&self) -> MockConfig {
        recover(&self.config).clone()
    }

    /// Add an issue assigned to the mock account
    pub fn add_issue(&self, key: &IssueKey, summary: &str, status: &str) {
        self.insert_issue(key, summary, status, Some(self.identity.display_name.clone()));
    }

    /// Add an issue with no assignee
    pub fn add_unassigned_issue(&self, key: &IssueKey, summary: &str, status: &str) {
        self.insert_issue(key, summary, status, None);
    }

    fn insert_issue(&self, key: &IssueKey, summary: &str, status: &str, assignee: Option<String>) {
        recover(&self.state).issues.insert(
            key.to_string(),
            MockIssue {
                summary: summary.to_string(),
                description: String::new(),
                status: status.to_string(),
                assignee,
                comments: Vec::new(),
            },
        );
    }

    /// Add an account returned by user search
    pub fn add_user(&self, user: UserAccount) {
        recover(&self.state).users.push(user);
    }

    /// Current status of `key`, if the issue exists
    pub fn issue_status(&self, key: &IssueKey) -> Option<String> {
        recover(&self.state)
            .issues
            .get(key.as_str())
            .map(|issue| issue.status.clone())
    }

    /// Comments posted on `key`, oldest first
    pub fn comments(&self, key: &IssueKey) -> Vec<String> {
        recover(&self.state)
            .issues
            .get(key.as_str())
            .map(|issue| issue.comments.clone())
            .unwrap_or_default()
    }

    /// Number of `ping` calls made so far
    pub fn ping_calls(&self) -> usize {
        self.ping_calls.load(Ordering::SeqCst)
    }

    /// Number of `search_users` calls made so far
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    async fn probe_delay(&self) {
        let delay = recover(&self.config).probe_delay_ms;
        if let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn operation_check(&self) -> BackendResult<()> {
        match &recover(&self.config).operation_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn not_found(key: &IssueKey) -> BackendError {
        BackendError::NotFound(format!("issue {key}"))
    }
}

#[async_trait]
impl BackendClient for MockBackendClient {
    async fn ping(&self) -> BackendResult<ServerInfo> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        self.probe_delay().await;

        let config = self.config();
        if config.panic_on_ping {
            panic!("simulated panic in ping");
        }
        if let Some(error) = config.ping_error {
            return Err(error);
        }
        Ok(ServerInfo {
            base_url: "https://mock.atlassian.net".to_string(),
            version: "1001.0.0".to_string(),
            server_title: "Mock Jira".to_string(),
        })
    }

    async fn current_identity(&self) -> BackendResult<Identity> {
        self.probe_delay().await;

        let config = self.config();
        if config.panic_on_identity {
            panic!("simulated panic in current_identity");
        }
        if let Some(error) = config.identity_error {
            return Err(error);
        }
        Ok(self.identity.clone())
    }

    async fn check_capability(&self, capability: &str) -> BackendResult<bool> {
        let config = self.config();
        if let Some(error) = config.capability_error {
            return Err(error);
        }
        Ok(config.capabilities.contains(capability))
    }

    async fn board_issues(
        &self,
        _board: BoardId,
        jql: Option<&str>,
        limit: u32,
    ) -> BackendResult<Vec<IssueSummary>> {
        self.operation_check()?;
        let mine_only = jql.is_some_and(|jql| jql.contains("currentUser()"));
        let open_only = jql.is_some_and(|jql| jql.contains("statusCategory != Done"));

        let state = recover(&self.state);
        Ok(state
            .issues
            .iter()
            .filter(|(_, issue)| {
                !mine_only || issue.assignee.as_deref() == Some(self.identity.display_name.as_str())
            })
            .filter(|(_, issue)| !open_only || issue.status != "Done")
            .take(limit as usize)
            .map(|(key, issue)| IssueSummary {
                key: key.clone(),
                summary: issue.summary.clone(),
                status: issue.status.clone(),
            })
            .collect())
    }

    async fn issue_digest(&self, key: &IssueKey) -> BackendResult<IssueDigest> {
        self.operation_check()?;
        let state = recover(&self.state);
        let issue = state
            .issues
            .get(key.as_str())
            .ok_or_else(|| Self::not_found(key))?;

        Ok(IssueDigest {
            key: key.to_string(),
            summary: issue.summary.clone(),
            status: issue.status.clone(),
            priority: "Medium".to_string(),
            assignee: issue
                .assignee
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
            description_snippet: if issue.description.is_empty() {
                "No description".to_string()
            } else {
                issue.description.clone()
            },
            comments_count: issue.comments.len() as u64,
            last_comment: issue.comments.last().cloned(),
        })
    }

    async fn transitions(&self, key: &IssueKey) -> BackendResult<Vec<Transition>> {
        self.operation_check()?;
        let state = recover(&self.state);
        let issue = state
            .issues
            .get(key.as_str())
            .ok_or_else(|| Self::not_found(key))?;

        let targets = WORKFLOW
            .iter()
            .find(|(status, _)| *status == issue.status)
            .map(|(_, targets)| *targets)
            .unwrap_or_default();

        Ok(targets
            .iter()
            .map(|target| Transition {
                id: transition_id(target),
                name: format!("Move to {target}"),
                to_status: target.to_string(),
            })
            .collect())
    }

    async fn apply_transition(&self, key: &IssueKey, transition_id_value: &str) -> BackendResult<()> {
        self.operation_check()?;
        let legal = self.transitions(key).await?;
        let target = legal
            .into_iter()
            .find(|transition| transition.id == transition_id_value)
            .ok_or_else(|| BackendError::Api {
                status: 400,
                message: format!("Transition id {transition_id_value} is not valid for {key}"),
            })?;

        let mut state = recover(&self.state);
        if let Some(issue) = state.issues.get_mut(key.as_str()) {
            issue.status = target.to_status;
        }
        Ok(())
    }

    async fn add_comment(&self, key: &IssueKey, body: &str) -> BackendResult<()> {
        self.operation_check()?;
        let mut state = recover(&self.state);
        let issue = state
            .issues
            .get_mut(key.as_str())
            .ok_or_else(|| Self::not_found(key))?;
        issue.comments.push(body.to_string());
        Ok(())
    }

    async fn create_issue(&self, new_issue: &NewIssue) -> BackendResult<CreatedIssue> {
        self.operation_check()?;
        let mut state = recover(&self.state);
        state.next_issue_number += 1;
        let id = state.next_issue_number;
        let key = format!("{}-{}", new_issue.project_key, id);

        state.issues.insert(
            key.clone(),
            MockIssue {
                summary: new_issue.summary.clone(),
                description: new_issue.description.clone(),
                status: "To Do".to_string(),
                assignee: None,
                comments: Vec::new(),
            },
        );

        Ok(CreatedIssue {
            id: id.to_string(),
            key,
        })
    }

    async fn search_users(&self, query: &str) -> BackendResult<Vec<UserAccount>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.operation_check()?;
        let needle = query.to_lowercase();
        Ok(recover(&self.state)
            .users
            .iter()
            .filter(|user| user.display_name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

fn transition_id(target: &str) -> String {
    WORKFLOW
        .iter()
        .position(|(status, _)| *status == target)
        .map(|index| ((index + 1) * 10 + 1).to_string())
        .unwrap_or_else(|| "0".to_string())
}

/// [`ClientFactory`] handing out a shared [`MockBackendClient`]
///
/// Every construction returns a handle to the same underlying mock, so a
/// test can seed and inspect state through [`MockClientFactory::client`].
#[derive(Debug, Clone, Default)]
pub struct MockClientFactory {
    client: MockBackendClient,
    construct_error: Arc<Mutex<Option<BackendError>>>,
    constructions: Arc<AtomicUsize>,
}

impl MockClientFactory {
    /// Create a factory that hands out `client`
    pub fn new(client: MockBackendClient) -> Self {
        Self {
            client,
            construct_error: Arc::new(Mutex::new(None)),
            constructions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make subsequent constructions fail with `error` (or succeed with `None`)
    pub fn fail_with(&self, error: Option<BackendError>) {
        *recover(&self.construct_error) = error;
    }

    /// The mock shared by every constructed client
    pub fn client(&self) -> &MockBackendClient {
        &self.client
    }

    /// Number of construction attempts, including failed ones
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl ClientFactory for MockClientFactory {
    fn construct(&self) -> BackendResult<Arc<dyn BackendClient>> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = recover(&self.construct_error).clone() {
            return Err(error);
        }
        Ok(Arc::new(self.client.clone()))
    }
}
