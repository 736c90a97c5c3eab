//! Backend client contract
//!
//! Tools and the health reporter talk to Jira only through
//! [`BackendClient`]. [`JiraClient`] implements it over HTTP and
//! [`MockBackendClient`] implements it in memory for tests.

mod jira;
pub mod mock;
mod types;

pub use jira::{JiraClient, JiraClientFactory};
pub use mock::{MockBackendClient, MockClientFactory, MockConfig};
pub use types::*;

use crate::error::BackendError;
use crate::validation::{BoardId, IssueKey};
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Operations the agent needs from Jira
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Lightweight reachability check
    async fn ping(&self) -> BackendResult<ServerInfo>;

    /// The account the credentials belong to
    async fn current_identity(&self) -> BackendResult<Identity>;

    /// Whether the account holds the named permission
    async fn check_capability(&self, capability: &str) -> BackendResult<bool>;

    /// Issues on a board, optionally filtered by JQL
    async fn board_issues(
        &self,
        board: BoardId,
        jql: Option<&str>,
        limit: u32,
    ) -> BackendResult<Vec<IssueSummary>>;

    /// Key fields, description snippet and latest comment of one issue
    async fn issue_digest(&self, key: &IssueKey) -> BackendResult<IssueDigest>;

    /// Transitions currently legal for the issue
    async fn transitions(&self, key: &IssueKey) -> BackendResult<Vec<Transition>>;

    /// Apply the transition with `transition_id`
    async fn apply_transition(&self, key: &IssueKey, transition_id: &str) -> BackendResult<()>;

    /// Post a plain-text comment
    async fn add_comment(&self, key: &IssueKey, body: &str) -> BackendResult<()>;

    /// Create an issue, returning its key
    async fn create_issue(&self, issue: &NewIssue) -> BackendResult<CreatedIssue>;

    /// Accounts whose name matches `query`
    async fn search_users(&self, query: &str) -> BackendResult<Vec<UserAccount>>;
}

/// Builds backend clients for the client slot
///
/// Construction attaches credentials but makes no network call.
pub trait ClientFactory: Send + Sync {
    /// Build a client from the current settings
    fn construct(&self) -> BackendResult<Arc<dyn BackendClient>>;
}

/// Move an issue to `target` only if a legal transition leads there
///
/// The target is matched case-insensitively against each transition's
/// destination status. When nothing matches, the legal destinations are
/// returned in [`TransitionOutcome::Blocked`] and no write is made.
pub async fn safe_transition(
    client: &dyn BackendClient,
    key: &IssueKey,
    target: &str,
) -> BackendResult<TransitionOutcome> {
    let transitions = client.transitions(key).await?;
    let wanted = target.trim().to_lowercase();

    match transitions
        .iter()
        .find(|transition| transition.to_status.to_lowercase() == wanted)
    {
        Some(transition) => {
            client.apply_transition(key, &transition.id).await?;
            tracing::info!("Moved {} to '{}'", key, transition.to_status);
            Ok(TransitionOutcome::Moved {
                new_status: transition.to_status.clone(),
            })
        }
        None => Ok(TransitionOutcome::Blocked {
            requested: target.trim().to_string(),
            valid_transitions: transitions
                .into_iter()
                .map(|transition| transition.to_status)
                .collect(),
        }),
    }
}

/// Pick the first active Atlassian account from a user search
pub fn find_active_user(users: &[UserAccount]) -> Option<UserMatch> {
    users
        .iter()
        .find(|user| user.active && user.account_type == "atlassian")
        .map(UserMatch::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_issue_key;

    fn user(id: &str, account_type: &str, active: bool) -> UserAccount {
        UserAccount {
            account_id: id.to_string(),
            account_type: account_type.to_string(),
            display_name: format!("User {id}"),
            email_address: None,
            active,
        }
    }

    #[test]
    fn test_find_active_user_skips_apps_and_inactive() {
        let users = vec![
            user("bot", "app", true),
            user("gone", "atlassian", false),
            user("ana", "atlassian", true),
            user("bo", "atlassian", true),
        ];
        assert_eq!(find_active_user(&users).unwrap().account_id, "ana");
        assert!(find_active_user(&users[..2]).is_none());
        assert!(find_active_user(&[]).is_none());
    }

    #[tokio::test]
    async fn test_safe_transition_matches_case_insensitively() {
        let client = MockBackendClient::new();
        let key = validate_issue_key("CRM-1").unwrap();
        client.add_issue(&key, "Ship it", "To Do");

        let outcome = safe_transition(&client, &key, "in progress").await.unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Moved {
                new_status: "In Progress".to_string()
            }
        );
        assert_eq!(client.issue_status(&key).as_deref(), Some("In Progress"));
    }

    #[tokio::test]
    async fn test_safe_transition_blocked_lists_legal_targets() {
        let client = MockBackendClient::new();
        let key = validate_issue_key("CRM-2").unwrap();
        client.add_issue(&key, "Ship it", "To Do");

        let outcome = safe_transition(&client, &key, "Archived").await.unwrap();
        match outcome {
            TransitionOutcome::Blocked {
                requested,
                valid_transitions,
            } => {
                assert_eq!(requested, "Archived");
                assert!(valid_transitions.contains(&"In Progress".to_string()));
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert_eq!(client.issue_status(&key).as_deref(), Some("To Do"));
    }

    #[tokio::test]
    async fn test_safe_transition_unknown_issue_is_not_found() {
        let client = MockBackendClient::new();
        let key = validate_issue_key("CRM-404").unwrap();

        let err = safe_transition(&client, &key, "Done").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
