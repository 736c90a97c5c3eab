//! Data shapes exchanged with the backend

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum characters kept from an issue description
pub const DESCRIPTION_SNIPPET_CHARS: usize = 300;

/// Response of the lightweight server-info call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Site root reported by the server
    #[serde(default)]
    pub base_url: String,
    /// Server version string
    #[serde(default)]
    pub version: String,
    /// Site title
    #[serde(default)]
    pub server_title: String,
}

/// The account the client is authenticated as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque account identifier
    pub account_id: String,
    /// Name shown in the Jira UI
    #[serde(default)]
    pub display_name: String,
    /// Email, hidden by some privacy settings
    #[serde(default)]
    pub email_address: Option<String>,
}

/// A row of the board listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    /// Issue key, e.g. `CRM-20`
    pub key: String,
    /// One-line title
    pub summary: String,
    /// Current status name
    pub status: String,
}

impl IssueSummary {
    /// Extract the listing fields from an issue JSON object
    pub fn from_issue_json(issue: &Value) -> Self {
        let fields = &issue["fields"];
        Self {
            key: issue["key"].as_str().unwrap_or_default().to_string(),
            summary: fields["summary"].as_str().unwrap_or_default().to_string(),
            status: fields["status"]["name"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string(),
        }
    }
}

/// A compact view of one issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDigest {
    /// Issue key, e.g. `CRM-20`
    pub key: String,
    /// One-line title
    pub summary: String,
    /// Current status name
    pub status: String,
    /// Priority name, `None` when unset
    pub priority: String,
    /// Assignee display name, `Unassigned` when unset
    pub assignee: String,
    /// Start of the description
    pub description_snippet: String,
    /// Total number of comments
    pub comments_count: u64,
    /// Text of the newest comment
    pub last_comment: Option<String>,
}

impl IssueDigest {
    /// Build a digest from the JSON returned by the issue endpoint
    ///
    /// Missing fields get placeholder text rather than failing, so a digest
    /// can always be produced for an issue that exists.
    pub fn from_issue_json(issue: &Value) -> Self {
        let fields = &issue["fields"];

        let description_snippet = match &fields["description"] {
            Value::String(text) => truncate_chars(text, DESCRIPTION_SNIPPET_CHARS),
            doc @ Value::Object(_) => {
                let text = adf_to_text(doc);
                if text.is_empty() {
                    "Complex content".to_string()
                } else {
                    truncate_chars(&text, DESCRIPTION_SNIPPET_CHARS)
                }
            }
            _ => "No description".to_string(),
        };

        let comments = fields["comment"]["comments"].as_array();
        let last_comment = comments
            .and_then(|comments| comments.last())
            .map(|comment| match &comment["body"] {
                Value::String(text) => text.clone(),
                body => {
                    let text = adf_to_text(body);
                    if text.is_empty() {
                        "Rich text comment".to_string()
                    } else {
                        text
                    }
                }
            });
        let comments_count = fields["comment"]["total"]
            .as_u64()
            .or_else(|| comments.map(|comments| comments.len() as u64))
            .unwrap_or(0);

        Self {
            key: issue["key"].as_str().unwrap_or_default().to_string(),
            summary: fields["summary"]
                .as_str()
                .unwrap_or("No summary")
                .to_string(),
            status: fields["status"]["name"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string(),
            priority: fields["priority"]["name"]
                .as_str()
                .unwrap_or("None")
                .to_string(),
            assignee: fields["assignee"]["displayName"]
                .as_str()
                .unwrap_or("Unassigned")
                .to_string(),
            description_snippet,
            comments_count,
            last_comment,
        }
    }
}

/// A workflow transition available from the issue's current status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Transition ID passed back to apply it
    pub id: String,
    /// Transition name shown in the workflow
    pub name: String,
    /// Status the issue lands in
    pub to_status: String,
}

impl Transition {
    /// Parse one entry of the transitions response
    pub fn from_json(transition: &Value) -> Option<Self> {
        Some(Self {
            id: transition["id"].as_str()?.to_string(),
            name: transition["name"].as_str().unwrap_or_default().to_string(),
            to_status: transition["to"]["name"].as_str()?.to_string(),
        })
    }
}

/// Result of a validated transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The issue now has `new_status`
    Moved {
        /// Status after the transition
        new_status: String,
    },
    /// No legal transition leads to the requested status
    Blocked {
        /// The status that was asked for
        requested: String,
        /// Statuses reachable from the current one
        valid_transitions: Vec<String>,
    },
}

/// Fields for a new issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Key of the project the issue is filed in
    pub project_key: String,
    /// One-line title
    pub summary: String,
    /// Plain-text body; blank means no description
    pub description: String,
    /// Issue type name, e.g. `Task`
    pub issue_type: String,
}

impl NewIssue {
    /// Request body for the create-issue endpoint
    ///
    /// A blank description is left out: Jira rejects empty ADF text nodes.
    pub fn to_request_body(&self) -> Value {
        let mut fields = serde_json::json!({
            "project": { "key": self.project_key },
            "summary": self.summary,
            "issuetype": { "name": self.issue_type },
        });
        let description = self.description.trim();
        if !description.is_empty() {
            fields["description"] = adf_paragraph(description);
        }
        serde_json::json!({ "fields": fields })
    }
}

/// Response of the create-issue endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// Numeric issue ID
    pub id: String,
    /// Issue key, e.g. `CRM-21`
    pub key: String,
}

/// A user returned by the user search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Opaque account identifier
    pub account_id: String,
    /// `atlassian` for people, `app` for bots
    #[serde(default)]
    pub account_type: String,
    /// Name shown in the Jira UI
    #[serde(default)]
    pub display_name: String,
    /// Email, hidden by some privacy settings
    #[serde(default)]
    pub email_address: Option<String>,
    /// Whether the account is enabled
    #[serde(default)]
    pub active: bool,
}

/// A resolved colleague
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMatch {
    /// Opaque account identifier
    pub account_id: String,
    /// Name shown in the Jira UI
    pub display_name: String,
    /// Email, or `Hidden`
    pub email: String,
}

impl From<&UserAccount> for UserMatch {
    fn from(user: &UserAccount) -> Self {
        Self {
            account_id: user.account_id.clone(),
            display_name: user.display_name.clone(),
            email: user
                .email_address
                .clone()
                .unwrap_or_else(|| "Hidden".to_string()),
        }
    }
}

/// Wrap plain text in a single-paragraph Atlassian Document Format document
pub fn adf_paragraph(text: &str) -> Value {
    serde_json::json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

/// Collect the text of every paragraph in an Atlassian Document Format document
///
/// Paragraph texts are joined with single spaces; other block types are skipped.
pub fn adf_to_text(doc: &Value) -> String {
    let mut parts = Vec::new();
    for block in doc["content"].as_array().into_iter().flatten() {
        if block["type"] != "paragraph" {
            continue;
        }
        for node in block["content"].as_array().into_iter().flatten() {
            if node["type"] == "text" {
                if let Some(text) = node["text"].as_str() {
                    parts.push(text);
                }
            }
        }
    }
    parts.join(" ")
}

/// Keep at most `max` characters, appending `...` when something was cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// JQL for the caller's unfinished issues
pub const MY_OPEN_TASKS_JQL: &str = "assignee = currentUser() AND statusCategory != Done";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_issue() -> Value {
        json!({
            "key": "CRM-20",
            "fields": {
                "summary": "Fix login redirect",
                "status": { "name": "In Progress" },
                "priority": { "name": "High" },
                "assignee": null,
                "description": adf_paragraph("Users land on a blank page."),
                "comment": {
                    "total": 2,
                    "comments": [
                        { "body": adf_paragraph("First look") },
                        { "body": adf_paragraph("Reproduced on staging") }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_digest_from_issue_json() {
        let digest = IssueDigest::from_issue_json(&sample_issue());

        assert_eq!(digest.key, "CRM-20");
        assert_eq!(digest.summary, "Fix login redirect");
        assert_eq!(digest.status, "In Progress");
        assert_eq!(digest.priority, "High");
        assert_eq!(digest.assignee, "Unassigned");
        assert_eq!(digest.description_snippet, "Users land on a blank page.");
        assert_eq!(digest.comments_count, 2);
        assert_eq!(digest.last_comment.as_deref(), Some("Reproduced on staging"));
    }

    #[test]
    fn test_digest_placeholders_for_missing_fields() {
        let digest = IssueDigest::from_issue_json(&json!({ "key": "CRM-1", "fields": {} }));

        assert_eq!(digest.summary, "No summary");
        assert_eq!(digest.status, "Unknown");
        assert_eq!(digest.priority, "None");
        assert_eq!(digest.description_snippet, "No description");
        assert_eq!(digest.comments_count, 0);
        assert_eq!(digest.last_comment, None);
    }

    #[test]
    fn test_digest_truncates_long_description() {
        let long = "x".repeat(DESCRIPTION_SNIPPET_CHARS + 50);
        let issue = json!({ "key": "CRM-2", "fields": { "description": long } });
        let digest = IssueDigest::from_issue_json(&issue);

        assert_eq!(
            digest.description_snippet.chars().count(),
            DESCRIPTION_SNIPPET_CHARS + 3
        );
        assert!(digest.description_snippet.ends_with("..."));
    }

    #[test]
    fn test_adf_to_text_skips_non_paragraph_blocks() {
        let doc = json!({
            "type": "doc",
            "content": [
                { "type": "paragraph", "content": [{ "type": "text", "text": "one" }] },
                { "type": "codeBlock", "content": [{ "type": "text", "text": "skip" }] },
                { "type": "paragraph", "content": [
                    { "type": "text", "text": "two" },
                    { "type": "hardBreak" },
                    { "type": "text", "text": "three" }
                ] }
            ]
        });
        assert_eq!(adf_to_text(&doc), "one two three");
        assert_eq!(adf_to_text(&json!({})), "");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_transition_from_json() {
        let transition = Transition::from_json(&json!({
            "id": "31",
            "name": "Finish",
            "to": { "name": "Done" }
        }))
        .unwrap();
        assert_eq!(transition.to_status, "Done");
        assert!(Transition::from_json(&json!({ "name": "broken" })).is_none());
    }

    #[test]
    fn test_new_issue_body() {
        let body = NewIssue {
            project_key: "CRM".to_string(),
            summary: "Add export".to_string(),
            description: "CSV export for reports".to_string(),
            issue_type: "Task".to_string(),
        }
        .to_request_body();

        assert_eq!(body["fields"]["project"]["key"], "CRM");
        assert_eq!(body["fields"]["issuetype"]["name"], "Task");
        assert_eq!(
            adf_to_text(&body["fields"]["description"]),
            "CSV export for reports"
        );
    }

    #[test]
    fn test_new_issue_body_omits_blank_description() {
        for description in ["", "   "] {
            let body = NewIssue {
                project_key: "CRM".to_string(),
                summary: "Add export".to_string(),
                description: description.to_string(),
                issue_type: "Task".to_string(),
            }
            .to_request_body();

            assert_eq!(body["fields"]["summary"], "Add export");
            assert!(body["fields"].get("description").is_none());
        }
    }

    #[test]
    fn test_user_account_deserializes_camel_case() {
        let user: UserAccount = serde_json::from_value(json!({
            "accountId": "abc",
            "accountType": "atlassian",
            "displayName": "Ana",
            "active": true
        }))
        .unwrap();
        let found = UserMatch::from(&user);
        assert_eq!(found.account_id, "abc");
        assert_eq!(found.email, "Hidden");
    }
}
