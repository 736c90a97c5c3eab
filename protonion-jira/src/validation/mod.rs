//! Input validation for caller-supplied identifiers
//!
//! Every tool runs its arguments through these functions before any network
//! call is made. Each function either returns a normalized value or a
//! [`ValidationError`] precise enough for the caller to correct the input.
//! Values are never silently clamped or rewritten beyond trimming.
//!
//! ```
//! use protonion_jira::validation::{validate_issue_key, validate_limit};
//!
//! assert_eq!(validate_issue_key("CRM-20").unwrap().as_str(), "CRM-20");
//! assert!(validate_issue_key("crm-20").is_err());
//! assert_eq!(validate_limit(15, 50).unwrap(), 15);
//! assert!(validate_limit(0, 50).is_err());
//! ```

mod input;

pub use input::IntegerInput;

use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Pattern for issue keys: 1-10 uppercase ASCII letters, a dash, 1-10 ASCII digits
pub const ISSUE_KEY_PATTERN: &str = r"^[A-Z]{1,10}-[0-9]{1,10}$";

static ISSUE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(ISSUE_KEY_PATTERN).expect("issue key pattern is a valid regex"));

/// A validated issue key such as `CRM-123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The project part of the key (`CRM` in `CRM-123`)
    pub fn project(&self) -> &str {
        self.0.split_once('-').map(|(project, _)| project).unwrap_or("")
    }

    /// The numeric part of the key (`123` in `CRM-123`)
    pub fn number(&self) -> u64 {
        self.0
            .split_once('-')
            .and_then(|(_, number)| number.parse().ok())
            .unwrap_or(0)
    }

    /// Consume the key, returning the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for IssueKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, trimmed workflow status name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StatusName(String);

impl StatusName {
    /// The status as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StatusName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated board identifier (always at least 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BoardId(u64);

impl BoardId {
    /// The numeric board identifier
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate an issue key of the form `PROJECT-NUMBER`
///
/// Surrounding whitespace is trimmed; case is not changed, so `crm-20` is
/// rejected rather than upper-cased.
pub fn validate_issue_key(raw: &str) -> Result<IssueKey, ValidationError> {
    let trimmed = raw.trim();
    if ISSUE_KEY_REGEX.is_match(trimmed) {
        Ok(IssueKey(trimmed.to_string()))
    } else {
        Err(ValidationError::InvalidFormat {
            input: raw.to_string(),
        })
    }
}

/// Validate a status name: any non-empty string after trimming
pub fn validate_status(raw: &str) -> Result<StatusName, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidStatus {
            input: raw.to_string(),
            reason: "status must be a non-empty string".to_string(),
        });
    }
    Ok(StatusName(trimmed.to_string()))
}

/// Validate a status name against a known set of statuses
///
/// Matching is case-insensitive and the spelling from `known` is returned.
pub fn validate_status_in<S: AsRef<str>>(
    raw: &str,
    known: &[S],
) -> Result<StatusName, ValidationError> {
    let candidate = validate_status(raw)?;
    known
        .iter()
        .map(AsRef::as_ref)
        .find(|status| status.eq_ignore_ascii_case(candidate.as_str()))
        .map(|status| StatusName(status.to_string()))
        .ok_or_else(|| ValidationError::InvalidStatus {
            input: raw.to_string(),
            reason: format!(
                "not one of the known statuses: {}",
                known
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
}

/// Validate a board ID: an integer-like value of at least 1
pub fn validate_board_id(raw: impl Into<IntegerInput>) -> Result<BoardId, ValidationError> {
    let raw = raw.into();
    match raw.as_integer() {
        Some(value) if value >= 1 => Ok(BoardId(value as u64)),
        Some(value) => Err(ValidationError::InvalidBoardId {
            input: raw.to_string(),
            reason: format!("must be a positive integer, got {value}"),
        }),
        None => Err(ValidationError::InvalidBoardId {
            input: raw.to_string(),
            reason: "must be an integer".to_string(),
        }),
    }
}

/// Validate a result limit: an integer in `[1, max_allowed]`
///
/// Out-of-range values are rejected, never clamped.
pub fn validate_limit(
    raw: impl Into<IntegerInput>,
    max_allowed: u32,
) -> Result<u32, ValidationError> {
    let raw = raw.into();
    raw.as_integer()
        .filter(|value| *value >= 1 && *value <= i64::from(max_allowed))
        .map(|value| value as u32)
        .ok_or_else(|| ValidationError::InvalidLimit {
            input: raw.to_string(),
            min: 1,
            max: max_allowed,
        })
}

/// Validate that a free-text field is non-empty after trimming
pub fn validate_non_empty<'a>(raw: &'a str, field: &str) -> Result<&'a str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Empty {
            field: field.to_string(),
        })
    } else {
        Ok(trimmed)
    }
}
