//! Error types for the Protonion Jira agent
//!
//! Validation failures and backend failures each have their own typed enum.
//! The MCP layer maps both onto protocol errors.

use thiserror::Error;

/// Rejection of caller-supplied input
///
/// Every variant carries the offending raw input so the caller can see
/// exactly what was refused. [`ValidationError::hint`] gives the corrective
/// suggestion that accompanies the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Issue key does not look like `PROJECT-NUMBER`
    #[error("Invalid issue key format: '{input}'. Expected format: PROJECT-NUMBER (e.g. 'CRM-123')")]
    InvalidFormat {
        /// The rejected key
        input: String,
    },

    /// Status name is empty or not one of the known statuses
    #[error("Invalid status '{input}': {reason}")]
    InvalidStatus {
        /// The rejected status
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Board ID is not an integer of at least 1
    #[error("Invalid board ID '{input}': {reason}")]
    InvalidBoardId {
        /// The rejected board ID, as given
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Limit is not an integer inside the allowed range
    #[error("Invalid limit '{input}': must be an integer in range [{min}, {max}]")]
    InvalidLimit {
        /// The rejected limit, as given
        input: String,
        /// Smallest accepted value
        min: u32,
        /// Largest accepted value
        max: u32,
    },

    /// A required free-text field was empty
    #[error("Field '{field}' must be a non-empty string")]
    Empty {
        /// Name of the empty field
        field: String,
    },
}

impl ValidationError {
    /// Corrective suggestion shown alongside the error message
    pub fn hint(&self) -> String {
        match self {
            ValidationError::InvalidFormat { .. } => {
                "Use 1-10 uppercase letters, a dash, then 1-10 digits, e.g. CRM-123".to_string()
            }
            ValidationError::InvalidStatus { .. } => {
                "Pass the exact status name shown on the board, e.g. 'In Progress'".to_string()
            }
            ValidationError::InvalidBoardId { .. } => {
                "Pass the numeric board ID from the board URL, e.g. 67".to_string()
            }
            ValidationError::InvalidLimit { min, max, .. } => {
                format!("Pick a whole number between {min} and {max}")
            }
            ValidationError::Empty { field } => format!("Provide a value for '{field}'"),
        }
    }

    /// The raw input that was rejected, when the error carries one
    pub fn input(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidFormat { input }
            | ValidationError::InvalidStatus { input, .. }
            | ValidationError::InvalidBoardId { input, .. }
            | ValidationError::InvalidLimit { input, .. } => Some(input),
            ValidationError::Empty { .. } => None,
        }
    }
}

/// Failures raised by a backend client or its factory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// Mandatory settings are absent, so no client can be built
    #[error("Missing required configuration: {}", .0.join(", "))]
    ConfigMissing(Vec<String>),

    /// Settings are present but unusable (e.g. malformed base URL)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server refused the credentials
    #[error("Credentials rejected (HTTP {status})")]
    AuthRejected {
        /// HTTP status of the response
        status: u16,
    },

    /// Authenticated, but not allowed to perform the call
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The addressed resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response
    #[error("Jira API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status of the response
        status: u16,
        /// Error text extracted from the body
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the error means the caller addressed something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}
