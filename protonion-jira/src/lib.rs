//! # Protonion Jira
//!
//! A Jira task agent reachable from AI assistants over the Model Context
//! Protocol.
//!
//! ## Features
//!
//! - **Input validation**: Issue keys, statuses, board IDs and limits are
//!   checked before any request leaves the process
//! - **TTL caching**: A time-bounded cache, a memoizing wrapper and a slot
//!   holding the single shared backend client
//! - **Health reporting**: Configuration, connectivity, authentication and
//!   permission probes aggregated into one report
//! - **MCP Support**: Task tools served through an rmcp server
//!
//! ## Quick Start
//!
//! ```rust
//! use protonion_jira::validation::{validate_issue_key, validate_limit};
//!
//! let key = validate_issue_key("CRM-123").unwrap();
//! assert_eq!(key.project(), "CRM");
//!
//! let err = validate_limit(0, 50).unwrap_err();
//! assert!(err.to_string().contains("[1, 50]"));
//! ```

#![warn(missing_docs)]

/// Time-bounded caching and the shared client slot
pub mod cache;

/// Backend client contract and implementations
pub mod client;

/// Settings loading
pub mod config;

/// Error types used throughout the library
pub mod error;

/// Health probes and report formatting
pub mod health;

/// Model Context Protocol (MCP) server support
pub mod mcp;

/// Validation of caller-supplied values
pub mod validation;

pub use cache::{ClientSlot, Memoized, TtlCache};
pub use client::{BackendClient, ClientFactory, JiraClient, JiraClientFactory};
pub use config::{ConfigSource, EnvConfigSource, JiraConfig};
pub use error::{BackendError, ValidationError};
pub use health::{format_health_report, HealthReport, HealthReporter, OverallStatus};
pub use mcp::McpServer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cache::{ClientSlot, TtlCache};
    pub use crate::client::{BackendClient, ClientFactory};
    pub use crate::config::{ConfigSource, JiraConfig};
    pub use crate::error::{BackendError, ValidationError};
    pub use crate::health::{HealthReport, HealthReporter};
    pub use crate::mcp::McpServer;
    pub use crate::validation::{
        validate_board_id, validate_issue_key, validate_limit, validate_status, BoardId,
        IssueKey, StatusName,
    };
}
