//! Health report data types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Probe names, in the order the reporter runs them
pub mod probe_names {
    /// Required settings are present
    pub const CONFIGURATION: &str = "Configuration";
    /// The server answers the info call
    pub const CONNECTIVITY: &str = "API Connectivity";
    /// The credentials are accepted
    pub const AUTHENTICATION: &str = "Authentication";
    /// The account holds the configured capability
    pub const PERMISSIONS: &str = "Permissions";
}

/// Whether a failed probe makes the agent unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Failure makes the report unhealthy
    Required,
    /// Failure only degrades the report
    Optional,
}

/// Why a probe failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailure {
    /// The probe did not finish in time
    Timeout,
    /// The server could not be reached
    ConnectivityError,
    /// The credentials were rejected
    AuthError,
    /// The account lacks the capability
    PermissionDenied,
    /// Required settings are absent
    ConfigMissing,
    /// The probe panicked or failed in a way no other variant describes
    Unexpected,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProbeFailure::Timeout => "timeout",
            ProbeFailure::ConnectivityError => "connectivity error",
            ProbeFailure::AuthError => "authentication error",
            ProbeFailure::PermissionDenied => "permission denied",
            ProbeFailure::ConfigMissing => "configuration missing",
            ProbeFailure::Unexpected => "unexpected failure",
        };
        f.write_str(label)
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheckItem {
    /// Probe name, one of [`probe_names`]
    pub name: String,
    /// Whether the probe succeeded
    pub passed: bool,
    /// Human-readable explanation, mostly for failures
    pub detail: Option<String>,
    /// How much a failure of this probe matters
    pub severity: Severity,
    /// Failure category, `None` when passed
    pub failure: Option<ProbeFailure>,
}

impl HealthCheckItem {
    /// A passing item
    pub fn pass(name: impl Into<String>, severity: Severity) -> HealthCheckItemBuilder {
        HealthCheckItemBuilder {
            item: HealthCheckItem {
                name: name.into(),
                passed: true,
                detail: None,
                severity,
                failure: None,
            },
        }
    }

    /// A failed item
    pub fn fail(
        name: impl Into<String>,
        severity: Severity,
        failure: ProbeFailure,
    ) -> HealthCheckItemBuilder {
        HealthCheckItemBuilder {
            item: HealthCheckItem {
                name: name.into(),
                passed: false,
                detail: None,
                severity,
                failure: Some(failure),
            },
        }
    }

    /// Whether a failure of this item makes the report unhealthy
    pub fn is_required(&self) -> bool {
        self.severity == Severity::Required
    }
}

/// Builder for [`HealthCheckItem`]
///
/// ```
/// use protonion_jira::health::{HealthCheckItem, ProbeFailure, Severity};
///
/// let item = HealthCheckItem::fail("API Connectivity", Severity::Required, ProbeFailure::Timeout)
///     .with_detail("no response within 5s")
///     .build();
/// assert!(!item.passed);
/// ```
pub struct HealthCheckItemBuilder {
    item: HealthCheckItem,
}

impl HealthCheckItemBuilder {
    /// Attach a human-readable explanation
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.item.detail = Some(detail.into());
        self
    }

    /// Finish the item
    pub fn build(self) -> HealthCheckItem {
        self.item
    }
}

/// Aggregate state derived from a report's items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every probe passed
    Healthy,
    /// Only optional probes failed
    Degraded,
    /// A required probe failed
    Unhealthy,
}

impl OverallStatus {
    /// Marker shown at the top of a formatted report
    pub fn emoji(self) -> &'static str {
        match self {
            OverallStatus::Healthy => "✅",
            OverallStatus::Degraded => "⚠️",
            OverallStatus::Unhealthy => "⛔",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OverallStatus::Healthy => "HEALTHY",
            OverallStatus::Degraded => "DEGRADED",
            OverallStatus::Unhealthy => "UNHEALTHY",
        };
        f.write_str(label)
    }
}

/// Ordered probe results of one health check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// Probe results in run order
    pub items: Vec<HealthCheckItem>,
    /// When the report was produced
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    /// Create a report stamped with the current time
    pub fn new(items: Vec<HealthCheckItem>) -> Self {
        Self {
            items,
            checked_at: Utc::now(),
        }
    }

    /// Unhealthy if any required item failed, degraded if only optional ones did
    pub fn overall(&self) -> OverallStatus {
        if self.items.iter().any(|item| !item.passed && item.is_required()) {
            OverallStatus::Unhealthy
        } else if self.items.iter().any(|item| !item.passed) {
            OverallStatus::Degraded
        } else {
            OverallStatus::Healthy
        }
    }

    /// Whether every probe passed
    pub fn is_healthy(&self) -> bool {
        self.overall() == OverallStatus::Healthy
    }

    /// The item produced by the probe called `name`
    pub fn item(&self, name: &str) -> Option<&HealthCheckItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Items whose probe failed
    pub fn failed_items(&self) -> impl Iterator<Item = &HealthCheckItem> {
        self.items.iter().filter(|item| !item.passed)
    }

    /// Serialize the report, including the derived overall status
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&serde_json::json!({
            "overall": self.overall(),
            "checked_at": self.checked_at,
            "items": self.items,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(name: &str, severity: Severity) -> HealthCheckItem {
        HealthCheckItem::pass(name, severity).build()
    }

    fn fail(name: &str, severity: Severity) -> HealthCheckItem {
        HealthCheckItem::fail(name, severity, ProbeFailure::Unexpected).build()
    }

    #[test]
    fn test_all_passing_is_healthy() {
        let report = HealthReport::new(vec![
            pass("a", Severity::Required),
            pass("b", Severity::Required),
            pass("c", Severity::Required),
            pass("d", Severity::Optional),
        ]);
        assert_eq!(report.overall(), OverallStatus::Healthy);
        assert!(report.is_healthy());
    }

    #[test]
    fn test_optional_failure_degrades() {
        let report = HealthReport::new(vec![
            pass("a", Severity::Required),
            pass("b", Severity::Required),
            pass("c", Severity::Required),
            fail("d", Severity::Optional),
        ]);
        assert_eq!(report.overall(), OverallStatus::Degraded);
    }

    #[test]
    fn test_required_failure_is_unhealthy() {
        let report = HealthReport::new(vec![
            fail("a", Severity::Required),
            pass("b", Severity::Required),
            pass("c", Severity::Required),
            pass("d", Severity::Optional),
        ]);
        assert_eq!(report.overall(), OverallStatus::Unhealthy);

        let both = HealthReport::new(vec![fail("a", Severity::Required), fail("d", Severity::Optional)]);
        assert_eq!(both.overall(), OverallStatus::Unhealthy);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(OverallStatus::Healthy.to_string(), "HEALTHY");
        assert_eq!(OverallStatus::Degraded.to_string(), "DEGRADED");
        assert_eq!(OverallStatus::Unhealthy.to_string(), "UNHEALTHY");
    }

    #[test]
    fn test_to_json_includes_overall() {
        let report = HealthReport::new(vec![fail("Permissions", Severity::Optional)]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["overall"], "degraded");
        assert_eq!(json["items"][0]["severity"], "optional");
        assert_eq!(json["items"][0]["failure"], "unexpected");
    }
}
