//! Health reporting
//!
//! [`HealthReporter`] runs four probes in a fixed order (configuration,
//! connectivity, authentication, permissions) and aggregates them into a
//! [`HealthReport`]. Permissions is the only optional probe: its failure
//! degrades the report instead of making it unhealthy.

mod format;
mod reporter;
mod types;

pub use format::{format_health_report, item_marker, troubleshooting_tips};
pub use reporter::{HealthReporter, DEFAULT_CAPABILITY, DEFAULT_PROBE_TIMEOUT};
pub use types::{
    probe_names, HealthCheckItem, HealthCheckItemBuilder, HealthReport, OverallStatus,
    ProbeFailure, Severity,
};
