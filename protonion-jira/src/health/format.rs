//! Plain-text rendering of a health report

use super::types::{HealthCheckItem, HealthReport, ProbeFailure, Severity};

const REPORT_TITLE: &str = "**Protonion Jira Agent Health Check**";

/// Marker for a single probe line
pub fn item_marker(item: &HealthCheckItem) -> &'static str {
    match (item.passed, item.failure, item.severity) {
        (true, _, _) => "✅",
        (false, Some(ProbeFailure::Timeout), _) => "⏱️",
        (false, _, Severity::Optional) => "⚠️",
        (false, _, Severity::Required) => "❌",
    }
}

/// Corrective suggestions for a failed probe
pub fn troubleshooting_tips(failure: ProbeFailure) -> &'static [&'static str] {
    match failure {
        ProbeFailure::ConfigMissing => &[
            "Check that JIRA_BASE_URL, JIRA_EMAIL and JIRA_API_TOKEN are set (environment or .env file)",
        ],
        ProbeFailure::ConnectivityError => &[
            "Verify network connection to the Jira server",
            "Check that JIRA_BASE_URL is correct",
        ],
        ProbeFailure::Timeout => &[
            "The Jira server did not answer in time; check network latency or raise JIRA_PROBE_TIMEOUT_SECS",
        ],
        ProbeFailure::AuthError => &[
            "Verify JIRA_EMAIL and JIRA_API_TOKEN are correct",
            "Check that the API token hasn't expired",
        ],
        ProbeFailure::PermissionDenied => &[
            "Ask a Jira administrator to grant the missing permission to this account",
        ],
        ProbeFailure::Unexpected => &["Run with --debug and check the log for details"],
    }
}

fn format_item(item: &HealthCheckItem) -> String {
    let label = match item.severity {
        Severity::Required => item.name.clone(),
        Severity::Optional => format!("{} (optional)", item.name),
    };
    match &item.detail {
        Some(detail) => format!("  {} {}: {}", item_marker(item), label, detail),
        None => format!("  {} {}", item_marker(item), label),
    }
}

/// Render a report as text: one line per probe, the overall status, then tips
///
/// ```
/// use protonion_jira::health::{format_health_report, HealthCheckItem, HealthReport, Severity};
///
/// let report = HealthReport::new(vec![
///     HealthCheckItem::pass("Configuration", Severity::Required).build(),
/// ]);
/// assert!(format_health_report(&report).contains("Overall Status: HEALTHY"));
/// ```
pub fn format_health_report(report: &HealthReport) -> String {
    let overall = report.overall();
    let mut lines = vec![
        format!("{} {}", overall.emoji(), REPORT_TITLE),
        String::new(),
        "Component Status:".to_string(),
    ];
    lines.extend(report.items.iter().map(format_item));
    lines.push(String::new());
    lines.push(format!("Overall Status: {overall}"));

    let mut tips: Vec<&str> = Vec::new();
    for failure in report.failed_items().filter_map(|item| item.failure) {
        for &tip in troubleshooting_tips(failure) {
            if !tips.contains(&tip) {
                tips.push(tip);
            }
        }
    }
    if !tips.is_empty() {
        lines.push(String::new());
        lines.push("💡 Troubleshooting:".to_string());
        lines.extend(tips.iter().map(|tip| format!("  - {tip}")));
    }

    lines.join("\n")
}
