//! Health reporter behavior through the public API

use protonion_jira::cache::ClientSlot;
use protonion_jira::client::{MockBackendClient, MockClientFactory, MockConfig};
use protonion_jira::config::{ConfigSource, MapConfigSource};
use protonion_jira::error::BackendError;
use protonion_jira::health::{
    format_health_report, probe_names, HealthReporter, OverallStatus, ProbeFailure,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn configured() -> Arc<dyn ConfigSource> {
    Arc::new(
        MapConfigSource::new()
            .with("JIRA_BASE_URL", "https://example.atlassian.net")
            .with("JIRA_EMAIL", "agent@example.com")
            .with("JIRA_API_TOKEN", "abcd-1234"),
    )
}

fn reporter(source: Arc<dyn ConfigSource>, config: MockConfig) -> HealthReporter {
    let factory = MockClientFactory::new(MockBackendClient::new_with_config(config));
    let slot = Arc::new(ClientSlot::new(Arc::new(factory)));
    HealthReporter::new(source, slot).with_probe_timeout(Duration::from_millis(200))
}

#[tokio::test]
async fn test_healthy_report_lists_probes_in_order() {
    let report = reporter(configured(), MockConfig::default())
        .run_health_check()
        .await;

    let names: Vec<&str> = report.items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            probe_names::CONFIGURATION,
            probe_names::CONNECTIVITY,
            probe_names::AUTHENTICATION,
            probe_names::PERMISSIONS,
        ]
    );
    assert_eq!(report.overall(), OverallStatus::Healthy);

    let text = format_health_report(&report);
    assert!(text.contains("Overall Status: HEALTHY"));
    assert!(!text.contains("Troubleshooting"));
}

#[tokio::test]
async fn test_missing_permission_only_degrades() {
    let config = MockConfig {
        capabilities: HashSet::new(),
        ..MockConfig::default()
    };
    let report = reporter(configured(), config).run_health_check().await;

    assert_eq!(report.overall(), OverallStatus::Degraded);
    let failed: Vec<_> = report.failed_items().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].name, probe_names::PERMISSIONS);
    assert_eq!(failed[0].failure, Some(ProbeFailure::PermissionDenied));
}

#[tokio::test]
async fn test_rejected_credentials_are_unhealthy() {
    let config = MockConfig {
        identity_error: Some(BackendError::AuthRejected { status: 401 }),
        ..MockConfig::default()
    };
    let report = reporter(configured(), config).run_health_check().await;

    assert_eq!(report.overall(), OverallStatus::Unhealthy);
    let auth = report.item(probe_names::AUTHENTICATION).unwrap();
    assert!(!auth.passed);
    assert!(auth.detail.as_deref().unwrap().contains("credentials rejected"));
    assert!(report.item(probe_names::CONNECTIVITY).unwrap().passed);
}

#[tokio::test]
async fn test_hung_backend_times_out_without_blocking() {
    let config = MockConfig {
        probe_delay_ms: Some(5_000),
        ..MockConfig::default()
    };
    let started = std::time::Instant::now();
    let report = reporter(configured(), config).run_health_check().await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.items.len(), 4);
    assert_eq!(
        report.item(probe_names::CONNECTIVITY).unwrap().failure,
        Some(ProbeFailure::Timeout)
    );
    assert!(format_health_report(&report).contains("⏱️"));
}

#[tokio::test]
async fn test_panicking_probe_is_contained() {
    let config = MockConfig {
        panic_on_identity: true,
        ..MockConfig::default()
    };
    let report = reporter(configured(), config).run_health_check().await;

    assert_eq!(report.items.len(), 4);
    assert_eq!(
        report.item(probe_names::AUTHENTICATION).unwrap().failure,
        Some(ProbeFailure::Unexpected)
    );
    assert_eq!(report.overall(), OverallStatus::Unhealthy);
}

#[tokio::test]
async fn test_missing_settings_are_named() {
    let source: Arc<dyn ConfigSource> =
        Arc::new(MapConfigSource::new().with("JIRA_BASE_URL", "https://example.atlassian.net"));
    let report = reporter(source, MockConfig::default()).run_health_check().await;

    let configuration = report.item(probe_names::CONFIGURATION).unwrap();
    assert_eq!(configuration.failure, Some(ProbeFailure::ConfigMissing));
    assert_eq!(
        configuration.detail.as_deref(),
        Some("Missing: JIRA_EMAIL, JIRA_API_TOKEN")
    );
    assert_eq!(report.overall(), OverallStatus::Unhealthy);
}
