//! The four-probe health reporter

use super::types::{probe_names, HealthCheckItem, HealthReport, ProbeFailure, Severity};
use crate::cache::ClientSlot;
use crate::client::{truncate_chars, BackendClient};
use crate::config::{missing_settings, ConfigSource, JiraConfig};
use crate::error::BackendError;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on each network-touching probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Capability the permissions probe checks when none is configured
pub const DEFAULT_CAPABILITY: &str = "BROWSE_PROJECTS";

const MAX_DETAIL_CHARS: usize = 200;

/// Detail on success, or the failure kind and detail
type ProbeOutcome = Result<Option<String>, (ProbeFailure, String)>;

/// Runs the four health probes against the shared client slot
///
/// Every probe is bounded by the probe timeout and isolated from panics, so
/// [`HealthReporter::run_health_check`] always returns a complete report.
pub struct HealthReporter {
    config_source: Arc<dyn ConfigSource>,
    client_slot: Arc<ClientSlot>,
    probe_timeout: Duration,
    capability: String,
}

impl HealthReporter {
    /// Create a reporter with the default timeout and capability
    pub fn new(config_source: Arc<dyn ConfigSource>, client_slot: Arc<ClientSlot>) -> Self {
        Self {
            config_source,
            client_slot,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            capability: DEFAULT_CAPABILITY.to_string(),
        }
    }

    /// Create a reporter using the timeout and capability from `config`
    pub fn from_config(
        config: &JiraConfig,
        config_source: Arc<dyn ConfigSource>,
        client_slot: Arc<ClientSlot>,
    ) -> Self {
        Self::new(config_source, client_slot)
            .with_probe_timeout(config.probe_timeout)
            .with_capability(config.permission_capability.clone())
    }

    /// Override the per-probe time limit
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Override the capability checked by the permissions probe
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = capability.into();
        self
    }

    /// Per-probe time limit
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Run configuration, connectivity, authentication and permissions probes in order
    pub async fn run_health_check(&self) -> HealthReport {
        tracing::debug!("Running health check");

        let items = vec![
            self.contain(
                probe_names::CONFIGURATION,
                Severity::Required,
                self.probe_configuration(),
            )
            .await,
            self.contain(
                probe_names::CONNECTIVITY,
                Severity::Required,
                self.probe_connectivity(),
            )
            .await,
            self.contain(
                probe_names::AUTHENTICATION,
                Severity::Required,
                self.probe_authentication(),
            )
            .await,
            self.contain(
                probe_names::PERMISSIONS,
                Severity::Optional,
                self.probe_permissions(),
            )
            .await,
        ];

        let report = HealthReport::new(items);
        tracing::info!("Health check finished: {}", report.overall());
        report
    }

    /// Turn a probe's outcome, timeout or panic into an item
    async fn contain<F>(&self, name: &str, severity: Severity, probe: F) -> HealthCheckItem
    where
        F: Future<Output = ProbeOutcome>,
    {
        let guarded = AssertUnwindSafe(probe).catch_unwind();
        let outcome = match tokio::time::timeout(self.probe_timeout, guarded).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(panic)) => Err((
                ProbeFailure::Unexpected,
                format!("probe panicked: {}", panic_message(panic.as_ref())),
            )),
            Err(_) => Err((
                ProbeFailure::Timeout,
                format!(
                    "no response within {}",
                    humanize_duration(self.probe_timeout)
                ),
            )),
        };

        match outcome {
            Ok(detail) => {
                let builder = match detail {
                    Some(detail) => HealthCheckItem::pass(name, severity)
                        .with_detail(truncate_chars(&detail, MAX_DETAIL_CHARS)),
                    None => HealthCheckItem::pass(name, severity),
                };
                builder.build()
            }
            Err((failure, detail)) => {
                tracing::warn!("Health probe '{}' failed ({}): {}", name, failure, detail);
                HealthCheckItem::fail(name, severity, failure)
                    .with_detail(truncate_chars(&detail, MAX_DETAIL_CHARS))
                    .build()
            }
        }
    }

    async fn client(&self) -> Result<Arc<dyn BackendClient>, (ProbeFailure, String)> {
        self.client_slot
            .get_or_create_client()
            .await
            .map_err(|e| (construction_failure(&e), format!("client unavailable: {e}")))
    }

    async fn probe_configuration(&self) -> ProbeOutcome {
        let missing = missing_settings(self.config_source.as_ref());
        if missing.is_empty() {
            Ok(None)
        } else {
            Err((
                ProbeFailure::ConfigMissing,
                format!("Missing: {}", missing.join(", ")),
            ))
        }
    }

    async fn probe_connectivity(&self) -> ProbeOutcome {
        let client = self.client().await?;
        match client.ping().await {
            Ok(info) if !info.version.is_empty() => Ok(Some(format!("Jira {}", info.version))),
            Ok(_) => Ok(None),
            Err(e) => Err((connectivity_failure(&e), e.to_string())),
        }
    }

    async fn probe_authentication(&self) -> ProbeOutcome {
        let client = self.client().await?;
        match client.current_identity().await {
            Ok(identity) => Ok(Some(format!("Authenticated as {}", identity.display_name))),
            Err(BackendError::AuthRejected { status }) => Err((
                ProbeFailure::AuthError,
                format!("credentials rejected (HTTP {status})"),
            )),
            Err(e) => {
                let failure = match e {
                    BackendError::Transport(_) => ProbeFailure::ConnectivityError,
                    _ => ProbeFailure::AuthError,
                };
                Err((
                    failure,
                    format!("credentials present but identity lookup failed: {e}"),
                ))
            }
        }
    }

    async fn probe_permissions(&self) -> ProbeOutcome {
        let client = self.client().await?;
        match client.check_capability(&self.capability).await {
            Ok(true) => Ok(Some(self.capability.clone())),
            Ok(false) => Err((
                ProbeFailure::PermissionDenied,
                format!("missing capability {}", self.capability),
            )),
            Err(e @ BackendError::PermissionDenied(_)) => {
                Err((ProbeFailure::PermissionDenied, e.to_string()))
            }
            Err(e) => Err((connectivity_failure(&e), e.to_string())),
        }
    }
}

impl std::fmt::Debug for HealthReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthReporter")
            .field("client_slot", &self.client_slot)
            .field("probe_timeout", &self.probe_timeout)
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

fn construction_failure(error: &BackendError) -> ProbeFailure {
    match error {
        BackendError::ConfigMissing(_) | BackendError::InvalidConfig(_) => {
            ProbeFailure::ConfigMissing
        }
        other => connectivity_failure(other),
    }
}

fn connectivity_failure(error: &BackendError) -> ProbeFailure {
    match error {
        BackendError::ConfigMissing(_) | BackendError::InvalidConfig(_) => {
            ProbeFailure::ConfigMissing
        }
        BackendError::AuthRejected { .. } => ProbeFailure::AuthError,
        BackendError::PermissionDenied(_) => ProbeFailure::PermissionDenied,
        BackendError::Transport(_) | BackendError::NotFound(_) | BackendError::Api { .. } => {
            ProbeFailure::ConnectivityError
        }
        _ => ProbeFailure::Unexpected,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn humanize_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockBackendClient, MockClientFactory, MockConfig};
    use crate::config::MapConfigSource;
    use crate::health::OverallStatus;

    fn configured_source() -> Arc<dyn ConfigSource> {
        Arc::new(
            MapConfigSource::new()
                .with("JIRA_BASE_URL", "https://example.atlassian.net")
                .with("JIRA_EMAIL", "dev@example.com")
                .with("JIRA_API_TOKEN", "token"),
        )
    }

    fn reporter_with(config: MockConfig) -> (HealthReporter, MockClientFactory) {
        let factory = MockClientFactory::new(MockBackendClient::new_with_config(config));
        let slot = Arc::new(ClientSlot::new(Arc::new(factory.clone())));
        let reporter = HealthReporter::new(configured_source(), slot)
            .with_probe_timeout(Duration::from_millis(200));
        (reporter, factory)
    }

    #[tokio::test]
    async fn test_all_probes_pass() {
        let (reporter, factory) = reporter_with(MockConfig::default());
        let report = reporter.run_health_check().await;

        assert_eq!(report.items.len(), 4);
        assert_eq!(report.overall(), OverallStatus::Healthy);
        let names: Vec<_> = report.items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                probe_names::CONFIGURATION,
                probe_names::CONNECTIVITY,
                probe_names::AUTHENTICATION,
                probe_names::PERMISSIONS
            ]
        );
        // Probes share one cached client
        assert_eq!(factory.constructions(), 1);
    }

    #[tokio::test]
    async fn test_missing_capability_degrades() {
        let (reporter, _) = reporter_with(MockConfig {
            capabilities: Default::default(),
            ..MockConfig::default()
        });
        let report = reporter.run_health_check().await;

        assert_eq!(report.overall(), OverallStatus::Degraded);
        let permissions = report.item(probe_names::PERMISSIONS).unwrap();
        assert_eq!(permissions.failure, Some(ProbeFailure::PermissionDenied));
        assert!(permissions.detail.as_deref().unwrap().contains("BROWSE_PROJECTS"));
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_distinguished() {
        let (reporter, _) = reporter_with(MockConfig {
            identity_error: Some(BackendError::AuthRejected { status: 401 }),
            ..MockConfig::default()
        });
        let report = reporter.run_health_check().await;

        assert_eq!(report.overall(), OverallStatus::Unhealthy);
        let auth = report.item(probe_names::AUTHENTICATION).unwrap();
        assert_eq!(auth.failure, Some(ProbeFailure::AuthError));
        assert!(auth.detail.as_deref().unwrap().contains("credentials rejected"));
    }

    #[tokio::test]
    async fn test_other_identity_failures_are_described_differently() {
        let (reporter, _) = reporter_with(MockConfig {
            identity_error: Some(BackendError::Api {
                status: 500,
                message: "internal".to_string(),
            }),
            ..MockConfig::default()
        });
        let report = reporter.run_health_check().await;

        let auth = report.item(probe_names::AUTHENTICATION).unwrap();
        let detail = auth.detail.as_deref().unwrap();
        assert!(detail.contains("identity lookup failed"));
        assert!(!detail.contains("credentials rejected"));
    }

    #[tokio::test]
    async fn test_slow_ping_times_out() {
        let (reporter, _) = reporter_with(MockConfig {
            probe_delay_ms: Some(1_000),
            ..MockConfig::default()
        });
        let report = reporter.run_health_check().await;

        let connectivity = report.item(probe_names::CONNECTIVITY).unwrap();
        assert_eq!(connectivity.failure, Some(ProbeFailure::Timeout));
        assert_eq!(connectivity.detail.as_deref(), Some("no response within 200ms"));
        assert_eq!(report.items.len(), 4);
    }

    #[tokio::test]
    async fn test_panicking_probe_still_yields_full_report() {
        let (reporter, _) = reporter_with(MockConfig {
            panic_on_ping: true,
            ..MockConfig::default()
        });
        let report = reporter.run_health_check().await;

        assert_eq!(report.items.len(), 4);
        let connectivity = report.item(probe_names::CONNECTIVITY).unwrap();
        assert_eq!(connectivity.failure, Some(ProbeFailure::Unexpected));
        assert!(connectivity
            .detail
            .as_deref()
            .unwrap()
            .contains("simulated panic in ping"));
        // Later probes still run
        assert!(report.item(probe_names::AUTHENTICATION).unwrap().passed);
        assert_eq!(report.overall(), OverallStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_missing_configuration_fails_every_required_probe() {
        let factory = MockClientFactory::default();
        factory.fail_with(Some(BackendError::ConfigMissing(vec![
            "JIRA_BASE_URL".to_string(),
        ])));
        let slot = Arc::new(ClientSlot::new(Arc::new(factory)));
        let reporter = HealthReporter::new(Arc::new(MapConfigSource::new()), slot);

        let report = reporter.run_health_check().await;
        let config = report.item(probe_names::CONFIGURATION).unwrap();
        assert_eq!(config.failure, Some(ProbeFailure::ConfigMissing));
        assert_eq!(
            config.detail.as_deref(),
            Some("Missing: JIRA_BASE_URL, JIRA_EMAIL, JIRA_API_TOKEN")
        );
        assert!(report.items.iter().all(|item| !item.passed));
        assert_eq!(report.overall(), OverallStatus::Unhealthy);
    }

    #[test]
    fn test_humanize_duration() {
        assert_eq!(humanize_duration(Duration::from_secs(5)), "5s");
        assert_eq!(humanize_duration(Duration::from_millis(250)), "250ms");
    }
}
