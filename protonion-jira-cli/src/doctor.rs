//! `doctor` command: run the health probes and report
//!
//! The doctor returns exit codes:
//! - 0: Healthy
//! - 1: Degraded
//! - 2: Unhealthy

use crate::cli::DoctorFormat;
use crate::exit_codes::exit_code_for;
use anyhow::{Context, Result};
use colored::*;
use protonion_jira::cache::ClientSlot;
use protonion_jira::client::JiraClientFactory;
use protonion_jira::config::{ConfigSource, EnvConfigSource, JiraConfig};
use protonion_jira::health::{format_health_report, HealthReport, HealthReporter};
use protonion_jira::OverallStatus;
use std::sync::Arc;

/// Run the probes against the configuration in `source`
pub async fn check(source: Arc<dyn ConfigSource>) -> HealthReport {
    let config = JiraConfig::load(source.as_ref());
    let factory = Arc::new(JiraClientFactory::new(config.clone()));
    let slot = Arc::new(ClientSlot::with_ttl(factory, config.client_ttl));
    HealthReporter::from_config(&config, source, slot)
        .run_health_check()
        .await
}

/// Run the doctor against the process environment and print the report
pub async fn run_doctor(format: DoctorFormat) -> Result<i32> {
    let report = check(Arc::new(EnvConfigSource)).await;

    match format {
        DoctorFormat::Text => println!("{}", render_report(&report)),
        DoctorFormat::Json => println!(
            "{}",
            report.to_json().context("Failed to encode health report")?
        ),
    }

    Ok(exit_code_for(report.overall()))
}

/// The text report with the overall status line colored
///
/// Colors are dropped when `colored` is switched off.
pub fn render_report(report: &HealthReport) -> String {
    format_health_report(report)
        .lines()
        .map(|line| {
            if line.starts_with("Overall Status:") {
                colorize(line, report.overall()).to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn colorize(line: &str, status: OverallStatus) -> ColoredString {
    match status {
        OverallStatus::Healthy => line.green().bold(),
        OverallStatus::Degraded => line.yellow().bold(),
        OverallStatus::Unhealthy => line.red().bold(),
    }
}
