//! `env` command: show the connection settings in use

use colored::*;
use protonion_jira::config::{environment_summary, ConfigSource};

/// Render the masked settings, one `NAME: value` line each
pub fn render_environment(source: &dyn ConfigSource) -> String {
    environment_summary(source)
        .into_iter()
        .map(|(name, value)| format!("{}: {}", name.bold(), value))
        .collect::<Vec<_>>()
        .join("\n")
}
