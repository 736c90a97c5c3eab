//! Configuration for the Jira agent
//!
//! Settings are read through a [`ConfigSource`] so the same loading code
//! serves the process environment and in-memory maps used by tests.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Settings without which no backend client can be built
pub const REQUIRED_SETTINGS: [&str; 3] = ["JIRA_BASE_URL", "JIRA_EMAIL", "JIRA_API_TOKEN"];

const CONFIG_PREFIX: &str = "JIRA";
const DEFAULT_PROJECT_KEY: &str = "CRM";
const DEFAULT_BOARD_ID: u64 = 67;
const DEFAULT_MAX_LIMIT: u32 = 100;
const DEFAULT_CLIENT_TTL_SECS: u64 = 30 * 60;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PERMISSION_CAPABILITY: &str = "BROWSE_PROJECTS";

/// A read-only lookup of named settings
///
/// Implementations return `None` for absent settings. Values are trimmed
/// and an empty value counts as absent.
pub trait ConfigSource: Send + Sync {
    /// Look up the raw value of `name`
    fn get_raw(&self, name: &str) -> Option<String>;

    /// Look up `name`, trimmed, treating blank values as absent
    fn get(&self, name: &str) -> Option<String> {
        self.get_raw(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Reads settings from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn get_raw(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Reads settings from an in-memory map
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Insert or overwrite `name`
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove `name` if present
    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }
}

impl<K, V> FromIterator<(K, V)> for MapConfigSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapConfigSource {
    fn get_raw(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Prefixed, typed access to a [`ConfigSource`]
pub struct ConfigReader<'a> {
    source: &'a dyn ConfigSource,
    prefix: &'a str,
}

impl<'a> ConfigReader<'a> {
    /// Read settings named `{prefix}{name}` from `source`
    pub fn new(source: &'a dyn ConfigSource, prefix: &'a str) -> Self {
        Self { source, prefix }
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Load a string value, if present
    pub fn load_optional(&self, suffix: &str) -> Option<String> {
        self.source.get(&self.key(suffix))
    }

    /// Load a string value with default
    pub fn load_string(&self, suffix: &str, default: &str) -> String {
        self.load_optional(suffix)
            .unwrap_or_else(|| default.to_string())
    }

    /// Load a parsed value; unparseable values fall back to the default
    pub fn load_parsed<T: FromStr>(&self, suffix: &str, default: T) -> T {
        match self.load_optional(suffix) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Ignoring unparseable value for {}: '{}'",
                    self.key(suffix),
                    raw
                );
                default
            }),
            None => default,
        }
    }
}

/// Names of required settings that `source` does not provide
pub fn missing_settings(source: &dyn ConfigSource) -> Vec<String> {
    REQUIRED_SETTINGS
        .iter()
        .filter(|name| source.get(name).is_none())
        .map(|name| name.to_string())
        .collect()
}

/// Jira connection and tool settings
#[derive(Clone, PartialEq, Eq)]
pub struct JiraConfig {
    /// Jira site root, e.g. `https://example.atlassian.net`
    pub base_url: Option<String>,
    /// Account email used for basic auth
    pub email: Option<String>,
    /// API token paired with `email`
    pub api_token: Option<String>,
    /// Project new issues are filed in
    pub project_key: String,
    /// Board listed when the caller names none
    pub default_board_id: u64,
    /// Upper bound accepted by `validate_limit`
    pub max_limit: u32,
    /// How long the shared client is reused
    pub client_ttl: Duration,
    /// Time limit applied to each health probe
    pub probe_timeout: Duration,
    /// Capability the permissions probe asks for
    pub permission_capability: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            email: None,
            api_token: None,
            project_key: DEFAULT_PROJECT_KEY.to_string(),
            default_board_id: DEFAULT_BOARD_ID,
            max_limit: DEFAULT_MAX_LIMIT,
            client_ttl: Duration::from_secs(DEFAULT_CLIENT_TTL_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            permission_capability: DEFAULT_PERMISSION_CAPABILITY.to_string(),
        }
    }
}

impl JiraConfig {
    /// Read the configuration from `source`, applying defaults
    pub fn load(source: &dyn ConfigSource) -> Self {
        let reader = ConfigReader::new(source, CONFIG_PREFIX);

        let max_limit = match reader.load_parsed("MAX_LIMIT", DEFAULT_MAX_LIMIT) {
            0 => DEFAULT_MAX_LIMIT,
            limit => limit,
        };
        let default_board_id = match reader.load_parsed("DEFAULT_BOARD_ID", DEFAULT_BOARD_ID) {
            0 => DEFAULT_BOARD_ID,
            board => board,
        };

        Self {
            base_url: reader
                .load_optional("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            email: reader.load_optional("EMAIL"),
            api_token: reader.load_optional("API_TOKEN"),
            project_key: reader.load_string("PROJECT_KEY", DEFAULT_PROJECT_KEY),
            default_board_id,
            max_limit,
            client_ttl: Duration::from_secs(
                reader.load_parsed("CLIENT_TTL_SECS", DEFAULT_CLIENT_TTL_SECS),
            ),
            probe_timeout: Duration::from_secs(
                reader.load_parsed("PROBE_TIMEOUT_SECS", DEFAULT_PROBE_TIMEOUT_SECS),
            ),
            permission_capability: reader
                .load_string("PERMISSION_CAPABILITY", DEFAULT_PERMISSION_CAPABILITY),
        }
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::load(&EnvConfigSource)
    }

    /// Names of required settings that are absent
    pub fn missing_required(&self) -> Vec<String> {
        let present = [
            self.base_url.is_some(),
            self.email.is_some(),
            self.api_token.is_some(),
        ];
        REQUIRED_SETTINGS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Whether every required setting is present
    pub fn is_configured(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Base of the REST API v3, when a base URL is configured
    pub fn api_base(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{base}/rest/api/3"))
    }

    /// Base of the Agile API, when a base URL is configured
    pub fn agile_base(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{base}/rest/agile/1.0"))
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &mask_secret(self.api_token.as_deref()))
            .field("project_key", &self.project_key)
            .field("default_board_id", &self.default_board_id)
            .field("max_limit", &self.max_limit)
            .field("client_ttl", &self.client_ttl)
            .field("probe_timeout", &self.probe_timeout)
            .field("permission_capability", &self.permission_capability)
            .finish()
    }
}

/// Show the first four characters of a secret followed by `***`
pub fn mask_secret(value: Option<&str>) -> String {
    match value {
        Some(secret) if !secret.is_empty() => {
            let visible: String = secret.chars().take(4).collect();
            format!("{visible}***")
        }
        _ => "Not set".to_string(),
    }
}

/// Environment name used when `ENV` is unset
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Connection settings as shown to a human, with the API token masked
pub fn environment_summary(source: &dyn ConfigSource) -> Vec<(&'static str, String)> {
    let shown = |name: &str| source.get(name).unwrap_or_else(|| "Not set".to_string());
    vec![
        ("JIRA_BASE_URL", shown("JIRA_BASE_URL")),
        ("JIRA_EMAIL", shown("JIRA_EMAIL")),
        (
            "JIRA_API_TOKEN",
            mask_secret(source.get("JIRA_API_TOKEN").as_deref()),
        ),
        (
            "ENV",
            source
                .get("ENV")
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
        ),
    ]
}
