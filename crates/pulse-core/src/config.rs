//! pulsewatch.toml configuration parser.
//!
//! The file names the check schedule, the status-page endpoint, the
//! process-wide default thresholds, and the list of monitored services.
//! Per-service overrides fall back to `[defaults]`, which falls back to
//! the documented values (retry 0, delay 5s, performance 1s, request 30s,
//! incident 5m, schedule 1m).

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duration::parse_duration;

/// Errors raised while loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid duration `{value}` for `{field}`")]
    Duration { field: String, value: String },

    #[error("duplicate service id `{0}`")]
    DuplicateId(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Check cadence, e.g. `"1m"`.
    #[serde(default = "default_schedule")]
    pub schedule: String,
    pub status_page: StatusPageConfig,
    #[serde(default)]
    pub defaults: CheckDefaults,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

/// Status-page API endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPageConfig {
    /// Base URL of the status-page API, e.g. `https://status.example.com/api/v1`.
    pub api: String,
    /// Token sent in the update request auth header.
    pub token: String,
}

/// Process-wide default thresholds for service checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDefaults {
    /// Additional probe attempts after the first.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// Pause between attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,
    /// Latency above this classifies a reachable service as SLOW.
    #[serde(default = "default_performance_timeout")]
    pub performance_timeout: String,
    /// Hard cap on a single probe.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// How long a service must stay down before OFFLINE escalates to INCIDENT.
    #[serde(default = "default_incident_threshold")]
    pub incident_threshold: String,
}

fn default_schedule() -> String {
    "1m".to_string()
}

fn default_retry_count() -> u32 {
    0
}

fn default_retry_delay() -> String {
    "5s".to_string()
}

fn default_performance_timeout() -> String {
    "1s".to_string()
}

fn default_request_timeout() -> String {
    "30s".to_string()
}

fn default_incident_threshold() -> String {
    "5m".to_string()
}

impl Default for CheckDefaults {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_delay: default_retry_delay(),
            performance_timeout: default_performance_timeout(),
            request_timeout: default_request_timeout(),
            incident_threshold: default_incident_threshold(),
        }
    }
}

/// Probe variant for a monitored service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Http,
    Tcp,
    Udp,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Http => write!(f, "http"),
            ProbeKind::Tcp => write!(f, "tcp"),
            ProbeKind::Udp => write!(f, "udp"),
        }
    }
}

/// One monitored service.
///
/// HTTP services name a `url`; TCP/UDP services name a `host` and `port`.
/// A spec whose target fields don't match its `kind` is accepted here and
/// rejected at check time, so one misconfigured service never takes the
/// rest of the cycle down with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Unique id; doubles as the status-page component id.
    pub id: String,
    pub kind: ProbeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    // Per-service threshold overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_threshold: Option<String>,
}

/// Fully resolved thresholds for one service's checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPolicy {
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub performance_timeout: Duration,
    pub request_timeout: Duration,
    pub incident_threshold: Duration,
}

impl ServiceSpec {
    /// Resolve this spec's thresholds against the process-wide defaults.
    pub fn policy(&self, defaults: &CheckDefaults) -> Result<CheckPolicy, ConfigError> {
        Ok(CheckPolicy {
            retry_count: self.retry_count.unwrap_or(defaults.retry_count),
            retry_delay: resolve(
                self.retry_delay.as_deref(),
                &defaults.retry_delay,
                "retry_delay",
            )?,
            performance_timeout: resolve(
                self.performance_timeout.as_deref(),
                &defaults.performance_timeout,
                "performance_timeout",
            )?,
            request_timeout: resolve(
                self.request_timeout.as_deref(),
                &defaults.request_timeout,
                "request_timeout",
            )?,
            incident_threshold: resolve(
                self.incident_threshold.as_deref(),
                &defaults.incident_threshold,
                "incident_threshold",
            )?,
        })
    }
}

fn resolve(override_: Option<&str>, fallback: &str, field: &str) -> Result<Duration, ConfigError> {
    let value = override_.unwrap_or(fallback);
    parse_duration(value).ok_or_else(|| ConfigError::Duration {
        field: field.to_string(),
        value: value.to_string(),
    })
}

impl Config {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check id uniqueness and that every duration field parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        resolve(None, &self.schedule, "schedule")?;
        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.id.as_str()) {
                return Err(ConfigError::DuplicateId(service.id.clone()));
            }
            service.policy(&self.defaults)?;
        }
        Ok(())
    }

    /// The check cadence as a duration.
    pub fn schedule_interval(&self) -> Result<Duration, ConfigError> {
        resolve(None, &self.schedule, "schedule")
    }
}
