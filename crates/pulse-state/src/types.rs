//! Domain types for service status tracking.
//!
//! A service is always in exactly one of four states. ONLINE and SLOW are
//! reachable states; OFFLINE is a failing probe; INCIDENT is an OFFLINE
//! that has persisted past the service's incident threshold.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unique identifier for a monitored service.
pub type ServiceId = String;

/// Classified status of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Online,
    Slow,
    Offline,
    Incident,
}

impl ServiceStatus {
    /// Whether this status represents a failing probe.
    pub fn is_failing(self) -> bool {
        matches!(self, ServiceStatus::Offline | ServiceStatus::Incident)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Online => write!(f, "ONLINE"),
            ServiceStatus::Slow => write!(f, "SLOW"),
            ServiceStatus::Offline => write!(f, "OFFLINE"),
            ServiceStatus::Incident => write!(f, "INCIDENT"),
        }
    }
}

/// The most recent evaluation result for a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: ServiceStatus,
    /// Human-readable detail from the probe (status line, socket state, error).
    pub message: String,
    /// Unix epoch milliseconds of the evaluation that produced this record.
    pub changed_at: u64,
}

/// Current Unix time in milliseconds.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
