//! Status evaluation — classify one probe outcome.
//!
//! Pure function of (outcome, previous record, thresholds, now), so the
//! escalation arithmetic is testable with fixed clocks.

use pulse_core::CheckPolicy;
use pulse_probe::ProbeOutcome;
use pulse_state::{ServiceStatus, StatusRecord};

/// Classify a probe outcome against the service's previous record.
///
/// Rules, in order: unreachable is OFFLINE; reachable but slower than
/// the performance timeout is SLOW; otherwise ONLINE. An OFFLINE result
/// escalates to INCIDENT when the previous record was already failing
/// and `now_ms` has reached `previous.changed_at + incident_threshold`.
/// Only a currently-failing probe can escalate — SLOW and ONLINE never do.
///
/// `changed_at` is always `now_ms`, whether or not the status differs
/// from the previous record.
pub fn evaluate(
    outcome: &ProbeOutcome,
    previous: Option<&StatusRecord>,
    policy: &CheckPolicy,
    now_ms: u64,
) -> StatusRecord {
    let mut status = if !outcome.reachable {
        ServiceStatus::Offline
    } else if outcome.latency > policy.performance_timeout {
        ServiceStatus::Slow
    } else {
        ServiceStatus::Online
    };

    if status == ServiceStatus::Offline {
        if let Some(prev) = previous {
            let threshold_ms = policy.incident_threshold.as_millis() as u64;
            if prev.status.is_failing() && now_ms >= prev.changed_at.saturating_add(threshold_ms) {
                status = ServiceStatus::Incident;
            }
        }
    }

    StatusRecord {
        status,
        message: outcome.message.clone(),
        changed_at: now_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn policy() -> CheckPolicy {
        CheckPolicy {
            retry_count: 0,
            retry_delay: Duration::from_secs(5),
            performance_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            incident_threshold: Duration::from_secs(300),
        }
    }

    fn up(latency: Duration) -> ProbeOutcome {
        ProbeOutcome {
            reachable: true,
            latency,
            message: "200 OK".to_string(),
        }
    }

    fn down() -> ProbeOutcome {
        ProbeOutcome {
            reachable: false,
            latency: Duration::from_millis(10),
            message: "connection refused".to_string(),
        }
    }

    fn prev(status: ServiceStatus, changed_at: u64) -> StatusRecord {
        StatusRecord {
            status,
            message: "earlier".to_string(),
            changed_at,
        }
    }

    // ── Classification ─────────────────────────────────────────────

    #[test]
    fn unreachable_is_offline() {
        let record = evaluate(&down(), None, &policy(), 1_000);
        assert_eq!(record.status, ServiceStatus::Offline);
        assert_eq!(record.message, "connection refused");
    }

    #[test]
    fn unreachable_is_offline_even_after_online() {
        let previous = prev(ServiceStatus::Online, 0);
        let record = evaluate(&down(), Some(&previous), &policy(), 1_000);
        assert_eq!(record.status, ServiceStatus::Offline);
    }

    #[test]
    fn fast_and_reachable_is_online() {
        let record = evaluate(&up(Duration::from_millis(50)), None, &policy(), 1_000);
        assert_eq!(record.status, ServiceStatus::Online);
    }

    #[test]
    fn latency_at_the_boundary_is_online() {
        let record = evaluate(&up(Duration::from_secs(1)), None, &policy(), 1_000);
        assert_eq!(record.status, ServiceStatus::Online);
    }

    #[test]
    fn latency_over_the_boundary_is_slow() {
        let record = evaluate(&up(Duration::from_millis(1_001)), None, &policy(), 1_000);
        assert_eq!(record.status, ServiceStatus::Slow);
    }

    // ── Escalation ─────────────────────────────────────────────────

    #[test]
    fn offline_past_threshold_escalates() {
        let previous = prev(ServiceStatus::Offline, 0);
        let record = evaluate(&down(), Some(&previous), &policy(), 301_000);
        assert_eq!(record.status, ServiceStatus::Incident);
    }

    #[test]
    fn offline_at_exact_threshold_escalates() {
        let previous = prev(ServiceStatus::Offline, 0);
        let record = evaluate(&down(), Some(&previous), &policy(), 300_000);
        assert_eq!(record.status, ServiceStatus::Incident);
    }

    #[test]
    fn offline_below_threshold_stays_offline() {
        let previous = prev(ServiceStatus::Offline, 0);
        let record = evaluate(&down(), Some(&previous), &policy(), 299_999);
        assert_eq!(record.status, ServiceStatus::Offline);
    }

    #[test]
    fn incident_remains_incident_while_down() {
        let previous = prev(ServiceStatus::Incident, 0);
        let record = evaluate(&down(), Some(&previous), &policy(), 600_000);
        assert_eq!(record.status, ServiceStatus::Incident);
    }

    #[test]
    fn first_failure_never_escalates() {
        // No previous record: absence means "never checked".
        let record = evaluate(&down(), None, &policy(), 999_999_999);
        assert_eq!(record.status, ServiceStatus::Offline);
    }

    #[test]
    fn previous_online_never_escalates() {
        let previous = prev(ServiceStatus::Online, 0);
        let record = evaluate(&down(), Some(&previous), &policy(), 301_000);
        assert_eq!(record.status, ServiceStatus::Offline);
    }

    #[test]
    fn previous_slow_never_escalates() {
        let previous = prev(ServiceStatus::Slow, 0);
        let record = evaluate(&down(), Some(&previous), &policy(), 301_000);
        assert_eq!(record.status, ServiceStatus::Offline);
    }

    #[test]
    fn slow_outcome_never_escalates() {
        let previous = prev(ServiceStatus::Offline, 0);
        let record = evaluate(
            &up(Duration::from_secs(5)),
            Some(&previous),
            &policy(),
            301_000,
        );
        assert_eq!(record.status, ServiceStatus::Slow);
    }

    #[test]
    fn online_outcome_never_escalates() {
        let previous = prev(ServiceStatus::Incident, 0);
        let record = evaluate(
            &up(Duration::from_millis(10)),
            Some(&previous),
            &policy(),
            900_000,
        );
        assert_eq!(record.status, ServiceStatus::Online);
    }

    // ── Timestamps ─────────────────────────────────────────────────

    #[test]
    fn changed_at_is_always_evaluation_time() {
        let previous = prev(ServiceStatus::Online, 4_000);
        let record = evaluate(&up(Duration::from_millis(10)), Some(&previous), &policy(), 5_000);
        // Status didn't change, the timestamp still moves.
        assert_eq!(record.status, ServiceStatus::Online);
        assert_eq!(record.changed_at, 5_000);
    }
}
