//! Retry controller — bounded attempts with a fixed inter-attempt delay.

use std::sync::Arc;

use tracing::debug;

use pulse_core::{CheckPolicy, ServiceSpec};
use pulse_probe::{ProbeError, Prober};
use pulse_state::{ServiceStatus, StatusRecord, epoch_millis};

use crate::evaluator::evaluate;

/// Wraps a [`Prober`] with the retry loop.
pub struct Checker<P: Prober> {
    prober: Arc<P>,
}

impl<P: Prober> Clone for Checker<P> {
    fn clone(&self) -> Self {
        Self {
            prober: self.prober.clone(),
        }
    }
}

impl<P: Prober> Checker<P> {
    pub fn new(prober: Arc<P>) -> Self {
        Self { prober }
    }

    /// Check a service with up to `retry_count + 1` probe attempts.
    ///
    /// An ONLINE evaluation returns immediately; any other status sleeps
    /// `retry_delay` and probes again while attempts remain. Exhaustion
    /// returns the last record, which may have been escalated to
    /// INCIDENT by the evaluator. Every attempt evaluates against the
    /// same stored `previous` record. Probe target errors propagate at
    /// once — a misconfigured service is not worth retrying.
    pub async fn check_with_retry(
        &self,
        spec: &ServiceSpec,
        policy: &CheckPolicy,
        previous: Option<&StatusRecord>,
    ) -> Result<StatusRecord, ProbeError> {
        let mut attempt = 0u32;
        loop {
            let outcome = self.prober.probe(spec, policy).await?;
            let record = evaluate(&outcome, previous, policy, epoch_millis());

            if record.status == ServiceStatus::Online || attempt >= policy.retry_count {
                return Ok(record);
            }

            attempt += 1;
            debug!(
                service = %spec.id,
                status = %record.status,
                attempt,
                attempts = policy.retry_count + 1,
                delay = ?policy.retry_delay,
                "check failed, retrying"
            );
            tokio::time::sleep(policy.retry_delay).await;
        }
    }
}
