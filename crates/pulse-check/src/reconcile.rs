//! Reconciliation — one pass evaluating every configured service.
//!
//! Each service runs in its own task: a slow or retrying check never
//! delays another service. The cycle has no cancellation — every check
//! runs to its natural conclusion. Overlapping cycles are tolerated;
//! the state store resolves same-id writes last-write-wins.

use std::sync::Arc;

use tracing::{debug, error, info};

use pulse_core::{CheckPolicy, ServiceSpec};
use pulse_probe::Prober;
use pulse_state::{ServiceStatus, StateStore};

use crate::retry::Checker;

type BoxFuture = std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>;

/// Callback invoked with (service id, new status) on every transition.
///
/// The daemon wires this to the status-page client; tests count calls.
/// Failures are the callback's own concern — reconciliation proceeds to
/// the store update regardless of what reporting does.
pub type ReportFn = Arc<dyn Fn(String, ServiceStatus) -> BoxFuture + Send + Sync>;

/// Drives one check cycle over the full service list.
pub struct Reconciler<P: Prober> {
    services: Arc<Vec<(ServiceSpec, CheckPolicy)>>,
    store: StateStore,
    checker: Checker<P>,
    report: ReportFn,
}

impl<P: Prober> Reconciler<P> {
    pub fn new(
        services: Vec<(ServiceSpec, CheckPolicy)>,
        store: StateStore,
        prober: Arc<P>,
        report: ReportFn,
    ) -> Self {
        Self {
            services: Arc::new(services),
            store,
            checker: Checker::new(prober),
            report,
        }
    }

    /// The shared state store backing this reconciler.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run one reconciliation cycle: every service checked concurrently,
    /// transitions reported and recorded.
    pub async fn run_cycle(&self) {
        let mut tasks = Vec::with_capacity(self.services.len());
        for (spec, policy) in self.services.iter() {
            let spec = spec.clone();
            let policy = *policy;
            let store = self.store.clone();
            let checker = self.checker.clone();
            let report = self.report.clone();
            tasks.push(tokio::spawn(async move {
                check_service(spec, policy, store, checker, report).await;
            }));
        }
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "service check task panicked");
            }
        }
        debug!(services = self.services.len(), "reconciliation cycle finished");
    }
}

async fn check_service<P: Prober>(
    spec: ServiceSpec,
    policy: CheckPolicy,
    store: StateStore,
    checker: Checker<P>,
    report: ReportFn,
) {
    let previous = store.get(&spec.id).await;
    let record = match checker
        .check_with_retry(&spec, &policy, previous.as_ref())
        .await
    {
        Ok(record) => record,
        Err(e) => {
            // Malformed target: this service's check is abandoned for the
            // cycle, everything else keeps going.
            error!(service = %spec.id, error = %e, "check aborted");
            return;
        }
    };

    if previous.as_ref().map(|p| p.status) == Some(record.status) {
        debug!(service = %spec.id, status = %record.status, "status unchanged");
        return;
    }

    info!(
        service = %spec.id,
        status = %record.status,
        message = %record.message,
        "status changed"
    );
    (report)(spec.id.clone(), record.status).await;
    store.replace(&spec.id, record).await;
}
