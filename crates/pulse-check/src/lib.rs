//! pulse-check — the status evaluation and escalation state machine.
//!
//! Converts raw probe outcomes into classified service statuses and
//! drives one reconciliation cycle over every configured service.
//!
//! # Architecture
//!
//! ```text
//! Reconciler::run_cycle()
//!   ├── One task per service (concurrent, unordered)
//!   │   ├── Checker::check_with_retry (bounded attempts, fixed delay)
//!   │   │   ├── Prober::probe → ProbeOutcome
//!   │   │   └── evaluate() → StatusRecord (OFFLINE/SLOW/ONLINE/INCIDENT)
//!   │   └── on transition: report callback, then StateStore::replace
//!   └── Awaits every task to its natural conclusion
//! ```
//!
//! Escalation is the only stateful rule: an OFFLINE evaluation whose
//! previous record has been failing for longer than the service's
//! incident threshold becomes an INCIDENT.

pub mod evaluator;
pub mod reconcile;
pub mod retry;

pub use evaluator::evaluate;
pub use reconcile::{ReportFn, Reconciler};
pub use retry::Checker;
