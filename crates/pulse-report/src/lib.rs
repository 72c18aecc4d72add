//! pulse-report — status-page integration for pulsewatch.
//!
//! Pushes status transitions to a Cachet-style status page: fetch the
//! component's current code, skip the update when it already matches,
//! otherwise PUT the new code with the API token. Reporting is
//! best-effort by contract — callers log failures and move on, and the
//! state store update never depends on the push succeeding.

pub mod client;

pub use client::{ReportError, StatusPageClient, component_code};
