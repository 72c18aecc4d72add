//! pulse-probe — reachability and latency probes for pulsewatch.
//!
//! A probe executes one check against a service and reports a raw
//! [`ProbeOutcome`]: reachable or not, how long it took, and a short
//! message. Every network failure mode (timeout, refusal, DNS error,
//! non-2xx response) is folded into an unreachable outcome — the only
//! error a probe can return is a service spec whose target fields don't
//! match its kind, which aborts that service's check alone.
//!
//! The [`Prober`] trait is the seam between probe execution and status
//! evaluation: all three variants present the same shape, so the
//! evaluator and retry controller never branch on probe type.

pub mod http;
pub mod port;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use pulse_core::{CheckPolicy, ProbeKind, ServiceSpec};

/// Raw result of a single probe. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    /// Whether the service answered at all (2xx response, open port).
    pub reachable: bool,
    /// Wall-clock duration of the probe.
    pub latency: Duration,
    /// Status line, socket state, or error detail.
    pub message: String,
}

/// A service spec whose target fields don't match its probe kind.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("service `{id}`: {kind} probe requires `{field}`")]
    MissingTarget {
        id: String,
        kind: ProbeKind,
        field: &'static str,
    },
}

/// Executes one probe for a service spec.
pub trait Prober: Send + Sync + 'static {
    fn probe(
        &self,
        spec: &ServiceSpec,
        policy: &CheckPolicy,
    ) -> impl Future<Output = Result<ProbeOutcome, ProbeError>> + Send;
}

/// The real network prober: reqwest for HTTP, tokio sockets for TCP/UDP.
#[derive(Clone, Default)]
pub struct NetProber {
    client: reqwest::Client,
}

impl NetProber {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prober for NetProber {
    async fn probe(
        &self,
        spec: &ServiceSpec,
        policy: &CheckPolicy,
    ) -> Result<ProbeOutcome, ProbeError> {
        match spec.kind {
            ProbeKind::Http => {
                let url = spec.url.as_deref().ok_or_else(|| missing(spec, "url"))?;
                Ok(http::check_http(&self.client, url, policy.request_timeout).await)
            }
            ProbeKind::Tcp => {
                let (host, p) = endpoint(spec)?;
                Ok(port::check_tcp(host, p, policy.request_timeout).await)
            }
            ProbeKind::Udp => {
                let (host, p) = endpoint(spec)?;
                Ok(port::check_udp(host, p, policy.request_timeout).await)
            }
        }
    }
}

fn endpoint(spec: &ServiceSpec) -> Result<(&str, u16), ProbeError> {
    let host = spec.host.as_deref().ok_or_else(|| missing(spec, "host"))?;
    let port = spec.port.ok_or_else(|| missing(spec, "port"))?;
    Ok((host, port))
}

fn missing(spec: &ServiceSpec, field: &'static str) -> ProbeError {
    ProbeError::MissingTarget {
        id: spec.id.clone(),
        kind: spec.kind,
        field,
    }
}
