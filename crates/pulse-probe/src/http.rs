//! HTTP probe — GET with a hard per-request timeout.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;

use crate::ProbeOutcome;

/// Issue a GET against `url`.
///
/// The request is capped at `request_timeout`; reqwest aborts the
/// in-flight request when the cap expires. Reachable iff the response
/// status is 2xx. Latency is the wall-clock duration of the request.
pub async fn check_http(client: &Client, url: &str, request_timeout: Duration) -> ProbeOutcome {
    let start = Instant::now();
    let result = client.get(url).timeout(request_timeout).send().await;
    let latency = start.elapsed();

    match result {
        Ok(response) => {
            let message = status_line(response.status());
            if response.status().is_success() {
                debug!(%url, %message, ?latency, "http probe ok");
                ProbeOutcome {
                    reachable: true,
                    latency,
                    message,
                }
            } else {
                debug!(%url, %message, "http probe non-2xx");
                ProbeOutcome {
                    reachable: false,
                    latency,
                    message,
                }
            }
        }
        Err(e) => {
            let message = if e.is_timeout() {
                format!("request timed out after {request_timeout:?}")
            } else {
                e.to_string()
            };
            debug!(%url, %message, "http probe failed");
            ProbeOutcome {
                reachable: false,
                latency,
                message,
            }
        }
    }
}

fn status_line(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
