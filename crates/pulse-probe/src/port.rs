//! TCP and UDP port probes.
//!
//! TCP attempts a connection under a timeout; the port is open iff the
//! connection is established. UDP is best-effort: a reply means open,
//! an ICMP port-unreachable means closed, and silence is reported as
//! `open|filtered` since no reply is indistinguishable from an open
//! port that simply doesn't answer.

use std::time::{Duration, Instant};

use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

use crate::ProbeOutcome;

/// Attempt a TCP connection to `host:port`.
pub async fn check_tcp(host: &str, port: u16, request_timeout: Duration) -> ProbeOutcome {
    let start = Instant::now();
    let result = tokio::time::timeout(request_timeout, TcpStream::connect((host, port))).await;
    let latency = start.elapsed();

    match result {
        Ok(Ok(_stream)) => {
            debug!(%host, port, ?latency, "tcp probe open");
            ProbeOutcome {
                reachable: true,
                latency,
                message: "open".to_string(),
            }
        }
        Ok(Err(e)) => {
            debug!(%host, port, error = %e, "tcp probe failed");
            ProbeOutcome {
                reachable: false,
                latency,
                message: e.to_string(),
            }
        }
        Err(_) => {
            debug!(%host, port, "tcp probe timed out");
            ProbeOutcome {
                reachable: false,
                latency,
                message: format!("connect timed out after {request_timeout:?}"),
            }
        }
    }
}

/// Send an empty datagram to `host:port` and wait for any reply.
pub async fn check_udp(host: &str, port: u16, request_timeout: Duration) -> ProbeOutcome {
    let start = Instant::now();
    let exchange = async {
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        socket.connect((host, port)).await?;
        socket.send(&[]).await?;
        let mut buf = [0u8; 512];
        socket.recv(&mut buf).await.map(|_| ())
    };
    let result = tokio::time::timeout(request_timeout, exchange).await;
    let latency = start.elapsed();

    match result {
        Ok(Ok(())) => {
            debug!(%host, port, ?latency, "udp probe got a reply");
            ProbeOutcome {
                reachable: true,
                latency,
                message: "open".to_string(),
            }
        }
        // A connected UDP socket surfaces ICMP port-unreachable as a recv error.
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            debug!(%host, port, "udp probe port unreachable");
            ProbeOutcome {
                reachable: false,
                latency,
                message: "closed".to_string(),
            }
        }
        Ok(Err(e)) => {
            debug!(%host, port, error = %e, "udp probe failed");
            ProbeOutcome {
                reachable: false,
                latency,
                message: e.to_string(),
            }
        }
        Err(_) => {
            debug!(%host, port, "udp probe silent");
            ProbeOutcome {
                reachable: true,
                latency,
                message: "open|filtered".to_string(),
            }
        }
    }
}
