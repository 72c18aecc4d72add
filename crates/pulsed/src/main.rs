//! pulsed — the pulsewatch daemon.
//!
//! Single binary that assembles the monitor:
//! - Configuration (TOML service list + thresholds)
//! - State store seeded from the snapshot file
//! - Network probes (HTTP/TCP/UDP)
//! - Reconciliation engine with retries and escalation
//! - Status-page client
//! - Scheduler ticker + SIGINT snapshot flush
//!
//! # Usage
//!
//! ```text
//! pulsed run --config pulsewatch.toml --data-dir ./data
//! pulsed once --config pulsewatch.toml --data-dir ./data
//! ```
//!
//! `once` runs a single reconciliation cycle and exits, for setups where
//! an external scheduler (cron, a systemd timer) owns the cadence.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use pulse_check::{Reconciler, ReportFn};
use pulse_core::Config;
use pulse_probe::NetProber;
use pulse_report::StatusPageClient;
use pulse_state::StateStore;

#[derive(Parser)]
#[command(name = "pulsed", about = "pulsewatch daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run checks on the configured schedule until interrupted.
    Run {
        /// Path to the configuration file.
        #[arg(long, default_value = "pulsewatch.toml")]
        config: PathBuf,

        /// Directory holding the state snapshot.
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
    /// Run a single check cycle and exit.
    Once {
        /// Path to the configuration file.
        #[arg(long, default_value = "pulsewatch.toml")]
        config: PathBuf,

        /// Directory holding the state snapshot.
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulsed=debug,pulse=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, data_dir } => run(config, data_dir, false).await,
        Command::Once { config, data_dir } => run(config, data_dir, true).await,
    }
}

async fn run(config_path: PathBuf, data_dir: PathBuf, once: bool) -> anyhow::Result<()> {
    info!("pulsewatch starting");

    let config = Config::from_file(&config_path)?;
    let interval = config.schedule_interval()?;

    std::fs::create_dir_all(&data_dir)?;
    let snapshot_path = data_dir.join("snapshot.json");

    // ── Assemble subsystems ────────────────────────────────────────

    let store = StateStore::restore(&snapshot_path)?;
    info!(
        services = config.services.len(),
        known = store.len().await,
        "state store ready"
    );

    let mut services = Vec::with_capacity(config.services.len());
    for spec in &config.services {
        let policy = spec.policy(&config.defaults)?;
        services.push((spec.clone(), policy));
    }

    let client = Arc::new(StatusPageClient::new(
        config.status_page.api.as_str(),
        config.status_page.token.as_str(),
    ));
    let report: ReportFn = Arc::new(move |id, status| {
        let client = client.clone();
        Box::pin(async move {
            // Best-effort: a failed push is logged and the check cycle
            // carries on with its store update.
            if let Err(e) = client.push(&id, status).await {
                warn!(service = %id, error = %e, "status page update failed");
            }
        })
    });

    let reconciler = Arc::new(Reconciler::new(
        services,
        store.clone(),
        Arc::new(NetProber::new()),
        report,
    ));

    // ── Drive cycles ───────────────────────────────────────────────

    if once {
        reconciler.run_cycle().await;
    } else {
        info!(interval = ?interval, "scheduler started");
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Cycles are allowed to overlap; the store resolves
                    // same-id writes last-write-wins.
                    let reconciler = reconciler.clone();
                    tokio::spawn(async move {
                        reconciler.run_cycle().await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }
    }

    store.persist(&snapshot_path).await?;
    info!(path = ?snapshot_path, "state snapshot flushed");

    info!("pulsewatch stopped");
    Ok(())
}
