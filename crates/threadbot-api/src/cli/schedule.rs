//! `threadbot schedule`: recurring runs until Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use futures_util::FutureExt;
use tracing::{error, info, warn};

use threadbot_core::schedule::{RunCallback, RunScheduler};
use threadbot_core::thread::engine::RunError;

use crate::state::ConcreteEngine;

/// Start the scheduler and block until a shutdown signal arrives.
///
/// A failed run is logged and the next trigger proceeds as normal. A trigger
/// that fires while a run is still in flight is skipped.
pub async fn schedule(engine: ConcreteEngine, cadence: &str, json: bool) -> Result<()> {
    let engine = Arc::new(engine);

    let callback: RunCallback = Arc::new(move |fired_at: DateTime<Utc>| {
        let engine = Arc::clone(&engine);
        async move {
            match engine.run_once().await {
                Ok(report) => info!(
                    %fired_at,
                    sequence = report.sequence,
                    handle = %report.persona_handle,
                    "scheduled run posted"
                ),
                Err(RunError::AlreadyRunning) => {
                    warn!(%fired_at, "previous run still in progress, skipping trigger")
                }
                Err(e) => error!(%fired_at, error = %e, "scheduled run failed"),
            }
        }
        .boxed()
    });

    let scheduler = RunScheduler::start(cadence, callback).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "status": "scheduled", "cron": scheduler.cron_expr() })
        );
    } else {
        println!();
        println!(
            "  {} Scheduled on {} (Ctrl+C to stop)",
            style("⏱").bold(),
            style(scheduler.cron_expr()).yellow()
        );
        println!();
    }

    shutdown_signal().await;
    info!("shutdown signal received");
    scheduler.stop().await?;
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
