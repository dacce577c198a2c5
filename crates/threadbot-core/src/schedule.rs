//! In-process run cadence on top of `tokio-cron-scheduler`.
//!
//! A cadence is either cron (5 fields, or 6 with a leading seconds field) or
//! an interval phrase such as `every 3 hours`. Both end up as 6-field cron.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler error: {0}")]
    JobError(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
}

/// Turn a cadence into a 6-field cron expression.
///
/// `every N seconds|minutes|hours` (singular accepted) becomes a step on the
/// matching field. Cron fields are passed through; the scheduler validates
/// them when the job is built.
pub fn normalize_schedule(input: &str) -> Result<String, SchedulerError> {
    let invalid = || SchedulerError::InvalidSchedule(input.trim().to_string());
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts.as_slice() {
        [_, _, _, _, _] => Ok(format!("0 {}", parts.join(" "))),
        [_, _, _, _, _, _] => Ok(parts.join(" ")),
        [every, n, unit] if every.eq_ignore_ascii_case("every") => {
            let n: u32 = n.parse().map_err(|_| invalid())?;
            if n == 0 {
                return Err(SchedulerError::InvalidSchedule(
                    "interval must be > 0".to_string(),
                ));
            }
            match unit.to_ascii_lowercase().trim_end_matches('s') {
                "second" => Ok(format!("*/{n} * * * * *")),
                "minute" => Ok(format!("0 */{n} * * * *")),
                "hour" => Ok(format!("0 0 */{n} * * *")),
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

/// Callback type invoked each time the schedule fires.
pub type RunCallback =
    Arc<dyn Fn(DateTime<Utc>) -> futures_util::future::BoxFuture<'static, ()> + Send + Sync>;

/// Runs one callback on a recurring cron schedule.
pub struct RunScheduler {
    inner: JobScheduler,
    cron_expr: String,
}

impl RunScheduler {
    /// Create and start a scheduler that fires `callback` on `schedule`.
    pub async fn start(schedule: &str, callback: RunCallback) -> Result<Self, SchedulerError> {
        let cron_expr = normalize_schedule(schedule)?;

        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _lock| {
            let cb = callback.clone();
            Box::pin(async move {
                let now = Utc::now();
                tracing::debug!(%now, "cron trigger fired");
                cb(now).await;
            })
        })
        .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;
        scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;

        tracing::info!(cron = %cron_expr, "run scheduler started");
        Ok(Self {
            inner: scheduler,
            cron_expr,
        })
    }

    /// The normalized cron expression in use.
    pub fn cron_expr(&self) -> &str {
        &self.cron_expr
    }

    /// Stop the scheduler. A run already in flight is not cancelled.
    pub async fn stop(mut self) -> Result<(), SchedulerError> {
        self.inner
            .shutdown()
            .await
            .map_err(|e| SchedulerError::JobError(e.to_string()))?;
        tracing::info!("run scheduler stopped");
        Ok(())
    }
}
