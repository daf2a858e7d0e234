//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at startup and registers the two
//! recurring pipelines: the alert sweep on a short fixed interval and the
//! news digest at a daily fixed time.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::services::pipelines;
use crate::AppState;

/// Builds and starts the scheduler. The returned handle must be kept
/// alive for the lifetime of the process; dropping it stops all jobs.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_alert_sweep_job(&scheduler, state.clone()).await?;
    register_daily_digest_job(&scheduler, state).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_alert_sweep_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let cron = state.settings.alert_sweep_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            let summary = pipelines::run_alert_sweep(&state).await;
            tracing::info!(
                checked = summary.checked,
                triggered = summary.triggered,
                "scheduler: alert sweep finished"
            );
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn register_daily_digest_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let cron = state.settings.daily_digest_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            let summary = pipelines::run_daily_digest(&state).await;
            tracing::info!(
                attempted = summary.attempted,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "scheduler: daily digest finished"
            );
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
