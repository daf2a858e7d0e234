use std::sync::Arc;

use tokio::sync::Mutex;

use crate::services::alert_engine::{self, AlertSweepSummary};
use crate::services::digest;
use crate::services::dispatch::RunSummary;
use crate::AppState;

/// One lease per pipeline. A scheduled run that finds its lease held
/// (the previous run is still in flight) is skipped, not queued. The
/// conditional trigger commit already makes overlap harmless; the lease
/// just stops duplicate quote/news fetches from burning quota.
#[derive(Clone, Default)]
pub struct RunLeases {
    alert_sweep: Arc<Mutex<()>>,
    daily_digest: Arc<Mutex<()>>,
}

/// Scheduler entry point for the alert-evaluation pipeline.
pub async fn run_alert_sweep(state: &AppState) -> AlertSweepSummary {
    let _guard = match state.run_leases.alert_sweep.try_lock() {
        Ok(guard) => guard,
        Err(_) => {
            tracing::warn!("previous alert sweep still in flight; skipping this run");
            return AlertSweepSummary::default();
        }
    };

    let summary = alert_engine::evaluate_all_pending(state).await;
    tracing::info!(
        checked = summary.checked,
        triggered = summary.triggered,
        "alert sweep complete"
    );
    summary
}

/// Scheduler entry point for the daily-digest pipeline.
pub async fn run_daily_digest(state: &AppState) -> RunSummary {
    let _guard = match state.run_leases.daily_digest.try_lock() {
        Ok(guard) => guard,
        Err(_) => {
            tracing::warn!("previous daily digest still in flight; skipping this run");
            return RunSummary::default();
        }
    };

    let summary = digest::run_daily_digest(state).await;
    tracing::info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "daily digest complete"
    );
    summary
}
