use std::collections::HashMap;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::json;

use crate::models::{Alert, AlertKind, User};
use crate::services::dispatch::{self, NotificationJob, TemplateKind};
use crate::services::{alert_service, user_service};
use crate::AppState;

/// Result of one evaluation sweep over all pending alerts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlertSweepSummary {
    pub checked: usize,
    pub triggered: usize,
}

/// Evaluate every pending alert against a fresh quote.
///
/// Alerts are grouped by symbol so the quote service is consulted once per
/// distinct symbol, not once per alert; symbol groups are evaluated
/// concurrently and a failed (or empty) quote skips that group for this
/// cycle only; the next scheduled sweep retries it naturally.
pub async fn evaluate_all_pending(state: &AppState) -> AlertSweepSummary {
    if !state.finnhub.has_key() {
        tracing::error!("FINNHUB_API_KEY is missing; skipping alert sweep");
        return AlertSweepSummary::default();
    }

    let pending = match alert_service::find_pending(state).await {
        Ok(alerts) => alerts,
        Err(e) => {
            tracing::error!(error = %e, "failed to load pending alerts");
            return AlertSweepSummary::default();
        }
    };

    if pending.is_empty() {
        return AlertSweepSummary::default();
    }

    let checked = pending.len();
    let by_symbol = group_by_symbol(pending);

    let results = join_all(
        by_symbol
            .into_iter()
            .map(|(symbol, alerts)| evaluate_symbol(state, symbol, alerts)),
    )
    .await;

    let mut triggered = 0;
    let mut jobs: Vec<NotificationJob> = Vec::new();
    for (count, mut symbol_jobs) in results {
        triggered += count;
        jobs.append(&mut symbol_jobs);
    }

    if !jobs.is_empty() {
        let mail = dispatch::dispatch(state, jobs).await;
        tracing::info!(
            attempted = mail.attempted,
            succeeded = mail.succeeded,
            failed = mail.failed,
            "alert notifications dispatched"
        );
    }

    AlertSweepSummary { checked, triggered }
}

pub fn group_by_symbol(alerts: Vec<Alert>) -> HashMap<String, Vec<Alert>> {
    let mut by_symbol: HashMap<String, Vec<Alert>> = HashMap::new();
    for alert in alerts {
        by_symbol.entry(alert.symbol.clone()).or_default().push(alert);
    }
    by_symbol
}

pub fn crossing_met(kind: AlertKind, target_price: f64, current: f64) -> bool {
    match kind {
        AlertKind::Above => current >= target_price,
        AlertKind::Below => current <= target_price,
    }
}

async fn evaluate_symbol(
    state: &AppState,
    symbol: String,
    alerts: Vec<Alert>,
) -> (usize, Vec<NotificationJob>) {
    let quote = match state.finnhub.quote(&symbol).await {
        Ok(q) => q,
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "quote fetch failed; skipping symbol this cycle");
            return (0, Vec::new());
        }
    };

    if !quote.has_price() {
        tracing::warn!(symbol = %symbol, "no quote data; skipping symbol this cycle");
        return (0, Vec::new());
    }
    let price = quote.c;

    let mut triggered = 0;
    let mut jobs: Vec<NotificationJob> = Vec::new();

    for alert in alerts {
        if !crossing_met(alert.kind, alert.target_price, price) {
            continue;
        }

        // The conditional commit decides ownership: only the caller that
        // performed the pending->triggered transition sends the mail.
        match alert_service::try_mark_triggered(state, alert.id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(
                    symbol = %symbol,
                    alert_id = %alert.id,
                    "alert already triggered by a concurrent run"
                );
                continue;
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, alert_id = %alert.id, error = %e, "trigger commit failed");
                continue;
            }
        }
        triggered += 1;

        match user_service::find_user(state, alert.user_id).await {
            Ok(Some(user)) => jobs.push(alert_job(&user, &alert, price)),
            Ok(None) => {
                tracing::warn!(alert_id = %alert.id, "alert owner not found; trigger stands without notification");
            }
            Err(e) => {
                tracing::warn!(alert_id = %alert.id, error = %e, "owner lookup failed; trigger stands without notification");
            }
        }
    }

    (triggered, jobs)
}

pub fn alert_job(user: &User, alert: &Alert, current_price: f64) -> NotificationJob {
    let (template, subject) = match alert.kind {
        AlertKind::Above => (
            TemplateKind::AlertAbove,
            format!("{} hit your target of ${:.2}!", alert.symbol, alert.target_price),
        ),
        AlertKind::Below => (
            TemplateKind::AlertBelow,
            format!("{} dropped below ${:.2}", alert.symbol, alert.target_price),
        ),
    };

    let timestamp = Utc::now().format("%b %d, %Y %H:%M UTC").to_string();

    NotificationJob {
        recipient: user.email.clone(),
        subject,
        template,
        substitutions: json!({
            "symbol": alert.symbol,
            "company": alert.company,
            "target_price": format!("${:.2}", alert.target_price),
            "current_price": format!("${:.2}", current_price),
            "timestamp": timestamp,
        }),
        text_body: format!(
            "{} price alert triggered. Current price: ${:.2}",
            alert.symbol, current_price
        ),
    }
}
