use chrono::Utc;
use futures_util::future::join_all;
use serde_json::json;

use crate::models::User;
use crate::services::dispatch::{self, DispatchOutcome, NotificationJob, RunSummary, TemplateKind};
use crate::services::{news_service, user_service};
use crate::AppState;

/// Assemble and send the daily news digest to every recipient.
///
/// Each recipient's preparation (watchlist resolution + news aggregation +
/// render) runs concurrently under the same isolation contract as the
/// dispatch itself: a failure there becomes a recorded outcome in the run
/// summary, never an aborted run.
pub async fn run_daily_digest(state: &AppState) -> RunSummary {
    if !state.finnhub.has_key() {
        tracing::error!("FINNHUB_API_KEY is missing; skipping daily digest run");
        return RunSummary::default();
    }

    let users = match user_service::list_digest_recipients(state).await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!(error = %e, "failed to load digest recipients");
            return RunSummary::default();
        }
    };

    if users.is_empty() {
        tracing::info!("no digest recipients; nothing to send");
        return RunSummary::default();
    }

    let prepared = join_all(users.iter().map(|user| async move {
        match prepare_digest_job(state, user).await {
            Ok(job) => Ok(job),
            Err(reason) => {
                tracing::warn!(
                    recipient = %user.email,
                    error = %reason,
                    "digest preparation failed"
                );
                Err(DispatchOutcome {
                    recipient: user.email.clone(),
                    succeeded: false,
                    failure_reason: Some(reason),
                })
            }
        }
    }))
    .await;

    let mut jobs: Vec<NotificationJob> = Vec::new();
    let mut prep_failures: Vec<DispatchOutcome> = Vec::new();
    for item in prepared {
        match item {
            Ok(job) => jobs.push(job),
            Err(outcome) => prep_failures.push(outcome),
        }
    }

    let mut summary = dispatch::dispatch(state, jobs).await;
    summary.attempted += prep_failures.len();
    summary.failed += prep_failures.len();
    summary.failures.extend(prep_failures);
    summary
}

async fn prepare_digest_job(state: &AppState, user: &User) -> Result<NotificationJob, String> {
    let symbols = user_service::watchlist_symbols(state, user.id).await?;

    let articles =
        news_service::select_articles(state, &symbols, news_service::MAX_DIGEST_ARTICLES).await?;

    let news_content = if articles.is_empty() {
        "No market news for your watchlist today.".to_string()
    } else {
        articles
            .iter()
            .map(|a| format!("• {}", a.article.headline))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let date = Utc::now().format("%B %d, %Y").to_string();

    Ok(NotificationJob {
        recipient: user.email.clone(),
        subject: format!("Market News Summary Today - {date}"),
        template: TemplateKind::NewsDigest,
        substitutions: json!({
            "name": user.display_name(),
            "date": date,
            "news_content": news_content,
        }),
        text_body: "Today's market news summary from MarketPulse".to_string(),
    })
}
