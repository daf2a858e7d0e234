use futures_util::future::join_all;
use serde_json::json;

use crate::templates::Hbs;
use crate::AppState;

/// Which mail template a job renders. Templates are data in the registry,
/// resolved by key at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Welcome,
    NewsDigest,
    AlertAbove,
    AlertBelow,
}

impl TemplateKind {
    pub fn key(self) -> &'static str {
        match self {
            TemplateKind::Welcome => "mail/welcome",
            TemplateKind::NewsDigest => "mail/news_digest",
            TemplateKind::AlertAbove => "mail/alert_above",
            TemplateKind::AlertBelow => "mail/alert_below",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub recipient: String,
    pub subject: String,
    pub template: TemplateKind,
    pub substitutions: serde_json::Value,
    pub text_body: String,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub recipient: String,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
}

/// Aggregate result of one dispatch run. Returned to the caller for
/// logging; never persisted.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<DispatchOutcome>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: Vec<DispatchOutcome>) -> Self {
        let mut summary = RunSummary {
            attempted: outcomes.len(),
            ..RunSummary::default()
        };

        for outcome in outcomes {
            if outcome.succeeded {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
                summary.failures.push(outcome);
            }
        }

        summary
    }
}

/// Execute a batch of notification jobs concurrently. Each job runs
/// independently: a render or send failure is caught at that job's
/// boundary and recorded, and never cancels or delays the others.
pub async fn dispatch(state: &AppState, jobs: Vec<NotificationJob>) -> RunSummary {
    let outcomes = join_all(jobs.into_iter().map(|job| async move {
        match deliver(state, &job).await {
            Ok(()) => DispatchOutcome {
                recipient: job.recipient,
                succeeded: true,
                failure_reason: None,
            },
            Err(reason) => {
                tracing::warn!(
                    recipient = %job.recipient,
                    error = %reason,
                    "notification delivery failed"
                );
                DispatchOutcome {
                    recipient: job.recipient,
                    succeeded: false,
                    failure_reason: Some(reason),
                }
            }
        }
    }))
    .await;

    RunSummary::from_outcomes(outcomes)
}

async fn deliver(state: &AppState, job: &NotificationJob) -> Result<(), String> {
    let html = render_mail(&state.hbs, job.template, &job.substitutions)?;

    state
        .mailer
        .send(&job.recipient, &job.subject, &html, &job.text_body)
        .await
}

/// Pure placeholder substitution into the template selected by kind.
pub fn render_mail(
    hbs: &Hbs,
    template: TemplateKind,
    substitutions: &serde_json::Value,
) -> Result<String, String> {
    hbs.render(template.key(), substitutions)
        .map_err(|e| e.to_string())
}

pub fn welcome_job(email: &str, name: &str) -> NotificationJob {
    let intro = "Welcome to MarketPulse! You now have price alerts, a daily market digest, \
                 and sentiment insight for the stocks you track. Start by adding your \
                 favorite symbols to your watchlist.";

    NotificationJob {
        recipient: email.to_string(),
        subject: "Welcome to MarketPulse - your market toolkit is ready!".to_string(),
        template: TemplateKind::Welcome,
        substitutions: json!({ "name": name, "intro": intro }),
        text_body: "Thanks for joining MarketPulse".to_string(),
    }
}

pub async fn send_welcome(state: &AppState, email: &str, name: &str) -> RunSummary {
    dispatch(state, vec![welcome_job(email, name)]).await
}
