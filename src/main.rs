use std::sync::Arc;

use mongodb::Client;

use marketpulse::services::mailer::SmtpMailer;
use marketpulse::services::pipelines::RunLeases;
use marketpulse::services::{db_init, finnhub, groq};
use marketpulse::{config, scheduler, templates, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!(error = %e, "index creation failed; continuing without");
    }

    let finnhub = finnhub::FinnhubClient::new(
        settings.finnhub_api_key.clone(),
        settings.http_timeout_secs,
    );
    let groq = groq::GroqClient::new(settings.groq_api_key.clone(), settings.http_timeout_secs);
    let mailer = SmtpMailer::new(&settings).expect("Failed to build SMTP transport");

    let state = AppState {
        hbs: templates::build_mail_templates(),
        db,
        settings,
        finnhub,
        groq,
        mailer: Arc::new(mailer),
        run_leases: RunLeases::default(),
    };

    let _scheduler = scheduler::build_scheduler(state)
        .await
        .expect("Failed to start scheduler");

    tracing::info!("marketpulse pipelines scheduled; Ctrl-C to exit");

    tokio::signal::ctrl_c().await.expect("ctrl_c handler");
    tracing::info!("shutting down");
}
