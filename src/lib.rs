//! Library entrypoint for MarketPulse.
//!
//! MarketPulse is a headless notification daemon: a cron scheduler invokes
//! the alert-evaluation and news-digest pipelines, which read from MongoDB,
//! consult market-data services, and fan out emails. This file exists mainly
//! to make pipeline tests easy (integration tests under `tests/` can import
//! the app state, engines, and services).

pub mod config;
pub mod models;

pub mod services;

pub mod scheduler;
pub mod templates;

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub db: mongodb::Database,
    pub settings: config::Settings,
    pub finnhub: services::finnhub::FinnhubClient,
    pub groq: services::groq::GroqClient,
    pub mailer: services::mailer::Mailer,
    pub run_leases: services::pipelines::RunLeases,
}
