use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub finnhub_api_key: String,
    pub groq_api_key: String,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_from: String,

    // 6-field cron expressions (sec min hour dom mon dow)
    pub alert_sweep_cron: String,
    pub daily_digest_cron: String,

    pub http_timeout_secs: u64,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "marketpulse".to_string());

    let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();
    let groq_api_key = env::var("GROQ_API_KEY").unwrap_or_default();

    let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());

    let smtp_port = env::var("SMTP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(587);

    let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
    let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();

    let mail_from = env::var("MAIL_FROM")
        .unwrap_or_else(|_| "MarketPulse <alerts@marketpulse.local>".to_string());

    let alert_sweep_cron =
        env::var("ALERT_SWEEP_CRON").unwrap_or_else(|_| "0 */5 * * * *".to_string());
    let daily_digest_cron =
        env::var("DAILY_DIGEST_CRON").unwrap_or_else(|_| "0 0 12 * * *".to_string());

    let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);

    Settings {
        mongodb_uri,
        mongodb_db,
        finnhub_api_key,
        groq_api_key,
        smtp_host,
        smtp_port,
        smtp_username,
        smtp_password,
        mail_from,
        alert_sweep_cron,
        daily_digest_cron,
        http_timeout_secs,
    }
}
