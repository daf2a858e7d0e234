pub mod alert_engine;
pub mod alert_service;
pub mod db_init;
pub mod digest;
pub mod dispatch;
pub mod finnhub;
pub mod groq;
pub mod mailer;
pub mod news_service;
pub mod pipelines;
pub mod sentiment_service;
pub mod user_service;
