use std::sync::Arc;

use mongodb::Client;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marketpulse::models::Sentiment;
use marketpulse::services::mailer::{MailTransport, Mailer};
use marketpulse::services::pipelines::RunLeases;
use marketpulse::services::sentiment_service::{
    analyze_symbol, build_sentiment_prompt, parse_sentiment_response, DEFAULT_SUMMARY,
    NO_NEWS_SUMMARY,
};
use marketpulse::services::{finnhub, groq};
use marketpulse::{config, templates, AppState};

struct NoopMailer;

#[async_trait::async_trait]
impl MailTransport for NoopMailer {
    async fn send(&self, _: &str, _: &str, _: &str, _: &str) -> Result<(), String> {
        Ok(())
    }
}

async fn test_state(finnhub_base: &str, groq_base: &str, groq_key: &str) -> AppState {
    let mut settings = config::load();
    settings.finnhub_api_key = "test-key".to_string();
    settings.groq_api_key = groq_key.to_string();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    let mailer: Mailer = Arc::new(NoopMailer);

    AppState {
        hbs: templates::build_mail_templates(),
        db,
        settings,
        finnhub: finnhub::FinnhubClient::with_base_url("test-key".to_string(), 5, finnhub_base),
        groq: groq::GroqClient::with_base_url(groq_key.to_string(), 5, groq_base),
        mailer,
        run_leases: RunLeases::default(),
    }
}

#[test]
fn parses_a_plain_json_object() {
    let result = parse_sentiment_response(
        r#"{"sentiment": "bullish", "score": 82, "summary": "Earnings beat expectations."}"#,
    )
    .expect("parse");

    assert_eq!(result.sentiment, Sentiment::Bullish);
    assert_eq!(result.score, 82);
    assert_eq!(result.summary, "Earnings beat expectations.");
}

#[test]
fn strips_markdown_code_fences() {
    let text = "```json\n{\"sentiment\": \"bearish\", \"score\": 20, \"summary\": \"Guidance cut.\"}\n```";

    let result = parse_sentiment_response(text).expect("parse");
    assert_eq!(result.sentiment, Sentiment::Bearish);
    assert_eq!(result.score, 20);
}

#[test]
fn finds_the_object_inside_surrounding_prose() {
    let text = concat!(
        "Here is my analysis of the headlines.\n",
        r#"{"sentiment": "neutral", "score": 55, "summary": "Mixed signals."}"#,
        "\nLet me know if you need more detail."
    );

    let result = parse_sentiment_response(text).expect("parse");
    assert_eq!(result.sentiment, Sentiment::Neutral);
    assert_eq!(result.score, 55);
}

#[test]
fn falls_back_to_balanced_braces_for_nested_objects() {
    // The shaped search cannot match an object containing nested braces;
    // the balanced-brace scan picks up the whole thing.
    let text = r#"{"sentiment": "bullish", "score": 75, "summary": "Solid.", "detail": {"n": 3}}"#;

    let result = parse_sentiment_response(text).expect("parse");
    assert_eq!(result.sentiment, Sentiment::Bullish);
    assert_eq!(result.score, 75);
}

#[test]
fn garbage_yields_none() {
    assert!(parse_sentiment_response("no json here at all").is_none());
    assert!(parse_sentiment_response("{not valid json}").is_none());
    assert!(parse_sentiment_response("").is_none());
}

#[test]
fn out_of_range_scores_are_clamped() {
    let high = parse_sentiment_response(
        r#"{"sentiment": "bullish", "score": 150, "summary": "Over the top."}"#,
    )
    .expect("parse");
    assert_eq!(high.score, 100);

    let low = parse_sentiment_response(
        r#"{"sentiment": "bearish", "score": -10, "summary": "Below the floor."}"#,
    )
    .expect("parse");
    assert_eq!(low.score, 0);
}

#[test]
fn non_numeric_score_defaults_to_fifty() {
    let result = parse_sentiment_response(
        r#"{"sentiment": "neutral", "score": "high", "summary": "Words, not numbers."}"#,
    )
    .expect("parse");
    assert_eq!(result.score, 50);
}

#[test]
fn unknown_sentiment_is_coerced_to_neutral() {
    let result = parse_sentiment_response(
        r#"{"sentiment": "positive", "score": 60, "summary": "Off-vocabulary verdict."}"#,
    )
    .expect("parse");
    assert_eq!(result.sentiment, Sentiment::Neutral);
}

#[test]
fn empty_summary_gets_the_default_sentence() {
    let result =
        parse_sentiment_response(r#"{"sentiment": "bullish", "score": 70, "summary": ""}"#)
            .expect("parse");
    assert_eq!(result.summary, DEFAULT_SUMMARY);
}

#[test]
fn prompt_numbers_the_headlines() {
    let headlines = vec!["First story".to_string(), "Second story".to_string()];
    let prompt = build_sentiment_prompt("AAPL", &headlines);

    assert!(prompt.contains("AAPL"));
    assert!(prompt.contains("1. First story"));
    assert!(prompt.contains("2. Second story"));
}

#[tokio::test]
async fn analyzes_headlines_end_to_end() {
    let finnhub = MockServer::start().await;
    let groq = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/company-news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "headline": "AAPL beats on revenue", "summary": "s", "url": "https://e/1", "datetime": 30 },
            { "id": 2, "headline": "AAPL raises guidance", "summary": "s", "url": "https://e/2", "datetime": 20 },
        ])))
        .mount(&finnhub)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "```json\n{\"sentiment\": \"bullish\", \"score\": 88, \"summary\": \"Strong quarter.\"}\n```"
                }
            }]
        })))
        .mount(&groq)
        .await;

    let state = test_state(&finnhub.uri(), &groq.uri(), "test-key").await;

    let result = analyze_symbol(&state, "AAPL").await.expect("sentiment");
    assert_eq!(result.sentiment, Sentiment::Bullish);
    assert_eq!(result.score, 88);
    assert_eq!(result.summary, "Strong quarter.");
}

#[tokio::test]
async fn no_news_short_circuits_without_a_reasoning_call() {
    let finnhub = MockServer::start().await;
    let groq = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/company-news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&finnhub)
        .await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&finnhub)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&groq)
        .await;

    let state = test_state(&finnhub.uri(), &groq.uri(), "test-key").await;

    let result = analyze_symbol(&state, "AAPL").await.expect("default verdict");
    assert_eq!(result.sentiment, Sentiment::Neutral);
    assert_eq!(result.score, 50);
    assert_eq!(result.summary, NO_NEWS_SUMMARY);
}

#[tokio::test]
async fn missing_credential_yields_none() {
    let finnhub = MockServer::start().await;
    let groq = MockServer::start().await;

    let state = test_state(&finnhub.uri(), &groq.uri(), "").await;

    assert!(analyze_symbol(&state, "AAPL").await.is_none());
}

#[tokio::test]
async fn reasoning_failure_yields_none() {
    let finnhub = MockServer::start().await;
    let groq = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/company-news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "headline": "AAPL story", "summary": "s", "url": "https://e/1", "datetime": 30 },
        ])))
        .mount(&finnhub)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&groq)
        .await;

    let state = test_state(&finnhub.uri(), &groq.uri(), "test-key").await;

    assert!(analyze_symbol(&state, "AAPL").await.is_none());
}
