use regex::Regex;
use serde_json::Value;

use crate::models::{Sentiment, SentimentResult};
use crate::services::news_service;
use crate::AppState;

pub const MAX_SENTIMENT_HEADLINES: usize = 5;

const SYSTEM_PROMPT: &str = "You are a financial analyst. Return only valid JSON.";
pub const DEFAULT_SUMMARY: &str = "Sentiment analysis completed.";
pub const NO_NEWS_SUMMARY: &str = "No recent news available for analysis.";
pub const NO_HEADLINES_SUMMARY: &str = "No headlines available for analysis.";

/// Extract a sentiment verdict for a symbol from its recent headlines.
///
/// Returns `None` when extraction could not be attempted (missing
/// credential, failed lookup or completion) or the response could not be
/// parsed. A symbol with no recent news gets the neutral default without
/// spending a reasoning call.
pub async fn analyze_symbol(state: &AppState, symbol: &str) -> Option<SentimentResult> {
    if !state.groq.has_key() {
        tracing::warn!("GROQ_API_KEY is missing; sentiment analysis unavailable");
        return None;
    }

    let articles = match news_service::select_articles(
        state,
        &[symbol.to_string()],
        news_service::MAX_DIGEST_ARTICLES,
    )
    .await
    {
        Ok(articles) => articles,
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "news lookup for sentiment failed");
            return None;
        }
    };

    if articles.is_empty() {
        return Some(SentimentResult::neutral(NO_NEWS_SUMMARY));
    }

    let headlines: Vec<String> = articles
        .iter()
        .take(MAX_SENTIMENT_HEADLINES)
        .map(|a| {
            if a.article.headline.trim().is_empty() {
                a.article.summary.clone()
            } else {
                a.article.headline.clone()
            }
        })
        .filter(|h| !h.trim().is_empty())
        .collect();

    if headlines.is_empty() {
        return Some(SentimentResult::neutral(NO_HEADLINES_SUMMARY));
    }

    let prompt = build_sentiment_prompt(symbol, &headlines);

    let response = match state.groq.complete(SYSTEM_PROMPT, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "sentiment completion failed");
            return None;
        }
    };

    parse_sentiment_response(&response)
}

pub fn build_sentiment_prompt(symbol: &str, headlines: &[String]) -> String {
    let numbered = headlines
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}. {}", i + 1, h))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the sentiment of these news headlines for {symbol} stock. \
         Return ONLY a JSON object with these exact fields:\n\
         - sentiment: \"bullish\", \"bearish\", or \"neutral\"\n\
         - score: a number from 0 to 100 (0 = extremely bearish, 50 = neutral, 100 = extremely bullish)\n\
         - summary: a brief 1-sentence summary of the overall sentiment\n\n\
         Headlines:\n{numbered}\n\n\
         Return ONLY valid JSON, no markdown, no explanation."
    )
}

/// Parse the free-form completion, stopping at the first step that
/// succeeds: strip code fences; find a brace group carrying all three
/// expected field names; else the first balanced-brace substring; decode.
/// Any miss yields `None`. Decoded fields are repaired, never rejected.
pub fn parse_sentiment_response(text: &str) -> Option<SentimentResult> {
    let fences = Regex::new(r"```(?:json)?").ok()?;
    let clean = fences.replace_all(text, "");
    let clean = clean.trim();

    let shaped = Regex::new(r#"\{[^{}]*"sentiment"[^{}]*"score"[^{}]*"summary"[^{}]*\}"#).ok()?;
    let candidate = match shaped.find(clean) {
        Some(m) => m.as_str(),
        None => first_balanced_braces(clean)?,
    };

    let value: Value = serde_json::from_str(candidate).ok()?;
    Some(repair(&value))
}

fn first_balanced_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth: usize = 0;

    for (idx, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + idx + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

fn repair(value: &Value) -> SentimentResult {
    let sentiment = match value.get("sentiment").and_then(Value::as_str) {
        Some(s) if s.eq_ignore_ascii_case("bullish") => Sentiment::Bullish,
        Some(s) if s.eq_ignore_ascii_case("bearish") => Sentiment::Bearish,
        _ => Sentiment::Neutral,
    };

    let score = match value.get("score").and_then(Value::as_f64) {
        Some(n) if n.is_finite() => n.clamp(0.0, 100.0).round() as i64,
        _ => 50,
    };

    let summary = match value.get("summary").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => DEFAULT_SUMMARY.to_string(),
    };

    SentimentResult {
        sentiment,
        score,
        summary,
    }
}
