use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Validated verdict of the sentiment engine. A `None` from the engine
/// means extraction could not be attempted or parsed at all; this struct
/// is only ever constructed with in-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,

    // 0 = extremely bearish, 50 = neutral, 100 = extremely bullish.
    pub score: i64,

    pub summary: String,
}

impl SentimentResult {
    pub fn neutral(summary: &str) -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 50,
            summary: summary.to_string(),
        }
    }
}
