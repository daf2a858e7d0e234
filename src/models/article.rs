use serde::{Deserialize, Serialize};

/// One news article as the feed returns it. Absent fields decode to
/// defaults so a partially-filled article can still be rejected by
/// [`RawArticle::is_valid`] instead of failing the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub category: String,

    // Unix seconds of publication.
    #[serde(default)]
    pub datetime: i64,

    #[serde(default)]
    pub headline: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub related: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub url: String,
}

impl RawArticle {
    pub fn is_valid(&self) -> bool {
        !self.headline.trim().is_empty()
            && !self.summary.trim().is_empty()
            && !self.url.trim().is_empty()
            && self.datetime > 0
    }

    /// Composite identity used when de-duplicating the general feed.
    pub fn dedupe_key(&self) -> String {
        format!("{}-{}-{}", self.id, self.url, self.headline)
    }
}

/// An article chosen for a digest, tagged with the round-robin round
/// (or sequential index on the general-feed path) it was picked in.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedArticle {
    pub article: RawArticle,

    // Symbol the article was fetched for; None on the general feed.
    pub symbol: Option<String>,

    pub selection_round: usize,
}
