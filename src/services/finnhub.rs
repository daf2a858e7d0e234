use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::RawArticle;

const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, timeout_secs, FINNHUB_BASE_URL)
    }

    /// Alternate base URL, used to point the client at a mock server.
    pub fn with_base_url(api_key: String, timeout_secs: u64, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn quote(&self, symbol: &str) -> Result<QuoteResponse, String> {
        if !self.has_key() {
            return Err("FINNHUB_API_KEY is missing in .env".to_string());
        }

        let url = format!("{}/quote", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Finnhub quote failed: {status} {body}"));
        }

        res.json::<QuoteResponse>().await.map_err(|e| e.to_string())
    }

    pub async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawArticle>, String> {
        if !self.has_key() {
            return Err("FINNHUB_API_KEY is missing in .env".to_string());
        }

        let url = format!("{}/company-news", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("from", &from.format("%Y-%m-%d").to_string()),
                ("to", &to.format("%Y-%m-%d").to_string()),
                ("token", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Finnhub company-news failed: {status} {body}"));
        }

        res.json::<Vec<RawArticle>>().await.map_err(|e| e.to_string())
    }

    pub async fn general_news(&self) -> Result<Vec<RawArticle>, String> {
        if !self.has_key() {
            return Err("FINNHUB_API_KEY is missing in .env".to_string());
        }

        let url = format!("{}/news", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("category", "general"), ("token", &self.api_key)])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Finnhub general news failed: {status} {body}"));
        }

        res.json::<Vec<RawArticle>>().await.map_err(|e| e.to_string())
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteResponse {
    // current
    #[serde(default)]
    pub c: f64,
    // change
    #[serde(default)]
    pub d: f64,
    // percent change
    #[serde(default)]
    pub dp: f64,
    // high
    #[serde(default)]
    pub h: f64,
    // low
    #[serde(default)]
    pub l: f64,
    // open
    #[serde(default)]
    pub o: f64,
    // previous close
    #[serde(default)]
    pub pc: f64,
    // timestamp
    #[serde(default)]
    pub t: i64,
}

impl QuoteResponse {
    /// A zero (or garbage) current price means the feed has no data for
    /// the symbol; evaluation must skip it.
    pub fn has_price(&self) -> bool {
        self.c.is_finite() && self.c > 0.0
    }
}
