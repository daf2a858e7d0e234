use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Chat-completion client for the reasoning service. One prompt in,
/// free-form text out; callers own all parsing of the response.
#[derive(Clone)]
pub struct GroqClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GroqClient {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, timeout_secs, GROQ_BASE_URL)
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

    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, String> {
        if !self.has_key() {
            return Err("GROQ_API_KEY is missing in .env".to_string());
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": GROQ_MODEL,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.3,
            "max_tokens": 200
        });

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Groq completion failed: {status} {body}"));
        }

        let parsed = res.json::<ChatResponse>().await.map_err(|e| e.to_string())?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| "Groq returned an empty completion".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}
