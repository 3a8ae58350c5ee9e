use crate::config::Config;
use crate::controller::CompletionService;
use crate::prompts;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Duration;

/// Client for the Gemini generateContent endpoint.
///
/// One single-shot request per turn; no streaming, no retries. A transport
/// or non-2xx failure propagates to the caller.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "No Gemini API key configured. Set GEMINI_API_KEY or add gemini_api_key to config.toml."
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let payload = serde_json::json!({
            "contents": [
                {
                    "parts": [{"text": prompt}]
                }
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({status}): {error_text}");
        }

        let body: Value = response.json().await?;
        Ok(prompts::clean_reply(&extract_reply_text(&body)))
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn request_reply(&self, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }
}

/// Pull the first candidate's first text part out of a generateContent
/// response, tolerating any missing level.
fn extract_reply_text(body: &Value) -> String {
    body.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or(prompts::EMPTY_REPLY_PLACEHOLDER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reply_text() {
        let body = serde_json::json!({
            "candidates": [
                {
                    "content": {
                        "parts": [
                            {"text": "Feedback: solid.\nNext Question: Why Rust?"}
                        ]
                    }
                }
            ]
        });
        assert_eq!(
            extract_reply_text(&body),
            "Feedback: solid.\nNext Question: Why Rust?"
        );
    }

    #[test]
    fn test_extract_defaults_when_candidates_missing() {
        assert_eq!(
            extract_reply_text(&serde_json::json!({})),
            prompts::EMPTY_REPLY_PLACEHOLDER
        );
    }

    #[test]
    fn test_extract_defaults_when_parts_empty() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": []}}]
        });
        assert_eq!(extract_reply_text(&body), prompts::EMPTY_REPLY_PLACEHOLDER);
    }

    #[test]
    fn test_extract_defaults_when_text_is_not_a_string() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": 42}]}}]
        });
        assert_eq!(extract_reply_text(&body), prompts::EMPTY_REPLY_PLACEHOLDER);
    }
}
