use crate::config::Config;
use crate::controller::TranscriptStore;
use crate::model::Message;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;
use tracing::debug;

/// Transcript and job context as returned by the backend.
///
/// Missing fields default so a sparse response hydrates an empty view
/// instead of failing the load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRecord {
    pub chat: Vec<Message>,
    pub job_role: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload<'a> {
    updated_chat: ChatUpdate<'a>,
}

#[derive(Debug, Serialize)]
struct ChatUpdate<'a> {
    chat: &'a [Message],
}

/// Client for the transcript backend.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        })
    }

    fn chat_url(&self, user_id: &str, chat_id: &str) -> String {
        format!("{}/user/chat/{}/{}", self.base_url, user_id, chat_id)
    }
}

#[async_trait]
impl TranscriptStore for BackendClient {
    async fn fetch_chat(&self, user_id: &str, chat_id: &str) -> Result<ChatRecord> {
        let response = self
            .client
            .get(self.chat_url(user_id, chat_id))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("backend returned {} for chat fetch", response.status());
        }

        let record: ChatRecord = response.json().await?;
        debug!(
            "fetched {} message(s) for chat {chat_id}",
            record.chat.len()
        );
        Ok(record)
    }

    /// Append only the new messages; the backend merges them into the
    /// stored transcript. The response body is ignored.
    async fn append_messages(
        &self,
        user_id: &str,
        chat_id: &str,
        messages: &[Message],
    ) -> Result<()> {
        let payload = UpdatePayload {
            updated_chat: ChatUpdate { chat: messages },
        };

        let response = self
            .client
            .put(self.chat_url(user_id, chat_id))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("backend returned {} for chat update", response.status());
        }

        Ok(())
    }
}
