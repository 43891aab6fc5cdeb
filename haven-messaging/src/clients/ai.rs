use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use haven_shared::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Remote text generation.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, messages: &[ChatTurn]) -> AppResult<String>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    system: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Deserialize)]
struct CompletionResponse {
    reply: String,
}

/// `POST {base_url}/chat`. An empty base url means the API is not configured and every call fails.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCompletionClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, system: &str, messages: &[ChatTurn]) -> AppResult<String> {
        if self.base_url.is_empty() {
            return Err(AppError::new(
                haven_shared::ErrorCode::ServiceUnavailable,
                "AI API is not configured",
            ));
        }

        let url = format!("{}/chat", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&CompletionRequest { system, messages })
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("AI API unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(format!("AI API returned {}", resp.status())));
        }

        let body = resp
            .json::<CompletionResponse>()
            .await
            .map_err(|e| AppError::upstream(format!("invalid AI API response: {e}")))?;

        let reply = body.reply.trim();
        if reply.is_empty() {
            return Err(AppError::upstream("AI API returned an empty reply"));
        }
        Ok(reply.to_string())
    }
}
