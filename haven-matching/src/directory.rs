use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult};

/// Resolves the direct conversation for a pair of profiles, creating it on first use.
#[async_trait]
pub trait ConversationDirectory: Send + Sync {
    async fn open_direct(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Uuid>;
}

#[derive(Debug, Serialize)]
struct OpenDirectRequest {
    user_a: Uuid,
    user_b: Uuid,
}

#[derive(Debug, Deserialize)]
struct OpenDirectResponse {
    conversation_id: Uuid,
}

/// Calls haven-messaging's internal endpoint.
pub struct HttpConversationDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpConversationDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ConversationDirectory for HttpConversationDirectory {
    async fn open_direct(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Uuid> {
        let url = format!("{}/internal/conversations/direct", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&OpenDirectRequest { user_a, user_b })
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("messaging service unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(format!(
                "messaging service returned {}",
                resp.status()
            )));
        }

        let body = resp
            .json::<OpenDirectResponse>()
            .await
            .map_err(|e| AppError::upstream(format!("invalid messaging response: {e}")))?;

        Ok(body.conversation_id)
    }
}
