use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult};
use haven_shared::types::ProfileSummary;

/// Read-only view of haven-matching's profiles.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Option<ProfileSummary>>;

    /// Unknown ids are skipped.
    async fn batch(&self, ids: &[Uuid]) -> AppResult<Vec<ProfileSummary>>;
}

pub struct HttpProfileDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    ids: &'a [Uuid],
}

#[async_trait]
impl ProfileDirectory for HttpProfileDirectory {
    async fn get(&self, id: Uuid) -> AppResult<Option<ProfileSummary>> {
        let url = format!("{}/internal/profiles/{id}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("matching service unreachable: {e}")))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let profile = resp
                    .json::<ProfileSummary>()
                    .await
                    .map_err(|e| AppError::upstream(format!("invalid profile response: {e}")))?;
                Ok(Some(profile))
            }
            status => Err(AppError::upstream(format!("matching service returned {status}"))),
        }
    }

    async fn batch(&self, ids: &[Uuid]) -> AppResult<Vec<ProfileSummary>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let url = format!("{}/internal/profiles/batch", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&BatchRequest { ids })
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("matching service unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(format!(
                "matching service returned {}",
                resp.status()
            )));
        }

        resp.json::<Vec<ProfileSummary>>()
            .await
            .map_err(|e| AppError::upstream(format!("invalid profile batch response: {e}")))
    }
}
