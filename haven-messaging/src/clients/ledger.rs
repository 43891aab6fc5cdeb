use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult};
use haven_shared::types::ApiErrorResponse;
use haven_shared::ErrorCode;

/// Moment balance operations served by haven-billing.
#[async_trait]
pub trait MomentLedger: Send + Sync {
    /// Returns the balance left after the deduction.
    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: &str,
        reference: Option<String>,
    ) -> AppResult<i32>;

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: &str,
        reference: Option<String>,
    ) -> AppResult<i32>;
}

#[derive(Debug, Serialize)]
struct LedgerRequest<'a> {
    user_id: Uuid,
    amount: i32,
    kind: &'a str,
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LedgerResponse {
    balance: i32,
}

pub struct HttpMomentLedger {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMomentLedger {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn call(&self, path: &str, body: LedgerRequest<'_>) -> AppResult<i32> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("billing service unreachable: {e}")))?;

        if resp.status().is_success() {
            let body = resp
                .json::<LedgerResponse>()
                .await
                .map_err(|e| AppError::upstream(format!("invalid billing response: {e}")))?;
            return Ok(body.balance);
        }

        // Surface billing's own error code so "out of moments" reaches the client as-is.
        let status = resp.status();
        match resp.json::<ApiErrorResponse>().await {
            Ok(err) if err.error.code == ErrorCode::InsufficientMoments.code() => Err(AppError::new(
                ErrorCode::InsufficientMoments,
                err.error.message,
            )),
            _ => Err(AppError::upstream(format!("billing service returned {status}"))),
        }
    }
}

#[async_trait]
impl MomentLedger for HttpMomentLedger {
    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: &str,
        reference: Option<String>,
    ) -> AppResult<i32> {
        self.call(
            "/internal/moments/deduct",
            LedgerRequest { user_id, amount, kind, reference },
        )
        .await
    }

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        kind: &str,
        reference: Option<String>,
    ) -> AppResult<i32> {
        self.call(
            "/internal/moments/credit",
            LedgerRequest { user_id, amount, kind, reference },
        )
        .await
    }
}
