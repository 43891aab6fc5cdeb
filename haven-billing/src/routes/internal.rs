use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::AppResult;

use crate::events::publisher;
use crate::models::UsageKind;
use crate::routes::moments::{remember_balance, BalanceResponse};
use crate::services::moments;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LedgerRequest {
    pub user_id: Uuid,
    pub amount: i32,
    pub kind: UsageKind,
    pub reference: Option<String>,
}

/// POST /internal/moments/deduct - used by haven-messaging before a companion reply (no auth)
pub async fn deduct(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LedgerRequest>,
) -> AppResult<Json<BalanceResponse>> {
    let balance = moments::deduct(
        state.store.as_ref(),
        state.config.starter_moments,
        req.user_id,
        req.amount,
        req.kind,
        req.reference,
    )
    .await?;

    remember_balance(&state, req.user_id, balance.balance).await;
    publisher::publish_moments_deducted(
        state.rabbitmq.as_ref(),
        req.user_id,
        req.amount,
        req.kind,
        balance.balance,
    )
    .await;

    Ok(Json(BalanceResponse {
        balance: balance.balance,
    }))
}

/// POST /internal/moments/credit - refunds and grants (no auth)
pub async fn credit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LedgerRequest>,
) -> AppResult<Json<BalanceResponse>> {
    let balance = moments::credit(
        state.store.as_ref(),
        state.config.starter_moments,
        req.user_id,
        req.amount,
        req.kind,
        req.reference,
    )
    .await?;

    remember_balance(&state, req.user_id, balance.balance).await;

    Ok(Json(BalanceResponse {
        balance: balance.balance,
    }))
}
