use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::api::ApiResponse;
use haven_shared::types::auth::AuthUser;
use haven_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::{UsageEvent, UsageKind};
use crate::services::moments::{self, VoiceUsageRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: i32,
}

#[derive(Debug, Serialize)]
pub struct VoiceChargeResponse {
    pub charged: i32,
    pub balance: i32,
}

fn cache_key(user_id: Uuid) -> String {
    format!("moments:{user_id}")
}

/// Keep the last known balance for degraded reads.
pub(crate) async fn remember_balance(state: &AppState, user_id: Uuid, balance: i32) {
    if let Some(redis) = &state.redis {
        redis
            .cache_json(&cache_key(user_id), &balance, state.config.balance_cache_ttl_secs)
            .await;
    }
}

/// GET /moments - the caller's balance.
/// Falls back to the last cached balance (or 0) when the store is unavailable.
pub async fn get_balance(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<BalanceResponse>>> {
    let starter = state.config.starter_moments;
    let balance = match moments::balance(state.store.as_ref(), starter, auth_user.id).await {
        Ok(b) => {
            remember_balance(&state, auth_user.id, b.balance).await;
            b.balance
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %auth_user.id, "failed to load balance, serving cache");
            let cached = match &state.redis {
                Some(redis) => redis.cached_json::<i32>(&cache_key(auth_user.id)).await,
                None => None,
            };
            cached.unwrap_or(0)
        }
    };

    Ok(Json(ApiResponse::ok(BalanceResponse { balance })))
}

/// POST /usage/voice - charge a finished voice call, one moment per started minute
pub async fn charge_voice(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceUsageRequest>,
) -> AppResult<Json<ApiResponse<VoiceChargeResponse>>> {
    let starter = state.config.starter_moments;
    let (balance, charged) =
        moments::charge_voice(state.store.as_ref(), starter, auth_user.id, req).await?;

    remember_balance(&state, auth_user.id, balance.balance).await;
    publisher::publish_moments_deducted(
        state.rabbitmq.as_ref(),
        auth_user.id,
        charged,
        UsageKind::VoiceMinute,
        balance.balance,
    )
    .await;

    Ok(Json(ApiResponse::ok(VoiceChargeResponse {
        charged,
        balance: balance.balance,
    })))
}

/// GET /usage - paginated usage history, newest first
pub async fn list_usage(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<UsageEvent>>>> {
    let (items, total) = state
        .store
        .list_usage(auth_user.id, params.offset() as i64, params.limit() as i64)
        .await?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}
