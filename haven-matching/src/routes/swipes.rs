use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::auth::AuthUser;
use haven_shared::types::ApiResponse;

use crate::events::publisher;
use crate::services::swipe_service::{self, SwipeOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub target_id: Uuid,
    pub liked: bool,
}

/// POST /swipes - record a like or pass; the response says whether it completed a match
pub async fn send_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeOutcome>>> {
    let outcome = swipe_service::swipe(
        state.store.as_ref(),
        state.directory.as_ref(),
        user.id,
        req.target_id,
        req.liked,
    )
    .await?;

    let rabbitmq = state.rabbitmq.as_ref();
    publisher::publish_swipe_recorded(rabbitmq, user.id, req.target_id, req.liked).await;

    let created = &outcome.match_outcome;
    if let (true, Some(row)) = (created.newly_created, created.row.as_ref()) {
        publisher::publish_match_created(rabbitmq, row, user.id, outcome.target.is_fake).await;
    }

    Ok(Json(ApiResponse::ok(outcome)))
}
