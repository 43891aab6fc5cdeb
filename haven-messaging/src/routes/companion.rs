use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use haven_shared::errors::AppResult;
use haven_shared::types::api::ApiResponse;
use haven_shared::types::auth::AuthUser;

use crate::services::companion::{self, CompanionChatRequest, CompanionReply};
use crate::AppState;

/// POST /companion/chat - one AI companion reply, charged one moment
pub async fn chat(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompanionChatRequest>,
) -> AppResult<Json<ApiResponse<CompanionReply>>> {
    let reply = companion::companion_chat(
        state.ledger.as_ref(),
        state.completion.as_ref(),
        auth_user.id,
        req,
    )
    .await?;
    Ok(Json(ApiResponse::ok(reply)))
}
