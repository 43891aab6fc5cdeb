use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::AppResult;

use crate::services::conversation_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenDirectRequest {
    pub user_a: Uuid,
    pub user_b: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OpenDirectResponse {
    pub conversation_id: Uuid,
    pub created: bool,
}

/// POST /internal/conversations/direct - get-or-create used by haven-matching on a mutual match (no auth)
pub async fn open_direct(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenDirectRequest>,
) -> AppResult<Json<OpenDirectResponse>> {
    let (conversation, created) =
        conversation_service::open_direct(state.store.as_ref(), req.user_a, req.user_b).await?;

    if created {
        state.notifier.conversation_changed(&conversation, None);
    }

    Ok(Json(OpenDirectResponse {
        conversation_id: conversation.id,
        created,
    }))
}
