use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult, ErrorCode};
use haven_shared::types::api::ApiResponse;
use haven_shared::types::auth::AuthUser;

use crate::models::{Conversation, ConversationView};
use crate::services::conversation_service;
use crate::AppState;

fn cache_key(user_id: Uuid) -> String {
    format!("conversations:{user_id}")
}

/// GET /conversations - the caller's conversations, most recent activity first.
/// Falls back to the last cached list (or an empty one) when the store is unavailable.
pub async fn list_conversations(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ConversationView>>>> {
    let key = cache_key(auth_user.id);

    let views = match conversation_service::list_views(
        state.store.as_ref(),
        state.profiles.as_ref(),
        auth_user.id,
    )
    .await
    {
        Ok(views) => {
            if let Some(redis) = &state.redis {
                redis
                    .cache_json(&key, &views, state.config.conversation_cache_ttl_secs)
                    .await;
            }
            views
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %auth_user.id, "failed to load conversations, serving cache");
            let cached = match &state.redis {
                Some(redis) => redis.cached_json::<Vec<ConversationView>>(&key).await,
                None => None,
            };
            cached.unwrap_or_default()
        }
    };

    Ok(Json(ApiResponse::ok(views)))
}

#[derive(Debug, Deserialize)]
pub struct OpenDirectRequest {
    pub profile_id: Uuid,
}

/// POST /conversations/direct - get or create the conversation with another profile
pub async fn open_direct(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenDirectRequest>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    if req.profile_id == auth_user.id {
        return Err(AppError::new(ErrorCode::CannotMessageSelf, "you cannot message yourself"));
    }

    if state.profiles.get(req.profile_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }

    let store = state.store.as_ref();
    let (conversation, _) =
        conversation_service::open_direct(store, auth_user.id, req.profile_id).await?;
    Ok(Json(ApiResponse::ok(conversation)))
}

/// GET /conversations/:id - a single conversation the caller takes part in
pub async fn get_conversation(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    let store = state.store.as_ref();
    let conversation =
        conversation_service::load_for_member(store, conversation_id, auth_user.id).await?;
    Ok(Json(ApiResponse::ok(conversation)))
}
