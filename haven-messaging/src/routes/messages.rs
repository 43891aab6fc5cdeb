use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::api::ApiResponse;
use haven_shared::types::auth::AuthUser;
use haven_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::Message;
use crate::services::conversation_service::{self, SendMessageRequest};
use crate::services::reply_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub total_unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub marked: usize,
}

/// GET /conversations/:id/messages - paginated messages, newest first
pub async fn list_messages(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Message>>>> {
    let store = state.store.as_ref();
    conversation_service::load_for_member(store, conversation_id, auth_user.id).await?;

    let (items, total) = store
        .list_messages(conversation_id, params.offset() as i64, params.limit() as i64)
        .await?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

/// POST /conversations/:id/messages - send a message in a conversation
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let (message, _) = conversation_service::send_message(
        state.store.as_ref(),
        state.notifier.as_ref(),
        auth_user.id,
        conversation_id,
        req,
    )
    .await?;

    publisher::publish_message_sent(state.rabbitmq.as_ref(), &message).await;
    spawn_seeded_reply(state.clone(), message.clone());

    Ok(Json(ApiResponse::ok(message)))
}

/// If the recipient is a seeded profile, answer on its behalf after a short pause.
fn spawn_seeded_reply(state: Arc<AppState>, incoming: Message) {
    tokio::spawn(async move {
        let seeded = match state.profiles.get(incoming.recipient_id).await {
            Ok(Some(profile)) if profile.is_fake => profile,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    recipient_id = %incoming.recipient_id,
                    "could not resolve recipient, skipping seeded reply"
                );
                return;
            }
        };

        tokio::time::sleep(Duration::from_millis(state.config.reply_delay_ms)).await;

        match reply_service::reply_as_seeded(
            state.store.as_ref(),
            state.notifier.as_ref(),
            state.completion.as_ref(),
            &seeded,
            &incoming,
        )
        .await
        {
            Ok((reply, _)) => {
                publisher::publish_message_sent(state.rabbitmq.as_ref(), &reply).await
            }
            Err(e) => tracing::error!(
                error = %e,
                conversation_id = %incoming.conversation_id,
                "seeded reply failed"
            ),
        }
    });
}

/// POST /conversations/:id/read - mark messages addressed to the caller as read
pub async fn mark_as_read(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MarkReadResponse>>> {
    let marked = conversation_service::mark_read(
        state.store.as_ref(),
        state.notifier.as_ref(),
        conversation_id,
        auth_user.id,
    )
    .await?;
    Ok(Json(ApiResponse::ok(MarkReadResponse { marked })))
}

/// GET /unread-count - unread messages across all of the caller's conversations
pub async fn get_unread_count(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let total_unread = state.store.unread_count(auth_user.id).await?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { total_unread })))
}
