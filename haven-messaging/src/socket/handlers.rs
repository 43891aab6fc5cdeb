use std::sync::Arc;

use serde::Serialize;
use socketioxide::extract::{Data, SocketRef};
use uuid::Uuid;

use haven_shared::types::auth::{jwt_secret, validate_token};

use crate::services::conversation_service;
use crate::AppState;

use super::{conversation_room, user_room};

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

fn get_user_id(socket: &SocketRef) -> Option<Uuid> {
    socket.extensions.get::<Uuid>()
}

pub async fn on_connect_with_state(
    socket: SocketRef,
    auth: Option<serde_json::Value>,
    state: Arc<AppState>,
) {
    let user_id = match authenticate_socket(&socket, auth.as_ref()) {
        Ok(id) => id,
        Err(msg) => {
            tracing::warn!(error = %msg, "messaging socket auth failed");
            let _ = socket.emit(
                "error",
                &ErrorPayload {
                    code: "AUTH_FAILED".into(),
                    message: msg,
                },
            );
            socket.disconnect().ok();
            return;
        }
    };

    socket.extensions.insert(user_id);

    // Personal room: conversation list changes for this user land here
    socket.join(user_room(user_id)).ok();

    tracing::info!(user_id = %user_id, sid = %socket.id, "messaging socket connected");
    let _ = socket.emit("connected", &serde_json::json!({ "user_id": user_id }));

    // Open chat screens subscribe to their conversation room
    socket.on("conversation:join", {
        let state = state.clone();
        move |socket: SocketRef, Data::<serde_json::Value>(payload)| {
            let state = state.clone();
            async move {
                on_conversation_join(socket, payload, &state).await;
            }
        }
    });

    socket.on(
        "conversation:leave",
        |socket: SocketRef, Data::<serde_json::Value>(payload)| async move {
            if let Some(conversation_id) = conversation_id_from(&payload) {
                socket.leave(conversation_room(conversation_id)).ok();
            }
        },
    );

    socket.on_disconnect(|socket: SocketRef| async move {
        if let Some(user_id) = get_user_id(&socket) {
            tracing::info!(user_id = %user_id, sid = %socket.id, "messaging socket disconnected");
        }
    });
}

async fn on_conversation_join(
    socket: SocketRef,
    payload: serde_json::Value,
    state: &Arc<AppState>,
) {
    let Some(user_id) = get_user_id(&socket) else { return };

    let Some(conversation_id) = conversation_id_from(&payload) else {
        tracing::warn!("conversation:join missing conversation_id");
        return;
    };

    let membership =
        conversation_service::load_for_member(state.store.as_ref(), conversation_id, user_id).await;
    match membership {
        Ok(_) => {
            socket.join(conversation_room(conversation_id)).ok();
            tracing::debug!(user_id = %user_id, conversation_id = %conversation_id, "joined conversation room");
        }
        Err(e) => {
            let _ = socket.emit(
                "error",
                &ErrorPayload {
                    code: e.code().map(|c| c.code()).unwrap_or("E0001").into(),
                    message: e.to_string(),
                },
            );
        }
    }
}

fn conversation_id_from(payload: &serde_json::Value) -> Option<Uuid> {
    payload
        .get("conversation_id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// The bearer token comes from the handshake `auth.token`, or `?token=` for older clients.
fn authenticate_socket(
    socket: &SocketRef,
    auth: Option<&serde_json::Value>,
) -> Result<Uuid, String> {
    let from_auth = auth
        .and_then(|a| a.get("token"))
        .and_then(|t| t.as_str())
        .map(|t| t.trim_start_matches("Bearer ").to_string());

    let token = match from_auth {
        Some(token) => token,
        None => token_from_query(socket.req_parts().uri.query().unwrap_or_default())
            .ok_or_else(|| "missing auth token".to_string())?,
    };

    let claims = validate_token(&token, &jwt_secret()).map_err(|e| e.to_string())?;
    if claims.is_expired() {
        return Err("token has expired".into());
    }

    Ok(claims.sub)
}

fn token_from_query(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let mut split = pair.splitn(2, '=');
        let key = split.next()?;
        let value = split.next()?;
        (key == "token").then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_read_from_query_string() {
        let token = token_from_query("EIO=4&token=abc.def&transport=websocket");
        assert_eq!(token.as_deref(), Some("abc.def"));
        assert_eq!(token_from_query("EIO=4&transport=polling"), None);
    }

    #[test]
    fn conversation_id_is_parsed_from_payload() {
        let id = Uuid::new_v4();
        assert_eq!(conversation_id_from(&serde_json::json!({ "conversation_id": id })), Some(id));
        assert_eq!(conversation_id_from(&serde_json::json!({ "conversation_id": "nope" })), None);
    }
}
