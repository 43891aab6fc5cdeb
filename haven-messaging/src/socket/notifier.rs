use serde::Serialize;
use socketioxide::SocketIo;
use uuid::Uuid;

use haven_shared::types::payloads::MatchCreated;

use crate::models::{Conversation, Message};

use super::{conversation_room, user_room};

pub const CONVERSATION_CHANGED: &str = "conversation:changed";
pub const MATCH_CREATED: &str = "match:created";

/// Push-style change notifications. Clients re-query on every event.
pub trait ConversationNotifier: Send + Sync {
    fn conversation_changed(&self, conversation: &Conversation, message: Option<&Message>);

    fn match_created(&self, event: &MatchCreated);
}

#[derive(Debug, Serialize)]
pub struct ConversationChanged {
    pub conversation_id: Uuid,
    pub last_message: Option<String>,
    pub last_message_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_sender_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
}

impl ConversationChanged {
    pub fn new(conversation: &Conversation, message: Option<&Message>) -> Self {
        Self {
            conversation_id: conversation.id,
            last_message: conversation.last_message.clone(),
            last_message_at: conversation.last_message_at,
            last_sender_id: conversation.last_sender_id,
            message_id: message.map(|m| m.id),
        }
    }
}

pub struct SocketNotifier {
    io: SocketIo,
}

impl SocketNotifier {
    pub fn new(io: SocketIo) -> Self {
        Self { io }
    }
}

impl ConversationNotifier for SocketNotifier {
    fn conversation_changed(&self, conversation: &Conversation, message: Option<&Message>) {
        let payload = ConversationChanged::new(conversation, message);
        let result = self
            .io
            .to(user_room(conversation.participant_low))
            .to(user_room(conversation.participant_high))
            .to(conversation_room(conversation.id))
            .emit(CONVERSATION_CHANGED, &payload);

        if let Err(e) = result {
            tracing::warn!(error = %e, conversation_id = %conversation.id, "failed to emit conversation change");
        }
    }

    fn match_created(&self, event: &MatchCreated) {
        let payload = serde_json::json!({
            "match_id": event.match_id,
            "conversation_id": event.conversation_id,
        });
        let result = self
            .io
            .to(user_room(event.user_low))
            .to(user_room(event.user_high))
            .emit(MATCH_CREATED, &payload);

        if let Err(e) = result {
            tracing::warn!(error = %e, match_id = %event.match_id, "failed to emit match notification");
        }
    }
}
