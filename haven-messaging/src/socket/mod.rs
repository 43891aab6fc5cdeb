pub mod handlers;
pub mod notifier;

pub use notifier::{ConversationNotifier, SocketNotifier};

pub fn user_room(user_id: uuid::Uuid) -> String {
    format!("user:{user_id}")
}

pub fn conversation_room(conversation_id: uuid::Uuid) -> String {
    format!("conversation:{conversation_id}")
}
