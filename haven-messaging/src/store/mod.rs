//! Persistence boundary for conversations and messages.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::CanonicalPair;

use crate::models::{Conversation, Message, NewMessage};

pub use memory::MemoryMessagingStore;
pub use postgres::PgMessagingStore;

#[async_trait]
pub trait MessagingStore: Send + Sync {
    /// Get-or-create the conversation for `pair`. The flag is true when this call created it.
    async fn open_direct(&self, pair: CanonicalPair) -> AppResult<(Conversation, bool)>;

    async fn get_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>>;

    /// Conversations `user_id` takes part in, most recent activity first.
    async fn list_conversations(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    /// Append a message and refresh the conversation's last-message fields.
    async fn append_message(&self, message: NewMessage) -> AppResult<Message>;

    /// Newest first, plus the total number of messages in the conversation.
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Message>, i64)>;

    /// Flag every unread message addressed to `reader` in the conversation. Returns how many changed.
    async fn mark_read(&self, conversation_id: Uuid, reader: Uuid) -> AppResult<usize>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64>;

    /// Unread totals per conversation for `user_id`; conversations with none are omitted.
    async fn unread_by_conversation(&self, user_id: Uuid) -> AppResult<Vec<(Uuid, i64)>>;

    async fn ping(&self) -> AppResult<()>;
}
