use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult, ErrorCode};
use haven_shared::types::CanonicalPair;

use crate::models::{Conversation, Message, NewMessage};
use crate::services::conversation_service::preview;

use super::MessagingStore;

#[derive(Default)]
pub struct MemoryMessagingStore {
    pairs: DashMap<CanonicalPair, Uuid>,
    conversations: DashMap<Uuid, Conversation>,
    messages: DashMap<Uuid, Vec<Message>>,
}

impl MemoryMessagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }
}

#[async_trait]
impl MessagingStore for MemoryMessagingStore {
    async fn open_direct(&self, pair: CanonicalPair) -> AppResult<(Conversation, bool)> {
        let mut created = false;
        let id = *self.pairs.entry(pair).or_insert_with(|| {
            created = true;
            let now = Utc::now();
            let conversation = Conversation {
                id: Uuid::new_v4(),
                participant_low: pair.low,
                participant_high: pair.high,
                last_message: None,
                last_message_at: None,
                last_sender_id: None,
                created_at: now,
                updated_at: now,
            };
            let id = conversation.id;
            self.conversations.insert(id, conversation);
            id
        });

        let conversation = self
            .conversations
            .get(&id)
            .map(|c| c.clone())
            .ok_or_else(|| AppError::internal("conversation index out of sync"))?;
        Ok((conversation, created))
    }

    async fn get_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        Ok(self.conversations.get(&id).map(|c| c.clone()))
    }

    async fn list_conversations(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let mut rows: Vec<Conversation> = self
            .conversations
            .iter()
            .filter(|c| c.has_participant(user_id))
            .map(|c| c.clone())
            .collect();
        rows.sort_by_key(|c| std::cmp::Reverse(c.activity_at()));
        Ok(rows)
    }

    async fn append_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut conversation = self
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::ConversationNotFound, "conversation not found")
            })?;

        let stored = Message {
            id: Uuid::new_v4(),
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            content: message.content,
            attachment_url: message.attachment_url,
            is_read: false,
            created_at: Utc::now(),
        };

        conversation.last_message = Some(preview(&stored));
        conversation.last_message_at = Some(stored.created_at);
        conversation.last_sender_id = Some(stored.sender_id);
        conversation.updated_at = stored.created_at;

        self.messages
            .entry(stored.conversation_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Message>, i64)> {
        let Some(log) = self.messages.get(&conversation_id) else {
            return Ok((vec![], 0));
        };
        let items = log
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((items, log.len() as i64))
    }

    async fn mark_read(&self, conversation_id: Uuid, reader: Uuid) -> AppResult<usize> {
        let Some(mut log) = self.messages.get_mut(&conversation_id) else {
            return Ok(0);
        };
        let mut updated = 0;
        for message in log.iter_mut().filter(|m| m.recipient_id == reader && !m.is_read) {
            message.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self
            .unread_by_conversation(user_id)
            .await?
            .iter()
            .map(|(_, n)| n)
            .sum())
    }

    async fn unread_by_conversation(&self, user_id: Uuid) -> AppResult<Vec<(Uuid, i64)>> {
        Ok(self
            .messages
            .iter()
            .filter_map(|entry| {
                let unread = entry
                    .value()
                    .iter()
                    .filter(|m| m.recipient_id == user_id && !m.is_read)
                    .count() as i64;
                (unread > 0).then(|| (*entry.key(), unread))
            })
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(conversation: &Conversation, from: Uuid, content: &str) -> NewMessage {
        NewMessage {
            conversation_id: conversation.id,
            sender_id: from,
            recipient_id: conversation.pair().other(from).unwrap(),
            content: content.into(),
            attachment_url: None,
        }
    }

    #[tokio::test]
    async fn open_direct_is_idempotent_in_either_order() {
        let store = MemoryMessagingStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let (first, created) = store.open_direct(CanonicalPair::new(a, b)).await.unwrap();
        let (second, created_again) = store.open_direct(CanonicalPair::new(b, a)).await.unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first.id, second.id);
        assert_eq!(store.conversation_count(), 1);
    }

    #[tokio::test]
    async fn append_updates_last_message_fields() {
        let store = MemoryMessagingStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (conversation, _) = store.open_direct(CanonicalPair::new(a, b)).await.unwrap();

        store.append_message(text(&conversation, a, "first")).await.unwrap();
        let last = store.append_message(text(&conversation, b, "second")).await.unwrap();

        let refreshed = store.get_conversation(conversation.id).await.unwrap().unwrap();
        assert_eq!(refreshed.last_message.as_deref(), Some("second"));
        assert_eq!(refreshed.last_sender_id, Some(b));
        assert_eq!(refreshed.last_message_at, Some(last.created_at));

        let (page, total) = store.list_messages(conversation.id, 0, 1).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].content, "second");
    }

    #[tokio::test]
    async fn append_to_unknown_conversation_fails() {
        let store = MemoryMessagingStore::new();
        let err = store
            .append_message(NewMessage {
                conversation_id: Uuid::new_v4(),
                sender_id: Uuid::new_v4(),
                recipient_id: Uuid::new_v4(),
                content: "hello?".into(),
                attachment_url: None,
            })
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::ConversationNotFound));
    }

    #[tokio::test]
    async fn mark_read_only_touches_messages_addressed_to_reader() {
        let store = MemoryMessagingStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (conversation, _) = store.open_direct(CanonicalPair::new(a, b)).await.unwrap();

        store.append_message(text(&conversation, a, "to b")).await.unwrap();
        store.append_message(text(&conversation, a, "to b again")).await.unwrap();
        store.append_message(text(&conversation, b, "to a")).await.unwrap();

        assert_eq!(store.mark_read(conversation.id, b).await.unwrap(), 2);
        assert_eq!(store.unread_count(b).await.unwrap(), 0);
        assert_eq!(store.unread_count(a).await.unwrap(), 1);
        assert_eq!(
            store.unread_by_conversation(a).await.unwrap(),
            vec![(conversation.id, 1)]
        );
    }
}
