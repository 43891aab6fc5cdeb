use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult, ErrorCode};
use haven_shared::types::CanonicalPair;

use crate::clients::ProfileDirectory;
use crate::models::{Conversation, ConversationView, Message, NewMessage};
use crate::socket::ConversationNotifier;
use crate::store::MessagingStore;

const PREVIEW_CHARS: usize = 100;
const MAX_MESSAGE_CHARS: usize = 4000;

/// Text shown in conversation lists and event payloads.
pub fn preview(message: &Message) -> String {
    let content = message.content.trim();
    if content.is_empty() && message.attachment_url.is_some() {
        return "[attachment]".into();
    }
    content.chars().take(PREVIEW_CHARS).collect()
}

pub async fn open_direct(
    store: &dyn MessagingStore,
    user_a: Uuid,
    user_b: Uuid,
) -> AppResult<(Conversation, bool)> {
    if user_a == user_b {
        return Err(AppError::new(ErrorCode::CannotMessageSelf, "you cannot message yourself"));
    }

    let (conversation, created) = store.open_direct(CanonicalPair::new(user_a, user_b)).await?;
    if created {
        tracing::info!(
            conversation_id = %conversation.id,
            user_a = %user_a,
            user_b = %user_b,
            "direct conversation created"
        );
    }
    Ok((conversation, created))
}

/// Load a conversation, rejecting callers that are not one of its two participants.
pub async fn load_for_member(
    store: &dyn MessagingStore,
    conversation_id: Uuid,
    user_id: Uuid,
) -> AppResult<Conversation> {
    let conversation = store
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;

    if !conversation.has_participant(user_id) {
        return Err(AppError::new(
            ErrorCode::NotConversationMember,
            "you are not a member of this conversation",
        ));
    }
    Ok(conversation)
}

#[derive(Debug, Deserialize, Default)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
    pub attachment_url: Option<String>,
}

/// Append a message from `sender_id` and notify both participants.
/// Returns the stored message and the conversation as refreshed by the append.
pub async fn send_message(
    store: &dyn MessagingStore,
    notifier: &dyn ConversationNotifier,
    sender_id: Uuid,
    conversation_id: Uuid,
    req: SendMessageRequest,
) -> AppResult<(Message, Conversation)> {
    let content = req.content.trim().to_string();
    let attachment_url = req.attachment_url.filter(|u| !u.trim().is_empty());

    if content.is_empty() && attachment_url.is_none() {
        return Err(AppError::new(
            ErrorCode::EmptyMessage,
            "message must have content or an attachment",
        ));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let conversation = load_for_member(store, conversation_id, sender_id).await?;
    let recipient_id = conversation
        .pair()
        .other(sender_id)
        .ok_or_else(|| AppError::internal("conversation has no counterpart"))?;

    append_and_notify(
        store,
        notifier,
        NewMessage {
            conversation_id,
            sender_id,
            recipient_id,
            content,
            attachment_url,
        },
    )
    .await
}

/// Shared by user sends and seeded replies.
pub(crate) async fn append_and_notify(
    store: &dyn MessagingStore,
    notifier: &dyn ConversationNotifier,
    message: NewMessage,
) -> AppResult<(Message, Conversation)> {
    let stored = store.append_message(message).await?;
    metrics::counter!("haven_messages_sent_total").increment(1);

    let conversation = store
        .get_conversation(stored.conversation_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ConversationNotFound, "conversation not found"))?;

    notifier.conversation_changed(&conversation, Some(&stored));
    Ok((stored, conversation))
}

pub async fn mark_read(
    store: &dyn MessagingStore,
    notifier: &dyn ConversationNotifier,
    conversation_id: Uuid,
    reader: Uuid,
) -> AppResult<usize> {
    let conversation = load_for_member(store, conversation_id, reader).await?;
    let updated = store.mark_read(conversation_id, reader).await?;
    if updated > 0 {
        notifier.conversation_changed(&conversation, None);
    }
    Ok(updated)
}

/// The caller's conversation list, most recent activity first, with the
/// counterpart's profile and the caller's unread count per conversation.
/// Profiles that cannot be resolved are left empty.
pub async fn list_views(
    store: &dyn MessagingStore,
    profiles: &dyn ProfileDirectory,
    user_id: Uuid,
) -> AppResult<Vec<ConversationView>> {
    let conversations = store.list_conversations(user_id).await?;
    let unread: HashMap<Uuid, i64> =
        store.unread_by_conversation(user_id).await?.into_iter().collect();

    let counterpart_ids: Vec<Uuid> = conversations
        .iter()
        .filter_map(|c| c.pair().other(user_id))
        .collect();

    let summaries = match profiles.batch(&counterpart_ids).await {
        Ok(found) => found.into_iter().map(|p| (p.id, p)).collect::<HashMap<_, _>>(),
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user_id, "failed to resolve conversation profiles");
            HashMap::new()
        }
    };

    let views = conversations
        .into_iter()
        .filter_map(|c| {
            let counterpart_id = c.pair().other(user_id)?;
            Some(ConversationView {
                id: c.id,
                counterpart_id,
                counterpart: summaries.get(&counterpart_id).cloned(),
                last_message: c.last_message,
                last_message_at: c.last_message_at,
                last_sender_id: c.last_sender_id,
                unread_count: unread.get(&c.id).copied().unwrap_or(0),
                updated_at: c.updated_at,
            })
        })
        .collect();

    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMessagingStore;
    use crate::testing::{summary, MemoryProfiles, RecordingNotifier};
    use std::time::Duration;

    fn text(content: &str) -> SendMessageRequest {
        SendMessageRequest {
            content: content.into(),
            attachment_url: None,
        }
    }

    #[tokio::test]
    async fn cannot_open_conversation_with_self() {
        let store = MemoryMessagingStore::new();
        let me = Uuid::new_v4();
        let err = open_direct(&store, me, me).await.unwrap_err();
        assert!(err.is(ErrorCode::CannotMessageSelf));
    }

    #[tokio::test]
    async fn send_notifies_and_addresses_counterpart() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (conversation, _) = open_direct(&store, a, b).await.unwrap();

        let sent = send_message(&store, &notifier, a, conversation.id, text("  hello there "));
        let (message, refreshed) = sent.await.unwrap();

        assert_eq!(message.recipient_id, b);
        assert_eq!(message.content, "hello there");
        assert_eq!(refreshed.last_message.as_deref(), Some("hello there"));
        assert_eq!(notifier.changed(), vec![conversation.id]);
    }

    #[tokio::test]
    async fn outsiders_and_empty_messages_are_rejected() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let (conversation, _) = open_direct(&store, Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        let member = conversation.participant_low;

        let err = send_message(&store, &notifier, Uuid::new_v4(), conversation.id, text("hi"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::NotConversationMember));

        let err = send_message(&store, &notifier, member, conversation.id, text("   "))
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::EmptyMessage));

        let err = send_message(&store, &notifier, member, Uuid::new_v4(), text("hi"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorCode::ConversationNotFound));

        assert!(notifier.changed().is_empty());
    }

    #[tokio::test]
    async fn attachment_only_message_is_accepted() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let a = Uuid::new_v4();
        let (conversation, _) = open_direct(&store, a, Uuid::new_v4()).await.unwrap();

        let (message, refreshed) = send_message(
            &store,
            &notifier,
            a,
            conversation.id,
            SendMessageRequest {
                content: String::new(),
                attachment_url: Some("https://cdn.haven.app/p/1.jpg".into()),
            },
        )
        .await
        .unwrap();

        assert!(message.attachment_url.is_some());
        assert_eq!(refreshed.last_message.as_deref(), Some("[attachment]"));
    }

    #[tokio::test]
    async fn conversation_list_is_ordered_by_recent_activity() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let me = Uuid::new_v4();
        let (older, _) = open_direct(&store, me, Uuid::new_v4()).await.unwrap();
        let (newer, _) = open_direct(&store, me, Uuid::new_v4()).await.unwrap();

        send_message(&store, &notifier, me, newer.id, text("first")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        send_message(&store, &notifier, me, older.id, text("second")).await.unwrap();

        let profiles = MemoryProfiles::default();
        let views = list_views(&store, &profiles, me).await.unwrap();
        let ids: Vec<Uuid> = views.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn views_carry_counterpart_and_unread_count() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let me = Uuid::new_v4();
        let jamie = summary("Jamie", true);
        let profiles = MemoryProfiles::with(vec![jamie.clone()]);

        let (conversation, _) = open_direct(&store, me, jamie.id).await.unwrap();
        send_message(&store, &notifier, jamie.id, conversation.id, text("hey!")).await.unwrap();
        send_message(&store, &notifier, jamie.id, conversation.id, text("you there?"))
            .await
            .unwrap();

        let views = list_views(&store, &profiles, me).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].counterpart_id, jamie.id);
        let counterpart = views[0].counterpart.as_ref();
        assert_eq!(counterpart.and_then(|p| p.display_name.as_deref()), Some("Jamie"));
        assert_eq!(views[0].unread_count, 2);

        assert_eq!(mark_read(&store, &notifier, conversation.id, me).await.unwrap(), 2);
        let views = list_views(&store, &profiles, me).await.unwrap();
        assert_eq!(views[0].unread_count, 0);
    }

    #[tokio::test]
    async fn profile_lookup_failure_still_lists_conversations() {
        let store = MemoryMessagingStore::new();
        let me = Uuid::new_v4();
        open_direct(&store, me, Uuid::new_v4()).await.unwrap();

        let views = list_views(&store, &MemoryProfiles::failing(), me).await.unwrap();
        assert_eq!(views.len(), 1);
        assert!(views[0].counterpart.is_none());
    }
}
