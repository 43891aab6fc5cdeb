use rand::rngs::StdRng;
use rand::SeedableRng;

use haven_shared::errors::AppResult;
use haven_shared::types::ProfileSummary;

use crate::clients::{ChatTurn, CompletionClient};
use crate::models::{Message, NewMessage};
use crate::persona::{self, Persona};
use crate::socket::ConversationNotifier;
use crate::store::MessagingStore;

use super::conversation_service;

/// Messages of context handed to the AI API and the canned generator.
const HISTORY_LEN: i64 = 10;

/// Which path produced a seeded reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Ai,
    Canned,
}

impl ReplySource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Canned => "canned",
        }
    }
}

/// Answer `incoming` on behalf of the seeded profile `seeded`.
///
/// The AI API is tried first; when it fails the canned generator answers.
/// The reply is appended to the conversation and both participants are notified.
pub async fn reply_as_seeded(
    store: &dyn MessagingStore,
    notifier: &dyn ConversationNotifier,
    completion: &dyn CompletionClient,
    seeded: &ProfileSummary,
    incoming: &Message,
) -> AppResult<(Message, ReplySource)> {
    let persona = Persona::from(seeded);
    let history = recent_turns(store, incoming).await?;

    let mut turns = history.clone();
    turns.push(ChatTurn::user(incoming.content.clone()));

    let prompt = persona::system_prompt(&persona);
    let (content, source) = match completion.complete(&prompt, &turns).await {
        Ok(reply) => (reply, ReplySource::Ai),
        Err(e) => {
            tracing::warn!(
                error = %e,
                seeded_id = %seeded.id,
                "AI reply unavailable, using canned response"
            );
            let mut rng = StdRng::from_entropy();
            let reply = persona::canned_reply(&persona, &incoming.content, &history, &mut rng);
            (reply, ReplySource::Canned)
        }
    };

    let (reply, _) = conversation_service::append_and_notify(
        store,
        notifier,
        NewMessage {
            conversation_id: incoming.conversation_id,
            sender_id: seeded.id,
            recipient_id: incoming.sender_id,
            content,
            attachment_url: None,
        },
    )
    .await?;

    metrics::counter!("haven_seeded_replies_total", "source" => source.as_str()).increment(1);
    tracing::debug!(
        conversation_id = %incoming.conversation_id,
        seeded_id = %seeded.id,
        source = source.as_str(),
        "seeded reply sent"
    );

    Ok((reply, source))
}

/// Earlier messages in chronological order, excluding `incoming`, seen from the seeded side.
/// Up to `HISTORY_LEN` turns that precede `incoming`, oldest first.
///
/// Messages the user sent after `incoming` (while the reply was delayed) are left out
/// so each reply only sees the conversation as it stood when its message arrived.
async fn recent_turns(store: &dyn MessagingStore, incoming: &Message) -> AppResult<Vec<ChatTurn>> {
    let (recent, _) = store
        .list_messages(incoming.conversation_id, 0, HISTORY_LEN * 2)
        .await?;

    let mut turns: Vec<ChatTurn> = recent
        .into_iter()
        .filter(|m| m.id != incoming.id && m.created_at <= incoming.created_at)
        .filter(|m| !m.content.trim().is_empty())
        .take(HISTORY_LEN as usize)
        .map(|m| {
            if m.sender_id == incoming.sender_id {
                ChatTurn::user(m.content)
            } else {
                ChatTurn::assistant(m.content)
            }
        })
        .collect();
    turns.reverse();
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ai::ChatRole;
    use crate::services::conversation_service::{open_direct, send_message, SendMessageRequest};
    use crate::store::MemoryMessagingStore;
    use crate::testing::{summary, RecordingNotifier, ScriptedCompletion};
    use uuid::Uuid;

    fn seattle_jamie() -> ProfileSummary {
        let mut jamie = summary("Jamie", true);
        jamie.location = Some("Seattle".into());
        jamie
    }

    async fn user_says(
        store: &MemoryMessagingStore,
        notifier: &RecordingNotifier,
        user: Uuid,
        seeded: &ProfileSummary,
        content: &str,
    ) -> Message {
        let (conversation, _) = open_direct(store, user, seeded.id).await.unwrap();
        let (message, _) = send_message(
            store,
            notifier,
            user,
            conversation.id,
            SendMessageRequest {
                content: content.into(),
                attachment_url: None,
            },
        )
        .await
        .unwrap();
        message
    }

    #[tokio::test]
    async fn ai_reply_is_preferred() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let completion = ScriptedCompletion::replying("I love rainy days too!");
        let jamie = seattle_jamie();
        let user = Uuid::new_v4();

        let incoming = user_says(&store, &notifier, user, &jamie, "I love rainy days").await;
        let (reply, source) = reply_as_seeded(&store, &notifier, &completion, &jamie, &incoming)
            .await
            .unwrap();

        assert_eq!(source, ReplySource::Ai);
        assert_eq!(reply.content, "I love rainy days too!");
        assert_eq!(reply.sender_id, jamie.id);
        assert_eq!(reply.recipient_id, user);

        let request = completion.last_request().unwrap();
        assert!(request.0.contains("Jamie"));
        assert_eq!(request.1.last().map(|t| t.content.as_str()), Some("I love rainy days"));
        assert_eq!(request.1.last().map(|t| t.role.clone()), Some(ChatRole::User));
    }

    #[tokio::test]
    async fn canned_reply_is_used_when_ai_fails() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let completion = ScriptedCompletion::failing();
        let jamie = seattle_jamie();
        let user = Uuid::new_v4();

        let incoming = user_says(&store, &notifier, user, &jamie, "where do you live?").await;
        let (reply, source) = reply_as_seeded(&store, &notifier, &completion, &jamie, &incoming)
            .await
            .unwrap();

        assert_eq!(source, ReplySource::Canned);
        assert!(reply.content.contains("Seattle"), "{}", reply.content);

        let (log, total) = store.list_messages(incoming.conversation_id, 0, 10).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(log[0].id, reply.id);
        assert_eq!(notifier.changed().len(), 2);
    }

    #[tokio::test]
    async fn history_is_chronological_and_excludes_incoming() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let completion = ScriptedCompletion::replying("ok!");
        let jamie = seattle_jamie();
        let user = Uuid::new_v4();

        let first = user_says(&store, &notifier, user, &jamie, "hi, i'm Sam").await;
        reply_as_seeded(&store, &notifier, &completion, &jamie, &first).await.unwrap();
        let second = user_says(&store, &notifier, user, &jamie, "what do you do?").await;
        reply_as_seeded(&store, &notifier, &completion, &jamie, &second).await.unwrap();

        let (_, turns) = completion.last_request().unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["hi, i'm Sam", "ok!", "what do you do?"]);
        assert_eq!(turns[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn messages_sent_during_the_delay_stay_out_of_the_earlier_reply() {
        let store = MemoryMessagingStore::new();
        let notifier = RecordingNotifier::default();
        let completion = ScriptedCompletion::replying("nice to meet you");
        let jamie = seattle_jamie();
        let user = Uuid::new_v4();

        let first = user_says(&store, &notifier, user, &jamie, "hey there").await;
        user_says(&store, &notifier, user, &jamie, "also, do you like hiking?").await;
        reply_as_seeded(&store, &notifier, &completion, &jamie, &first).await.unwrap();

        let (_, turns) = completion.last_request().unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["hey there"]);
    }
}
