use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use uuid::Uuid;

use haven_shared::clients::db::{checkout, DbPool};
use haven_shared::errors::{AppError, AppResult, ErrorCode};
use haven_shared::types::CanonicalPair;

use crate::models::{Conversation, Message, NewConversation, NewMessage};
use crate::schema::{conversations, messages};
use crate::services::conversation_service::preview;

use super::MessagingStore;

pub struct PgMessagingStore {
    pool: DbPool,
}

impl PgMessagingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessagingStore for PgMessagingStore {
    async fn open_direct(&self, pair: CanonicalPair) -> AppResult<(Conversation, bool)> {
        let mut conn = checkout(&self.pool)?;

        let inserted = diesel::insert_into(conversations::table)
            .values(&NewConversation::from(pair))
            .on_conflict((conversations::participant_low, conversations::participant_high))
            .do_nothing()
            .execute(&mut conn)?;

        let conversation = conversations::table
            .filter(conversations::participant_low.eq(pair.low))
            .filter(conversations::participant_high.eq(pair.high))
            .first::<Conversation>(&mut conn)?;

        Ok((conversation, inserted == 1))
    }

    async fn get_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let mut conn = checkout(&self.pool)?;
        let conversation = conversations::table
            .find(id)
            .first::<Conversation>(&mut conn)
            .optional()?;
        Ok(conversation)
    }

    async fn list_conversations(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let mut conn = checkout(&self.pool)?;
        let mut rows = conversations::table
            .filter(
                conversations::participant_low
                    .eq(user_id)
                    .or(conversations::participant_high.eq(user_id)),
            )
            .load::<Conversation>(&mut conn)?;

        rows.sort_by_key(|c| std::cmp::Reverse(c.activity_at()));
        Ok(rows)
    }

    async fn append_message(&self, message: NewMessage) -> AppResult<Message> {
        let mut conn = checkout(&self.pool)?;
        let conversation_id = message.conversation_id;

        let stored = conn.transaction::<Message, diesel::result::Error, _>(|conn| {
            let stored = diesel::insert_into(messages::table)
                .values(&message)
                .get_result::<Message>(conn)?;

            diesel::update(conversations::table.find(conversation_id))
                .set((
                    conversations::last_message.eq(preview(&stored)),
                    conversations::last_message_at.eq(stored.created_at),
                    conversations::last_sender_id.eq(stored.sender_id),
                    conversations::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            Ok(stored)
        });

        match stored {
            Ok(stored) => Ok(stored),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => Err(AppError::new(ErrorCode::ConversationNotFound, "conversation not found")),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Message>, i64)> {
        let mut conn = checkout(&self.pool)?;

        let total: i64 = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .select(count_star())
            .first(&mut conn)?;

        let items = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .order(messages::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Message>(&mut conn)?;

        Ok((items, total))
    }

    async fn mark_read(&self, conversation_id: Uuid, reader: Uuid) -> AppResult<usize> {
        let mut conn = checkout(&self.pool)?;
        let updated = diesel::update(
            messages::table
                .filter(messages::conversation_id.eq(conversation_id))
                .filter(messages::recipient_id.eq(reader))
                .filter(messages::is_read.eq(false)),
        )
        .set(messages::is_read.eq(true))
        .execute(&mut conn)?;
        Ok(updated)
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let mut conn = checkout(&self.pool)?;
        let count = messages::table
            .filter(messages::recipient_id.eq(user_id))
            .filter(messages::is_read.eq(false))
            .select(count_star())
            .first::<i64>(&mut conn)?;
        Ok(count)
    }

    async fn unread_by_conversation(&self, user_id: Uuid) -> AppResult<Vec<(Uuid, i64)>> {
        let mut conn = checkout(&self.pool)?;
        let rows = messages::table
            .filter(messages::recipient_id.eq(user_id))
            .filter(messages::is_read.eq(false))
            .group_by(messages::conversation_id)
            .select((messages::conversation_id, count_star()))
            .load::<(Uuid, i64)>(&mut conn)?;
        Ok(rows)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}
