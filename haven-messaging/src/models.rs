use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use haven_shared::types::{CanonicalPair, ProfileSummary};

use crate::schema::{conversations, messages};

// --- Conversation ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone)]
#[diesel(table_name = conversations)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_low: Uuid,
    pub participant_high: Uuid,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_sender_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn pair(&self) -> CanonicalPair {
        CanonicalPair {
            low: self.participant_low,
            high: self.participant_high,
        }
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.pair().contains(user_id)
    }

    /// Most recent activity, used to order conversation lists.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(self.updated_at)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub participant_low: Uuid,
    pub participant_high: Uuid,
}

impl From<CanonicalPair> for NewConversation {
    fn from(pair: CanonicalPair) -> Self {
        Self {
            participant_low: pair.low,
            participant_high: pair.high,
        }
    }
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub attachment_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub attachment_url: Option<String>,
}

// --- Views ---

/// One row of a user's conversation list.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConversationView {
    pub id: Uuid,
    pub counterpart_id: Uuid,
    pub counterpart: Option<ProfileSummary>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_sender_id: Option<Uuid>,
    pub unread_count: i64,
    pub updated_at: DateTime<Utc>,
}
