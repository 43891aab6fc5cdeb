//! Fixtures shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult, ErrorCode};
use haven_shared::types::payloads::MatchCreated;
use haven_shared::types::ProfileSummary;

use crate::clients::{ChatTurn, CompletionClient, MomentLedger, ProfileDirectory};
use crate::models::{Conversation, Message};
use crate::socket::ConversationNotifier;

pub fn summary(name: &str, is_fake: bool) -> ProfileSummary {
    ProfileSummary {
        id: Uuid::new_v4(),
        display_name: Some(name.into()),
        age: None,
        gender: None,
        location: None,
        occupation: None,
        bio: None,
        interests: vec![],
        communication_style: None,
        goals: None,
        photos: vec![],
        is_fake,
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    changed: Mutex<Vec<Uuid>>,
    matches: Mutex<Vec<Uuid>>,
}

impl RecordingNotifier {
    /// Conversation ids in notification order.
    pub fn changed(&self) -> Vec<Uuid> {
        self.changed.lock().unwrap().clone()
    }

    pub fn matches(&self) -> Vec<Uuid> {
        self.matches.lock().unwrap().clone()
    }
}

impl ConversationNotifier for RecordingNotifier {
    fn conversation_changed(&self, conversation: &Conversation, _message: Option<&Message>) {
        self.changed.lock().unwrap().push(conversation.id);
    }

    fn match_created(&self, event: &MatchCreated) {
        self.matches.lock().unwrap().push(event.match_id);
    }
}

#[derive(Default)]
pub struct MemoryProfiles {
    profiles: DashMap<Uuid, ProfileSummary>,
    fail: bool,
}

impl MemoryProfiles {
    pub fn with(profiles: Vec<ProfileSummary>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.id, p)).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ProfileDirectory for MemoryProfiles {
    async fn get(&self, id: Uuid) -> AppResult<Option<ProfileSummary>> {
        if self.fail {
            return Err(AppError::upstream("matching service unreachable"));
        }
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn batch(&self, ids: &[Uuid]) -> AppResult<Vec<ProfileSummary>> {
        if self.fail {
            return Err(AppError::upstream("matching service unreachable"));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.profiles.get(id).map(|p| p.clone()))
            .collect())
    }
}

/// Completion client that answers with a fixed reply (or always fails) and records the last request.
pub struct ScriptedCompletion {
    reply: Option<String>,
    last: Mutex<Option<(String, Vec<ChatTurn>)>>,
}

impl ScriptedCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.into()),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            last: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<(String, Vec<ChatTurn>)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, system: &str, messages: &[ChatTurn]) -> AppResult<String> {
        *self.last.lock().unwrap() = Some((system.to_string(), messages.to_vec()));
        self.reply
            .clone()
            .ok_or_else(|| AppError::upstream("AI API returned 503 Service Unavailable"))
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    balances: DashMap<Uuid, i32>,
}

impl MemoryLedger {
    pub fn with_balance(user_id: Uuid, balance: i32) -> Self {
        let ledger = Self::default();
        ledger.balances.insert(user_id, balance);
        ledger
    }

    pub fn balance(&self, user_id: Uuid) -> i32 {
        self.balances.get(&user_id).map(|b| *b).unwrap_or(0)
    }
}

#[async_trait]
impl MomentLedger for MemoryLedger {
    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i32,
        _kind: &str,
        _reference: Option<String>,
    ) -> AppResult<i32> {
        let mut balance = self.balances.entry(user_id).or_insert(0);
        if *balance < amount {
            return Err(AppError::new(ErrorCode::InsufficientMoments, "not enough moments"));
        }
        *balance -= amount;
        Ok(*balance)
    }

    async fn credit(
        &self,
        user_id: Uuid,
        amount: i32,
        _kind: &str,
        _reference: Option<String>,
    ) -> AppResult<i32> {
        let mut balance = self.balances.entry(user_id).or_insert(0);
        *balance += amount;
        Ok(*balance)
    }
}
