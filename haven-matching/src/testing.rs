//! Fixtures shared by the unit tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult};
use haven_shared::types::CanonicalPair;

use crate::directory::ConversationDirectory;
use crate::models::Profile;

pub fn profile_with(edit: impl FnOnce(&mut Profile)) -> Profile {
    let now = Utc::now();
    let mut profile = Profile {
        id: Uuid::new_v4(),
        device_id: None,
        display_name: None,
        age: None,
        gender: None,
        location: None,
        occupation: None,
        bio: None,
        interests: serde_json::json!([]),
        communication_style: None,
        goals: None,
        photos: serde_json::json!([]),
        onboarding_complete: false,
        is_fake: false,
        created_at: now,
        updated_at: now,
    };
    edit(&mut profile);
    profile
}

/// Conversation directory that hands out one id per canonical pair.
#[derive(Default)]
pub struct MemoryDirectory {
    pub conversations: DashMap<CanonicalPair, Uuid>,
    pub fail: bool,
}

impl MemoryDirectory {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ConversationDirectory for MemoryDirectory {
    async fn open_direct(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Uuid> {
        if self.fail {
            return Err(AppError::upstream("messaging service unreachable"));
        }
        let id = *self
            .conversations
            .entry(CanonicalPair::new(user_a, user_b))
            .or_insert_with(Uuid::new_v4);
        Ok(id)
    }
}
