use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use haven_shared::types::{CanonicalPair, ProfileSummary};

use crate::schema::{matches, profiles, swipes};

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub device_id: Option<String>,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub bio: Option<String>,
    pub interests: serde_json::Value,
    pub communication_style: Option<String>,
    pub goals: Option<String>,
    pub photos: serde_json::Value,
    pub onboarding_complete: bool,
    pub is_fake: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn interest_tags(&self) -> Vec<String> {
        string_array(&self.interests)
    }

    pub fn photo_urls(&self) -> Vec<String> {
        string_array(&self.photos)
    }

    /// Seeded profiles are always discoverable; real ones only after onboarding.
    pub fn is_discoverable(&self) -> bool {
        self.is_fake || self.onboarding_complete
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id,
            display_name: self.display_name.clone(),
            age: self.age,
            gender: self.gender.clone(),
            location: self.location.clone(),
            occupation: self.occupation.clone(),
            bio: self.bio.clone(),
            interests: self.interest_tags(),
            communication_style: self.communication_style.clone(),
            goals: self.goals.clone(),
            photos: self.photo_urls(),
            is_fake: self.is_fake,
        }
    }
}

fn string_array(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Insertable, Clone, Default)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Option<Uuid>,
    pub device_id: Option<String>,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub bio: Option<String>,
    pub interests: Option<serde_json::Value>,
    pub communication_style: Option<String>,
    pub goals: Option<String>,
    pub photos: Option<serde_json::Value>,
    pub onboarding_complete: Option<bool>,
    pub is_fake: Option<bool>,
}

#[derive(Debug, AsChangeset, Deserialize, Validate, Clone, Default)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    #[validate(length(min = 2, max = 30))]
    pub display_name: Option<String>,
    #[validate(range(min = 18, max = 120))]
    pub age: Option<i32>,
    #[validate(length(max = 30))]
    pub gender: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub occupation: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    pub interests: Option<serde_json::Value>,
    #[validate(length(max = 30))]
    pub communication_style: Option<String>,
    #[validate(length(max = 500))]
    pub goals: Option<String>,
    pub photos: Option<serde_json::Value>,
    #[serde(skip)]
    pub onboarding_complete: Option<bool>,
}

// --- Swipe ---

#[derive(Debug, Queryable, Serialize, Clone)]
pub struct Swipe {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub liked: bool,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub conversation_id: Uuid,
    pub low_liked: bool,
    pub high_liked: bool,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn pair(&self) -> CanonicalPair {
        CanonicalPair::new(self.user_low, self.user_high)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub conversation_id: Uuid,
    pub low_liked: bool,
    pub high_liked: bool,
}

impl NewMatch {
    /// A mutual match: both directions liked.
    pub fn mutual(pair: CanonicalPair, conversation_id: Uuid) -> Self {
        Self {
            user_low: pair.low,
            user_high: pair.high,
            conversation_id,
            low_liked: true,
            high_liked: true,
        }
    }
}
