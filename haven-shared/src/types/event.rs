use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `haven.{service}.{entity}.{action}`
/// Example: `haven.matching.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

pub mod routing_keys {
    // Matching
    pub const MATCHING_SWIPE_RECORDED: &str = "haven.matching.swipe.recorded";
    pub const MATCHING_MATCH_CREATED: &str = "haven.matching.match.created";
    pub const MATCHING_PROFILE_DELETED: &str = "haven.matching.profile.deleted";

    // Messaging
    pub const MESSAGING_MESSAGE_SENT: &str = "haven.messaging.message.sent";

    // Billing
    pub const BILLING_MOMENTS_PURCHASED: &str = "haven.billing.moments.purchased";
    pub const BILLING_MOMENTS_DEDUCTED: &str = "haven.billing.moments.deducted";
}

pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SwipeRecorded {
        pub actor_id: Uuid,
        pub target_id: Uuid,
        pub liked: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub conversation_id: Uuid,
        pub user_low: Uuid,
        pub user_high: Uuid,
        pub with_seeded_profile: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileDeleted {
        pub profile_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MessageSent {
        pub message_id: Uuid,
        pub conversation_id: Uuid,
        pub sender_id: Uuid,
        pub recipient_id: Uuid,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MomentsPurchased {
        pub user_id: Uuid,
        pub product_id: String,
        pub transaction_id: String,
        pub credits: i32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MomentsDeducted {
        pub user_id: Uuid,
        pub amount: i32,
        pub kind: String,
        pub balance: i32,
    }
}
