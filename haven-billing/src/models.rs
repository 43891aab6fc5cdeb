use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{moment_balances, purchases, usage_events};

// --- Balance ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone)]
#[diesel(table_name = moment_balances, primary_key(user_id))]
pub struct MomentBalance {
    pub user_id: Uuid,
    pub balance: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = moment_balances)]
pub struct NewMomentBalance {
    pub user_id: Uuid,
    pub balance: i32,
}

// --- Usage log ---

/// Why a balance moved. Stored as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    AiChat,
    VoiceMinute,
    Purchase,
    Refund,
    Grant,
}

impl UsageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AiChat => "ai_chat",
            Self::VoiceMinute => "voice_minute",
            Self::Purchase => "purchase",
            Self::Refund => "refund",
            Self::Grant => "grant",
        }
    }

    /// Kinds that spend moments. The rest add them.
    pub fn is_debit(self) -> bool {
        matches!(self, Self::AiChat | Self::VoiceMinute)
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = usage_events)]
pub struct UsageEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    /// Negative for spending, positive for credits.
    pub amount: i32,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = usage_events)]
pub struct NewUsageEvent {
    pub user_id: Uuid,
    pub kind: String,
    pub amount: i32,
    pub reference: Option<String>,
}

impl NewUsageEvent {
    pub fn new(user_id: Uuid, kind: UsageKind, amount: i32, reference: Option<String>) -> Self {
        Self {
            user_id,
            kind: kind.as_str().to_string(),
            amount,
            reference,
        }
    }
}

// --- Purchases ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone)]
#[diesel(table_name = purchases)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: String,
    pub transaction_id: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = purchases)]
pub struct NewPurchase {
    pub user_id: Uuid,
    pub product_id: String,
    pub transaction_id: String,
    pub credits: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_kind_names_match_the_wire_format() {
        for kind in [
            UsageKind::AiChat,
            UsageKind::VoiceMinute,
            UsageKind::Purchase,
            UsageKind::Refund,
            UsageKind::Grant,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().into()));
        }
        assert!(UsageKind::AiChat.is_debit());
        assert!(!UsageKind::Refund.is_debit());
    }
}
