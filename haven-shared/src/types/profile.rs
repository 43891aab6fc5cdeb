use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a profile, shared across services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub communication_style: Option<String>,
    pub goals: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub is_fake: bool,
}
