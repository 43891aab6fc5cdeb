//! Persistence boundary for profiles, swipes and matches.
//!
//! `PgMatchingStore` is the production backend; `MemoryMatchingStore` backs
//! `storage = "memory"` for local runs and the unit tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::CanonicalPair;

use crate::models::{Match, NewMatch, NewProfile, Profile, Swipe, UpdateProfile};

pub use memory::MemoryMatchingStore;
pub use postgres::PgMatchingStore;

#[async_trait]
pub trait MatchingStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>>;

    async fn get_profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>>;

    /// Insert-if-absent keyed on the device id. The flag is true when this call created the profile.
    async fn get_or_create_device_profile(&self, device_id: &str) -> AppResult<(Profile, bool)>;

    async fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile>;

    /// Insert or overwrite a seeded profile keyed on its id.
    async fn upsert_seed_profile(&self, profile: NewProfile) -> AppResult<Profile>;

    async fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<Profile>;

    /// Hard delete: the profile plus every swipe and match that references it.
    async fn delete_profile(&self, id: Uuid) -> AppResult<()>;

    /// Every profile except `viewer` and the targets `viewer` already swiped on.
    /// Backends may also drop profiles that are not discoverable.
    async fn list_unswiped_profiles(&self, viewer: Uuid) -> AppResult<Vec<Profile>>;

    /// Upsert keyed on (actor, target); a repeat overwrites `liked`.
    async fn record_swipe(&self, actor_id: Uuid, target_id: Uuid, liked: bool) -> AppResult<Swipe>;

    async fn get_swipe(&self, actor_id: Uuid, target_id: Uuid) -> AppResult<Option<Swipe>>;

    /// Insert-if-absent on the canonical pair. The flag is true when this call created the row.
    async fn upsert_match(&self, new_match: NewMatch) -> AppResult<(Match, bool)>;

    async fn get_match(&self, pair: CanonicalPair) -> AppResult<Option<Match>>;

    async fn list_matches(&self, user_id: Uuid) -> AppResult<Vec<Match>>;

    async fn ping(&self) -> AppResult<()>;
}
