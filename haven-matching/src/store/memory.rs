use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult, ErrorCode};
use haven_shared::types::CanonicalPair;

use crate::models::{Match, NewMatch, NewProfile, Profile, Swipe, UpdateProfile};

use super::MatchingStore;

#[derive(Default)]
pub struct MemoryMatchingStore {
    profiles: DashMap<Uuid, Profile>,
    devices: DashMap<String, Uuid>,
    swipes: DashMap<(Uuid, Uuid), Swipe>,
    matches: DashMap<CanonicalPair, Match>,
}

impl MemoryMatchingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn swipe_count(&self) -> usize {
        self.swipes.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

fn build_profile(id: Uuid, new: NewProfile) -> Profile {
    let now = Utc::now();
    Profile {
        id,
        device_id: new.device_id,
        display_name: new.display_name,
        age: new.age,
        gender: new.gender,
        location: new.location,
        occupation: new.occupation,
        bio: new.bio,
        interests: new.interests.unwrap_or_else(|| serde_json::json!([])),
        communication_style: new.communication_style,
        goals: new.goals,
        photos: new.photos.unwrap_or_else(|| serde_json::json!([])),
        onboarding_complete: new.onboarding_complete.unwrap_or(false),
        is_fake: new.is_fake.unwrap_or(false),
        created_at: now,
        updated_at: now,
    }
}

fn apply_changes(profile: &mut Profile, changes: UpdateProfile) {
    let UpdateProfile {
        display_name,
        age,
        gender,
        location,
        occupation,
        bio,
        interests,
        communication_style,
        goals,
        photos,
        onboarding_complete,
    } = changes;

    if display_name.is_some() {
        profile.display_name = display_name;
    }
    if age.is_some() {
        profile.age = age;
    }
    if gender.is_some() {
        profile.gender = gender;
    }
    if location.is_some() {
        profile.location = location;
    }
    if occupation.is_some() {
        profile.occupation = occupation;
    }
    if bio.is_some() {
        profile.bio = bio;
    }
    if let Some(v) = interests {
        profile.interests = v;
    }
    if communication_style.is_some() {
        profile.communication_style = communication_style;
    }
    if goals.is_some() {
        profile.goals = goals;
    }
    if let Some(v) = photos {
        profile.photos = v;
    }
    if let Some(v) = onboarding_complete {
        profile.onboarding_complete = v;
    }
    profile.updated_at = Utc::now();
}

#[async_trait]
impl MatchingStore for MemoryMatchingStore {
    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.profiles.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn get_or_create_device_profile(&self, device_id: &str) -> AppResult<(Profile, bool)> {
        match self.devices.entry(device_id.to_string()) {
            Entry::Occupied(slot) => {
                let id = *slot.get();
                let existing = self
                    .profiles
                    .get(&id)
                    .map(|p| p.value().clone())
                    .ok_or_else(|| AppError::internal("device is bound to a missing profile"))?;
                Ok((existing, false))
            }
            Entry::Vacant(slot) => {
                let id = Uuid::new_v4();
                let created = build_profile(
                    id,
                    NewProfile {
                        device_id: Some(device_id.to_string()),
                        ..Default::default()
                    },
                );
                self.profiles.insert(id, created.clone());
                slot.insert(id);
                Ok((created, true))
            }
        }
    }

    async fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let id = profile.id.unwrap_or_else(Uuid::new_v4);
        if self.profiles.contains_key(&id) {
            return Err(AppError::bad_request("profile already exists"));
        }

        if let Some(device_id) = profile.device_id.clone() {
            match self.devices.entry(device_id) {
                Entry::Occupied(_) => {
                    return Err(AppError::bad_request("device already registered"));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let created = build_profile(id, profile);
        self.profiles.insert(id, created.clone());
        Ok(created)
    }

    async fn upsert_seed_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let id = profile.id.unwrap_or_else(Uuid::new_v4);
        let seeded = build_profile(id, profile);
        self.profiles.insert(id, seeded.clone());
        Ok(seeded)
    }

    async fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<Profile> {
        let mut profile = self
            .profiles
            .get_mut(&id)
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
        apply_changes(&mut profile, changes);
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> AppResult<()> {
        let (_, profile) = self
            .profiles
            .remove(&id)
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
        if let Some(device_id) = profile.device_id {
            self.devices.remove(&device_id);
        }
        self.swipes.retain(|(actor, target), _| *actor != id && *target != id);
        self.matches.retain(|pair, _| !pair.contains(id));
        Ok(())
    }

    async fn list_unswiped_profiles(&self, viewer: Uuid) -> AppResult<Vec<Profile>> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.id != viewer && !self.swipes.contains_key(&(viewer, p.id)))
            .map(|p| p.clone())
            .collect())
    }

    async fn record_swipe(&self, actor_id: Uuid, target_id: Uuid, liked: bool) -> AppResult<Swipe> {
        let now = Utc::now();
        let mut entry = self.swipes.entry((actor_id, target_id)).or_insert_with(|| Swipe {
            actor_id,
            target_id,
            liked,
            created_at: now,
            updated_at: now,
        });
        entry.liked = liked;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn get_swipe(&self, actor_id: Uuid, target_id: Uuid) -> AppResult<Option<Swipe>> {
        Ok(self.swipes.get(&(actor_id, target_id)).map(|s| s.clone()))
    }

    async fn upsert_match(&self, new_match: NewMatch) -> AppResult<(Match, bool)> {
        let pair = CanonicalPair::new(new_match.user_low, new_match.user_high);
        match self.matches.entry(pair) {
            Entry::Occupied(existing) => Ok((existing.get().clone(), false)),
            Entry::Vacant(slot) => {
                let created = Match {
                    id: Uuid::new_v4(),
                    user_low: pair.low,
                    user_high: pair.high,
                    conversation_id: new_match.conversation_id,
                    low_liked: new_match.low_liked,
                    high_liked: new_match.high_liked,
                    created_at: Utc::now(),
                };
                slot.insert(created.clone());
                Ok((created, true))
            }
        }
    }

    async fn get_match(&self, pair: CanonicalPair) -> AppResult<Option<Match>> {
        Ok(self.matches.get(&pair).map(|m| m.clone()))
    }

    async fn list_matches(&self, user_id: Uuid) -> AppResult<Vec<Match>> {
        let mut found: Vec<Match> = self
            .matches
            .iter()
            .filter(|m| m.key().contains(user_id))
            .map(|m| m.clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeated_swipe_overwrites_single_row() {
        let store = MemoryMatchingStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.record_swipe(a, b, true).await.unwrap();
        store.record_swipe(a, b, true).await.unwrap();
        let last = store.record_swipe(a, b, false).await.unwrap();

        assert_eq!(store.swipe_count(), 1);
        assert!(!last.liked);
    }

    #[tokio::test]
    async fn duplicate_device_registration_is_rejected() {
        let store = MemoryMatchingStore::new();
        let new = NewProfile {
            device_id: Some("device-1234".into()),
            ..Default::default()
        };
        store.insert_profile(new.clone()).await.unwrap();
        assert!(store.insert_profile(new).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_related_rows() {
        let store = MemoryMatchingStore::new();
        let a = store.insert_profile(NewProfile::default()).await.unwrap();
        let b = store.insert_profile(NewProfile::default()).await.unwrap();
        store.record_swipe(a.id, b.id, true).await.unwrap();
        store.record_swipe(b.id, a.id, true).await.unwrap();
        store
            .upsert_match(NewMatch::mutual(CanonicalPair::new(a.id, b.id), Uuid::new_v4()))
            .await
            .unwrap();

        store.delete_profile(a.id).await.unwrap();

        assert_eq!(store.swipe_count(), 0);
        assert_eq!(store.match_count(), 0);
        assert!(store.get_profile(a.id).await.unwrap().is_none());
    }
}
