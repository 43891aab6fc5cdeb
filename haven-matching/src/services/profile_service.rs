use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use haven_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Profile, UpdateProfile};
use crate::store::MatchingStore;

const MAX_INTERESTS: usize = 15;
const MAX_PHOTOS: usize = 6;

/// Return the profile bound to `device_id`, creating an empty one on first launch.
/// The flag is true when the profile was created by this call.
pub async fn register_device(
    store: &dyn MatchingStore,
    device_id: &str,
) -> AppResult<(Profile, bool)> {
    validate_device_id(device_id)?;

    let (profile, created) = store.get_or_create_device_profile(device_id).await?;
    if created {
        tracing::info!(profile_id = %profile.id, "anonymous profile created");
    }
    Ok((profile, created))
}

fn validate_device_id(device_id: &str) -> AppResult<()> {
    let valid_len = (8..=128).contains(&device_id.len());
    let valid_chars = device_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));

    if !valid_len || !valid_chars {
        return Err(AppError::new(ErrorCode::DeviceIdInvalid, "device id is malformed"));
    }
    Ok(())
}

pub async fn load_profile(store: &dyn MatchingStore, id: Uuid) -> AppResult<Profile> {
    store
        .get_profile(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

pub async fn update_profile(
    store: &dyn MatchingStore,
    id: Uuid,
    mut changes: UpdateProfile,
) -> AppResult<Profile> {
    changes.validate()?;
    validate_tag_list(changes.interests.as_ref(), "interests", MAX_INTERESTS)?;
    validate_tag_list(changes.photos.as_ref(), "photos", MAX_PHOTOS)?;
    changes.onboarding_complete = None;

    store.update_profile(id, changes).await
}

fn validate_tag_list(value: Option<&serde_json::Value>, field: &str, max: usize) -> AppResult<()> {
    let Some(value) = value else { return Ok(()) };
    let items = value
        .as_array()
        .ok_or_else(|| AppError::Validation(format!("{field} must be an array of strings")))?;

    if items.len() > max {
        return Err(AppError::Validation(format!("{field} accepts at most {max} entries")));
    }
    if items.iter().any(|v| !v.is_string()) {
        return Err(AppError::Validation(format!("{field} must be an array of strings")));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct OnboardingRequest {
    #[validate(length(min = 2, max = 30))]
    pub display_name: String,
    #[validate(range(min = 18, max = 120))]
    pub age: i32,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub occupation: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub communication_style: Option<String>,
    pub goals: Option<String>,
}

pub async fn complete_onboarding(
    store: &dyn MatchingStore,
    id: Uuid,
    req: OnboardingRequest,
) -> AppResult<Profile> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::InvalidDisplayName, e.to_string()))?;

    let display_name = req.display_name.trim().to_string();
    if display_name.chars().count() < 2 {
        return Err(AppError::new(
            ErrorCode::InvalidDisplayName,
            "display name must be at least 2 characters",
        ));
    }

    let changes = UpdateProfile {
        display_name: Some(display_name),
        age: Some(req.age),
        gender: req.gender,
        location: req.location,
        occupation: req.occupation,
        bio: req.bio,
        interests: Some(serde_json::json!(req.interests)),
        communication_style: req.communication_style,
        goals: req.goals,
        photos: None,
        onboarding_complete: Some(true),
    };
    validate_tag_list(changes.interests.as_ref(), "interests", MAX_INTERESTS)?;

    let profile = store.update_profile(id, changes).await?;
    tracing::info!(profile_id = %profile.id, "onboarding completed");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMatchingStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn device_registration_is_idempotent() {
        let store = MemoryMatchingStore::new();
        let (first, created) = register_device(&store, "ios-7F3A9C21").await.unwrap();
        let (second, created_again) = register_device(&store, "ios-7F3A9C21").await.unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first.id, second.id);
        assert!(!first.is_fake);
        assert!(!first.onboarding_complete);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_launch_registrations_share_one_profile() {
        const DEVICE: &str = "ios-first-launch-01";
        let store = Arc::new(MemoryMatchingStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { register_device(store.as_ref(), DEVICE).await })
            })
            .collect();

        let mut ids = Vec::new();
        let mut created = 0;
        for handle in handles {
            let (profile, was_created) = handle.await.unwrap().unwrap();
            ids.push(profile.id);
            created += usize::from(was_created);
        }

        assert_eq!(created, 1);
        assert!(ids.iter().all(|id| *id == ids[0]));
    }

    #[tokio::test]
    async fn malformed_device_id_is_rejected() {
        let store = MemoryMatchingStore::new();
        for bad in ["short", "has spaces in it", "semi;colon-device"] {
            let err = register_device(&store, bad).await.unwrap_err();
            assert!(err.is(ErrorCode::DeviceIdInvalid), "{bad} should be rejected");
        }
    }

    #[tokio::test]
    async fn onboarding_marks_profile_complete() {
        let store = MemoryMatchingStore::new();
        let (profile, _) = register_device(&store, "android-0001-abcd").await.unwrap();

        let done = complete_onboarding(
            &store,
            profile.id,
            OnboardingRequest {
                display_name: "  River ".into(),
                age: 27,
                gender: None,
                location: Some("Austin".into()),
                occupation: None,
                bio: None,
                interests: vec!["Coding".into(), "Cats".into()],
                communication_style: Some("direct".into()),
                goals: None,
            },
        )
        .await
        .unwrap();

        assert!(done.onboarding_complete);
        assert_eq!(done.display_name.as_deref(), Some("River"));
        assert_eq!(done.interest_tags(), vec!["Coding", "Cats"]);
    }

    #[tokio::test]
    async fn underage_onboarding_is_rejected() {
        let store = MemoryMatchingStore::new();
        let (profile, _) = register_device(&store, "android-0002-abcd").await.unwrap();
        let result = complete_onboarding(
            &store,
            profile.id,
            OnboardingRequest {
                display_name: "Sam".into(),
                age: 16,
                gender: None,
                location: None,
                occupation: None,
                bio: None,
                interests: vec![],
                communication_style: None,
                goals: None,
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_cannot_toggle_onboarding_or_send_bad_tags() {
        let store = MemoryMatchingStore::new();
        let (profile, _) = register_device(&store, "web-session-99999").await.unwrap();

        let updated = update_profile(
            &store,
            profile.id,
            UpdateProfile {
                bio: Some("Quiet mornings, loud music.".into()),
                onboarding_complete: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!updated.onboarding_complete);
        assert_eq!(updated.bio.as_deref(), Some("Quiet mornings, loud music."));

        let err = update_profile(
            &store,
            profile.id,
            UpdateProfile {
                interests: Some(serde_json::json!([1, 2])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorCode::ValidationError));
    }
}
