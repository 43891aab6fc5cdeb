use serde::Serialize;
use uuid::Uuid;

use haven_shared::errors::{AppError, AppResult, ErrorCode};

use crate::directory::ConversationDirectory;
use crate::models::{Profile, Swipe};
use crate::services::match_service::{self, MatchOutcome};
use crate::store::MatchingStore;

#[derive(Debug, Serialize)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    #[serde(rename = "match")]
    pub match_outcome: MatchOutcome,
    #[serde(skip)]
    pub target: Profile,
}

/// Record a like or pass from `actor_id` on `target_id`, then check for a mutual match on likes.
pub async fn swipe(
    store: &dyn MatchingStore,
    directory: &dyn ConversationDirectory,
    actor_id: Uuid,
    target_id: Uuid,
    liked: bool,
) -> AppResult<SwipeOutcome> {
    if actor_id == target_id {
        return Err(AppError::new(ErrorCode::CannotSwipeSelf, "you cannot swipe on yourself"));
    }

    let target = store
        .get_profile(target_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "target profile not found"))?;

    let swipe = store.record_swipe(actor_id, target_id, liked).await?;

    tracing::debug!(
        actor_id = %actor_id,
        target_id = %target_id,
        liked,
        "swipe recorded"
    );

    let match_outcome = if liked {
        match_service::detect_mutual_match(store, directory, actor_id, &target).await
    } else {
        MatchOutcome::none()
    };

    Ok(SwipeOutcome {
        swipe,
        match_outcome,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProfile;
    use crate::store::MemoryMatchingStore;
    use crate::testing::MemoryDirectory;

    async fn setup() -> (MemoryMatchingStore, MemoryDirectory, Profile, Profile) {
        let store = MemoryMatchingStore::new();
        let a = onboarded(&store).await;
        let b = onboarded(&store).await;
        (store, MemoryDirectory::default(), a, b)
    }

    async fn onboarded(store: &MemoryMatchingStore) -> Profile {
        let profile = NewProfile {
            onboarding_complete: Some(true),
            ..Default::default()
        };
        store.insert_profile(profile).await.unwrap()
    }

    #[tokio::test]
    async fn mutual_likes_create_one_match_in_either_order() {
        for a_first in [true, false] {
            let (store, directory, a, b) = setup().await;
            let (first, second) = if a_first { (&a, &b) } else { (&b, &a) };

            let opening = swipe(&store, &directory, first.id, second.id, true).await.unwrap();
            assert!(!opening.match_outcome.matched);

            let closing = swipe(&store, &directory, second.id, first.id, true).await.unwrap();
            assert!(closing.match_outcome.matched);
            assert_eq!(closing.match_outcome.profile.as_ref().map(|p| p.id), Some(first.id));

            assert_eq!(store.match_count(), 1);
            assert_eq!(directory.conversations.len(), 1);
        }
    }

    #[tokio::test]
    async fn repeated_mutual_likes_do_not_duplicate() {
        let (store, directory, a, b) = setup().await;
        swipe(&store, &directory, a.id, b.id, true).await.unwrap();
        swipe(&store, &directory, b.id, a.id, true).await.unwrap();
        swipe(&store, &directory, a.id, b.id, true).await.unwrap();
        swipe(&store, &directory, b.id, a.id, true).await.unwrap();

        assert_eq!(store.swipe_count(), 2);
        assert_eq!(store.match_count(), 1);
        assert_eq!(directory.conversations.len(), 1);
    }

    #[tokio::test]
    async fn liking_seeded_profile_matches_immediately() {
        let (store, directory, a, _) = setup().await;
        let seeded = store
            .insert_profile(NewProfile {
                is_fake: Some(true),
                display_name: Some("Jamie".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let outcome = swipe(&store, &directory, a.id, seeded.id, true).await.unwrap();

        assert!(outcome.match_outcome.matched);
        assert!(outcome.match_outcome.conversation_id.is_some());
        assert_eq!(store.match_count(), 1);
    }

    #[tokio::test]
    async fn pass_never_creates_match() {
        let (store, directory, a, b) = setup().await;
        let seeded = store
            .insert_profile(NewProfile {
                is_fake: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        swipe(&store, &directory, b.id, a.id, true).await.unwrap();
        let on_real = swipe(&store, &directory, a.id, b.id, false).await.unwrap();
        let on_seeded = swipe(&store, &directory, a.id, seeded.id, false).await.unwrap();

        assert!(!on_real.match_outcome.matched);
        assert!(!on_seeded.match_outcome.matched);
        assert_eq!(store.match_count(), 0);
    }

    #[tokio::test]
    async fn self_and_unknown_targets_are_rejected() {
        let (store, directory, a, _) = setup().await;

        let err = swipe(&store, &directory, a.id, a.id, true).await.unwrap_err();
        assert!(err.is(ErrorCode::CannotSwipeSelf));

        let err = swipe(&store, &directory, a.id, Uuid::new_v4(), true).await.unwrap_err();
        assert!(err.is(ErrorCode::ProfileNotFound));
        assert_eq!(store.swipe_count(), 0);
    }
}
