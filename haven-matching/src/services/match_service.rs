use serde::Serialize;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::{CanonicalPair, ProfileSummary};

use crate::directory::ConversationDirectory;
use crate::models::{Match, NewMatch, Profile};
use crate::store::MatchingStore;

#[derive(Debug, Clone, Serialize, Default)]
pub struct MatchOutcome {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSummary>,
    /// True only for the call that created the match row.
    #[serde(skip)]
    pub newly_created: bool,
    #[serde(skip)]
    pub row: Option<Match>,
}

impl MatchOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    fn matched(row: &Match, other: &Profile, newly_created: bool) -> Self {
        Self {
            matched: true,
            match_id: Some(row.id),
            conversation_id: Some(row.conversation_id),
            profile: Some(other.summary()),
            newly_created,
            row: Some(row.clone()),
        }
    }
}

/// Decide whether a like from `actor_id` to `target` completes a mutual match.
///
/// Best effort: a failure anywhere is logged and reported as "no match".
pub async fn detect_mutual_match(
    store: &dyn MatchingStore,
    directory: &dyn ConversationDirectory,
    actor_id: Uuid,
    target: &Profile,
) -> MatchOutcome {
    match try_detect(store, directory, actor_id, target).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(
                error = %e,
                actor_id = %actor_id,
                target_id = %target.id,
                "mutual match detection failed"
            );
            MatchOutcome::none()
        }
    }
}

async fn try_detect(
    store: &dyn MatchingStore,
    directory: &dyn ConversationDirectory,
    actor_id: Uuid,
    target: &Profile,
) -> AppResult<MatchOutcome> {
    let reciprocated = if target.is_fake {
        true
    } else {
        store
            .get_swipe(target.id, actor_id)
            .await?
            .is_some_and(|s| s.liked)
    };

    if !reciprocated {
        return Ok(MatchOutcome::none());
    }

    let pair = CanonicalPair::new(actor_id, target.id);

    if let Some(existing) = store.get_match(pair).await? {
        return Ok(MatchOutcome::matched(&existing, target, false));
    }

    let conversation_id = directory.open_direct(pair.low, pair.high).await?;
    let (row, created) = store
        .upsert_match(NewMatch::mutual(pair, conversation_id))
        .await?;

    if created {
        metrics::counter!("haven_matches_created_total").increment(1);
        tracing::info!(
            match_id = %row.id,
            conversation_id = %row.conversation_id,
            seeded = target.is_fake,
            "mutual match created"
        );
    }

    Ok(MatchOutcome::matched(&row, target, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewProfile;
    use crate::store::MemoryMatchingStore;
    use crate::testing::MemoryDirectory;

    async fn real_profile(store: &MemoryMatchingStore) -> Profile {
        store
            .insert_profile(NewProfile {
                onboarding_complete: Some(true),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn one_sided_like_is_not_a_match() {
        let store = MemoryMatchingStore::new();
        let directory = MemoryDirectory::default();
        let a = real_profile(&store).await;
        let b = real_profile(&store).await;

        store.record_swipe(a.id, b.id, true).await.unwrap();
        let outcome = detect_mutual_match(&store, &directory, a.id, &b).await;

        assert!(!outcome.matched);
        assert_eq!(store.match_count(), 0);
        assert!(directory.conversations.is_empty());
    }

    #[tokio::test]
    async fn reciprocal_pass_is_not_a_match() {
        let store = MemoryMatchingStore::new();
        let directory = MemoryDirectory::default();
        let a = real_profile(&store).await;
        let b = real_profile(&store).await;

        store.record_swipe(b.id, a.id, false).await.unwrap();
        store.record_swipe(a.id, b.id, true).await.unwrap();

        assert!(!detect_mutual_match(&store, &directory, a.id, &b).await.matched);
    }

    #[tokio::test]
    async fn existing_match_is_returned_without_new_conversation() {
        let store = MemoryMatchingStore::new();
        let directory = MemoryDirectory::default();
        let a = real_profile(&store).await;
        let b = real_profile(&store).await;
        store.record_swipe(a.id, b.id, true).await.unwrap();
        store.record_swipe(b.id, a.id, true).await.unwrap();

        let first = detect_mutual_match(&store, &directory, b.id, &a).await;
        let again = detect_mutual_match(&store, &directory, a.id, &b).await;

        assert!(first.newly_created);
        assert!(!again.newly_created);
        assert_eq!(first.conversation_id, again.conversation_id);
        assert_eq!(store.match_count(), 1);
        assert_eq!(directory.conversations.len(), 1);
    }

    #[tokio::test]
    async fn directory_failure_degrades_to_no_match() {
        let store = MemoryMatchingStore::new();
        let directory = MemoryDirectory::failing();
        let a = real_profile(&store).await;
        let seeded = store
            .insert_profile(NewProfile {
                is_fake: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        let outcome = detect_mutual_match(&store, &directory, a.id, &seeded).await;
        assert!(!outcome.matched);
        assert_eq!(store.match_count(), 0);
    }
}
