use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use haven_shared::types::ProfileSummary;

use super::compatibility;
use crate::models::Profile;

pub const DEFAULT_DECK_SIZE: usize = 20;
pub const MAX_DECK_SIZE: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckFilters {
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub limit: Option<usize>,
}

impl DeckFilters {
    fn size(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_DECK_SIZE).clamp(1, MAX_DECK_SIZE)
    }

    /// Profiles without an age are never excluded by the age bounds.
    fn admits_age(&self, age: Option<i32>) -> bool {
        let Some(age) = age else { return true };
        self.age_min.map_or(true, |min| age >= min) && self.age_max.map_or(true, |max| age <= max)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeckEntry {
    pub profile: ProfileSummary,
    pub compatibility: f64,
}

/// Build a swipe deck from profiles the viewer has not swiped on yet.
///
/// Candidates are filtered, shuffled, then truncated; each entry carries its
/// compatibility score for display. The order is random, not score-ranked.
pub fn build_deck<R: Rng + ?Sized>(
    viewer: &Profile,
    candidates: Vec<Profile>,
    filters: &DeckFilters,
    rng: &mut R,
) -> Vec<DeckEntry> {
    let mut eligible: Vec<Profile> = candidates
        .into_iter()
        .filter(|c| c.id != viewer.id && c.is_discoverable() && filters.admits_age(c.age))
        .collect();

    eligible.shuffle(rng);
    eligible.truncate(filters.size());

    eligible
        .into_iter()
        .map(|candidate| DeckEntry {
            compatibility: compatibility::score(viewer, &candidate).total,
            profile: candidate.summary(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile_with;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn excludes_viewer_and_unfinished_real_profiles() {
        let viewer = profile_with(|p| p.onboarding_complete = true);
        let unfinished = profile_with(|p| p.onboarding_complete = false);
        let seeded = profile_with(|p| p.is_fake = true);
        let ready = profile_with(|p| p.onboarding_complete = true);

        let deck = build_deck(
            &viewer,
            vec![viewer.clone(), unfinished.clone(), seeded.clone(), ready.clone()],
            &DeckFilters::default(),
            &mut StdRng::seed_from_u64(7),
        );

        let ids: Vec<_> = deck.iter().map(|e| e.profile.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&seeded.id));
        assert!(ids.contains(&ready.id));
    }

    fn seeded_aged(age: i32) -> Profile {
        profile_with(|p| {
            p.is_fake = true;
            p.age = Some(age);
        })
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let viewer = profile_with(|_| {});
        let edge = seeded_aged(25);
        let pool = vec![seeded_aged(21), edge.clone(), seeded_aged(40)];

        let filters = DeckFilters {
            age_min: Some(25),
            age_max: Some(35),
            limit: None,
        };
        let deck = build_deck(&viewer, pool, &filters, &mut StdRng::seed_from_u64(1));

        assert_eq!(deck.len(), 1);
        assert_eq!(deck[0].profile.id, edge.id);
    }

    #[test]
    fn limit_is_applied_after_filtering() {
        let viewer = profile_with(|_| {});
        let pool: Vec<_> = (0..80).map(|_| profile_with(|p| p.is_fake = true)).collect();
        let limited = |limit| DeckFilters {
            limit: Some(limit),
            ..Default::default()
        };

        let big = build_deck(&viewer, pool.clone(), &limited(500), &mut StdRng::seed_from_u64(3));
        assert_eq!(big.len(), MAX_DECK_SIZE);

        let small = build_deck(&viewer, pool, &limited(5), &mut StdRng::seed_from_u64(3));
        assert_eq!(small.len(), 5);
        assert!(small.iter().all(|e| (0.0..=100.0).contains(&e.compatibility)));
    }
}
