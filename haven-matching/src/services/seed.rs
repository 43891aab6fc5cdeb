use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::NewProfile;
use crate::store::MatchingStore;

/// One entry of the seed file. Ids are fixed so re-importing updates in place.
#[derive(Debug, Deserialize, Validate)]
pub struct SeedProfile {
    pub id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub display_name: String,
    #[validate(range(min = 18, max = 120))]
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
}

impl From<SeedProfile> for NewProfile {
    fn from(seed: SeedProfile) -> Self {
        NewProfile {
            id: Some(seed.id),
            device_id: None,
            display_name: Some(seed.display_name),
            age: seed.age,
            gender: seed.gender,
            location: seed.location,
            occupation: seed.occupation,
            bio: seed.bio,
            interests: Some(serde_json::json!(seed.interests)),
            communication_style: seed.communication_style,
            goals: seed.goals,
            photos: Some(serde_json::json!(seed.photos)),
            onboarding_complete: Some(true),
            is_fake: Some(true),
        }
    }
}

pub fn parse_seed(raw: &str) -> anyhow::Result<Vec<SeedProfile>> {
    let seeds: Vec<SeedProfile> = serde_json::from_str(raw)?;
    Ok(seeds)
}

/// Upsert every seeded profile from `path`. Individual failures are logged and skipped.
pub async fn import_seed_file(store: &dyn MatchingStore, path: &str) -> anyhow::Result<usize> {
    let raw = tokio::fs::read_to_string(path).await?;
    let seeds = parse_seed(&raw)?;
    let total = seeds.len();

    let imported = import_seeds(store, seeds).await;
    tracing::info!(path = %path, imported, total, "seed profiles imported");
    Ok(imported)
}

/// Entries that fail validation or the upsert are logged and skipped.
pub async fn import_seeds(store: &dyn MatchingStore, seeds: Vec<SeedProfile>) -> usize {
    let mut imported = 0;
    for seed in seeds {
        let id = seed.id;
        if let Err(e) = seed.validate() {
            tracing::warn!(error = %e, profile_id = %id, "invalid seed profile skipped");
            continue;
        }
        match store.upsert_seed_profile(seed.into()).await {
            Ok(_) => imported += 1,
            Err(e) => tracing::warn!(error = %e, profile_id = %id, "failed to import seed profile"),
        }
    }
    imported
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMatchingStore;

    const SEED: &str = r#"[
        {
            "id": "6f1c2a70-3a52-4a0e-9c1e-0b7f5c1d2e01",
            "display_name": "Jamie",
            "age": 28,
            "location": "Seattle",
            "occupation": "illustrator",
            "interests": ["Art", "Board games"],
            "communication_style": "gentle"
        }
    ]"#;

    #[tokio::test]
    async fn seeded_profiles_are_fake_and_discoverable() {
        let store = MemoryMatchingStore::new();
        let seeds = parse_seed(SEED).unwrap();
        let id = seeds[0].id;

        assert_eq!(import_seeds(&store, seeds).await, 1);

        let profile = store.get_profile(id).await.unwrap().unwrap();
        assert!(profile.is_fake);
        assert!(profile.is_discoverable());
        assert_eq!(profile.location.as_deref(), Some("Seattle"));
        assert_eq!(profile.interest_tags(), vec!["Art", "Board games"]);
    }

    #[tokio::test]
    async fn out_of_range_ages_are_skipped() {
        let store = MemoryMatchingStore::new();
        let seeds = parse_seed(
            r#"[
                {"id": "6f1c2a70-3a52-4a0e-9c1e-0b7f5c1d2e02", "display_name": "Robin", "age": 2147483647},
                {"id": "6f1c2a70-3a52-4a0e-9c1e-0b7f5c1d2e03", "display_name": "Ash", "age": 34}
            ]"#,
        )
        .unwrap();

        assert_eq!(import_seeds(&store, seeds).await, 1);
        let skipped = Uuid::parse_str("6f1c2a70-3a52-4a0e-9c1e-0b7f5c1d2e02").unwrap();
        assert!(store.get_profile(skipped).await.unwrap().is_none());
    }

    #[test]
    fn malformed_seed_is_an_error() {
        assert!(parse_seed(r#"[{"display_name": "no id"}]"#).is_err());
    }
}
