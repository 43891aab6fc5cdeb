use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use haven_shared::clients::db::{checkout, DbPool};
use haven_shared::errors::{AppError, AppResult, ErrorCode};
use haven_shared::types::CanonicalPair;

use crate::models::{Match, NewMatch, NewProfile, NewSwipe, Profile, Swipe, UpdateProfile};
use crate::schema::{matches, profiles, swipes};

use super::MatchingStore;

pub struct PgMatchingStore {
    pool: DbPool,
}

impl PgMatchingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn json_or_empty(value: &Option<serde_json::Value>) -> serde_json::Value {
    value.clone().unwrap_or_else(|| serde_json::json!([]))
}

#[async_trait]
impl MatchingStore for PgMatchingStore {
    async fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let mut conn = checkout(&self.pool)?;
        let profile = profiles::table
            .find(id)
            .first::<Profile>(&mut conn)
            .optional()?;
        Ok(profile)
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> AppResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = checkout(&self.pool)?;
        let found = profiles::table
            .filter(profiles::id.eq_any(ids))
            .load::<Profile>(&mut conn)?;
        Ok(found)
    }

    async fn get_or_create_device_profile(&self, device_id: &str) -> AppResult<(Profile, bool)> {
        let mut conn = checkout(&self.pool)?;

        let inserted = diesel::insert_into(profiles::table)
            .values(&NewProfile {
                device_id: Some(device_id.to_string()),
                ..Default::default()
            })
            .on_conflict(profiles::device_id)
            .do_nothing()
            .get_result::<Profile>(&mut conn)
            .optional()?;

        if let Some(created) = inserted {
            return Ok((created, true));
        }

        let existing = profiles::table
            .filter(profiles::device_id.eq(device_id))
            .first::<Profile>(&mut conn)?;
        Ok((existing, false))
    }

    async fn insert_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let mut conn = checkout(&self.pool)?;
        let created = diesel::insert_into(profiles::table)
            .values(&profile)
            .get_result::<Profile>(&mut conn)?;
        Ok(created)
    }

    async fn upsert_seed_profile(&self, profile: NewProfile) -> AppResult<Profile> {
        let id = profile
            .id
            .ok_or_else(|| AppError::bad_request("seeded profiles need a fixed id"))?;
        let mut conn = checkout(&self.pool)?;

        let seeded = diesel::insert_into(profiles::table)
            .values(&profile)
            .on_conflict(profiles::id)
            .do_update()
            .set((
                profiles::display_name.eq(&profile.display_name),
                profiles::age.eq(profile.age),
                profiles::gender.eq(&profile.gender),
                profiles::location.eq(&profile.location),
                profiles::occupation.eq(&profile.occupation),
                profiles::bio.eq(&profile.bio),
                profiles::interests.eq(json_or_empty(&profile.interests)),
                profiles::communication_style.eq(&profile.communication_style),
                profiles::goals.eq(&profile.goals),
                profiles::photos.eq(json_or_empty(&profile.photos)),
                profiles::is_fake.eq(true),
                profiles::updated_at.eq(Utc::now()),
            ))
            .get_result::<Profile>(&mut conn)?;

        tracing::debug!(profile_id = %id, "seed profile upserted");
        Ok(seeded)
    }

    async fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<Profile> {
        let mut conn = checkout(&self.pool)?;
        let updated = diesel::update(profiles::table.find(id))
            .set((&changes, profiles::updated_at.eq(Utc::now())))
            .get_result::<Profile>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
        Ok(updated)
    }

    async fn delete_profile(&self, id: Uuid) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        let deleted = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(
                swipes::table.filter(swipes::actor_id.eq(id).or(swipes::target_id.eq(id))),
            )
            .execute(conn)?;
            diesel::delete(
                matches::table.filter(matches::user_low.eq(id).or(matches::user_high.eq(id))),
            )
            .execute(conn)?;
            diesel::delete(profiles::table.find(id)).execute(conn)
        })?;

        if deleted == 0 {
            return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
        }
        Ok(())
    }

    async fn list_unswiped_profiles(&self, viewer: Uuid) -> AppResult<Vec<Profile>> {
        let mut conn = checkout(&self.pool)?;
        let swiped = swipes::table
            .filter(swipes::actor_id.eq(viewer))
            .select(swipes::target_id);

        let candidates = profiles::table
            .filter(profiles::id.ne(viewer))
            .filter(profiles::id.ne_all(swiped))
            .filter(profiles::is_fake.or(profiles::onboarding_complete))
            .load::<Profile>(&mut conn)?;
        Ok(candidates)
    }

    async fn record_swipe(&self, actor_id: Uuid, target_id: Uuid, liked: bool) -> AppResult<Swipe> {
        let mut conn = checkout(&self.pool)?;
        let new_swipe = NewSwipe {
            actor_id,
            target_id,
            liked,
        };

        let swipe = diesel::insert_into(swipes::table)
            .values(&new_swipe)
            .on_conflict((swipes::actor_id, swipes::target_id))
            .do_update()
            .set((swipes::liked.eq(liked), swipes::updated_at.eq(Utc::now())))
            .get_result::<Swipe>(&mut conn)?;
        Ok(swipe)
    }

    async fn get_swipe(&self, actor_id: Uuid, target_id: Uuid) -> AppResult<Option<Swipe>> {
        let mut conn = checkout(&self.pool)?;
        let swipe = swipes::table
            .find((actor_id, target_id))
            .first::<Swipe>(&mut conn)
            .optional()?;
        Ok(swipe)
    }

    async fn upsert_match(&self, new_match: NewMatch) -> AppResult<(Match, bool)> {
        let mut conn = checkout(&self.pool)?;

        let inserted = diesel::insert_into(matches::table)
            .values(&new_match)
            .on_conflict((matches::user_low, matches::user_high))
            .do_nothing()
            .execute(&mut conn)?;

        let row = matches::table
            .filter(matches::user_low.eq(new_match.user_low))
            .filter(matches::user_high.eq(new_match.user_high))
            .first::<Match>(&mut conn)?;

        Ok((row, inserted == 1))
    }

    async fn get_match(&self, pair: CanonicalPair) -> AppResult<Option<Match>> {
        let mut conn = checkout(&self.pool)?;
        let row = matches::table
            .filter(matches::user_low.eq(pair.low))
            .filter(matches::user_high.eq(pair.high))
            .first::<Match>(&mut conn)
            .optional()?;
        Ok(row)
    }

    async fn list_matches(&self, user_id: Uuid) -> AppResult<Vec<Match>> {
        let mut conn = checkout(&self.pool)?;
        let rows = matches::table
            .filter(matches::user_low.eq(user_id).or(matches::user_high.eq(user_id)))
            .order(matches::created_at.desc())
            .load::<Match>(&mut conn)?;
        Ok(rows)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = checkout(&self.pool)?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}
