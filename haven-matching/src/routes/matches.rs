use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::auth::AuthUser;
use haven_shared::types::{ApiResponse, ProfileSummary};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MatchView {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub matched_at: DateTime<Utc>,
    pub profile: Option<ProfileSummary>,
}

/// GET /matches - the caller's matches, newest first, with the other party's summary
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<MatchView>>>> {
    let rows = state.store.list_matches(user.id).await?;

    let other_ids: Vec<Uuid> = rows
        .iter()
        .filter_map(|m| m.pair().other(user.id))
        .collect();

    let profiles: HashMap<Uuid, ProfileSummary> = state
        .store
        .get_profiles(&other_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p.summary()))
        .collect();

    let views = rows
        .into_iter()
        .map(|m| {
            let profile = m.pair().other(user.id).and_then(|id| profiles.get(&id).cloned());
            MatchView {
                id: m.id,
                conversation_id: m.conversation_id,
                matched_at: m.created_at,
                profile,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(views)))
}
