use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

use haven_shared::errors::AppResult;
use haven_shared::types::auth::AuthUser;
use haven_shared::types::ApiResponse;

use crate::matching::deck::{self, DeckEntry, DeckFilters};
use crate::services::profile_service;
use crate::AppState;

/// GET /deck - shuffled profiles the caller has not swiped on yet
pub async fn get_deck(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(filters): Query<DeckFilters>,
) -> AppResult<Json<ApiResponse<Vec<DeckEntry>>>> {
    let viewer = profile_service::load_profile(state.store.as_ref(), user.id).await?;
    let candidates = state.store.list_unswiped_profiles(user.id).await?;

    let entries = deck::build_deck(&viewer, candidates, &filters, &mut rand::thread_rng());

    tracing::debug!(profile_id = %user.id, size = entries.len(), "deck built");
    Ok(Json(ApiResponse::ok(entries)))
}
