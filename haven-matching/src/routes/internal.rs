use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::ProfileSummary;

use crate::services::profile_service;
use crate::AppState;

/// GET /internal/profiles/:id - public summary for other services (no auth)
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ProfileSummary>> {
    let profile = profile_service::load_profile(state.store.as_ref(), profile_id).await?;
    Ok(Json(profile.summary()))
}

#[derive(Debug, Deserialize)]
pub struct BatchProfilesRequest {
    pub ids: Vec<Uuid>,
}

/// POST /internal/profiles/batch - summaries for many ids; unknown ids are skipped
pub async fn batch_profiles(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchProfilesRequest>,
) -> Json<Vec<ProfileSummary>> {
    match state.store.get_profiles(&req.ids).await {
        Ok(profiles) => Json(profiles.iter().map(|p| p.summary()).collect()),
        Err(e) => {
            tracing::error!(error = %e, count = req.ids.len(), "failed to load profile batch");
            Json(vec![])
        }
    }
}
