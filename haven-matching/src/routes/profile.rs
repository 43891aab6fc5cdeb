use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use haven_shared::errors::AppResult;
use haven_shared::types::auth::{issue_access_token, jwt_secret, AccessToken, AuthUser};
use haven_shared::types::{ApiResponse, ProfileSummary};

use crate::events::publisher;
use crate::models::{Profile, UpdateProfile};
use crate::services::profile_service::{self, OnboardingRequest};
use crate::AppState;

// --- POST /devices/register ---

#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterDeviceResponse {
    pub profile: Profile,
    pub created: bool,
    #[serde(flatten)]
    pub token: AccessToken,
}

pub async fn register_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterDeviceRequest>,
) -> AppResult<Json<ApiResponse<RegisterDeviceResponse>>> {
    let (profile, created) =
        profile_service::register_device(state.store.as_ref(), &req.device_id).await?;
    let token = issue_access_token(profile.id, &jwt_secret(), state.config.access_token_ttl_secs)?;

    Ok(Json(ApiResponse::ok(RegisterDeviceResponse {
        profile,
        created,
        token,
    })))
}

// --- GET /me ---

pub async fn get_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = profile_service::load_profile(state.store.as_ref(), user.id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /me ---

pub async fn update_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let updated = profile_service::update_profile(state.store.as_ref(), user.id, payload).await?;
    Ok(Json(ApiResponse::ok(updated)))
}

// --- DELETE /me ---

pub async fn delete_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    state.store.delete_profile(user.id).await?;
    tracing::info!(profile_id = %user.id, "account deleted");

    publisher::publish_profile_deleted(state.rabbitmq.as_ref(), user.id).await;

    Ok(Json(ApiResponse::ok_with_message(
        serde_json::json!({ "deleted": true }),
        "account deleted",
    )))
}

// --- POST /onboarding ---

pub async fn complete_onboarding(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<OnboardingRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = profile_service::complete_onboarding(state.store.as_ref(), user.id, req).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /profiles/:id ---

pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileSummary>>> {
    let profile = profile_service::load_profile(state.store.as_ref(), profile_id).await?;
    Ok(Json(ApiResponse::ok(profile.summary())))
}
