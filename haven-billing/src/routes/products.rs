use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use haven_shared::errors::AppResult;
use haven_shared::types::api::ApiResponse;
use haven_shared::types::auth::AuthUser;

use crate::catalog::{Product, PRODUCTS};
use crate::events::publisher;
use crate::routes::moments::remember_balance;
use crate::services::moments::{self, PurchaseOutcome, PurchaseRequest};
use crate::AppState;

/// GET /products - the store catalog
pub async fn list_products() -> Json<ApiResponse<&'static [Product]>> {
    Json(ApiResponse::ok(PRODUCTS))
}

/// POST /purchases - credit a store receipt; repeats return the original purchase
pub async fn purchase(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PurchaseRequest>,
) -> AppResult<Json<ApiResponse<PurchaseOutcome>>> {
    let starter = state.config.starter_moments;
    let outcome = moments::purchase(state.store.as_ref(), starter, auth_user.id, req).await?;

    remember_balance(&state, auth_user.id, outcome.balance).await;
    if outcome.credited {
        publisher::publish_moments_purchased(state.rabbitmq.as_ref(), &outcome.purchase).await;
    }

    Ok(Json(ApiResponse::ok(outcome)))
}
