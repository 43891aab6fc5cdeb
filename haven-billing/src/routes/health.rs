use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use haven_shared::types::api::{HealthCheck, HealthResponse};

use crate::AppState;

/// GET /health - 503 when the store is unreachable, degraded when only redis is.
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = vec![HealthCheck::required("store", state.store.ping().await)];
    if let Some(redis) = &state.redis {
        let ping = redis.get("health:ping").await.map(|_| ());
        checks.push(HealthCheck::optional("redis", ping));
    }
    let health =
        HealthResponse::new("haven-billing", env!("CARGO_PKG_VERSION")).with_checks(checks);
    (health.status_code(), Json(health))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}
