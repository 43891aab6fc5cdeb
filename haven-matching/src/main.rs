use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod directory;
mod events;
mod matching;
mod models;
mod routes;
mod schema;
mod services;
mod store;
#[cfg(test)]
mod testing;

use config::{AppConfig, StorageBackend};
use directory::{ConversationDirectory, HttpConversationDirectory};
use haven_shared::clients::db::create_pool;
use haven_shared::clients::http::service_client;
use haven_shared::clients::rabbitmq::RabbitMQClient;
use store::{MatchingStore, MemoryMatchingStore, PgMatchingStore};

pub struct AppState {
    pub store: Arc<dyn MatchingStore>,
    pub directory: Arc<dyn ConversationDirectory>,
    pub config: AppConfig,
    pub rabbitmq: Option<RabbitMQClient>,
    pub metrics: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    haven_shared::middleware::init_tracing("haven-matching");
    let metrics = haven_shared::middleware::init_metrics("haven-matching")?;

    let config = AppConfig::load()?;
    let port = config.port;

    let store: Arc<dyn MatchingStore> = match config.storage {
        StorageBackend::Postgres => {
            Arc::new(PgMatchingStore::new(create_pool(&config.database_url)?))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryMatchingStore::new())
        }
    };

    let rabbitmq = if config.rabbitmq_url.is_empty() {
        tracing::warn!("rabbitmq_url is empty; domain events are disabled");
        None
    } else {
        Some(RabbitMQClient::connect(&config.rabbitmq_url).await?)
    };

    let directory: Arc<dyn ConversationDirectory> = Arc::new(HttpConversationDirectory::new(
        service_client()?,
        config.messaging_service_url.clone(),
    ));

    if let Some(path) = config.seed_file.as_deref() {
        if let Err(e) = services::seed::import_seed_file(store.as_ref(), path).await {
            tracing::error!(error = %e, path = %path, "seed import failed");
        }
    }

    let state = Arc::new(AppState {
        store,
        directory,
        config,
        rabbitmq,
        metrics,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Identity and profile
        .route("/devices/register", post(routes::profile::register_device))
        .route(
            "/me",
            get(routes::profile::get_me)
                .patch(routes::profile::update_me)
                .delete(routes::profile::delete_me),
        )
        .route("/onboarding", post(routes::profile::complete_onboarding))
        .route("/profiles/:id", get(routes::profile::get_public_profile))
        // Matching
        .route("/deck", get(routes::deck::get_deck))
        .route("/swipes", post(routes::swipes::send_swipe))
        .route("/matches", get(routes::matches::list_matches))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/profiles/batch", post(routes::internal::batch_profiles))
        .route("/internal/profiles/:id", get(routes::internal::get_profile))
        .layer(middleware::from_fn(haven_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "haven-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
