use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod catalog;
mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;
mod store;

use config::{AppConfig, StorageBackend};
use haven_shared::clients::db::create_pool;
use haven_shared::clients::rabbitmq::RabbitMQClient;
use haven_shared::clients::redis::RedisClient;
use store::{BillingStore, MemoryBillingStore, PgBillingStore};

pub struct AppState {
    pub store: Arc<dyn BillingStore>,
    pub config: AppConfig,
    pub rabbitmq: Option<RabbitMQClient>,
    pub redis: Option<RedisClient>,
    pub metrics: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    haven_shared::middleware::init_tracing("haven-billing");
    let metrics = haven_shared::middleware::init_metrics("haven-billing")?;

    let config = AppConfig::load()?;
    let port = config.port;

    if config.starter_moments < 0 {
        anyhow::bail!("starter_moments must not be negative");
    }

    let store: Arc<dyn BillingStore> = match config.storage {
        StorageBackend::Postgres => {
            Arc::new(PgBillingStore::new(create_pool(&config.database_url)?))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryBillingStore::new())
        }
    };

    let rabbitmq = if config.rabbitmq_url.is_empty() {
        tracing::warn!("rabbitmq_url is empty; domain events are disabled");
        None
    } else {
        Some(RabbitMQClient::connect(&config.rabbitmq_url).await?)
    };

    let redis = if config.redis_url.is_empty() {
        None
    } else {
        match RedisClient::connect(&config.redis_url).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "redis unavailable; balance cache disabled");
                None
            }
        }
    };

    let state = Arc::new(AppState {
        store,
        config,
        rabbitmq,
        redis,
        metrics,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Balance and usage
        .route("/moments", get(routes::moments::get_balance))
        .route("/usage", get(routes::moments::list_usage))
        .route("/usage/voice", post(routes::moments::charge_voice))
        // Store
        .route("/products", get(routes::products::list_products))
        .route("/purchases", post(routes::products::purchase))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/moments/deduct", post(routes::internal::deduct))
        .route("/internal/moments/credit", post(routes::internal::credit))
        .layer(middleware::from_fn(haven_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "haven-billing starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
