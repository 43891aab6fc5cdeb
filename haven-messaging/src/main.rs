use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use socketioxide::extract::{SocketRef, TryData};
use socketioxide::SocketIo;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod clients;
mod config;
mod events;
mod models;
mod persona;
mod routes;
mod schema;
mod services;
mod socket;
mod store;
#[cfg(test)]
mod testing;

use clients::{
    CompletionClient, HttpCompletionClient, HttpMomentLedger, HttpProfileDirectory, MomentLedger,
    ProfileDirectory,
};
use config::{AppConfig, StorageBackend};
use haven_shared::clients::db::create_pool;
use haven_shared::clients::http::service_client;
use haven_shared::clients::rabbitmq::RabbitMQClient;
use haven_shared::clients::redis::RedisClient;
use socket::{ConversationNotifier, SocketNotifier};
use store::{MemoryMessagingStore, MessagingStore, PgMessagingStore};

pub struct AppState {
    pub store: Arc<dyn MessagingStore>,
    pub profiles: Arc<dyn ProfileDirectory>,
    pub ledger: Arc<dyn MomentLedger>,
    pub completion: Arc<dyn CompletionClient>,
    pub notifier: Arc<dyn ConversationNotifier>,
    pub config: AppConfig,
    pub rabbitmq: Option<RabbitMQClient>,
    pub redis: Option<RedisClient>,
    pub metrics: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    haven_shared::middleware::init_tracing("haven-messaging");
    let metrics = haven_shared::middleware::init_metrics("haven-messaging")?;

    let config = AppConfig::load()?;
    let port = config.port;

    let store: Arc<dyn MessagingStore> = match config.storage {
        StorageBackend::Postgres => {
            Arc::new(PgMessagingStore::new(create_pool(&config.database_url)?))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryMessagingStore::new())
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
                tracing::warn!(error = %e, "redis unavailable; conversation cache disabled");
                None
            }
        }
    };

    if config.ai_api_url.is_empty() {
        tracing::warn!("ai_api_url is empty; seeded profiles will use canned replies");
    }

    let http = service_client()?;
    let profiles: Arc<dyn ProfileDirectory> =
        Arc::new(HttpProfileDirectory::new(http.clone(), config.matching_service_url.clone()));
    let ledger: Arc<dyn MomentLedger> =
        Arc::new(HttpMomentLedger::new(http.clone(), config.billing_service_url.clone()));
    let completion: Arc<dyn CompletionClient> =
        Arc::new(HttpCompletionClient::new(http, config.ai_api_url.clone()));

    // Build Socket.IO layer - io is needed by the notifier for emitting from REST routes
    let (sio_layer, io) = SocketIo::builder().build_layer();
    let notifier: Arc<dyn ConversationNotifier> = Arc::new(SocketNotifier::new(io.clone()));

    let state = Arc::new(AppState {
        store,
        profiles,
        ledger,
        completion,
        notifier: notifier.clone(),
        config,
        rabbitmq: rabbitmq.clone(),
        redis,
        metrics,
    });

    io.ns("/", {
        let state = state.clone();
        move |socket: SocketRef, TryData::<serde_json::Value>(auth)| {
            let state = state.clone();
            async move {
                socket::handlers::on_connect_with_state(socket, auth.ok(), state).await;
            }
        }
    });

    if let Some(rabbitmq) = rabbitmq {
        tokio::spawn(async move {
            if let Err(e) = events::subscriber::listen_match_created(rabbitmq, notifier).await {
                tracing::error!(error = %e, "match.created subscriber failed");
            }
        });
    }

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Conversations
        .route("/conversations", get(routes::conversations::list_conversations))
        .route("/conversations/direct", post(routes::conversations::open_direct))
        .route("/conversations/:id", get(routes::conversations::get_conversation))
        // Messages
        .route(
            "/conversations/:id/messages",
            get(routes::messages::list_messages).post(routes::messages::send_message),
        )
        .route("/conversations/:id/read", post(routes::messages::mark_as_read))
        .route("/unread-count", get(routes::messages::get_unread_count))
        // AI companion
        .route("/companion/chat", post(routes::companion::chat))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/conversations/direct", post(routes::internal::open_direct))
        .layer(sio_layer)
        .layer(middleware::from_fn(haven_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "haven-messaging starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
