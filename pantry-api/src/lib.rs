use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use pantry_core::{Notifier, ProductRepository};
use pantry_order::{OrderProcessor, OrderRepository};
use pantry_store::app_config::{Config, NotificationBackend, StoreBackend};
use pantry_store::{DbClient, InMemoryStore, LogNotifier, StoreOrderRepository, StoreProductRepository};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod orders;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/orders/{order_id}/process", post(orders::process_order))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Wire the configured store and notification backends into the app state
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let orders: Arc<dyn OrderRepository>;
    let products: Arc<dyn ProductRepository>;
    match config.store.backend {
        StoreBackend::Postgres => {
            let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
            db.migrate().await?;
            orders = Arc::new(StoreOrderRepository::new(db.pool.clone()));
            products = Arc::new(StoreProductRepository::new(db.pool));
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            orders = store.clone();
            products = store;
        }
    }

    let notifier = build_notifier(config)?;

    Ok(AppState {
        processor: OrderProcessor::new(orders, products, notifier),
    })
}

fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    match config.notifications.backend {
        NotificationBackend::Log => Ok(Arc::new(LogNotifier)),
        #[cfg(feature = "kafka")]
        NotificationBackend::Kafka => {
            let brokers = config
                .notifications
                .brokers
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("notifications.brokers is required for the kafka backend"))?;
            let producer = pantry_store::EventProducer::new(brokers)?;
            Ok(Arc::new(pantry_store::EventNotifier::new(producer)))
        }
        #[cfg(not(feature = "kafka"))]
        NotificationBackend::Kafka => {
            anyhow::bail!("kafka notifications require building with the `kafka` feature")
        }
    }
}
