pub mod conversation;
pub mod db;
pub mod error;
pub mod message;
pub mod realtime;
pub mod routes;
pub mod state;
pub mod store;

use std::sync::Arc;

use state::{Config, StoreBackend};
use store::{ChatStore, InMemoryChatStore, PgChatStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pair_chat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the store client selected by `config`.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn ChatStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            tracing::info!("Using Postgres store at {}", db::redacted_store_url(config));
            let pool = db::create_pool(config)?;

            if config.run_migrations {
                tracing::info!("Running migrations...");
                db::run_migrations(&pool).await?;
            }

            Ok(Arc::new(PgChatStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(InMemoryChatStore::new()))
        }
    }
}
