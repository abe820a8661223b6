//! Application state wiring the services together.
//!
//! Services are generic over the repository traits; AppState pins them to the
//! SQLite implementations.

use std::sync::Arc;

use parley_core::service::{ChatService, MessageService, Service};
use parley_infra::sqlite::{DatabasePool, SqliteChatRepository, SqliteMessageRepository};
use parley_observe::spans;
use parley_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteMessageService = MessageService<SqliteChatRepository, SqliteMessageRepository>;

pub type ConcreteService = Service<ConcreteChatService, ConcreteMessageService>;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConcreteService>,
    pub config: Arc<AppConfig>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Connect to the database (applying migrations) and wire the services.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&config.database).await?;
        Ok(Self::from_pool(db_pool, config))
    }

    /// Wire the services over an already opened pool.
    pub fn from_pool(db_pool: DatabasePool, config: AppConfig) -> Self {
        let chat = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            spans::chat_service_span(),
        );
        let message = MessageService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            spans::message_service_span(),
        );

        Self {
            service: Arc::new(Service::new(chat, message)),
            config: Arc::new(config),
            db_pool,
        }
    }
}
