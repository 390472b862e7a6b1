pub mod memory;
pub mod postgres;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    conversation::conversation_models::{Conversation, ParticipantPair},
    message::message_models::Message,
    realtime::MessageSubscription,
};

pub use memory::InMemoryChatStore;
pub use postgres::PgChatStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed change feed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("rejected by store: {0}")]
    Rejected(String),
}

/// Client for the external store that owns conversations and messages.
///
/// Every operation is a single round trip. Implementations hold no
/// per-request state and can be shared freely across handlers.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Look up the conversation for an already-ordered pair.
    async fn find_conversation(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Create the conversation for an ordered pair.
    ///
    /// If a row for the pair already exists (a concurrent create won), that
    /// row is returned instead of a duplicate.
    async fn insert_conversation(&self, pair: &ParticipantPair) -> Result<Conversation, StoreError>;

    async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: &str,
        text: &str,
    ) -> Result<Message, StoreError>;

    /// All messages of a conversation, oldest first.
    async fn messages_for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError>;

    /// Conversations where `user_id` is either participant, newest first.
    async fn conversations_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError>;

    /// Open a change feed of messages inserted into `conversation_id` from now on.
    async fn subscribe_message_inserts(
        &self,
        conversation_id: Uuid,
    ) -> Result<MessageSubscription, StoreError>;
}
