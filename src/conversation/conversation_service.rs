use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::conversation_models::{Conversation, ParticipantPair};
use crate::store::{ChatStore, StoreError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("conversation lookup failed: {0}")]
    LookupFailed(#[source] StoreError),

    #[error("conversation create failed: {0}")]
    CreateFailed(#[source] StoreError),
}

/// Maps a pair of participants to their single shared conversation.
#[derive(Clone)]
pub struct ConversationResolver {
    store: Arc<dyn ChatStore>,
}

impl ConversationResolver {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Get-or-create the conversation between `a` and `b`. Argument order
    /// never affects the result.
    ///
    /// Lookup and create are separate round trips. Two concurrent calls for
    /// a new pair can both miss the lookup; the store's unique constraint on
    /// the ordered pair makes the losing insert return the winning row.
    pub async fn resolve(&self, a: &str, b: &str) -> Result<Uuid, ResolveError> {
        let pair = ParticipantPair::new(a, b);

        let existing = self
            .store
            .find_conversation(&pair)
            .await
            .map_err(ResolveError::LookupFailed)?;

        if let Some(conversation) = existing {
            return Ok(conversation.id);
        }

        let conversation = self
            .store
            .insert_conversation(&pair)
            .await
            .map_err(ResolveError::CreateFailed)?;

        tracing::info!(
            "Created conversation {} between {} and {}",
            conversation.id,
            pair.low(),
            pair.high()
        );

        Ok(conversation.id)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        self.store.conversations_for_user(user_id).await
    }
}
