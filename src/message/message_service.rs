use std::sync::Arc;

use uuid::Uuid;

use crate::conversation::ConversationResolver;
use crate::error::{AppError, Result};
use crate::message::message_dto::SendMessageRequest;
use crate::message::message_models::Message;
use crate::store::ChatStore;

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn ChatStore>,
    resolver: ConversationResolver,
}

impl MessageService {
    pub fn new(store: Arc<dyn ChatStore>, resolver: ConversationResolver) -> Self {
        Self { store, resolver }
    }

    /// Validate, resolve the sender/receiver conversation, then insert.
    ///
    /// A conversation created here is kept even if the message insert fails.
    pub async fn send_message(&self, payload: SendMessageRequest) -> Result<Message> {
        let (sender_id, receiver_id, text) = payload.into_parts()?;

        let conversation_id = self.resolver.resolve(&sender_id, &receiver_id).await?;

        let message = self
            .store
            .insert_message(conversation_id, &sender_id, &text)
            .await
            .map_err(AppError::PersistenceFailed)?;

        tracing::debug!("Message {} stored in conversation {}", message.id, conversation_id);

        Ok(message)
    }

    pub async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        self.store
            .messages_for_conversation(conversation_id)
            .await
            .map_err(|source| AppError::QueryFailed {
                resource: "messages",
                source,
            })
    }
}
