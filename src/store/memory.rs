use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use uuid::Uuid;

use super::{ChatStore, StoreError};
use crate::{
    conversation::conversation_models::{Conversation, ParticipantPair},
    message::message_models::Message,
    realtime::MessageSubscription,
};

const FEED_CAPACITY: usize = 256;

#[derive(Default)]
struct Tables {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

/// Process-local store with the same ordering, uniqueness and change feed
/// behaviour as the Postgres schema. Rows live in insertion order.
#[derive(Clone)]
pub struct InMemoryChatStore {
    tables: Arc<RwLock<Tables>>,
    inserts: broadcast::Sender<Message>,
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        let (inserts, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            inserts,
        }
    }
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_count(&self) -> usize {
        self.tables.read().conversations.len()
    }

    pub fn message_count(&self) -> usize {
        self.tables.read().messages.len()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn find_conversation(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, StoreError> {
        let tables = self.tables.read();
        Ok(tables.conversations.iter().find(|c| pair.matches(c)).cloned())
    }

    async fn insert_conversation(&self, pair: &ParticipantPair) -> Result<Conversation, StoreError> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.conversations.iter().find(|c| pair.matches(c)) {
            return Ok(existing.clone());
        }

        let conversation = Conversation {
            id: Uuid::new_v4(),
            user1_id: pair.low().to_string(),
            user2_id: pair.high().to_string(),
            created_at: Utc::now(),
        };
        tables.conversations.push(conversation.clone());

        Ok(conversation)
    }

    async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: &str,
        text: &str,
    ) -> Result<Message, StoreError> {
        let message = {
            let mut tables = self.tables.write();
            if !tables.conversations.iter().any(|c| c.id == conversation_id) {
                return Err(StoreError::Rejected(format!(
                    "conversation {} does not exist",
                    conversation_id
                )));
            }

            let message = Message {
                id: Uuid::new_v4(),
                conversation_id,
                sender_id: sender_id.to_string(),
                text: text.to_string(),
                timestamp: Utc::now(),
            };
            tables.messages.push(message.clone());
            message
        };

        // No subscribers is not an error.
        let _ = self.inserts.send(message.clone());

        Ok(message)
    }

    async fn messages_for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let tables = self.tables.read();
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();

        // Stable: equal timestamps keep insertion order.
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn conversations_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let tables = self.tables.read();
        let mut conversations: Vec<Conversation> = tables
            .conversations
            .iter()
            .rev()
            .filter(|c| c.involves(user_id))
            .cloned()
            .collect();

        // Reversed first, so equal timestamps put the later insert first.
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(conversations)
    }

    async fn subscribe_message_inserts(
        &self,
        conversation_id: Uuid,
    ) -> Result<MessageSubscription, StoreError> {
        let stream = BroadcastStream::new(self.inserts.subscribe()).filter_map(move |result| match result {
            Ok(message) if message.conversation_id == conversation_id => Some(message),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(
                    "Subscriber for conversation {} lagged, {} inserts dropped",
                    conversation_id,
                    skipped
                );
                None
            }
        });

        Ok(MessageSubscription::new(conversation_id, stream))
    }
}
