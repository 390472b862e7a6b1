use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ChatStore, InMemoryChatStore, StoreError};
use crate::{
    conversation::conversation_models::{Conversation, ParticipantPair},
    message::message_models::Message,
    realtime::MessageSubscription,
};

/// Wraps an in-memory store and fails selected operations on demand.
#[derive(Default)]
pub struct FlakyChatStore {
    pub inner: InMemoryChatStore,
    pub fail_lookup: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_message_insert: AtomicBool,
    pub fail_queries: AtomicBool,
}

impl FlakyChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Rejected(format!("{} unavailable", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatStore for FlakyChatStore {
    async fn find_conversation(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, StoreError> {
        Self::check(&self.fail_lookup, "lookup")?;
        self.inner.find_conversation(pair).await
    }

    async fn insert_conversation(&self, pair: &ParticipantPair) -> Result<Conversation, StoreError> {
        Self::check(&self.fail_create, "create")?;
        self.inner.insert_conversation(pair).await
    }

    async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: &str,
        text: &str,
    ) -> Result<Message, StoreError> {
        Self::check(&self.fail_message_insert, "message insert")?;
        self.inner.insert_message(conversation_id, sender_id, text).await
    }

    async fn messages_for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        Self::check(&self.fail_queries, "query")?;
        self.inner.messages_for_conversation(conversation_id).await
    }

    async fn conversations_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        Self::check(&self.fail_queries, "query")?;
        self.inner.conversations_for_user(user_id).await
    }

    async fn subscribe_message_inserts(
        &self,
        conversation_id: Uuid,
    ) -> Result<MessageSubscription, StoreError> {
        self.inner.subscribe_message_inserts(conversation_id).await
    }
}
