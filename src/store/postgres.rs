use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::{broadcast, Mutex};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use super::{ChatStore, StoreError};
use crate::{
    conversation::conversation_models::{Conversation, ParticipantPair},
    message::message_models::Message,
    realtime::MessageSubscription,
};

/// NOTIFY channel written by the `messages_notify_insert` trigger.
pub const MESSAGE_INSERTS_CHANNEL: &str = "message_inserts";

const FEED_CAPACITY: usize = 256;

/// Payload published by the insert trigger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct MessageInserted {
    id: Uuid,
    conversation_id: Uuid,
}

fn decode_insert(payload: &str) -> Result<MessageInserted, StoreError> {
    Ok(serde_json::from_str(payload)?)
}

/// Id of the inserted message if it belongs to `conversation_id`.
fn wanted_insert(
    item: Result<MessageInserted, BroadcastStreamRecvError>,
    conversation_id: Uuid,
) -> Option<Uuid> {
    match item {
        Ok(inserted) if inserted.conversation_id == conversation_id => Some(inserted.id),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(
                "Subscriber for conversation {} lagged, {} inserts dropped",
                conversation_id,
                skipped
            );
            None
        }
    }
}

/// Postgres-backed store.
///
/// All subscriptions share one `PgListener` connection, started on the first
/// subscribe and fanned out over a broadcast channel. If the listener fails,
/// open subscriptions end and the next subscribe starts a new one.
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
    feed: Arc<Mutex<Option<broadcast::Sender<MessageInserted>>>>,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            feed: Arc::new(Mutex::new(None)),
        }
    }

    async fn find_message(pool: &PgPool, id: Uuid) -> Result<Option<Message>, StoreError> {
        let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(message)
    }

    async fn insert_feed(&self) -> Result<broadcast::Receiver<MessageInserted>, StoreError> {
        let mut feed = self.feed.lock().await;
        if let Some(sender) = feed.as_ref() {
            return Ok(sender.subscribe());
        }

        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(MESSAGE_INSERTS_CHANNEL).await?;
        tracing::info!("Listening on {}", MESSAGE_INSERTS_CHANNEL);

        let (sender, receiver) = broadcast::channel(FEED_CAPACITY);
        let task_sender = sender.clone();
        let slot = self.feed.clone();

        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => match decode_insert(notification.payload()) {
                        // No subscribers is not an error.
                        Ok(inserted) => {
                            let _ = task_sender.send(inserted);
                        }
                        Err(e) => tracing::warn!("Skipping change feed payload: {}", e),
                    },
                    Err(e) => {
                        tracing::error!("Change feed on {} closed: {:?}", MESSAGE_INSERTS_CHANNEL, e);
                        break;
                    }
                }
            }

            // Dropping both senders ends every open subscription.
            slot.lock().await.take();
        });

        *feed = Some(sender);
        Ok(receiver)
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_conversation(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, StoreError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations
             WHERE user1_id = $1 AND user2_id = $2",
        )
        .bind(pair.low())
        .bind(pair.high())
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn insert_conversation(&self, pair: &ParticipantPair) -> Result<Conversation, StoreError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (user1_id, user2_id)
             VALUES ($1, $2)
             ON CONFLICT (user1_id, user2_id)
             DO UPDATE SET user1_id = EXCLUDED.user1_id
             RETURNING *",
        )
        .bind(pair.low())
        .bind(pair.high())
        .fetch_one(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: &str,
        text: &str,
    ) -> Result<Message, StoreError> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, sender_id, text)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn messages_for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages
             WHERE conversation_id = $1
             ORDER BY \"timestamp\" ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn conversations_for_user(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations
             WHERE user1_id = $1 OR user2_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    async fn subscribe_message_inserts(
        &self,
        conversation_id: Uuid,
    ) -> Result<MessageSubscription, StoreError> {
        let receiver = self.insert_feed().await?;
        tracing::debug!("Subscribed to inserts for conversation {}", conversation_id);

        let pool = self.pool.clone();
        let stream = BroadcastStream::new(receiver).filter_map(move |item| {
            let pool = pool.clone();
            async move {
                let id = wanted_insert(item, conversation_id)?;
                match Self::find_message(&pool, id).await {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!("Failed to load inserted message {}: {}", id, e);
                        None
                    }
                }
            }
        });

        Ok(MessageSubscription::new(conversation_id, stream))
    }
}
