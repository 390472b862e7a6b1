use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use super::MessageSubscription;
use crate::{message::message_models::Message, store::{ChatStore, StoreError}};

/// Subscribes to message inserts on the store's change feed.
#[derive(Clone)]
pub struct ChangeNotifier {
    store: Arc<dyn ChatStore>,
}

impl ChangeNotifier {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    pub async fn subscribe(&self, conversation_id: Uuid) -> Result<MessageSubscription, StoreError> {
        let subscription = self.store.subscribe_message_inserts(conversation_id).await?;
        tracing::info!("Subscribed to new messages in conversation {}", conversation_id);
        Ok(subscription)
    }

    /// Run `on_insert` for every message inserted into the conversation
    /// until the returned handle is unsubscribed or the feed closes.
    pub async fn listen<F>(&self, conversation_id: Uuid, mut on_insert: F) -> Result<ListenerHandle, StoreError>
    where
        F: FnMut(Message) + Send + 'static,
    {
        let mut subscription = self.subscribe(conversation_id).await?;
        let task = tokio::spawn(async move {
            while let Some(message) = subscription.next_message().await {
                on_insert(message);
            }
            subscription.unsubscribe();
        });

        Ok(ListenerHandle { conversation_id, task })
    }
}

/// Owns a running [`ChangeNotifier::listen`] task. Dropping the handle
/// stops the listener as well.
pub struct ListenerHandle {
    conversation_id: Uuid,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn unsubscribe(self) {
        tracing::info!("Stopped listening to conversation {}", self.conversation_id);
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::conversation_models::ParticipantPair;
    use crate::store::InMemoryChatStore;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_listen_invokes_callback_per_insert() {
        let store = InMemoryChatStore::new();
        let conversation = store
            .insert_conversation(&ParticipantPair::new("alice", "bob"))
            .await
            .unwrap();
        let notifier = ChangeNotifier::new(Arc::new(store.clone()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = notifier
            .listen(conversation.id, move |message| {
                let _ = tx.send(message.text);
            })
            .await
            .unwrap();

        store.insert_message(conversation.id, "alice", "hello").await.unwrap();
        store.insert_message(conversation.id, "bob", "hi back").await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(first.as_deref(), Some("hello"));
        assert_eq!(second.as_deref(), Some("hi back"));
        assert_eq!(handle.conversation_id(), conversation.id);

        handle.unsubscribe();
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_callbacks() {
        let store = InMemoryChatStore::new();
        let conversation = store
            .insert_conversation(&ParticipantPair::new("alice", "bob"))
            .await
            .unwrap();
        let notifier = ChangeNotifier::new(Arc::new(store.clone()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = notifier
            .listen(conversation.id, move |message| {
                let _ = tx.send(message.text);
            })
            .await
            .unwrap();
        handle.unsubscribe();

        store.insert_message(conversation.id, "alice", "too late").await.unwrap();

        // The aborted task drops its sender, so the channel closes empty.
        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(received, None);
    }
}
