use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use uuid::Uuid;

use crate::message::message_models::Message;

/// Live feed of messages inserted into one conversation.
///
/// Only rows inserted after the subscription was opened are yielded, in
/// whatever order the underlying change feed delivers them. Dropping the
/// subscription (or calling [`MessageSubscription::unsubscribe`]) releases
/// the listener connection or channel behind it.
pub struct MessageSubscription {
    conversation_id: Uuid,
    inner: BoxStream<'static, Message>,
}

impl MessageSubscription {
    pub fn new<S>(conversation_id: Uuid, stream: S) -> Self
    where
        S: Stream<Item = Message> + Send + 'static,
    {
        Self {
            conversation_id,
            inner: stream.boxed(),
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    /// Wait for the next inserted message. `None` once the feed has closed.
    pub async fn next_message(&mut self) -> Option<Message> {
        self.inner.next().await
    }

    pub fn unsubscribe(self) {
        tracing::debug!("Unsubscribed from conversation {}", self.conversation_id);
    }
}

impl Stream for MessageSubscription {
    type Item = Message;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(conversation_id: Uuid, text: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id: "alice".to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscription_yields_then_closes() {
        let conversation_id = Uuid::new_v4();
        let feed = futures::stream::iter(vec![
            message(conversation_id, "first"),
            message(conversation_id, "second"),
        ]);
        let mut subscription = MessageSubscription::new(conversation_id, feed);

        assert_eq!(subscription.conversation_id(), conversation_id);
        assert_eq!(subscription.next_message().await.unwrap().text, "first");
        assert_eq!(subscription.next().await.unwrap().text, "second");
        assert!(subscription.next_message().await.is_none());
    }
}
