use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A durable record of one unordered pair of participants.
///
/// `user1_id <= user2_id` always holds, so the same two users share a
/// single row no matter who wrote first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Conversation {
    pub id: Uuid,
    pub user1_id: String,
    pub user2_id: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn involves(&self, user_id: &str) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }
}

/// Two participant identifiers in canonical (byte-wise ascending) order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: String,
    high: String,
}

impl ParticipantPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    pub fn matches(&self, conversation: &Conversation) -> bool {
        conversation.user1_id == self.low && conversation.user2_id == self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        assert_eq!(ParticipantPair::new("bob", "alice"), ParticipantPair::new("alice", "bob"));

        let pair = ParticipantPair::new("bob", "alice");
        assert_eq!(pair.low(), "alice");
        assert_eq!(pair.high(), "bob");
    }

    #[test]
    fn test_pair_uses_byte_order() {
        // Uppercase sorts before lowercase, digits before both.
        let pair = ParticipantPair::new("alice", "Bob");
        assert_eq!(pair.low(), "Bob");

        let pair = ParticipantPair::new("user10", "user2");
        assert_eq!(pair.low(), "user10");
        assert_eq!(pair.high(), "user2");
    }

    #[test]
    fn test_pair_with_same_participant() {
        let pair = ParticipantPair::new("alice", "alice");
        assert_eq!(pair.low(), pair.high());
    }

    #[test]
    fn test_conversation_involves_either_slot() {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user1_id: "alice".to_string(),
            user2_id: "bob".to_string(),
            created_at: Utc::now(),
        };

        assert!(conversation.involves("alice"));
        assert!(conversation.involves("bob"));
        assert!(!conversation.involves("carol"));
        assert!(ParticipantPair::new("bob", "alice").matches(&conversation));
    }
}
