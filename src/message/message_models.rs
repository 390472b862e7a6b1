use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An immutable chat message. `timestamp` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_json_shape() {
        let payload = r#"{
            "id": "7f1c2d3e-4b5a-4c6d-8e7f-9a0b1c2d3e4f",
            "conversation_id": "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
            "sender_id": "alice",
            "text": "hello",
            "timestamp": "2024-05-01T10:15:30.123456+00:00"
        }"#;

        let message: Message = serde_json::from_str(payload).unwrap();
        assert_eq!(message.sender_id, "alice");
        assert_eq!(message.text, "hello");
        assert_eq!(message.timestamp.to_rfc3339(), "2024-05-01T10:15:30.123456+00:00");
    }
}
