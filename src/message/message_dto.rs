use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, Result};

pub const MISSING_FIELDS: &str = "Missing required fields";

#[derive(Clone, Debug, Default, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub sender_id: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub text: Option<String>,
}

impl SendMessageRequest {
    pub fn new(sender_id: &str, receiver_id: &str, text: &str) -> Self {
        Self {
            sender_id: Some(sender_id.to_string()),
            receiver_id: Some(receiver_id.to_string()),
            text: Some(text.to_string()),
        }
    }

    /// Validate and split into `(sender_id, receiver_id, text)`.
    pub fn into_parts(self) -> Result<(String, String, String)> {
        if let Err(e) = self.validate() {
            tracing::debug!("Invalid send message request: {}", e);
            return Err(AppError::InvalidRequest(MISSING_FIELDS.to_string()));
        }

        match (self.sender_id, self.receiver_id, self.text) {
            (Some(sender_id), Some(receiver_id), Some(text)) => Ok((sender_id, receiver_id, text)),
            _ => Err(AppError::InvalidRequest(MISSING_FIELDS.to_string())),
        }
    }
}
