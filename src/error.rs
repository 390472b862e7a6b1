use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{conversation::conversation_service::ResolveError, store::StoreError};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("conversation resolution failed: {0}")]
    ConversationResolution(#[from] ResolveError),

    #[error("message insert failed: {0}")]
    PersistenceFailed(#[source] StoreError),

    #[error("failed to fetch {resource}: {source}")]
    QueryFailed {
        resource: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients. Store details never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidRequest(msg) => msg.clone(),
            AppError::PersistenceFailed(_) => "Failed to send message".to_string(),
            AppError::QueryFailed { resource, .. } => format!("Failed to fetch {}", resource),
            AppError::ConversationResolution(_) | AppError::Internal(_) => "Server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidRequest("Missing required fields".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PersistenceFailed(StoreError::Rejected("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_message_hides_store_detail() {
        let err = AppError::QueryFailed {
            resource: "messages",
            source: StoreError::Rejected("relation \"messages\" does not exist".into()),
        };
        assert_eq!(err.public_message(), "Failed to fetch messages");

        let err = AppError::from(ResolveError::LookupFailed(StoreError::Rejected("timeout".into())));
        assert_eq!(err.public_message(), "Server error");
    }
}
