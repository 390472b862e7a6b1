use std::convert::Infallible;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    message::{message_dto::SendMessageRequest, message_models::Message},
    state::AppState,
};

/// Send a message from one user to another
#[utoipa::path(
    post,
    path = "/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message sent", body = Message),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Failed to send message")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let message = state.message_service.send_message(payload).await?;

    Ok((StatusCode::OK, Json(message)))
}

/// Get the messages of a conversation, oldest first
#[utoipa::path(
    get,
    path = "/messages/{conversation_id}",
    tag = "messages",
    params(
        ("conversation_id" = Uuid, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Messages ordered by timestamp", body = Vec<Message>),
        (status = 400, description = "Malformed conversation ID"),
        (status = 500, description = "Failed to fetch messages")
    )
)]
pub async fn get_messages(
    State(state): State<AppState>,
    conversation_id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(conversation_id) = conversation_id.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let messages = state.message_service.list_messages(conversation_id).await?;

    Ok((StatusCode::OK, Json(messages)))
}

/// Stream messages inserted into a conversation as Server-Sent Events
///
/// On Postgres every open stream shares the store's single LISTEN
/// connection, but each delivered event reloads its row through the pool.
#[utoipa::path(
    get,
    path = "/messages/{conversation_id}/stream",
    tag = "messages",
    params(
        ("conversation_id" = Uuid, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "One `message` event per inserted message", body = Message, content_type = "text/event-stream"),
        (status = 400, description = "Malformed conversation ID"),
        (status = 500, description = "Server error")
    )
)]
pub async fn message_stream(
    State(state): State<AppState>,
    conversation_id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let Path(conversation_id) = conversation_id.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let subscription = state
        .notifier
        .subscribe(conversation_id)
        .await
        .map_err(|e| AppError::Internal(format!("subscribe to conversation {}: {}", conversation_id, e)))?;

    let stream = subscription.filter_map(|message| {
        let json = serde_json::to_string(&message).ok()?;
        Some(Ok::<_, Infallible>(Event::default().event("message").data(json)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
