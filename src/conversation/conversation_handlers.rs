use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    conversation::conversation_models::Conversation,
    error::{AppError, Result},
    state::AppState,
};

/// Get every conversation a user takes part in, newest first
#[utoipa::path(
    get,
    path = "/conversations/{user_id}",
    tag = "conversations",
    params(
        ("user_id" = String, Path, description = "User ID, matched against either participant")
    ),
    responses(
        (status = 200, description = "Conversations ordered by creation time, newest first", body = Vec<Conversation>),
        (status = 500, description = "Failed to fetch conversations")
    )
)]
pub async fn get_conversations(
    State(state): State<AppState>,
    user_id: std::result::Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(user_id) = user_id.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let conversations = state
        .conversation_resolver
        .list_for_user(&user_id)
        .await
        .map_err(|source| AppError::QueryFailed {
            resource: "conversations",
            source,
        })?;

    Ok((StatusCode::OK, Json(conversations)))
}
