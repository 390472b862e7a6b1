use crate::{
    conversation::{conversation_handlers, conversation_models::Conversation},
    message::{message_dto::SendMessageRequest, message_handlers, message_models::Message},
    state::AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Messaging API", version = "1.0.0"),
    paths(
        crate::message::message_handlers::send_message,
        crate::message::message_handlers::get_messages,
        crate::message::message_handlers::message_stream,
        crate::conversation::conversation_handlers::get_conversations,
    ),
    components(
        schemas(
            SendMessageRequest,
            Message,
            Conversation,
        )
    ),
    tags(
        (name = "messages", description = "Send and read messages"),
        (name = "conversations", description = "Conversations between two users")
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let message_routes = Router::new()
        .route("/", post(message_handlers::send_message))
        .route("/:conversation_id", get(message_handlers::get_messages))
        .route("/:conversation_id/stream", get(message_handlers::message_stream));

    let conversation_routes = Router::new()
        .route("/:user_id", get(conversation_handlers::get_conversations));

    Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/openapi.json", ApiDoc::openapi()))
        .nest("/messages", message_routes)
        .nest("/conversations", conversation_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
