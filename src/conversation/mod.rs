pub mod conversation_handlers;
pub mod conversation_models;
pub mod conversation_service;

pub use conversation_models::{Conversation, ParticipantPair};
pub use conversation_service::{ConversationResolver, ResolveError};
