//! Chat: a typed gateway to the remote text-generation endpoint and an append-only session log.

mod gateway;
mod session;

pub use gateway::{ChatBackend, ChatGateway};
pub use session::{ChatError, ChatMessage, ChatSession, Sender};
