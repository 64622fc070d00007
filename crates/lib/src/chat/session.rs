//! Chat session: ordered message log plus a busy flag so at most one round-trip is in flight.
//!
//! The log is append-only; `clear` resets it and `regenerate` drops the reply being redone.

use crate::chat::ChatBackend;
use crate::http::ApiResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

const GREETING: &str = "Hi! I'm your AI assistant. How can I help you?";
const CLEARED: &str = "Chat history cleared. Anything new I can help with?";
const NO_REPLY: &str = "Sorry, I can't respond right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One entry of the chat log. `id` is generated client-side and unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("a reply is still pending; wait for it before sending again")]
    Busy,
    #[error("message is empty")]
    EmptyInput,
    #[error("no message at index {0}")]
    NoSuchMessage(usize),
    #[error("message {0} does not follow a user message")]
    NotRegenerable(usize),
}

/// Clears the busy flag when the round-trip ends, including when the future is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    messages: RwLock<Vec<ChatMessage>>,
    busy: AtomicBool,
}

impl ChatSession {
    /// New session seeded with the assistant's greeting.
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            messages: RwLock::new(vec![ChatMessage::ai(GREETING)]),
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Snapshot of the log in order.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, ChatError> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ChatError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    /// Append the user's message, ask the backend, append and return the reply.
    /// A failed request still produces an AI message carrying the failure reason.
    pub async fn submit(&self, text: &str) -> Result<ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        let _guard = self.acquire()?;
        let user = ChatMessage::user(text);
        self.messages.write().await.push(user.clone());

        let reply = self.ask(&user.content).await;
        self.messages.write().await.push(reply.clone());
        Ok(reply)
    }

    /// Re-ask the user message preceding `index`, dropping everything from `index` on.
    pub async fn regenerate(&self, index: usize) -> Result<ChatMessage, ChatError> {
        let _guard = self.acquire()?;
        let prompt = {
            let mut log = self.messages.write().await;
            if index >= log.len() {
                return Err(ChatError::NoSuchMessage(index));
            }
            if index == 0 || log[index - 1].sender != Sender::User {
                return Err(ChatError::NotRegenerable(index));
            }
            let prompt = log[index - 1].content.clone();
            log.truncate(index);
            prompt
        };

        let reply = self.ask(&prompt).await;
        self.messages.write().await.push(reply.clone());
        Ok(reply)
    }

    /// Reset the log to a single notice from the assistant.
    pub async fn clear(&self) {
        let mut log = self.messages.write().await;
        log.clear();
        log.push(ChatMessage::ai(CLEARED));
    }

    async fn ask(&self, prompt: &str) -> ChatMessage {
        match self.backend.send_message(prompt).await {
            ApiResult::Success { data } if !data.is_empty() => ChatMessage::ai(data),
            ApiResult::Failure { error } if !error.is_empty() => {
                log::warn!("chat: reply failed: {}", error);
                ChatMessage::ai(error)
            }
            _ => ChatMessage::ai(NO_REPLY),
        }
    }
}
