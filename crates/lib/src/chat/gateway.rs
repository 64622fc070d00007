//! Chat gateway: one `POST {"prompt": ...}` per message through the retrying HTTP client.

use crate::http::{ApiResult, HttpClient};
use async_trait::async_trait;

/// Something that answers a prompt. Implemented by [`ChatGateway`]; mocked in session tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(&self, prompt: &str) -> ApiResult<String>;
}

/// Typed facade over the remote chat endpoint. Holds no conversation state.
#[derive(Clone)]
pub struct ChatGateway {
    endpoint: String,
    http: HttpClient,
}

impl ChatGateway {
    pub fn new(endpoint: impl Into<String>, http: HttpClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for ChatGateway {
    /// POST the prompt and return the reply text, or the failure reason.
    async fn send_message(&self, prompt: &str) -> ApiResult<String> {
        log::debug!("chat: sending {} chars to {}", prompt.len(), self.endpoint);
        let res = self
            .http
            .post(&self.endpoint, serde_json::json!({ "prompt": prompt }))
            .await
            .map(|body| body.into_text());
        if let Some(e) = res.error() {
            log::error!("chat: request failed: {}", e);
        }
        res
    }
}
