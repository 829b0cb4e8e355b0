//! Chat backend abstraction
//!
//! Provides a common interface for the external chat-completion service
//! the NPC forwards user text to.

mod client;
mod error;
mod types;

pub use client::{OpenAiChatClient, DEFAULT_ENDPOINT};
pub use error::{ChatError, ChatErrorKind};
pub use types::{ChatReply, ChatRequest, DEFAULT_SYSTEM_PROMPT};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface to the chat backend
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// Logging wrapper for chat clients
pub struct LoggingClient {
    inner: Arc<dyn ChatClient>,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn ChatClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatClient for LoggingClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let start = Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    reply_chars = reply.text.len(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Chat request failed"
                );
            }
        }

        result
    }
}
