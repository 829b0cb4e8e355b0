//! OpenAI-compatible chat-completions client

use super::types::{ChatReply, ChatRequest};
use super::{ChatClient, ChatError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed chat-completions endpoint used unless overridden.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Bounded request timeout, so a stalled backend cannot leave the NPC
/// thinking forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions client speaking the OpenAI wire format.
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiChatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Point the client at a gateway or test server instead of the
    /// default endpoint.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn translate_request(request: &ChatRequest) -> CompletionRequest {
        CompletionRequest {
            model: request.model.clone(),
            messages: vec![
                WireMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                WireMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            temperature: request.temperature,
        }
    }

    fn normalize_response(resp: CompletionResponse) -> Result<ChatReply, ChatError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::unknown("No choices in response"))?;

        Ok(ChatReply {
            text: choice.message.content.trim().to_string(),
        })
    }

    fn status_error(status: reqwest::StatusCode, body: &str) -> ChatError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map_or_else(|_| body.to_string(), |resp| resp.error.message);

        match status.as_u16() {
            401 | 403 => ChatError::auth(format!("Authentication failed: {message}")),
            429 => ChatError::rate_limit(format!("Rate limit exceeded: {message}")),
            400 => ChatError::invalid_request(format!("Invalid request: {message}")),
            500..=599 => ChatError::server_error(format!("Server error: {message}")),
            _ => ChatError::unknown(format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let wire_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::network(format!("Connection failed: {e}"))
                } else {
                    ChatError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::unknown(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(completion)
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}
