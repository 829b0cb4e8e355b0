//! Common types for chat backend interactions

/// Default system prompt used when the configured one is empty.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// One completion request.
///
/// Model, system prompt and temperature come from the session
/// configuration at build time, so configuration changes take effect on
/// the next submit without rebuilding the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl ChatRequest {
    /// Build a request, substituting the default system prompt for an
    /// empty one.
    pub fn new(
        model: impl Into<String>,
        system: &str,
        user: impl Into<String>,
        temperature: f32,
    ) -> Self {
        let system = if system.trim().is_empty() {
            DEFAULT_SYSTEM_PROMPT.to_string()
        } else {
            system.to_string()
        };
        Self {
            model: model.into(),
            system,
            user: user.into(),
            temperature,
        }
    }
}

/// A completed reply, content already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
}
