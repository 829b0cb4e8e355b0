//! npc-console - drive one NPC session from a terminal
//!
//! A minimal standalone host harness: reads configuration from NPC_*
//! environment variables, opens the dialog and submits each stdin line to
//! the real chat backend.

use npc_chat::chat::{ChatClient, LoggingClient, OpenAiChatClient};
use npc_chat::config::{FieldValues, SessionConfig};
use npc_chat::runtime::{AvatarRig, NpcSession, PassthroughAssets, PlayerIdentity};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Rig that reports emote switches to the log instead of an avatar.
struct ConsoleRig;

impl AvatarRig for ConsoleRig {
    fn play_emote(&self, url: &str) {
        tracing::debug!(emote = %url, "emote switched");
    }
}

struct EnvIdentity;

impl PlayerIdentity for EnvIdentity {
    fn display_name(&self) -> String {
        std::env::var("USER").unwrap_or_else(|_| "you".to_string())
    }
}

fn env_fields() -> FieldValues {
    let mut fields = FieldValues::new();
    for (key, var) in [
        ("npcName", "NPC_NAME"),
        ("initialMessage", "NPC_GREETING"),
        ("aiModel", "NPC_MODEL"),
        ("system", "NPC_SYSTEM"),
    ] {
        if let Ok(value) = std::env::var(var) {
            fields.insert(key.to_string(), Value::String(value));
        }
    }

    if let Ok(key) = std::env::var("NPC_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY")) {
        fields.insert("apiKey".to_string(), Value::String(key));
    }

    if let Some(temperature) = std::env::var("NPC_TEMPERATURE")
        .ok()
        .and_then(|t| t.parse::<f64>().ok())
    {
        fields.insert("temperature".to_string(), temperature.into());
    }

    fields
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "npc_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SessionConfig::from_fields(&env_fields());
    if config.api_key.is_empty() {
        tracing::warn!("No API key configured. Set NPC_API_KEY or OPENAI_API_KEY.");
    }

    let backend = Arc::new(OpenAiChatClient::new(config.api_key.clone()));
    let chat: Arc<dyn ChatClient> = Arc::new(LoggingClient::new(backend));

    let session = Arc::new(NpcSession::new(
        config,
        chat,
        Arc::new(ConsoleRig),
        Arc::new(PassthroughAssets),
        Arc::new(EnvIdentity),
    ));

    session.open();
    for message in session.transcript() {
        println!("{}: {}", message.speaker, message.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim().to_string();
        if text.is_empty() {
            continue;
        }

        let before = session.transcript().len();
        session.submit(&text).await;

        // Print anything the backend added past the user's own line.
        for message in session.transcript().iter().skip(before + 1) {
            println!("{}: {}", message.speaker, message.text);
        }
    }

    session.close();
    Ok(())
}
