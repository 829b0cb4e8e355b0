//! Declared configuration fields and per-session resolution
//!
//! The host owns the configuration UI and storage; it hands the current
//! values over as a key/value map and signals when they change. Missing
//! or mistyped values fall back to the declared defaults, never an error.

use serde_json::Value;
use std::collections::HashMap;

/// Current field values as supplied by the host.
pub type FieldValues = HashMap<String, Value>;

pub const DEFAULT_NPC_NAME: &str = "AI NPC";
pub const DEFAULT_GREETING: &str = "Welcome! How can I help you today?";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default assets used when a file-reference field is empty.
pub const DEFAULT_VRM: &str = "default.vrm";
pub const DEFAULT_IDLE_EMOTE: &str = "emotes/idle.glb";
pub const DEFAULT_TRIGGERED_EMOTE: &str = "emotes/wave.glb";
pub const DEFAULT_THINKING_EMOTE: &str = "emotes/think.glb";
pub const DEFAULT_TALKING_EMOTE: &str = "emotes/talk.glb";

const MODEL_OPTIONS: &[&str] = &["gpt-3.5-turbo", "gpt-4", "gpt-4-0613"];

/// Kind of a declared configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Float,
    Dropdown { options: &'static [&'static str] },
    File { accept: &'static str },
    /// Decorative header in the host's configuration UI
    Section,
}

/// One declared configuration field
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: Option<&'static str>,
}

/// The fields this plugin declares to the host, in display order.
pub fn field_schema() -> Vec<FieldDef> {
    vec![
        FieldDef {
            key: "npcName",
            label: "NPC Name",
            kind: FieldKind::Text,
            default: Some(DEFAULT_NPC_NAME),
        },
        FieldDef {
            key: "initialMessage",
            label: "Initial Message",
            kind: FieldKind::Text,
            default: Some(DEFAULT_GREETING),
        },
        FieldDef {
            key: "behavior",
            label: "Behavior",
            kind: FieldKind::Section,
            default: None,
        },
        FieldDef {
            key: "aiModel",
            label: "AI Model",
            kind: FieldKind::Dropdown {
                options: MODEL_OPTIONS,
            },
            default: Some(DEFAULT_MODEL),
        },
        FieldDef {
            key: "apiKey",
            label: "API Key",
            kind: FieldKind::Text,
            default: None,
        },
        FieldDef {
            key: "system",
            label: "System",
            kind: FieldKind::Text,
            default: None,
        },
        FieldDef {
            key: "temperature",
            label: "Temperature",
            kind: FieldKind::Float,
            default: Some("0.7"),
        },
        FieldDef {
            key: "appearance",
            label: "Appearance",
            kind: FieldKind::Section,
            default: None,
        },
        FieldDef {
            key: "vrmFile",
            label: "VRM File",
            kind: FieldKind::File { accept: ".vrm" },
            default: None,
        },
        FieldDef {
            key: "idleEmote",
            label: "Idle Emote",
            kind: FieldKind::File { accept: ".glb" },
            default: None,
        },
        FieldDef {
            key: "triggeredEmote",
            label: "Triggered Emote",
            kind: FieldKind::File { accept: ".glb" },
            default: None,
        },
        FieldDef {
            key: "thinkingEmote",
            label: "Thinking Emote",
            kind: FieldKind::File { accept: ".glb" },
            default: None,
        },
        FieldDef {
            key: "talkingEmote",
            label: "Talking Emote",
            kind: FieldKind::File { accept: ".glb" },
            default: None,
        },
    ]
}

/// File references for the four animation states, unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmoteRefs {
    pub idle: Option<String>,
    pub triggered: Option<String>,
    pub thinking: Option<String>,
    pub talking: Option<String>,
}

/// Immutable-per-session configuration bundle.
///
/// Re-resolved from [`FieldValues`] whenever the host signals a change.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub npc_name: String,
    pub greeting: String,
    pub api_key: String,
    pub model: String,
    pub system: String,
    pub temperature: f32,
    pub vrm_file: Option<String>,
    pub emotes: EmoteRefs,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_fields(&FieldValues::new())
    }
}

impl SessionConfig {
    pub fn from_fields(fields: &FieldValues) -> Self {
        Self {
            npc_name: text(fields, "npcName").unwrap_or_else(|| DEFAULT_NPC_NAME.to_string()),
            greeting: text(fields, "initialMessage")
                .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
            api_key: text(fields, "apiKey").unwrap_or_default(),
            model: text(fields, "aiModel").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            system: text(fields, "system").unwrap_or_default(),
            temperature: float(fields, "temperature").unwrap_or(DEFAULT_TEMPERATURE),
            vrm_file: file_ref(fields, "vrmFile"),
            emotes: EmoteRefs {
                idle: file_ref(fields, "idleEmote"),
                triggered: file_ref(fields, "triggeredEmote"),
                thinking: file_ref(fields, "thinkingEmote"),
                talking: file_ref(fields, "talkingEmote"),
            },
        }
    }
}

fn text(fields: &FieldValues, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

#[allow(clippy::cast_possible_truncation)]
fn float(fields: &FieldValues, key: &str) -> Option<f32> {
    fields.get(key).and_then(Value::as_f64).map(|f| f as f32)
}

fn file_ref(fields: &FieldValues, key: &str) -> Option<String> {
    text(fields, key)
}
