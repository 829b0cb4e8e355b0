//! Session state types

use serde::{Deserialize, Serialize};

/// Visible behavioral state of the NPC avatar.
///
/// Exactly one value is current at any time; transitions are driven
/// solely by the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NpcState {
    /// Nothing happening, dialog closed
    #[default]
    Idle,
    /// Dialog just opened, waiting for the user to type
    Triggered,
    /// A chat request is outstanding
    Thinking,
    /// Last reply delivered, dialog still open
    Talking,
}

/// One entry in the session transcript.
///
/// Immutable once created. Ids are minted by the session controller and
/// are strictly increasing within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub speaker: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(id: u64, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Full machine state for one NPC session.
///
/// Invariant: `dialog_open == false` implies `npc == NpcState::Idle`.
/// `in_flight` is the single mutually-exclusive request slot; it survives
/// a close so that a late reply can still be accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub dialog_open: bool,
    pub npc: NpcState,
    pub in_flight: bool,
}

impl SessionState {
    pub fn is_open(&self) -> bool {
        self.dialog_open
    }
}
