//! Effects produced by state transitions

use super::state::NpcState;

/// Effects to be executed by the session controller after a transition.
///
/// The transition function itself performs no I/O; appending to the
/// transcript, switching emotes and issuing the backend request all
/// happen here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a user message to the transcript
    AppendUser { speaker: String, text: String },

    /// Append an NPC reply to the transcript
    AppendReply { text: String },

    /// Replace the transcript with the configured greeting
    ResetTranscript,

    /// Switch the avatar animation to the emote for this state
    PlayEmote(NpcState),

    /// Mount/show the dialog presenter
    ShowDialog,

    /// Unmount/hide the dialog presenter
    HideDialog,

    /// Issue the backend chat request for this user text
    RequestChat { text: String },
}
