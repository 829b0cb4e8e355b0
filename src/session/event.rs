//! Events that can occur in a session

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Pointer interaction on the NPC's visual representation.
    /// Toggles the dialog: opens it when closed, closes it when open.
    Activate,

    /// Close the dialog (presenter close callback, or host focus loss)
    Close,

    /// User committed a line of input from the dialog
    Submit { speaker: String, text: String },

    /// The outstanding chat request produced a reply
    ReplyReceived { text: String },

    /// The outstanding chat request failed (network, status, malformed body)
    ReplyFailed,

    /// The host reported updated configuration fields
    ConfigChanged,
}
