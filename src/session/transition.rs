//! Pure state transition function
//!
//! Implements the Elm Architecture pattern: given the current state and an
//! event, produce the new state plus a list of effects for the controller
//! to execute. No I/O happens here.

use super::{Effect, Event, NpcState, SessionState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("a chat request is already in flight")]
    RequestInFlight,
    #[error("dialog is not open")]
    DialogClosed,
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
///
/// Given the same inputs, always produces the same outputs.
pub fn transition(
    state: &SessionState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // Pointer toggle: open when closed, close when open.
        Event::Activate if !state.dialog_open => Ok(open_dialog(state)),
        Event::Activate => Ok(close_dialog(state)),

        // Close from any state forces Idle with the dialog hidden.
        Event::Close => Ok(close_dialog(state)),

        // A new submit is only accepted while no request is in flight.
        Event::Submit { .. } if state.in_flight => Err(TransitionError::RequestInFlight),
        Event::Submit { .. } if !state.dialog_open => Err(TransitionError::DialogClosed),
        Event::Submit { speaker, text } => {
            let new_state = SessionState {
                dialog_open: true,
                npc: NpcState::Thinking,
                in_flight: true,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::AppendUser {
                    speaker,
                    text: text.clone(),
                })
                .with_effect(Effect::PlayEmote(NpcState::Thinking))
                .with_effect(Effect::RequestChat { text }))
        }

        // Resolution of the outstanding request. The user message already
        // appended stands either way; failures append nothing.
        Event::ReplyReceived { text } => {
            require_in_flight(state, "ReplyReceived")?;
            if state.dialog_open {
                let new_state = SessionState {
                    dialog_open: true,
                    npc: NpcState::Talking,
                    in_flight: false,
                };
                Ok(TransitionResult::new(new_state)
                    .with_effect(Effect::AppendReply { text })
                    .with_effect(Effect::PlayEmote(NpcState::Talking)))
            } else {
                // Dialog was closed mid-flight: the transcript still gets
                // the reply, but visible effects are suppressed.
                let new_state = SessionState {
                    dialog_open: false,
                    npc: NpcState::Idle,
                    in_flight: false,
                };
                Ok(TransitionResult::new(new_state).with_effect(Effect::AppendReply { text }))
            }
        }

        Event::ReplyFailed => {
            require_in_flight(state, "ReplyFailed")?;
            let new_state = SessionState {
                dialog_open: state.dialog_open,
                npc: NpcState::Idle,
                in_flight: false,
            };
            let result = TransitionResult::new(new_state);
            if state.dialog_open {
                Ok(result.with_effect(Effect::PlayEmote(NpcState::Idle)))
            } else {
                Ok(result)
            }
        }

        // Configuration refresh resets the transcript and nothing else.
        Event::ConfigChanged => {
            Ok(TransitionResult::new(*state).with_effect(Effect::ResetTranscript))
        }
    }
}

fn open_dialog(state: &SessionState) -> TransitionResult {
    let new_state = SessionState {
        dialog_open: true,
        npc: NpcState::Triggered,
        in_flight: state.in_flight,
    };
    TransitionResult::new(new_state)
        .with_effect(Effect::ShowDialog)
        .with_effect(Effect::PlayEmote(NpcState::Triggered))
}

fn close_dialog(state: &SessionState) -> TransitionResult {
    let new_state = SessionState {
        dialog_open: false,
        npc: NpcState::Idle,
        in_flight: state.in_flight,
    };
    TransitionResult::new(new_state)
        .with_effect(Effect::HideDialog)
        .with_effect(Effect::PlayEmote(NpcState::Idle))
}

fn require_in_flight(state: &SessionState, event: &str) -> Result<(), TransitionError> {
    if state.in_flight {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition(format!(
            "{event} with no request in flight"
        )))
    }
}
