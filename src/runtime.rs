//! Session runtime
//!
//! The controller that drives one NPC entity's session, the trait seams
//! to the host engine, and the event stream the presenter subscribes to.

mod controller;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use controller::{EmoteSet, NpcSession};
pub use traits::*;

use crate::session::ChatMessage;

/// Events broadcast to presenter/host subscribers.
///
/// The presenter derives its busy indicator from `InFlightChanged`
/// instead of keeping a parallel flag of its own.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    DialogOpened,
    DialogClosed,
    TranscriptChanged { transcript: Vec<ChatMessage> },
    InFlightChanged { in_flight: bool },
}
