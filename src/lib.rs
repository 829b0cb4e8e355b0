//! In-world NPC chat widget
//!
//! A host-runtime plugin: a 3D avatar entity that opens a chat dialog on
//! interaction, forwards user text to a chat-completion backend and
//! renders the reply while switching the avatar's animation state
//! (idle/triggered/thinking/talking). The host engine supplies the scene
//! graph, GUI primitives, asset store and configuration UI; this crate
//! owns the session state machine, the transcript and the backend call.

pub mod chat;
pub mod config;
pub mod presenter;
pub mod runtime;
pub mod session;
