//! Session controller
//!
//! Owns the transcript, the id counter and the machine state for one NPC
//! entity, applies events through the pure transition function and
//! executes the resulting effects against the host collaborators.

use super::traits::{AssetResolver, AvatarRig, PlayerIdentity};
use super::SessionEvent;
use crate::chat::{ChatClient, ChatRequest};
use crate::config::{
    EmoteRefs, FieldValues, SessionConfig, DEFAULT_IDLE_EMOTE, DEFAULT_TALKING_EMOTE,
    DEFAULT_THINKING_EMOTE, DEFAULT_TRIGGERED_EMOTE, DEFAULT_VRM,
};
use crate::session::{transition, ChatMessage, Effect, Event, NpcState, SessionState};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Resolved emote URLs for the four animation states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmoteSet {
    pub idle: String,
    pub triggered: String,
    pub thinking: String,
    pub talking: String,
}

impl EmoteSet {
    pub fn resolve(assets: &dyn AssetResolver, refs: &EmoteRefs) -> Self {
        Self {
            idle: assets.resolve(refs.idle.as_deref(), DEFAULT_IDLE_EMOTE),
            triggered: assets.resolve(refs.triggered.as_deref(), DEFAULT_TRIGGERED_EMOTE),
            thinking: assets.resolve(refs.thinking.as_deref(), DEFAULT_THINKING_EMOTE),
            talking: assets.resolve(refs.talking.as_deref(), DEFAULT_TALKING_EMOTE),
        }
    }

    pub fn url_for(&self, state: NpcState) -> &str {
        match state {
            NpcState::Idle => &self.idle,
            NpcState::Triggered => &self.triggered,
            NpcState::Thinking => &self.thinking,
            NpcState::Talking => &self.talking,
        }
    }
}

struct Inner {
    config: SessionConfig,
    emotes: EmoteSet,
    state: SessionState,
    transcript: Vec<ChatMessage>,
    next_id: u64,
}

impl Inner {
    fn mint_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the transcript wholesale with the configured greeting.
    fn reset_transcript(&mut self) {
        self.next_id = 1;
        let id = self.mint_id();
        let greeting = ChatMessage::new(id, &self.config.npc_name, &self.config.greeting);
        self.transcript = vec![greeting];
    }
}

/// Controller for one NPC entity's conversational session.
///
/// All methods take `&self`; state sits behind a mutex that is never held
/// across an await, so a `close()` or `handle_activate()` can interleave
/// with a suspended `submit`.
pub struct NpcSession {
    chat: Mutex<Arc<dyn ChatClient>>,
    rig: Arc<dyn AvatarRig>,
    assets: Arc<dyn AssetResolver>,
    identity: Arc<dyn PlayerIdentity>,
    events: broadcast::Sender<SessionEvent>,
    inner: Mutex<Inner>,
}

impl NpcSession {
    pub fn new(
        config: SessionConfig,
        chat: Arc<dyn ChatClient>,
        rig: Arc<dyn AvatarRig>,
        assets: Arc<dyn AssetResolver>,
        identity: Arc<dyn PlayerIdentity>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let emotes = EmoteSet::resolve(assets.as_ref(), &config.emotes);

        let mut inner = Inner {
            config,
            emotes,
            state: SessionState::default(),
            transcript: Vec::new(),
            next_id: 1,
        };
        inner.reset_transcript();
        rig.play_emote(&inner.emotes.idle);

        Self {
            chat: Mutex::new(chat),
            rig,
            assets,
            identity,
            events,
            inner: Mutex::new(inner),
        }
    }

    /// Subscribe to session events (transcript, visibility, in-flight).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Read-only snapshot of the transcript.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.lock_inner().transcript.clone()
    }

    pub fn state(&self) -> SessionState {
        self.lock_inner().state
    }

    pub fn config(&self) -> SessionConfig {
        self.lock_inner().config.clone()
    }

    /// Swap the backend client, e.g. after a credential rotation.
    pub fn set_chat_client(&self, client: Arc<dyn ChatClient>) {
        *self.chat.lock().expect("chat client lock poisoned") = client;
    }

    /// Resolved URL of the avatar model, falling back to the default
    /// asset when the field is empty.
    pub fn avatar_url(&self) -> String {
        let inner = self.lock_inner();
        self.assets
            .resolve(inner.config.vrm_file.as_deref(), DEFAULT_VRM)
    }

    /// Pointer interaction on the NPC: toggles the dialog.
    pub fn handle_activate(&self) {
        let mut inner = self.lock_inner();
        self.apply(&mut inner, Event::Activate);
    }

    /// Open the dialog. No-op when already open.
    pub fn open(&self) {
        let mut inner = self.lock_inner();
        if !inner.state.is_open() {
            self.apply(&mut inner, Event::Activate);
        }
    }

    /// Close the dialog and force the NPC back to idle.
    pub fn close(&self) {
        let mut inner = self.lock_inner();
        self.apply(&mut inner, Event::Close);
    }

    /// Forward one line of user input to the chat backend.
    ///
    /// Appends the user message, suspends on the backend call and appends
    /// the reply (or records the failure). A submit while a request is
    /// already in flight is dropped. Resolves regardless of outcome; the
    /// in-flight slot is cleared through the single resolution point
    /// below on both paths.
    pub async fn submit(&self, text: &str) {
        let speaker = self.identity.display_name();
        let request = {
            let mut inner = self.lock_inner();
            self.apply(
                &mut inner,
                Event::Submit {
                    speaker,
                    text: text.to_string(),
                },
            )
        };
        let Some(request) = request else {
            return;
        };

        let client = self.chat.lock().expect("chat client lock poisoned").clone();
        let event = match client.complete(&request).await {
            Ok(reply) => Event::ReplyReceived { text: reply.text },
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind, "chat request failed");
                Event::ReplyFailed
            }
        };

        let mut inner = self.lock_inner();
        self.apply(&mut inner, event);
    }

    /// Re-resolve configuration after the host signals a field change.
    ///
    /// Resets the transcript to the new greeting; never touches the
    /// dialog visibility or the NPC state.
    pub fn update_config(&self, fields: &FieldValues) {
        let config = SessionConfig::from_fields(fields);
        let mut inner = self.lock_inner();
        inner.emotes = EmoteSet::resolve(self.assets.as_ref(), &config.emotes);
        inner.config = config;
        self.apply(&mut inner, Event::ConfigChanged);
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("session state lock poisoned")
    }

    /// Apply one event and execute the resulting effects.
    ///
    /// Returns the backend request to issue, if the transition asked for
    /// one. Rejected events are logged and dropped.
    fn apply(&self, inner: &mut Inner, event: Event) -> Option<ChatRequest> {
        let result = match transition(&inner.state, event) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(error = %e, "session event dropped");
                return None;
            }
        };

        let was_in_flight = inner.state.in_flight;
        inner.state = result.new_state;

        let mut request = None;
        let mut transcript_changed = false;
        for effect in result.effects {
            match effect {
                Effect::AppendUser { speaker, text } => {
                    let id = inner.mint_id();
                    inner.transcript.push(ChatMessage::new(id, speaker, text));
                    transcript_changed = true;
                }
                Effect::AppendReply { text } => {
                    let id = inner.mint_id();
                    let npc_name = inner.config.npc_name.clone();
                    inner.transcript.push(ChatMessage::new(id, npc_name, text));
                    transcript_changed = true;
                }
                Effect::ResetTranscript => {
                    inner.reset_transcript();
                    transcript_changed = true;
                }
                Effect::PlayEmote(state) => {
                    self.rig.play_emote(inner.emotes.url_for(state));
                }
                Effect::ShowDialog => {
                    let _ = self.events.send(SessionEvent::DialogOpened);
                }
                Effect::HideDialog => {
                    let _ = self.events.send(SessionEvent::DialogClosed);
                }
                Effect::RequestChat { text } => {
                    request = Some(ChatRequest::new(
                        inner.config.model.clone(),
                        &inner.config.system,
                        text,
                        inner.config.temperature,
                    ));
                }
            }
        }

        if transcript_changed {
            let _ = self.events.send(SessionEvent::TranscriptChanged {
                transcript: inner.transcript.clone(),
            });
        }
        if was_in_flight != inner.state.in_flight {
            let _ = self.events.send(SessionEvent::InFlightChanged {
                in_flight: inner.state.in_flight,
            });
        }

        request
    }
}
