//! Mock collaborators for testing
//!
//! These mocks enable exercising the session controller without a real
//! host or network.

use super::traits::*;
use super::{NpcSession, SessionEvent};
use crate::chat::{ChatClient, ChatError, ChatReply, ChatRequest};
use crate::config::SessionConfig;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Chat client that returns queued replies
pub struct MockChatClient {
    responses: Mutex<VecDeque<Result<ChatReply, ChatError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ChatReply { text: text.into() }));
    }

    pub fn queue_error(&self, error: ChatError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::network("No mock response queued")))
    }
}

use std::time::Duration;
use tokio::sync::Notify;

/// Chat client with a configurable delay, for interleaving tests
pub struct DelayedMockChatClient {
    inner: MockChatClient,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockChatClient {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockChatClient::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.inner.queue_reply(text);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ChatClient for DelayedMockChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_waiters();
        tokio::time::sleep(self.delay).await;
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::network("No mock response queued")))
    }
}

/// Avatar rig that records every emote switch
#[derive(Default)]
pub struct RecordingRig {
    pub played: Mutex<Vec<String>>,
}

impl RecordingRig {
    pub fn recorded(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

impl AvatarRig for RecordingRig {
    fn play_emote(&self, url: &str) {
        self.played.lock().unwrap().push(url.to_string());
    }
}

/// Identity with a fixed display name
pub struct FixedIdentity(pub String);

impl FixedIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl PlayerIdentity for FixedIdentity {
    fn display_name(&self) -> String {
        self.0.clone()
    }
}

/// Session configuration used throughout the tests
pub fn aria_config() -> SessionConfig {
    SessionConfig {
        npc_name: "Aria".to_string(),
        greeting: "Hi!".to_string(),
        ..SessionConfig::default()
    }
}

/// Build a session around the given chat client with recording mocks.
pub fn test_session(chat: Arc<dyn ChatClient>) -> (Arc<NpcSession>, Arc<RecordingRig>) {
    let rig = Arc::new(RecordingRig::default());
    let session = Arc::new(NpcSession::new(
        aria_config(),
        chat,
        rig.clone(),
        Arc::new(PassthroughAssets),
        Arc::new(FixedIdentity::new("visitor")),
    ));
    (session, rig)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::DEFAULT_SYSTEM_PROMPT;
    use crate::config::{FieldValues, DEFAULT_MODEL};
    use crate::session::NpcState;
    use serde_json::json;

    #[tokio::test]
    async fn fresh_session_seeds_greeting() {
        let (session, _rig) = test_session(Arc::new(MockChatClient::new()));

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].id, 1);
        assert_eq!(transcript[0].speaker, "Aria");
        assert_eq!(transcript[0].text, "Hi!");

        let state = session.state();
        assert!(!state.dialog_open);
        assert_eq!(state.npc, NpcState::Idle);
    }

    #[tokio::test]
    async fn successful_submit_appends_two_messages() {
        let chat = Arc::new(MockChatClient::new());
        chat.queue_reply("Hello there!");
        let (session, _rig) = test_session(chat.clone());

        session.open();
        session.submit("hello").await;

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].id, 2);
        assert_eq!(transcript[1].speaker, "visitor");
        assert_eq!(transcript[1].text, "hello");
        assert_eq!(transcript[2].id, 3);
        assert_eq!(transcript[2].speaker, "Aria");
        assert_eq!(transcript[2].text, "Hello there!");

        let state = session.state();
        assert_eq!(state.npc, NpcState::Talking);
        assert!(!state.in_flight);
    }

    #[tokio::test]
    async fn request_carries_config_and_defaults() {
        let chat = Arc::new(MockChatClient::new());
        chat.queue_reply("ok");
        let (session, _rig) = test_session(chat.clone());

        session.open();
        session.submit("hello").await;

        let requests = chat.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, DEFAULT_MODEL);
        assert_eq!(requests[0].system, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(requests[0].user, "hello");
    }

    #[tokio::test]
    async fn failed_submit_keeps_user_message_and_idles() {
        let chat = Arc::new(MockChatClient::new());
        chat.queue_error(ChatError::network("connection reset"));
        let (session, _rig) = test_session(chat.clone());

        session.open();
        session.submit("hello").await;

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].text, "hello");

        let state = session.state();
        assert_eq!(state.npc, NpcState::Idle);
        assert!(state.dialog_open);
        assert!(!state.in_flight);
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected() {
        let chat = Arc::new(DelayedMockChatClient::new(Duration::from_millis(100)));
        chat.queue_reply("first reply");
        let (session, _rig) = test_session(chat.clone());
        session.open();

        let background = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("one").await })
        };
        tokio::time::timeout(Duration::from_secs(1), chat.request_started.notified())
            .await
            .expect("first request should start");

        // Second submit arrives while the first is still in flight.
        session.submit("two").await;

        background.await.unwrap();

        assert_eq!(chat.recorded_requests().len(), 1);
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].text, "one");
        assert_eq!(transcript[2].text, "first reply");
    }

    #[tokio::test]
    async fn close_while_thinking_still_lands_reply() {
        let chat = Arc::new(DelayedMockChatClient::new(Duration::from_millis(50)));
        chat.queue_reply("late reply");
        let (session, _rig) = test_session(chat.clone());
        session.open();

        let background = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("hello").await })
        };
        tokio::time::timeout(Duration::from_secs(1), chat.request_started.notified())
            .await
            .expect("request should start");

        session.close();
        let state = session.state();
        assert!(!state.dialog_open);
        assert_eq!(state.npc, NpcState::Idle);
        assert!(state.in_flight, "request stays outstanding across close");

        background.await.unwrap();

        // The reply still lands in the transcript; visible state stays
        // idle and hidden.
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].text, "late reply");
        let state = session.state();
        assert!(!state.dialog_open);
        assert_eq!(state.npc, NpcState::Idle);
        assert!(!state.in_flight);
    }

    #[tokio::test]
    async fn activate_toggles_dialog() {
        let (session, _rig) = test_session(Arc::new(MockChatClient::new()));

        session.handle_activate();
        assert!(session.state().dialog_open);
        assert_eq!(session.state().npc, NpcState::Triggered);

        session.handle_activate();
        assert!(!session.state().dialog_open);
        assert_eq!(session.state().npc, NpcState::Idle);
    }

    #[tokio::test]
    async fn open_and_close_broadcast_visibility() {
        let (session, _rig) = test_session(Arc::new(MockChatClient::new()));
        let mut rx = session.subscribe();

        session.open();
        session.close();

        assert!(matches!(rx.try_recv(), Ok(SessionEvent::DialogOpened)));
        assert!(matches!(rx.try_recv(), Ok(SessionEvent::DialogClosed)));
    }

    #[tokio::test]
    async fn in_flight_signal_toggles_around_submit() {
        let chat = Arc::new(MockChatClient::new());
        chat.queue_reply("ok");
        let (session, _rig) = test_session(chat);
        session.open();

        let mut rx = session.subscribe();
        session.submit("hi").await;

        let mut flags = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::InFlightChanged { in_flight } = event {
                flags.push(in_flight);
            }
        }
        assert_eq!(flags, vec![true, false]);
    }

    #[tokio::test]
    async fn ids_are_strictly_increasing() {
        let chat = Arc::new(MockChatClient::new());
        chat.queue_reply("one");
        chat.queue_reply("two");
        let (session, _rig) = test_session(chat);
        session.open();

        session.submit("first").await;
        session.submit("second").await;

        let ids: Vec<u64> = session.transcript().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn config_change_resets_transcript_only() {
        let chat = Arc::new(MockChatClient::new());
        chat.queue_reply("remembered");
        let (session, _rig) = test_session(chat);
        session.open();
        session.submit("hello").await;
        assert_eq!(session.transcript().len(), 3);

        let mut fields = FieldValues::new();
        fields.insert("npcName".to_string(), json!("Zed"));
        fields.insert("initialMessage".to_string(), json!("Yo."));
        session.update_config(&fields);

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].id, 1);
        assert_eq!(transcript[0].speaker, "Zed");
        assert_eq!(transcript[0].text, "Yo.");

        // Visibility and behavioral state are untouched by a refresh.
        let state = session.state();
        assert!(state.dialog_open);
        assert_eq!(state.npc, NpcState::Talking);
    }

    #[tokio::test]
    async fn avatar_model_falls_back_to_default() {
        let (session, _rig) = test_session(Arc::new(MockChatClient::new()));
        assert_eq!(session.avatar_url(), "default.vrm");

        let mut fields = FieldValues::new();
        fields.insert("vrmFile".to_string(), json!("avatars/aria.vrm"));
        session.update_config(&fields);
        assert_eq!(session.avatar_url(), "avatars/aria.vrm");
    }

    #[tokio::test]
    async fn emotes_follow_the_session() {
        let chat = Arc::new(MockChatClient::new());
        chat.queue_reply("ok");
        let (session, rig) = test_session(chat);

        session.open();
        session.submit("hi").await;

        assert_eq!(
            rig.recorded(),
            vec![
                "emotes/idle.glb".to_string(),
                "emotes/wave.glb".to_string(),
                "emotes/think.glb".to_string(),
                "emotes/talk.glb".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn custom_emote_refs_are_resolved() {
        let mut fields = FieldValues::new();
        fields.insert("thinkingEmote".to_string(), json!("custom/ponder.glb"));
        let config = SessionConfig::from_fields(&fields);

        let chat = Arc::new(MockChatClient::new());
        chat.queue_reply("ok");
        let rig = Arc::new(RecordingRig::default());
        let session = NpcSession::new(
            config,
            chat,
            rig.clone(),
            Arc::new(PassthroughAssets),
            Arc::new(FixedIdentity::new("visitor")),
        );

        session.open();
        session.submit("hi").await;

        assert!(rig
            .recorded()
            .contains(&"custom/ponder.glb".to_string()));
    }
}
