//! Dialog presenter
//!
//! Stateless-over-time view of one session: renders the title, the
//! transcript and an input affordance through the host's GUI surface, and
//! feeds committed input back into the session controller. Purely
//! reactive to the events broadcast by [`crate::runtime::NpcSession`].

use crate::runtime::{NpcSession, SessionEvent};
use crate::session::ChatMessage;
use std::sync::Arc;
use tokio::sync::broadcast;

pub const DIALOG_WIDTH: f32 = 340.0;
pub const DIALOG_HEIGHT: f32 = 600.0;
/// Viewports wider than this get the side placement.
pub const WIDE_BREAKPOINT: f32 = 880.0;
const EDGE_MARGIN: f32 = 20.0;

/// Host viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Screen placement of the dialog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// Deterministic placement rule: wide viewports center the dialog
/// vertically in the right half, narrow ones pin it above the bottom
/// edge, centered horizontally.
pub fn placement(viewport: Viewport) -> Placement {
    let (top, left) = if viewport.width > WIDE_BREAKPOINT {
        (
            viewport.height / 2.0 - DIALOG_HEIGHT / 2.0,
            viewport.width - (viewport.width / 2.0 - DIALOG_WIDTH / 2.0),
        )
    } else {
        (
            viewport.height - DIALOG_HEIGHT - EDGE_MARGIN,
            viewport.width / 2.0 - DIALOG_WIDTH / 2.0,
        )
    };
    Placement {
        top,
        left,
        width: DIALOG_WIDTH,
        height: DIALOG_HEIGHT,
    }
}

/// How the message list scrolls to the newest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// First render jumps straight to the bottom
    Instant,
    /// Subsequent renders animate
    Smooth,
}

/// Everything the host GUI needs to draw the dialog.
///
/// While `busy` is set the input affordance is replaced by a busy
/// indicator, so no further submits can originate from this presenter.
#[derive(Debug, Clone)]
pub struct DialogView {
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub busy: bool,
    pub scroll: ScrollBehavior,
    pub placement: Placement,
}

/// Host-owned GUI surface the presenter draws into
pub trait DialogSurface: Send + Sync {
    fn render(&self, view: &DialogView);

    /// Request exclusive input focus so typing doesn't leak to other
    /// world controls.
    fn grab_focus(&self);
}

/// Presenter for one mounted dialog instance.
pub struct DialogPresenter {
    session: Arc<NpcSession>,
    surface: Arc<dyn DialogSurface>,
    viewport: Viewport,
    title: String,
    messages: Vec<ChatMessage>,
    waiting: bool,
    rendered_once: bool,
}

impl DialogPresenter {
    /// Mount the dialog: grab input focus and render the current
    /// transcript.
    pub fn mount(
        session: Arc<NpcSession>,
        surface: Arc<dyn DialogSurface>,
        viewport: Viewport,
    ) -> Self {
        let title = session.config().npc_name;
        let messages = session.transcript();
        let waiting = session.state().in_flight;
        let mut presenter = Self {
            session,
            surface,
            viewport,
            title,
            messages,
            waiting,
            rendered_once: false,
        };
        presenter.surface.grab_focus();
        presenter.render();
        presenter
    }

    fn render(&mut self) {
        let scroll = if self.rendered_once {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        };
        let view = DialogView {
            title: self.title.clone(),
            messages: self.messages.clone(),
            busy: self.waiting,
            scroll,
            placement: placement(self.viewport),
        };
        self.surface.render(&view);
        self.rendered_once = true;
    }

    /// React to one session event. Returns `false` once the dialog has
    /// been closed and the presenter should unmount.
    pub fn handle_event(&mut self, event: &SessionEvent) -> bool {
        match event {
            SessionEvent::DialogClosed => return false,
            SessionEvent::DialogOpened => {}
            SessionEvent::TranscriptChanged { transcript } => {
                self.messages = transcript.clone();
                self.render();
            }
            SessionEvent::InFlightChanged { in_flight } => {
                self.waiting = *in_flight;
                self.render();
            }
        }
        true
    }

    /// Commit action of the input affordance.
    ///
    /// Empty or whitespace-only content is a no-op; otherwise the trimmed
    /// text is submitted exactly once.
    pub async fn commit_input(&self, raw: &str) {
        if self.waiting {
            return;
        }
        let text = raw.trim();
        if text.is_empty() {
            return;
        }
        self.session.submit(text).await;
    }

    /// The host moved global input focus away from the dialog: close it
    /// so it never lingers visible without focus.
    pub fn on_focus_lost(&self) {
        self.session.close();
    }

    /// Event pump: re-render on every session event until the dialog
    /// closes.
    pub async fn run(mut self, mut events: broadcast::Receiver<SessionEvent>) {
        while let Ok(event) = events.recv().await {
            if !self.handle_event(&event) {
                break;
            }
        }
    }
}
