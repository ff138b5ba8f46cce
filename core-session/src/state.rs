//! # Per-Session Playback State
//!
//! The logical activity state machine and the bookkeeping needed to
//! synthesize replay sequences and restore state after buffering spells.
//!
//! `Idle → Initializing → Loading → Loaded → {Playing ⇄ Paused} → Completed`,
//! with buffering as an orthogonal overlay (tracked as two flags here, never
//! as a main state) and `Failed` reachable from anywhere. `Stopped` is
//! terminal, reachable only via explicit teardown. Transitions are driven
//! solely by engine notifications and explicit commands; absence of events
//! never implies a transition.

use core_runtime::events::ActivityEvent;
use std::time::Duration;

/// Logical activity state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    /// No engine activity yet recorded.
    Idle,
    /// Engine materialized; nothing loaded.
    Initializing,
    /// A load is in flight.
    Loading,
    /// Media loaded; playback has not started since loading.
    Loaded,
    /// Playback running.
    Playing,
    /// Playback paused.
    Paused,
    /// Media played to its end.
    Completed,
    /// The engine reported a failure.
    Failed,
    /// Session torn down. Terminal.
    Stopped,
}

impl ActivityState {
    /// Returns `true` for the two states buffering can overlay.
    pub fn is_resting(&self) -> bool {
        matches!(self, ActivityState::Playing | ActivityState::Paused)
    }

    /// Returns `true` when no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActivityState::Stopped)
    }
}

/// Last non-transient play/pause state, used for post-buffering restoration.
///
/// Restoration re-emits whichever of these is current at the moment the
/// engine leaves buffering, not the state that caused entry into buffering;
/// the user may have toggled play/pause while the stall was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestingState {
    Playing,
    Paused,
}

impl RestingState {
    /// The activity event announcing this state.
    pub fn as_event(&self) -> ActivityEvent {
        match self {
            RestingState::Playing => ActivityEvent::Playing,
            RestingState::Paused => ActivityEvent::Paused,
        }
    }
}

/// Everything a session remembers about its observable state.
///
/// This record is what replay sequences are synthesized from; it is updated
/// under the session lock on every transition and never by inference.
#[derive(Debug, Clone)]
pub struct LastKnownState {
    /// Current logical activity state.
    pub activity: ActivityState,
    /// Last non-transient play/pause state.
    pub resting: RestingState,
    /// Live stall flag straight from the engine (undebounced).
    pub engine_buffering: bool,
    /// Whether a debounced `Buffering` event is currently visible to
    /// observers and awaiting restoration.
    pub buffering_visible: bool,
    /// Media duration, once known.
    pub duration: Option<Duration>,
    /// Message of the most recent failure, when `activity` is `Failed`.
    pub last_failure: Option<String>,
}

impl Default for LastKnownState {
    fn default() -> Self {
        Self {
            activity: ActivityState::Idle,
            resting: RestingState::Paused,
            engine_buffering: false,
            buffering_visible: false,
            duration: None,
            last_failure: None,
        }
    }
}

impl LastKnownState {
    /// Reset the buffering overlay, e.g. when playback completes or fails.
    pub fn clear_buffering(&mut self) {
        self.engine_buffering = false;
        self.buffering_visible = false;
    }
}
