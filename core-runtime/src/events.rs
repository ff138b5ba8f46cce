//! # Session Event Types
//!
//! The typed event vocabulary delivered to attached view adapters.
//!
//! ## Overview
//!
//! Every observer of a playback session sees the same union:
//! - **Activity events**: logical state-machine transitions (loading, playing,
//!   paused, buffering, completed, failed)
//! - **Control events**: continuous or incidental observations that do not
//!   move the state machine (position ticks, quality/speed changes, PiP and
//!   fullscreen presentation changes)
//!
//! Events are immutable snapshots, not commands: receiving `Playing` means
//! the engine already transitioned; it is never a request to transition.
//!
//! ## Delivery Model
//!
//! ```text
//! ┌──────────────┐  notification   ┌─────────┐   fan-out    ┌──────────────┐
//! │ Engine Handle├────────────────>│ Session ├─────────────>│ View Adapter │
//! └──────────────┘                 │         │   (mpsc per  ├──────────────┤
//!                                  │         │    adapter)  │ View Adapter │
//!                                  └─────────┘              └──────────────┘
//! ```
//!
//! Each adapter owns a private unbounded channel. Within one adapter's
//! channel, events arrive in the order the session observed the underlying
//! transitions, and the synthetic replay sequence always precedes any live
//! event. Across adapters of the same session no relative ordering is
//! guaranteed; each stream is only self-consistent.
//!
//! ## Consuming Events
//!
//! ```rust
//! use core_runtime::events::{EventStream, SessionEvent};
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = mpsc::unbounded_channel();
//! let mut stream = EventStream::new(rx)
//!     .filter(|event| matches!(event, SessionEvent::Activity(_)));
//!
//! tx.send(SessionEvent::Activity(core_runtime::events::ActivityEvent::Playing)).ok();
//! drop(tx);
//!
//! while let Some(event) = stream.recv().await {
//!     println!("observed: {}", event.description());
//! }
//! # }
//! ```

use bridge_engine::QualityVariant;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event union delivered to view adapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    /// Logical state-machine transition.
    Activity(ActivityEvent),
    /// Continuous or incidental control-plane observation.
    Control(ControlEvent),
}

impl SessionEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            SessionEvent::Activity(e) => e.description(),
            SessionEvent::Control(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            SessionEvent::Activity(ActivityEvent::Failed { .. }) => EventSeverity::Error,
            SessionEvent::Activity(ActivityEvent::Buffering) => EventSeverity::Warning,
            SessionEvent::Control(ControlEvent::TimeUpdated { .. }) => EventSeverity::Debug,
            SessionEvent::Activity(_) => EventSeverity::Info,
            SessionEvent::Control(_) => EventSeverity::Debug,
        }
    }

    /// Returns `true` for activity events.
    pub fn is_activity(&self) -> bool {
        matches!(self, SessionEvent::Activity(_))
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose; position ticks).
    Debug,
    /// Informational events (ordinary transitions).
    Info,
    /// Warning events (confirmed buffering stalls).
    Warning,
    /// Error events (engine failures).
    Error,
}

// ============================================================================
// Activity Events
// ============================================================================

/// Logical playback state transitions.
///
/// These mirror the per-session state machine: `Idle → Initializing →
/// Loading → Loaded → {Playing ⇄ Paused} → Completed`, with `Buffering` as
/// an orthogonal overlay and `Failed` reachable from anywhere. `Stopped` is
/// terminal and only ever produced by explicit teardown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ActivityEvent {
    /// No media loaded.
    Idle,
    /// Session created; engine materialized but nothing loaded yet.
    Initializing,
    /// A load command is in flight.
    Loading,
    /// Media loaded and its duration is known.
    Loaded {
        /// Total media duration in milliseconds.
        duration_ms: u64,
    },
    /// Playback is running.
    Playing,
    /// Playback is paused.
    Paused,
    /// A buffering stall persisted past the debounce quiet period.
    Buffering,
    /// Playback reached the end of the media.
    Completed,
    /// The session was explicitly torn down.
    Stopped,
    /// The engine failed; the session remains usable for another load.
    Failed {
        /// Human-readable failure message.
        message: String,
    },
}

impl ActivityEvent {
    fn description(&self) -> &str {
        match self {
            ActivityEvent::Idle => "No media loaded",
            ActivityEvent::Initializing => "Session initializing",
            ActivityEvent::Loading => "Media loading",
            ActivityEvent::Loaded { .. } => "Media loaded",
            ActivityEvent::Playing => "Playback running",
            ActivityEvent::Paused => "Playback paused",
            ActivityEvent::Buffering => "Playback stalled on buffering",
            ActivityEvent::Completed => "Playback completed",
            ActivityEvent::Stopped => "Session stopped",
            ActivityEvent::Failed { .. } => "Playback failed",
        }
    }
}

// ============================================================================
// Control Events
// ============================================================================

/// Control-plane observations that do not move the activity state machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ControlEvent {
    /// Periodic position report.
    ///
    /// `is_buffering` is the engine's live stall flag, independent of the
    /// debounced [`ActivityEvent::Buffering`] channel; together they can
    /// express "playing but currently stalled".
    TimeUpdated {
        /// Current playback position in milliseconds.
        position_ms: u64,
        /// Total duration in milliseconds, when known.
        duration_ms: Option<u64>,
        /// Furthest buffered position in milliseconds.
        buffered_position_ms: u64,
        /// Whether the engine is stalled right now (undebounced).
        is_buffering: bool,
    },
    /// The active quality rendition changed.
    QualityChanged {
        /// The variant now in effect.
        variant: QualityVariant,
    },
    /// The playback rate changed.
    SpeedChanged {
        /// New rate (1.0 = realtime).
        value: f32,
    },
    /// A seek completed.
    Seeked {
        /// Position rendering resumed at, in milliseconds.
        position_ms: u64,
    },
    /// Picture-in-picture presentation started.
    PipStarted,
    /// Picture-in-picture presentation stopped.
    PipStopped,
    /// The presentation moved into fullscreen.
    FullscreenEntered,
    /// The presentation returned to its inline container.
    FullscreenExited,
    /// The active subtitle track changed (`None` disables subtitles).
    SubtitleChanged {
        /// Identifier of the newly active track.
        track: Option<String>,
    },
}

impl ControlEvent {
    fn description(&self) -> &str {
        match self {
            ControlEvent::TimeUpdated { .. } => "Playback position updated",
            ControlEvent::QualityChanged { .. } => "Quality variant changed",
            ControlEvent::SpeedChanged { .. } => "Playback speed changed",
            ControlEvent::Seeked { .. } => "Seek completed",
            ControlEvent::PipStarted => "Picture-in-picture started",
            ControlEvent::PipStopped => "Picture-in-picture stopped",
            ControlEvent::FullscreenEntered => "Entered fullscreen",
            ControlEvent::FullscreenExited => "Exited fullscreen",
            ControlEvent::SubtitleChanged { .. } => "Subtitle track changed",
        }
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&SessionEvent) -> bool + Send + Sync>;

/// A wrapper around an adapter's event receiver with optional filtering.
///
/// The underlying channel is the adapter's private unbounded queue; a closed
/// stream (`recv` returning `None` after draining) means the adapter was
/// detached or its session torn down.
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<SessionEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter are returned by `recv`; the rest
    /// are silently skipped.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SessionEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// Returns `None` once the channel is closed and drained.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Some(event);
            };

            if filter(&event) {
                return Some(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently queued.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            let event = self.receiver.try_recv().ok()?;

            let Some(filter) = &self.filter else {
                return Some(event);
            };

            if filter(&event) {
                return Some(event);
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
