//! Commands a view adapter can dispatch to its session.

use bridge_engine::{MediaSource, QualityVariant};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A playback command, dispatched on behalf of one view adapter.
///
/// Dispatch is asynchronous from the caller's perspective: the session
/// validates the command, issues it to the engine, and returns immediately;
/// completion or failure arrives later as an event on every attached
/// adapter's stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum SessionCommand {
    /// Load media, replacing whatever is currently loaded.
    Load { source: MediaSource },
    /// Begin or resume playback. The dispatching view becomes the election
    /// origin for the resulting transition into the playing state.
    Play,
    /// Pause playback.
    Pause,
    /// Seek to an absolute position. Seeking while paused stays paused.
    Seek { position: Duration },
    /// Set output volume in `[0.0, 1.0]`.
    SetVolume { value: f32 },
    /// Set playback rate in `[0.25, 4.0]`.
    SetSpeed { value: f32 },
    /// Switch quality rendition.
    SetQuality { variant: QualityVariant },
    /// The host relocated this view's surface into a fullscreen
    /// presentation; rebind every surface defensively.
    EnterFullscreen,
    /// The host returned this view's surface to its inline container.
    ExitFullscreen,
}

impl SessionCommand {
    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Load { .. } => "load",
            SessionCommand::Play => "play",
            SessionCommand::Pause => "pause",
            SessionCommand::Seek { .. } => "seek",
            SessionCommand::SetVolume { .. } => "set_volume",
            SessionCommand::SetSpeed { .. } => "set_speed",
            SessionCommand::SetQuality { .. } => "set_quality",
            SessionCommand::EnterFullscreen => "enter_fullscreen",
            SessionCommand::ExitFullscreen => "exit_fullscreen",
        }
    }
}
