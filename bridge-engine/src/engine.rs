//! Playback engine bridge traits and supporting types.
//!
//! These abstractions let the session core drive one platform decode/render
//! pipeline per session while staying ignorant of the platform's media stack.
//! Host applications provide concrete implementations that satisfy their
//! platform constraints (AVPlayer, ExoPlayer, a desktop GStreamer pipeline)
//! and adapt their native notification shapes into the single
//! [`EngineNotification`] union at this boundary.

use crate::error::Result;
use crate::quality::QualityVariant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Media Source
// ============================================================================

/// Locator handed to [`PlaybackEngine::load`].
///
/// The session core treats the locator as opaque; only the engine interprets
/// it. Headers travel alongside for authenticated streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Engine-interpreted locator (URL, asset id, file path).
    pub locator: String,
    /// HTTP headers to include when fetching remote media.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl MediaSource {
    /// Create a source from a bare locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            headers: HashMap::new(),
        }
    }

    /// Attach a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

// ============================================================================
// Ready State
// ============================================================================

/// How much of the loaded media the engine can currently render.
///
/// Mirrors the coarse readiness ladder most platform engines report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadyState {
    /// No media information is available yet.
    Nothing,
    /// Duration and dimensions are known; no frames decoded.
    Metadata,
    /// The current playback position can be rendered.
    CurrentData,
    /// Playback can proceed without an immediate stall.
    EnoughData,
}

// ============================================================================
// Notifications
// ============================================================================

/// Low-level state notification emitted by a platform engine.
///
/// Platform handlers translate their native callbacks into exactly these
/// variants; nothing platform-shaped crosses the session boundary. Variants
/// are observations, not commands: the engine reports what already happened,
/// regardless of who initiated it (an explicit command from the core or a
/// native system control such as a lock-screen button).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotification {
    /// Media finished loading. Duration is reported when the container
    /// declares one (live streams may not).
    Ready { duration: Option<Duration> },
    /// Playback transitioned into the playing state.
    Playing,
    /// Playback transitioned into the paused state.
    Paused,
    /// The engine entered (`active == true`) or left a buffering stall.
    Buffering { active: bool },
    /// A seek completed and rendering resumed at the new position.
    Seeked { position: Duration },
    /// Playback reached the end of the media.
    Ended,
    /// The engine failed; the session stays usable for a subsequent load.
    Failed { message: String },
    /// Picture-in-picture presentation started.
    PipStarted,
    /// Picture-in-picture presentation stopped.
    PipStopped,
    /// The OS moved the presentation into fullscreen.
    FullscreenEntered,
    /// The OS returned the presentation to its inline container.
    FullscreenExited,
    /// The active subtitle track changed (`None` disables subtitles).
    SubtitleChanged { track: Option<String> },
}

/// Capability for receiving engine notifications.
///
/// The session core registers exactly one observer per engine via
/// [`PlaybackEngine::set_observer`]. Implementations must tolerate being
/// called from any thread the platform delivers callbacks on; the callback
/// itself must not block.
pub trait EngineObserver: Send + Sync {
    /// Deliver one notification, in the order the engine observed it.
    fn on_notification(&self, notification: EngineNotification);
}

// ============================================================================
// Engine Handle
// ============================================================================

/// Opaque handle to one platform decode/render pipeline.
///
/// A handle is exclusively owned by its session: only the session calls
/// mutating operations, and the handle lives from first attach until explicit
/// session teardown, surviving transient windows where no view is attached.
///
/// ## Threading Model
///
/// Implementations must be `Send + Sync`; commands arrive from the session's
/// dispatch tasks while queries arrive from the position ticker.
///
/// ## Command Semantics
///
/// Commands are asynchronous from the session's perspective: issuing a
/// command returns once the engine accepted it, and the resulting state
/// change arrives later through [`EngineObserver`]. Implementations should
/// therefore keep command futures short-lived.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Load media into the pipeline, replacing any current media.
    ///
    /// Completion is signalled by [`EngineNotification::Ready`]; failure by
    /// [`EngineNotification::Failed`] or an error from this call.
    async fn load(&self, source: MediaSource) -> Result<()>;

    /// Begin or resume playback.
    async fn play(&self) -> Result<()>;

    /// Pause playback, preserving position.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Set output volume in `[0.0, 1.0]`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Set the playback rate (1.0 = realtime).
    async fn set_speed(&self, speed: f32) -> Result<()>;

    /// Switch to a specific quality rendition.
    async fn set_quality(&self, variant: &QualityVariant) -> Result<()>;

    /// List the selectable quality renditions of the loaded media.
    async fn available_qualities(&self) -> Result<Vec<QualityVariant>>;

    /// Current playback position.
    async fn current_position(&self) -> Result<Duration>;

    /// Total media duration, when known.
    async fn duration(&self) -> Result<Option<Duration>>;

    /// Furthest buffered position.
    async fn buffered_position(&self) -> Result<Duration>;

    /// Whether the engine is actively playing.
    async fn is_playing(&self) -> Result<bool>;

    /// Current readiness level.
    async fn ready_state(&self) -> Result<ReadyState>;

    /// Register the single notification observer for this engine.
    ///
    /// Re-registering replaces the previous observer.
    async fn set_observer(&self, observer: Arc<dyn EngineObserver>);

    /// Stop playback and release platform resources.
    ///
    /// Called exactly once, during session teardown. After shutdown every
    /// other operation may return [`BridgeError::EngineReleased`].
    ///
    /// [`BridgeError::EngineReleased`]: crate::error::BridgeError::EngineReleased
    async fn shutdown(&self);
}

// ============================================================================
// Engine Factory
// ============================================================================

/// Lazy constructor for [`PlaybackEngine`] instances.
///
/// The session registry holds one factory and invokes it at most once per
/// session, on the session's first attach. This keeps sessions cheap until a
/// surface actually needs video: looking a session up never allocates a
/// pipeline.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Construct a fresh engine for the session identified by `session_id`.
    async fn create(&self, session_id: &str) -> Result<Arc<dyn PlaybackEngine>>;
}
