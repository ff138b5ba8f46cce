//! # Shared Playback Session
//!
//! One session per logical video instance: exactly one engine, any number of
//! observing view adapters over its lifetime.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐ commands  ┌─────────────────────────────┐
//! │ View Adapter ├──────────>│           Session           │
//! └──────▲───────┘           │  ┌───────────────────────┐  │   commands   ┌─────────┐
//!        │                   │  │   AttachmentTracker   │  ├─────────────>│ Engine  │
//! ┌──────┴───────┐  events   │  ├───────────────────────┤  │<─────────────┤ Handle  │
//! │ View Adapter │<──────────┤  │   LastKnownState      │  │ notifications└─────────┘
//! └──────────────┘  fan-out  │  ├───────────────────────┤  │
//!                            │  │   Quality cache       │  │
//!                            └──┴───────────────────────┴──┘
//! ```
//!
//! ## Serialization Model
//!
//! Every mutation of a session's record (engine reference, attached set,
//! primary slot, last-known state) happens under one `parking_lot` mutex, so
//! attach, detach, election, and event fan-out on a given session are
//! mutually exclusive; a detach-triggered surface reconnection can never
//! race a concurrent attach. Different sessions are fully independent.
//!
//! Engine commands are issued on spawned tasks so `dispatch` returns
//! immediately; completion or failure arrives later as an event. Engine
//! notifications must therefore be delivered from within the host's tokio
//! runtime (every supported host adapter does this already).

use crate::adapter::{ViewAdapter, ViewId};
use crate::attachment::{AttachedView, AttachmentTracker};
use crate::command::SessionCommand;
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::state::{ActivityState, LastKnownState, RestingState};
use crate::{reconnect, synchronizer};
use bridge_engine::{
    BridgeError, EngineFactory, EngineNotification, EngineObserver, PlaybackEngine, QualityVariant,
    RenderSurface,
};
use core_runtime::events::{ActivityEvent, ControlEvent, SessionEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

// ============================================================================
// Session Identity
// ============================================================================

/// Opaque, caller-supplied identifier for a logical video instance.
///
/// Stable for the instance's lifetime; the registry never generates these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a caller-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Session Record
// ============================================================================

/// Mutable record guarded by the session lock.
pub(crate) struct SessionInner {
    /// Exclusively owned engine; `Some` from first attach until teardown.
    pub engine: Option<Arc<dyn PlaybackEngine>>,
    /// Ordered attached views plus the primary slot.
    pub tracker: AttachmentTracker,
    /// Last computed observable state, the source replay is synthesized from.
    pub last_known: LastKnownState,
    /// Quality variants fetched once per session; survives attach/detach
    /// churn, cleared only on teardown.
    pub quality_cache: Option<Vec<QualityVariant>>,
    /// The view whose play command is awaiting its `Playing` transition.
    pub play_origin: Option<ViewId>,
    /// Cancellation for the pending buffering quiet-period task.
    pub debounce_token: Option<CancellationToken>,
    /// Guards a stale quiet-period task against a newer stall's slot.
    pub debounce_generation: u64,
    /// Cancellation for the position ticker task.
    pub ticker_token: Option<CancellationToken>,
    /// Set exactly once, by explicit teardown.
    pub torn_down: bool,
}

impl SessionInner {
    fn cancel_debounce(&mut self) {
        if let Some(token) = self.debounce_token.take() {
            token.cancel();
        }
    }
}

/// One shared playback session.
///
/// Created only through [`SessionRegistry::get_or_create`]; the engine is
/// materialized lazily on the first attach and survives transient
/// zero-attachment windows caused by navigation. Only explicit disposal
/// through the registry releases it.
///
/// [`SessionRegistry::get_or_create`]: crate::registry::SessionRegistry::get_or_create
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    factory: Arc<dyn EngineFactory>,
    /// Serializes engine materialization so concurrent first attaches cannot
    /// create two engines.
    init_lock: tokio::sync::Mutex<()>,
    inner: Mutex<SessionInner>,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        config: SessionConfig,
        factory: Arc<dyn EngineFactory>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            config,
            factory,
            init_lock: tokio::sync::Mutex::new(()),
            inner: Mutex::new(SessionInner {
                engine: None,
                tracker: AttachmentTracker::default(),
                last_known: LastKnownState::default(),
                quality_cache: None,
                play_origin: None,
                debounce_token: None,
                debounce_generation: 0,
                ticker_token: None,
                torn_down: false,
            }),
        })
    }

    /// This session's identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The configuration this session runs with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ========================================================================
    // Attachment
    // ========================================================================

    /// Attach a new view, materializing the engine if this is the first
    /// attach ever, and deliver the synthetic replay sequence before any
    /// live event can reach the new adapter.
    #[instrument(skip(self, surface), fields(session = %self.id))]
    pub(crate) async fn attach(self: &Arc<Self>, surface: Arc<dyn RenderSurface>) -> Result<ViewAdapter> {
        {
            let _init = self.init_lock.lock().await;
            let needs_engine = {
                let inner = self.inner.lock();
                if inner.torn_down {
                    return Err(SessionError::UnknownSession(self.id.clone()));
                }
                inner.engine.is_none()
            };
            if needs_engine {
                let engine = self.factory.create(self.id.as_str()).await?;
                engine
                    .set_observer(Arc::new(SessionObserver {
                        session: Arc::downgrade(self),
                    }))
                    .await;
                let ticker_token = CancellationToken::new();
                {
                    let mut inner = self.inner.lock();
                    inner.engine = Some(Arc::clone(&engine));
                    inner.last_known.activity = ActivityState::Initializing;
                    inner.ticker_token = Some(ticker_token.clone());
                }
                synchronizer::spawn_position_ticker(
                    Arc::downgrade(self),
                    engine,
                    ticker_token,
                    self.config.position_update_interval,
                );
                debug!("engine materialized on first attach");
            }
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let view_id = ViewId::generate();
        {
            let mut inner = self.inner.lock();
            if inner.torn_down {
                return Err(SessionError::UnknownSession(self.id.clone()));
            }
            let replay = synchronizer::replay_for(&inner.last_known);
            for event in replay {
                let _ = sender.send(event);
            }
            inner.tracker.attach(AttachedView {
                view_id,
                sender,
                surface: Arc::clone(&surface),
            });
            debug!(view = %view_id, attached = inner.tracker.len(), "view attached");
        }

        Ok(ViewAdapter::new(view_id, self.id.clone(), surface, receiver))
    }

    /// Detach one view.
    ///
    /// Removes the view from all future dispatch (its channel closes) and
    /// defensively rebinds every remaining surface to the unchanged engine;
    /// no event is emitted. A pending buffering debounce keeps running even
    /// when the last view leaves: its confirmation then only updates state,
    /// so a later reattach replays the stall instead of a stale play state.
    pub(crate) fn detach(&self, view_id: ViewId) {
        let mut inner = self.inner.lock();
        if inner.tracker.detach(view_id).is_none() {
            return;
        }
        debug!(session = %self.id, view = %view_id, remaining = inner.tracker.len(), "view detached");
        if !inner.tracker.is_empty() {
            if let Some(engine) = inner.engine.clone() {
                reconnect::rebind_all(&inner.tracker, &engine);
            }
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Validate and issue a command on behalf of `view_id`.
    ///
    /// Returns once the command is handed to the engine task; the resulting
    /// transition (or failure, coerced to a `Failed` event) arrives on every
    /// attached adapter's stream.
    pub(crate) fn dispatch(self: &Arc<Self>, view_id: ViewId, command: SessionCommand) -> Result<()> {
        match &command {
            SessionCommand::SetVolume { value } if !(0.0..=1.0).contains(value) => {
                return Err(SessionError::InvalidVolume(*value));
            }
            SessionCommand::SetSpeed { value } if !(0.25..=4.0).contains(value) => {
                return Err(SessionError::InvalidSpeed(*value));
            }
            _ => {}
        }

        let engine = {
            let mut inner = self.inner.lock();
            if inner.torn_down {
                return Err(SessionError::UnknownSession(self.id.clone()));
            }
            if !inner.tracker.contains(view_id) {
                return Err(SessionError::AdapterDetached(view_id));
            }
            let engine = inner
                .engine
                .clone()
                .ok_or_else(|| SessionError::NoEngineAvailable(self.id.clone()))?;

            match &command {
                SessionCommand::Play => {
                    inner.play_origin = Some(view_id);
                }
                SessionCommand::Load { .. } => {
                    inner.last_known.activity = ActivityState::Loading;
                    inner.last_known.duration = None;
                    inner.last_known.clear_buffering();
                    inner.cancel_debounce();
                    inner
                        .tracker
                        .broadcast(SessionEvent::Activity(ActivityEvent::Loading));
                }
                SessionCommand::EnterFullscreen => {
                    reconnect::rebind_all(&inner.tracker, &engine);
                    inner
                        .tracker
                        .broadcast(SessionEvent::Control(ControlEvent::FullscreenEntered));
                }
                SessionCommand::ExitFullscreen => {
                    reconnect::rebind_all(&inner.tracker, &engine);
                    inner
                        .tracker
                        .broadcast(SessionEvent::Control(ControlEvent::FullscreenExited));
                }
                _ => {}
            }
            engine
        };

        trace!(session = %self.id, view = %view_id, command = command.name(), "dispatching");

        let session = Arc::downgrade(self);
        tokio::spawn(async move {
            let outcome = match command {
                SessionCommand::Load { source } => engine.load(source).await,
                SessionCommand::Play => engine.play().await,
                SessionCommand::Pause => engine.pause().await,
                SessionCommand::Seek { position } => engine.seek(position).await,
                SessionCommand::SetVolume { value } => engine.set_volume(value).await,
                SessionCommand::SetSpeed { value } => match engine.set_speed(value).await {
                    Ok(()) => {
                        if let Some(session) = session.upgrade() {
                            session.emit_control(ControlEvent::SpeedChanged { value });
                        }
                        Ok(())
                    }
                    Err(error) => Err(error),
                },
                SessionCommand::SetQuality { variant } => {
                    match engine.set_quality(&variant).await {
                        Ok(()) => {
                            if let Some(session) = session.upgrade() {
                                session.emit_control(ControlEvent::QualityChanged { variant });
                            }
                            Ok(())
                        }
                        Err(error) => Err(error),
                    }
                }
                // Presentation-only: the rebind already happened above.
                SessionCommand::EnterFullscreen | SessionCommand::ExitFullscreen => Ok(()),
            };
            if let Err(error) = outcome {
                if let Some(session) = session.upgrade() {
                    session.report_engine_failure(error);
                }
            }
        });

        Ok(())
    }

    /// Quality variants for the loaded media, served from the session cache
    /// when possible. The cache survives every attach/detach cycle.
    pub(crate) async fn qualities(&self, view_id: ViewId) -> Result<Vec<QualityVariant>> {
        let engine = {
            let inner = self.inner.lock();
            if inner.torn_down {
                return Err(SessionError::UnknownSession(self.id.clone()));
            }
            if !inner.tracker.contains(view_id) {
                return Err(SessionError::AdapterDetached(view_id));
            }
            if let Some(cache) = &inner.quality_cache {
                return Ok(cache.clone());
            }
            inner
                .engine
                .clone()
                .ok_or_else(|| SessionError::NoEngineAvailable(self.id.clone()))?
        };

        let fetched = engine.available_qualities().await?;
        let mut inner = self.inner.lock();
        if !inner.torn_down {
            inner.quality_cache = Some(fetched.clone());
        }
        Ok(fetched)
    }

    // ========================================================================
    // Engine Notifications
    // ========================================================================

    /// Apply one engine notification to the state machine and fan the
    /// resulting event out to every attached view.
    pub(crate) fn handle_notification(self: &Arc<Self>, notification: EngineNotification) {
        let mut inner = self.inner.lock();
        if inner.torn_down {
            return;
        }
        trace!(session = %self.id, ?notification, "engine notification");

        match notification {
            EngineNotification::Ready { duration } => {
                inner.last_known.duration = duration;
                inner.last_known.activity = ActivityState::Loaded;
                inner.last_known.resting = RestingState::Paused;
                inner.last_known.clear_buffering();
                inner.cancel_debounce();
                if let Some(duration) = duration {
                    inner.tracker.broadcast(SessionEvent::Activity(ActivityEvent::Loaded {
                        duration_ms: duration.as_millis() as u64,
                    }));
                }
            }
            EngineNotification::Playing => {
                inner.last_known.resting = RestingState::Playing;
                if inner.last_known.activity != ActivityState::Playing {
                    inner.last_known.activity = ActivityState::Playing;
                    // Election runs exactly once per transition into playing,
                    // no matter who initiated it.
                    let origin = inner.play_origin.take();
                    if let Some(elected) = inner.tracker.elect_primary(origin) {
                        debug!(session = %self.id, primary = %elected, "primary view elected");
                    }
                    if !inner.last_known.buffering_visible {
                        inner
                            .tracker
                            .broadcast(SessionEvent::Activity(ActivityEvent::Playing));
                    }
                }
            }
            EngineNotification::Paused => {
                inner.last_known.resting = RestingState::Paused;
                if inner.last_known.activity != ActivityState::Paused {
                    inner.last_known.activity = ActivityState::Paused;
                    if !inner.last_known.buffering_visible {
                        inner
                            .tracker
                            .broadcast(SessionEvent::Activity(ActivityEvent::Paused));
                    }
                }
            }
            EngineNotification::Buffering { active } => {
                synchronizer::on_buffering_changed(self, &mut inner, active);
            }
            EngineNotification::Seeked { position } => {
                // Seeking does not move the activity machine: a seek while
                // paused must not be reported as entering playing.
                inner.tracker.broadcast(SessionEvent::Control(ControlEvent::Seeked {
                    position_ms: position.as_millis() as u64,
                }));
            }
            EngineNotification::Ended => {
                inner.last_known.activity = ActivityState::Completed;
                inner.last_known.resting = RestingState::Paused;
                inner.last_known.clear_buffering();
                inner.cancel_debounce();
                inner
                    .tracker
                    .broadcast(SessionEvent::Activity(ActivityEvent::Completed));
            }
            EngineNotification::Failed { message } => {
                self.apply_failure(&mut inner, message);
            }
            EngineNotification::PipStarted => {
                inner
                    .tracker
                    .broadcast(SessionEvent::Control(ControlEvent::PipStarted));
            }
            EngineNotification::PipStopped => {
                inner
                    .tracker
                    .broadcast(SessionEvent::Control(ControlEvent::PipStopped));
            }
            EngineNotification::FullscreenEntered => {
                if let Some(engine) = inner.engine.clone() {
                    reconnect::rebind_all(&inner.tracker, &engine);
                }
                inner
                    .tracker
                    .broadcast(SessionEvent::Control(ControlEvent::FullscreenEntered));
            }
            EngineNotification::FullscreenExited => {
                if let Some(engine) = inner.engine.clone() {
                    reconnect::rebind_all(&inner.tracker, &engine);
                }
                inner
                    .tracker
                    .broadcast(SessionEvent::Control(ControlEvent::FullscreenExited));
            }
            EngineNotification::SubtitleChanged { track } => {
                inner
                    .tracker
                    .broadcast(SessionEvent::Control(ControlEvent::SubtitleChanged { track }));
            }
        }
    }

    /// Coerce an asynchronous engine failure into a `Failed` event so one
    /// view's fault cannot crash siblings sharing the session. The session
    /// remains usable for a subsequent load.
    pub(crate) fn report_engine_failure(&self, error: BridgeError) {
        warn!(session = %self.id, error = %error, "engine command failed");
        let mut inner = self.inner.lock();
        if inner.torn_down {
            return;
        }
        self.apply_failure(&mut inner, error.to_string());
    }

    fn apply_failure(&self, inner: &mut SessionInner, message: String) {
        inner.last_known.activity = ActivityState::Failed;
        inner.last_known.last_failure = Some(message.clone());
        inner.last_known.clear_buffering();
        inner.cancel_debounce();
        inner
            .tracker
            .broadcast(SessionEvent::Activity(ActivityEvent::Failed { message }));
    }

    // ========================================================================
    // Synchronizer Callbacks
    // ========================================================================

    /// The quiet period elapsed while still stalling: make buffering visible.
    pub(crate) fn confirm_buffering(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.torn_down || inner.debounce_generation != generation {
            return;
        }
        inner.debounce_token = None;
        if !inner.last_known.engine_buffering {
            // Recovered in the race window between timer fire and this lock.
            return;
        }
        inner.last_known.buffering_visible = true;
        debug!(session = %self.id, "buffering stall outlived quiet period");
        inner
            .tracker
            .broadcast(SessionEvent::Activity(ActivityEvent::Buffering));
    }

    /// Whether the position ticker has anyone to report to.
    pub(crate) fn wants_position_ticks(&self) -> bool {
        let inner = self.inner.lock();
        !inner.torn_down && !inner.tracker.is_empty() && inner.engine.is_some()
    }

    /// Fan out one periodic position report.
    pub(crate) fn emit_time_update(
        &self,
        position: Duration,
        duration: Option<Duration>,
        buffered: Duration,
    ) {
        let inner = self.inner.lock();
        if inner.torn_down {
            return;
        }
        inner.tracker.broadcast(SessionEvent::Control(ControlEvent::TimeUpdated {
            position_ms: position.as_millis() as u64,
            duration_ms: duration.map(|d| d.as_millis() as u64),
            buffered_position_ms: buffered.as_millis() as u64,
            is_buffering: inner.last_known.engine_buffering,
        }));
    }

    /// Fan out a control event produced by a completed command.
    pub(crate) fn emit_control(&self, event: ControlEvent) {
        let inner = self.inner.lock();
        if inner.torn_down {
            return;
        }
        inner.tracker.broadcast(SessionEvent::Control(event));
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Mark the session stopped and strip it of its engine.
    ///
    /// Emits the terminal `Stopped` event, closes every adapter channel,
    /// clears the quality cache, and returns the engine (if any) so the
    /// registry can shut it down outside the lock. Idempotent.
    pub(crate) fn begin_teardown(&self) -> Option<Arc<dyn PlaybackEngine>> {
        let mut inner = self.inner.lock();
        if inner.torn_down {
            return None;
        }
        inner.torn_down = true;
        inner.cancel_debounce();
        if let Some(token) = inner.ticker_token.take() {
            token.cancel();
        }
        inner.last_known.activity = ActivityState::Stopped;
        inner.last_known.clear_buffering();
        inner
            .tracker
            .broadcast(SessionEvent::Activity(ActivityEvent::Stopped));
        inner.tracker.clear();
        inner.quality_cache = None;
        inner.engine.take()
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// The view currently authorized to trigger automatic picture-in-picture.
    pub fn primary_view(&self) -> Option<ViewId> {
        self.inner.lock().tracker.primary()
    }

    /// Whether `view_id` is the current primary (always computed, never stored
    /// on the adapter).
    pub fn is_primary(&self, view_id: ViewId) -> bool {
        self.inner.lock().tracker.is_primary(view_id)
    }

    /// Number of currently attached views.
    pub fn attached_count(&self) -> usize {
        self.inner.lock().tracker.len()
    }

    /// Whether the engine has been materialized and not yet released.
    pub fn has_engine(&self) -> bool {
        self.inner.lock().engine.is_some()
    }

    /// Current logical activity state.
    pub fn activity(&self) -> ActivityState {
        self.inner.lock().last_known.activity
    }

    /// Media duration, once known.
    pub fn duration(&self) -> Option<Duration> {
        self.inner.lock().last_known.duration
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("attached", &inner.tracker.len())
            .field("has_engine", &inner.engine.is_some())
            .field("activity", &inner.last_known.activity)
            .field("torn_down", &inner.torn_down)
            .finish()
    }
}

// ============================================================================
// Engine Observer
// ============================================================================

/// Bridges engine notifications into the session without keeping it alive.
struct SessionObserver {
    session: Weak<Session>,
}

impl EngineObserver for SessionObserver {
    fn on_notification(&self, notification: EngineNotification) {
        if let Some(session) = self.session.upgrade() {
            session.handle_notification(notification);
        }
    }
}
