//! # Session Registry
//!
//! Process-wide map from session identifier to its single [`Session`]. The
//! registry is the only entry point for hosts: it creates sessions on
//! demand, routes adapter operations to the owning session, and is the only
//! component allowed to release an engine.
//!
//! ## Lifecycle
//!
//! ```text
//! attach(id, surface) ──> get_or_create ──> Session::attach
//!                                              │ first attach
//!                                              ▼
//!                                        factory.create(id)
//!
//! teardown(id) ──> remove from map ──> Session::begin_teardown ──> engine.shutdown
//! ```
//!
//! Detaching the last view does NOT tear the session down; the engine idles
//! with full state until another view attaches or the host disposes the
//! session explicitly.

use crate::adapter::ViewAdapter;
use crate::command::SessionCommand;
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::session::{Session, SessionId};
use bridge_engine::{EngineFactory, QualityVariant, RenderSurface};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Registry of live sessions, keyed by caller-supplied identifier.
///
/// Cheap to share: hosts typically hold one `Arc<SessionRegistry>` for the
/// process. All per-session work happens under that session's own lock; the
/// registry lock only guards the map.
pub struct SessionRegistry {
    config: SessionConfig,
    factory: Arc<dyn EngineFactory>,
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create a registry with the given engine factory and configuration.
    pub fn new(factory: Arc<dyn EngineFactory>, config: SessionConfig) -> Result<Self> {
        config.validate().map_err(SessionError::Internal)?;
        Ok(Self {
            config,
            factory,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Create a registry with default timing.
    pub fn with_default_config(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            config: SessionConfig::default(),
            factory,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the session for `id`, creating its record if this is the first
    /// reference. No engine exists until the first view attaches.
    pub fn get_or_create(&self, id: impl Into<SessionId>) -> Arc<Session> {
        let id = id.into();
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get(&id) {
            return Arc::clone(session);
        }
        debug!(session = %id, "session record created");
        let session = Session::new(id.clone(), self.config.clone(), Arc::clone(&self.factory));
        sessions.insert(id, Arc::clone(&session));
        session
    }

    /// Look up an existing session without creating one.
    pub fn session(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.lock().get(id).map(Arc::clone)
    }

    /// Attach a new view to the session for `id`, creating both the session
    /// record and (on the very first attach) the engine as needed. The
    /// returned adapter's stream begins with the synthetic replay sequence.
    pub async fn attach(
        &self,
        id: impl Into<SessionId>,
        surface: Arc<dyn RenderSurface>,
    ) -> Result<ViewAdapter> {
        self.get_or_create(id).attach(surface).await
    }

    /// Detach an adapter from its session.
    ///
    /// The session, its engine, and all playback state survive; remaining
    /// sibling surfaces are defensively rebound. Detaching an adapter whose
    /// session is already gone is a no-op.
    pub fn detach(&self, adapter: &ViewAdapter) {
        if let Some(session) = self.session(adapter.session_id()) {
            session.detach(adapter.view_id());
        }
    }

    /// Detach and consume an adapter in one step, for hosts whose view
    /// teardown hands the adapter over by value.
    pub fn release_resources(&self, adapter: ViewAdapter) {
        self.detach(&adapter);
    }

    /// Dispatch a command on behalf of `adapter`.
    pub fn dispatch(&self, adapter: &ViewAdapter, command: SessionCommand) -> Result<()> {
        let session = self
            .session(adapter.session_id())
            .ok_or_else(|| SessionError::UnknownSession(adapter.session_id().clone()))?;
        session.dispatch(adapter.view_id(), command)
    }

    /// Quality variants for `adapter`'s session, fetched from the engine at
    /// most once per session lifetime.
    pub async fn qualities(&self, adapter: &ViewAdapter) -> Result<Vec<QualityVariant>> {
        let session = self
            .session(adapter.session_id())
            .ok_or_else(|| SessionError::UnknownSession(adapter.session_id().clone()))?;
        session.qualities(adapter.view_id()).await
    }

    /// Dispose of a session completely: emit the terminal `Stopped` event,
    /// close every adapter stream, and shut the engine down.
    ///
    /// This is the only path that releases an engine. Idempotent; tearing
    /// down an unknown identifier is a no-op.
    #[instrument(skip(self), fields(session = %id))]
    pub async fn teardown(&self, id: &SessionId) {
        let session = self.sessions.lock().remove(id);
        let Some(session) = session else {
            return;
        };
        if let Some(engine) = session.begin_teardown() {
            engine.shutdown().await;
        }
        info!("session torn down");
    }

    /// Number of live session records.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.lock().len())
            .finish()
    }
}
