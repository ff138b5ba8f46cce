//! # View Adapters
//!
//! One adapter per UI surface. An adapter binds a host rendering surface to a
//! session's engine, dispatches commands through the registry, and receives
//! the session's event stream on a private channel. Its lifetime is
//! independent of the session: it is created when a UI surface mounts and
//! detached when the surface unmounts; detaching never releases the engine.

use crate::session::SessionId;
use bridge_engine::RenderSurface;
use core_runtime::events::{EventStream, SessionEvent};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Process-unique identifier for a view adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    /// Generate a fresh identifier.
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UI surface's binding into a session.
///
/// The adapter owns the receiving half of its event channel; the session
/// holds the sending half for as long as the adapter is attached. Once
/// detached, the channel closes: buffered events can still be drained, then
/// `recv` returns `None`.
pub struct ViewAdapter {
    view_id: ViewId,
    session_id: SessionId,
    surface: Arc<dyn RenderSurface>,
    receiver: Option<mpsc::UnboundedReceiver<SessionEvent>>,
}

impl ViewAdapter {
    pub(crate) fn new(
        view_id: ViewId,
        session_id: SessionId,
        surface: Arc<dyn RenderSurface>,
        receiver: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Self {
        Self {
            view_id,
            session_id,
            surface,
            receiver: Some(receiver),
        }
    }

    /// This adapter's identifier.
    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    /// The session this adapter is bound to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The (non-owning) surface binding.
    pub fn surface(&self) -> &Arc<dyn RenderSurface> {
        &self.surface
    }

    /// Receive the next event.
    ///
    /// The synthetic replay sequence is always delivered before any live
    /// event. Returns `None` once the adapter is detached and the channel is
    /// drained, or if the stream was taken with [`take_event_stream`].
    ///
    /// [`take_event_stream`]: ViewAdapter::take_event_stream
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.receiver.as_mut()?.recv().await
    }

    /// Receive the next event without blocking, if one is queued.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.receiver.as_mut()?.try_recv().ok()
    }

    /// Move the event channel into a filterable [`EventStream`].
    ///
    /// Returns `None` if the stream was already taken.
    pub fn take_event_stream(&mut self) -> Option<EventStream> {
        self.receiver.take().map(EventStream::new)
    }
}

impl fmt::Debug for ViewAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewAdapter")
            .field("view_id", &self.view_id)
            .field("session_id", &self.session_id)
            .field("surface_id", &self.surface.surface_id())
            .field("stream_taken", &self.receiver.is_none())
            .finish()
    }
}
