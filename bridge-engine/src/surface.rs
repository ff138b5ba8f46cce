//! Rendering surface bindings.

use crate::engine::PlaybackEngine;
use crate::error::Result;
use std::sync::Arc;

/// Non-owning binding between a host UI surface and a playback engine.
///
/// The host framework owns the surface; the session core only ever asks the
/// binding to (re)point itself at an engine. On several platforms removing
/// one observer's surface can silently sever the render target of a sibling
/// sharing the same engine, so the session re-runs `rebind` on every
/// remaining surface after each detach and after fullscreen relocation.
///
/// `rebind` is synchronous on purpose: the session invokes it inside its
/// per-session critical section, and a binding swap must not suspend.
/// Implementations must make it idempotent; rebinding to the engine a
/// surface is already bound to is a no-op.
pub trait RenderSurface: Send + Sync {
    /// Stable identifier for diagnostics.
    fn surface_id(&self) -> &str;

    /// Point this surface's render target at `engine`.
    fn rebind(&self, engine: &Arc<dyn PlaybackEngine>) -> Result<()>;
}
