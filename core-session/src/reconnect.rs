//! # Defensive Surface Reconnection
//!
//! Host view systems recycle and re-parent rendering surfaces behind our
//! back: a sibling detaching, or a surface moving into a fullscreen
//! presentation, can silently invalidate another view's binding to the
//! shared engine. Rather than trying to detect which binding went stale, the
//! session re-asserts every remaining binding whenever the surface topology
//! changes. Rebinding is idempotent and emits no events, so over-rebinding
//! costs nothing observable.

use crate::attachment::AttachmentTracker;
use bridge_engine::PlaybackEngine;
use std::sync::Arc;
use tracing::warn;

/// Re-assert the surface binding of every attached view.
///
/// Caller holds the session lock, so no attach or detach can interleave with
/// the sweep. A failed rebind is logged and skipped; one degraded surface
/// must not strand its siblings.
pub(crate) fn rebind_all(tracker: &AttachmentTracker, engine: &Arc<dyn PlaybackEngine>) {
    for view in tracker.iter() {
        if let Err(error) = view.surface.rebind(engine) {
            warn!(
                view = %view.view_id,
                surface = view.surface.surface_id(),
                error = %error,
                "surface rebind failed"
            );
        }
    }
}
