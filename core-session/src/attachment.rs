//! # Attachment Tracking & Primary-View Election
//!
//! Tracks the ordered set of currently attached view adapters for one
//! session and elects the **primary view**: the single adapter authorized to
//! trigger automatic side effects such as auto picture-in-picture.
//!
//! Election rule: the most recent view to begin playback becomes primary,
//! unconditionally displacing any previous primary. The rule applies
//! identically whether playback was started through a dispatched command or
//! by a native platform control the core did not initiate. Primary status is
//! earned only by starting playback; detaching the primary clears the slot
//! without transferring it.

use crate::adapter::ViewId;
use bridge_engine::RenderSurface;
use core_runtime::events::SessionEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One attached view's bookkeeping inside a session.
pub(crate) struct AttachedView {
    pub view_id: ViewId,
    /// Sending half of the adapter's private event channel.
    pub sender: mpsc::UnboundedSender<SessionEvent>,
    /// Non-owning surface binding, rebound on sibling detach.
    pub surface: Arc<dyn RenderSurface>,
}

/// Ordered set of attached views plus the primary-view slot.
///
/// Insertion order is attach order; "most recently attached" tie-breaks use
/// the back of the vector. The primary slot stores an identifier only, never
/// an owning reference, so a detached view can neither be kept alive nor
/// mistaken for primary after removal.
#[derive(Default)]
pub(crate) struct AttachmentTracker {
    views: Vec<AttachedView>,
    primary: Option<ViewId>,
}

impl AttachmentTracker {
    /// Append a view to the attached set.
    pub fn attach(&mut self, view: AttachedView) {
        debug_assert!(!self.contains(view.view_id));
        self.views.push(view);
    }

    /// Remove a view. Clears the primary slot if the removed view held it,
    /// and always clears it once the set becomes empty (a session with zero
    /// views never retains a stale primary).
    pub fn detach(&mut self, view_id: ViewId) -> Option<AttachedView> {
        let index = self.views.iter().position(|v| v.view_id == view_id)?;
        let removed = self.views.remove(index);
        if self.primary == Some(view_id) || self.views.is_empty() {
            self.primary = None;
        }
        Some(removed)
    }

    /// Run primary election for a transition into the playing state.
    ///
    /// `origin` is the view that dispatched the play command, when there was
    /// one; playback started by a native control has no origin and falls
    /// back to the most recently attached view. Returns the elected view.
    pub fn elect_primary(&mut self, origin: Option<ViewId>) -> Option<ViewId> {
        let elected = origin
            .filter(|id| self.contains(*id))
            .or_else(|| self.views.last().map(|v| v.view_id));
        self.primary = elected;
        elected
    }

    /// The current primary view, if any.
    pub fn primary(&self) -> Option<ViewId> {
        self.primary
    }

    /// Whether `view_id` currently holds primary status.
    pub fn is_primary(&self, view_id: ViewId) -> bool {
        self.primary == Some(view_id)
    }

    /// Whether `view_id` is attached.
    pub fn contains(&self, view_id: ViewId) -> bool {
        self.views.iter().any(|v| v.view_id == view_id)
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Iterate attached views in attach order.
    pub fn iter(&self) -> impl Iterator<Item = &AttachedView> {
        self.views.iter()
    }

    /// Send `event` to every attached view.
    ///
    /// With zero views attached this folds to a no-op; a closed receiver
    /// (adapter dropped without detaching) is ignored.
    pub fn broadcast(&self, event: SessionEvent) {
        for view in &self.views {
            let _ = view.sender.send(event.clone());
        }
    }

    /// Drop every view and the primary slot; used only by teardown.
    pub fn clear(&mut self) {
        self.views.clear();
        self.primary = None;
    }
}
