//! # Event Synchronizer
//!
//! Two jobs, both about keeping observers honest without flooding them:
//!
//! 1. **Replay**: compute the minimal synthetic event sequence that brings a
//!    newly (re)attaching view adapter to the session's current observable
//!    state. The sequence is synthesized from [`LastKnownState`], never
//!    recorded history, so catch-up cost is O(1) no matter how long the
//!    engine has been running and stale transients are never resent.
//!
//! 2. **Buffering debounce**: a transition into buffering on the live stream
//!    is held for a quiet period before being emitted. Stalls that recover
//!    inside the quiet period produce no activity event at all; stalls that
//!    survive it produce exactly one `Buffering`, and recovery re-emits the
//!    *current* resting play/pause state. The hold is a cancellable
//!    scheduled task, never a blocking wait.
//!
//! The periodic `TimeUpdated` tick lives here too; it carries the engine's
//! live stall flag independent of the debounced activity channel, so a UI
//! can render "playing but currently stalled".

use crate::session::{Session, SessionInner};
use crate::state::{ActivityState, LastKnownState};
use bridge_engine::PlaybackEngine;
use core_runtime::events::{ActivityEvent, SessionEvent};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

// ============================================================================
// Replay
// ============================================================================

/// Synthesize the catch-up sequence for a view that just finished attaching.
///
/// A brand-new session replays `[Initializing]`. A session with history
/// replays at most one `Loaded` (when the duration is known) followed by
/// exactly one state snapshot, bounded regardless of how many transitions
/// the engine has been through.
pub(crate) fn replay_for(state: &LastKnownState) -> Vec<SessionEvent> {
    if matches!(state.activity, ActivityState::Initializing) {
        return vec![SessionEvent::Activity(ActivityEvent::Initializing)];
    }

    let mut events = Vec::with_capacity(2);
    if let Some(duration) = state.duration {
        events.push(SessionEvent::Activity(ActivityEvent::Loaded {
            duration_ms: duration.as_millis() as u64,
        }));
    }
    events.push(SessionEvent::Activity(snapshot_event(state)));
    events
}

/// The single activity event describing the session's state right now.
///
/// Buffering uses the debounced overlay, not the raw engine flag, so a
/// reattaching view and its already-attached siblings agree on what is
/// visible; a sub-threshold stall is invisible to both.
fn snapshot_event(state: &LastKnownState) -> ActivityEvent {
    if state.buffering_visible {
        return ActivityEvent::Buffering;
    }
    match state.activity {
        ActivityState::Playing => ActivityEvent::Playing,
        ActivityState::Paused | ActivityState::Loaded => ActivityEvent::Paused,
        ActivityState::Completed => ActivityEvent::Completed,
        ActivityState::Stopped => ActivityEvent::Stopped,
        ActivityState::Failed => ActivityEvent::Failed {
            message: state.last_failure.clone().unwrap_or_default(),
        },
        ActivityState::Idle | ActivityState::Loading => ActivityEvent::Idle,
        // Handled above; a brand-new session replays Initializing alone.
        ActivityState::Initializing => ActivityEvent::Initializing,
    }
}

// ============================================================================
// Buffering Debounce
// ============================================================================

/// Handle a raw engine buffering transition. Caller holds the session lock.
pub(crate) fn on_buffering_changed(session: &Arc<Session>, inner: &mut SessionInner, active: bool) {
    if active {
        inner.last_known.engine_buffering = true;

        // A repeat report while a timer is pending or the spinner is already
        // visible changes nothing; with neither in place it (re)arms the
        // quiet period.
        if inner.debounce_token.is_some() || inner.last_known.buffering_visible {
            return;
        }
        schedule_confirmation(session, inner);
    } else {
        if !inner.last_known.engine_buffering {
            return;
        }
        inner.last_known.engine_buffering = false;

        if let Some(token) = inner.debounce_token.take() {
            // Stall ended inside the quiet period: emit nothing at all.
            token.cancel();
            trace!(session = %session.id(), "buffering spell ended within debounce window");
            return;
        }

        if inner.last_known.buffering_visible {
            inner.last_known.buffering_visible = false;
            // Restore whichever resting state is current, which may differ
            // from the one that was interrupted.
            let restored = inner.last_known.resting.as_event();
            debug!(session = %session.id(), ?restored, "buffering recovered");
            inner.tracker.broadcast(SessionEvent::Activity(restored));
        }
    }
}

/// Arm the quiet-period timer for a fresh stall. Caller holds the lock.
fn schedule_confirmation(session: &Arc<Session>, inner: &mut SessionInner) {
    let token = CancellationToken::new();
    inner.debounce_generation += 1;
    let generation = inner.debounce_generation;
    inner.debounce_token = Some(token.clone());

    let quiet_period = session.config().buffering_debounce;
    let weak = Arc::downgrade(session);
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(quiet_period) => {
                if let Some(session) = weak.upgrade() {
                    session.confirm_buffering(generation);
                }
            }
        }
    });
}

// ============================================================================
// Position Ticker
// ============================================================================

/// Spawn the periodic `TimeUpdated` reporter for a freshly created engine.
///
/// The first report comes one full interval after engine creation, never at
/// creation itself. The task outlives individual adapters but not the
/// session: it stops when the token fires (teardown) or the session is
/// dropped. Ticks with zero attached views fold to nothing; engine query
/// failures skip the tick rather than surfacing an error.
pub(crate) fn spawn_position_ticker(
    session: Weak<Session>,
    engine: Arc<dyn PlaybackEngine>,
    token: CancellationToken,
    interval: Duration,
) {
    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(session) = session.upgrade() else {
                break;
            };
            if !session.wants_position_ticks() {
                continue;
            }

            let position = engine.current_position().await;
            let duration = engine.duration().await;
            let buffered = engine.buffered_position().await;
            if let (Ok(position), Ok(duration), Ok(buffered)) = (position, duration, buffered) {
                session.emit_time_update(position, duration, buffered);
            }
        }
    });
}
