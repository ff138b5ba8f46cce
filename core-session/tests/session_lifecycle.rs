//! Session lifecycle integration tests: engine sharing, attach/detach
//! independence, primary-view election, reconnection sweeps, and teardown.

mod common;

use common::{drain, registry_from, settle, FakeFactory, RecordingSurface};
use core_runtime::events::{ActivityEvent, ControlEvent, SessionEvent};
use core_session::{
    ActivityState, SessionCommand, SessionConfig, SessionError, SessionId, SessionRegistry,
};
use bridge_engine::{EngineNotification, MediaSource};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn registry_with(factory: Arc<FakeFactory>) -> SessionRegistry {
    // Park the position ticker far away; these tests assert on discrete
    // transitions, not time reports.
    let config = SessionConfig {
        position_update_interval: Duration::from_secs(3600),
        ..Default::default()
    };
    registry_from(factory, config)
}

fn activities(events: Vec<SessionEvent>) -> Vec<ActivityEvent> {
    events
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::Activity(a) => Some(a),
            SessionEvent::Control(_) => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn first_attach_creates_engine_and_replays_initializing() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let mut adapter = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();

    assert_eq!(factory.created(), 1);
    assert_eq!(
        adapter.recv().await,
        Some(SessionEvent::Activity(ActivityEvent::Initializing))
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_first_attaches_share_one_engine() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let (a, b) = tokio::join!(
        registry.attach("video-1", RecordingSurface::new("a")),
        registry.attach("video-1", RecordingSurface::new("b")),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(factory.created(), 1);
    assert_eq!(registry.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn views_share_engine_and_reattach_catches_up() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let mut a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    drain(&mut a);
    let engine = factory.last_engine();

    registry
        .dispatch(
            &a,
            SessionCommand::Load {
                source: MediaSource::new("https://cdn.example.com/clip.m3u8"),
            },
        )
        .unwrap();
    settle().await;
    engine.notify(EngineNotification::Ready {
        duration: Some(Duration::from_secs(120)),
    });
    registry.dispatch(&a, SessionCommand::Play).unwrap();
    settle().await;
    engine.notify(EngineNotification::Playing);

    assert_eq!(
        activities(drain(&mut a)),
        vec![
            ActivityEvent::Loading,
            ActivityEvent::Loaded { duration_ms: 120_000 },
            ActivityEvent::Playing,
        ]
    );
    assert_eq!(engine.command_log(), vec!["load", "play"]);

    // A second view attaching mid-playback gets the synthesized catch-up,
    // not the full history, and no second engine.
    let mut b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    assert_eq!(factory.created(), 1);
    assert_eq!(
        activities(drain(&mut b)),
        vec![
            ActivityEvent::Loaded { duration_ms: 120_000 },
            ActivityEvent::Playing,
        ]
    );

    // Live events now reach both.
    engine.notify(EngineNotification::Paused);
    assert_eq!(activities(drain(&mut a)), vec![ActivityEvent::Paused]);
    assert_eq!(activities(drain(&mut b)), vec![ActivityEvent::Paused]);
}

#[tokio::test(start_paused = true)]
async fn detaching_last_view_keeps_engine_and_state() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let engine = factory.last_engine();
    engine.notify(EngineNotification::Ready {
        duration: Some(Duration::from_secs(60)),
    });
    engine.notify(EngineNotification::Playing);

    let session = registry.session(&SessionId::new("video-1")).unwrap();
    registry.detach(&a);
    assert_eq!(session.attached_count(), 0);
    assert!(session.has_engine());
    assert_eq!(session.activity(), ActivityState::Playing);
    assert_eq!(engine.shutdown_calls.load(Ordering::SeqCst), 0);

    // Reattaching resumes observation of the still-running playback.
    let mut b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    assert_eq!(factory.created(), 1);
    assert_eq!(
        activities(drain(&mut b)),
        vec![
            ActivityEvent::Loaded { duration_ms: 60_000 },
            ActivityEvent::Playing,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn detach_rebinds_remaining_surfaces() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let surface_b = RecordingSurface::new("b");
    let surface_c = RecordingSurface::new("c");
    let a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let _b = registry
        .attach("video-1", surface_b.clone())
        .await
        .unwrap();
    let _c = registry
        .attach("video-1", surface_c.clone())
        .await
        .unwrap();

    // Sibling failure must not strand the others.
    surface_b.fail_rebind.store(true, Ordering::SeqCst);
    registry.detach(&a);

    assert_eq!(surface_b.rebinds(), 1);
    assert_eq!(surface_c.rebinds(), 1);
}

#[tokio::test(start_paused = true)]
async fn fullscreen_relocation_rebinds_and_emits_control_event() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let surface_a = RecordingSurface::new("a");
    let surface_b = RecordingSurface::new("b");
    let mut a = registry
        .attach("video-1", surface_a.clone())
        .await
        .unwrap();
    let mut b = registry
        .attach("video-1", surface_b.clone())
        .await
        .unwrap();
    drain(&mut a);
    drain(&mut b);

    registry.dispatch(&a, SessionCommand::EnterFullscreen).unwrap();
    settle().await;

    assert_eq!(surface_a.rebinds(), 1);
    assert_eq!(surface_b.rebinds(), 1);
    assert_eq!(
        drain(&mut b),
        vec![SessionEvent::Control(ControlEvent::FullscreenEntered)]
    );
    // Presentation moves never reach the engine.
    assert!(factory.last_engine().command_log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn play_origin_wins_primary_election() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    let engine = factory.last_engine();
    let session = registry.session(&SessionId::new("video-1")).unwrap();

    registry.dispatch(&a, SessionCommand::Play).unwrap();
    engine.notify(EngineNotification::Playing);
    assert!(session.is_primary(a.view_id()));

    // The most recent view to start playback takes over unconditionally.
    engine.notify(EngineNotification::Paused);
    registry.dispatch(&b, SessionCommand::Play).unwrap();
    engine.notify(EngineNotification::Playing);
    assert!(session.is_primary(b.view_id()));
    assert!(!session.is_primary(a.view_id()));
}

#[tokio::test(start_paused = true)]
async fn native_playback_start_elects_most_recently_attached() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let _a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    let engine = factory.last_engine();
    let session = registry.session(&SessionId::new("video-1")).unwrap();

    // Playback started by a lock-screen control: no dispatching view.
    engine.notify(EngineNotification::Playing);
    assert_eq!(session.primary_view(), Some(b.view_id()));
}

#[tokio::test(start_paused = true)]
async fn detaching_primary_clears_without_transfer() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let _b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    let engine = factory.last_engine();
    let session = registry.session(&SessionId::new("video-1")).unwrap();

    registry.dispatch(&a, SessionCommand::Play).unwrap();
    engine.notify(EngineNotification::Playing);
    assert!(session.is_primary(a.view_id()));

    registry.detach(&a);
    assert_eq!(session.primary_view(), None);
    assert_eq!(session.attached_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn sibling_keeps_receiving_ticks_after_detach() {
    let factory = FakeFactory::new();
    let config = SessionConfig {
        position_update_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let registry = registry_from(Arc::clone(&factory), config);

    let a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let mut b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    drain(&mut b);

    registry.detach(&a);
    tokio::time::sleep(Duration::from_millis(120)).await;

    // The surviving view keeps getting position reports; the detach itself
    // produces no activity event.
    let events = drain(&mut b);
    let ticks = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Control(ControlEvent::TimeUpdated { .. })))
        .count();
    assert!(ticks >= 2, "expected uninterrupted ticks, got: {events:?}");
    assert!(activities(events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn command_validation() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();

    let err = registry
        .dispatch(&a, SessionCommand::SetVolume { value: 1.5 })
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidVolume(_)));

    let err = registry
        .dispatch(&a, SessionCommand::SetSpeed { value: 8.0 })
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidSpeed(_)));

    registry.detach(&a);
    let err = registry.dispatch(&a, SessionCommand::Play).unwrap_err();
    assert!(matches!(err, SessionError::AdapterDetached(_)));
}

#[tokio::test(start_paused = true)]
async fn speed_change_emits_control_event_after_engine_accepts() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let mut a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    drain(&mut a);

    registry
        .dispatch(&a, SessionCommand::SetSpeed { value: 1.5 })
        .unwrap();
    settle().await;

    assert_eq!(
        drain(&mut a),
        vec![SessionEvent::Control(ControlEvent::SpeedChanged { value: 1.5 })]
    );
}

#[tokio::test(start_paused = true)]
async fn load_failure_becomes_failed_event_and_session_stays_usable() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let mut a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    drain(&mut a);
    let engine = factory.last_engine();
    let session = registry.session(&SessionId::new("video-1")).unwrap();

    engine.fail_load.store(true, Ordering::SeqCst);
    registry
        .dispatch(
            &a,
            SessionCommand::Load {
                source: MediaSource::new("https://cdn.example.com/denied.m3u8"),
            },
        )
        .unwrap();
    settle().await;

    let events = activities(drain(&mut a));
    assert_eq!(events[0], ActivityEvent::Loading);
    assert!(
        matches!(&events[1], ActivityEvent::Failed { message } if message.contains("403")),
        "unexpected events: {events:?}"
    );
    assert_eq!(session.activity(), ActivityState::Failed);

    // Failure is not terminal: a subsequent load proceeds normally.
    engine.fail_load.store(false, Ordering::SeqCst);
    registry
        .dispatch(
            &a,
            SessionCommand::Load {
                source: MediaSource::new("https://cdn.example.com/clip.m3u8"),
            },
        )
        .unwrap();
    settle().await;
    engine.notify(EngineNotification::Ready {
        duration: Some(Duration::from_secs(30)),
    });
    assert_eq!(
        activities(drain(&mut a)),
        vec![ActivityEvent::Loading, ActivityEvent::Loaded { duration_ms: 30_000 }]
    );
}

#[tokio::test(start_paused = true)]
async fn quality_variants_fetched_once_per_session() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let engine = factory.last_engine();

    let first = registry.qualities(&a).await.unwrap();
    let second = registry.qualities(&a).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.quality_fetches.load(Ordering::SeqCst), 1);

    // The cache survives a full release/reattach cycle.
    registry.release_resources(a);
    let b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    registry.qualities(&b).await.unwrap();
    assert_eq!(engine.quality_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_everyone_and_releases_the_engine() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let mut a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let mut b = registry
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();
    drain(&mut a);
    drain(&mut b);
    let engine = factory.last_engine();

    registry.teardown(&SessionId::new("video-1")).await;

    // Both observers see the terminal event, then their streams close.
    assert_eq!(
        a.recv().await,
        Some(SessionEvent::Activity(ActivityEvent::Stopped))
    );
    assert_eq!(a.recv().await, None);
    assert_eq!(
        b.recv().await,
        Some(SessionEvent::Activity(ActivityEvent::Stopped))
    );
    assert_eq!(b.recv().await, None);

    assert_eq!(engine.shutdown_calls.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());

    // Dispatching through a stale adapter now fails cleanly.
    let err = registry.dispatch(&a, SessionCommand::Play).unwrap_err();
    assert!(matches!(err, SessionError::UnknownSession(_)));

    // Teardown is idempotent.
    registry.teardown(&SessionId::new("video-1")).await;
    assert_eq!(engine.shutdown_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn independent_registries_never_share_sessions() {
    let factory_one = FakeFactory::new();
    let factory_two = FakeFactory::new();
    let registry_one = registry_with(Arc::clone(&factory_one));
    let registry_two = registry_with(Arc::clone(&factory_two));

    let _a = registry_one
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let _b = registry_two
        .attach("video-1", RecordingSurface::new("b"))
        .await
        .unwrap();

    // Same identifier, different registries: two engines, no shared state.
    assert_eq!(factory_one.created(), 1);
    assert_eq!(factory_two.created(), 1);
    assert!(!Arc::ptr_eq(
        &registry_one.session(&SessionId::new("video-1")).unwrap(),
        &registry_two.session(&SessionId::new("video-1")).unwrap(),
    ));
}

#[tokio::test(start_paused = true)]
async fn sessions_with_distinct_ids_get_distinct_engines() {
    let factory = FakeFactory::new();
    let registry = registry_with(Arc::clone(&factory));

    let _a = registry
        .attach("video-1", RecordingSurface::new("a"))
        .await
        .unwrap();
    let _b = registry
        .attach("video-2", RecordingSurface::new("b"))
        .await
        .unwrap();

    assert_eq!(factory.created(), 2);
    assert_eq!(registry.len(), 2);
}
