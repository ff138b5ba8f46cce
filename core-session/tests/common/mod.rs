//! Shared test doubles: a scriptable engine, its factory, and a counting
//! render surface.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_engine::{
    BridgeError, EngineFactory, EngineNotification, EngineObserver, MediaSource, PlaybackEngine,
    QualityVariant, ReadyState, RenderSurface, Result as BridgeResult,
};
use core_runtime::events::SessionEvent;
use core_session::{SessionConfig, SessionRegistry, ViewAdapter};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Engine double the tests drive by hand.
///
/// Commands succeed (unless scripted to fail) and record their names;
/// notifications are pushed through the registered observer with
/// [`FakeEngine::notify`], exactly the way a platform bridge would.
pub struct FakeEngine {
    observer: Mutex<Option<Arc<dyn EngineObserver>>>,
    pub position: Mutex<Duration>,
    pub duration: Mutex<Option<Duration>>,
    pub buffered: Mutex<Duration>,
    pub commands: Mutex<Vec<String>>,
    pub quality_fetches: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    pub fail_load: AtomicBool,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            observer: Mutex::new(None),
            position: Mutex::new(Duration::ZERO),
            duration: Mutex::new(None),
            buffered: Mutex::new(Duration::ZERO),
            commands: Mutex::new(Vec::new()),
            quality_fetches: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            fail_load: AtomicBool::new(false),
        })
    }

    /// Deliver a notification through the session's observer.
    pub fn notify(&self, notification: EngineNotification) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.on_notification(notification);
        }
    }

    /// Names of the commands received so far.
    pub fn command_log(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    fn record(&self, name: &str) {
        self.commands.lock().push(name.to_string());
    }
}

#[async_trait]
impl PlaybackEngine for FakeEngine {
    async fn load(&self, _source: MediaSource) -> BridgeResult<()> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(BridgeError::LoadFailed("origin returned 403".into()));
        }
        self.record("load");
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.record("play");
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.record("pause");
        Ok(())
    }

    async fn seek(&self, _position: Duration) -> BridgeResult<()> {
        self.record("seek");
        Ok(())
    }

    async fn set_volume(&self, _volume: f32) -> BridgeResult<()> {
        self.record("set_volume");
        Ok(())
    }

    async fn set_speed(&self, _speed: f32) -> BridgeResult<()> {
        self.record("set_speed");
        Ok(())
    }

    async fn set_quality(&self, _variant: &QualityVariant) -> BridgeResult<()> {
        self.record("set_quality");
        Ok(())
    }

    async fn available_qualities(&self) -> BridgeResult<Vec<QualityVariant>> {
        self.quality_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            QualityVariant::automatic("https://cdn.example.com/v/master.m3u8"),
            QualityVariant::new("720p", "https://cdn.example.com/v/mid.m3u8"),
        ])
    }

    async fn current_position(&self) -> BridgeResult<Duration> {
        Ok(*self.position.lock())
    }

    async fn duration(&self) -> BridgeResult<Option<Duration>> {
        Ok(*self.duration.lock())
    }

    async fn buffered_position(&self) -> BridgeResult<Duration> {
        Ok(*self.buffered.lock())
    }

    async fn is_playing(&self) -> BridgeResult<bool> {
        Ok(false)
    }

    async fn ready_state(&self) -> BridgeResult<ReadyState> {
        Ok(ReadyState::EnoughData)
    }

    async fn set_observer(&self, observer: Arc<dyn EngineObserver>) {
        *self.observer.lock() = Some(observer);
    }

    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory that records every engine it hands out.
#[derive(Default)]
pub struct FakeFactory {
    engines: Mutex<Vec<Arc<FakeEngine>>>,
}

impl FakeFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of engines created so far.
    pub fn created(&self) -> usize {
        self.engines.lock().len()
    }

    /// The most recently created engine.
    pub fn last_engine(&self) -> Arc<FakeEngine> {
        Arc::clone(self.engines.lock().last().unwrap())
    }
}

#[async_trait]
impl EngineFactory for FakeFactory {
    async fn create(&self, _session_id: &str) -> BridgeResult<Arc<dyn PlaybackEngine>> {
        let engine = FakeEngine::new();
        self.engines.lock().push(Arc::clone(&engine));
        Ok(engine)
    }
}

/// Surface that counts how often it was rebound.
pub struct RecordingSurface {
    id: String,
    rebinds: AtomicUsize,
    pub fail_rebind: AtomicBool,
}

impl RecordingSurface {
    pub fn new(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            rebinds: AtomicUsize::new(0),
            fail_rebind: AtomicBool::new(false),
        })
    }

    pub fn rebinds(&self) -> usize {
        self.rebinds.load(Ordering::SeqCst)
    }
}

impl RenderSurface for RecordingSurface {
    fn surface_id(&self) -> &str {
        &self.id
    }

    fn rebind(&self, _engine: &Arc<dyn PlaybackEngine>) -> BridgeResult<()> {
        self.rebinds.fetch_add(1, Ordering::SeqCst);
        if self.fail_rebind.load(Ordering::SeqCst) {
            return Err(BridgeError::SurfaceLost("surface recycled by host".into()));
        }
        Ok(())
    }
}

/// Build a registry over a scripted factory.
///
/// Takes the concrete factory type so call sites can keep a handle to it;
/// the trait-object coercion happens here, once.
pub fn registry_from(factory: Arc<FakeFactory>, config: SessionConfig) -> SessionRegistry {
    SessionRegistry::new(factory, config).unwrap()
}

/// Let spawned dispatch tasks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

/// Drain every event currently queued on an adapter.
pub fn drain(adapter: &mut ViewAdapter) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Some(event) = adapter.try_recv() {
        events.push(event);
    }
    events
}

/// Await the next activity event, skipping control events.
pub async fn next_activity(adapter: &mut ViewAdapter) -> Option<SessionEvent> {
    while let Some(event) = adapter.recv().await {
        if event.is_activity() {
            return Some(event);
        }
    }
    None
}
