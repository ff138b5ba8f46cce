//! # Playback Engine Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform's
//! playback stack.
//!
//! ## Overview
//!
//! This crate defines the contract between the shared session core and the
//! platform-specific video machinery. The core never decodes, renders, or talks
//! to the OS presentation APIs itself; it drives an opaque [`PlaybackEngine`]
//! handle and observes it through [`EngineObserver`] notifications. Host
//! applications provide concrete implementations per platform (desktop, iOS,
//! Android) and hand the core an [`EngineFactory`] so engine instances can be
//! materialized lazily, on first attach.
//!
//! ## Traits
//!
//! - [`PlaybackEngine`](engine::PlaybackEngine) - one decode/render pipeline;
//!   async commands plus position/duration/ready-state queries
//! - [`EngineFactory`](engine::EngineFactory) - lazy engine construction
//! - [`EngineObserver`](engine::EngineObserver) - unified notification callback;
//!   platform handlers adapt their native event shapes into
//!   [`EngineNotification`](engine::EngineNotification) at this boundary
//! - [`RenderSurface`](surface::RenderSurface) - non-owning binding between a
//!   host UI surface and an engine, rebindable at any time
//!
//! ## Fail-Fast Strategy
//!
//! Implementations should fail fast with descriptive [`BridgeError`] values
//! rather than silently degrading; the session core coerces command failures
//! into `Failed` activity events so one surface's fault cannot take down its
//! siblings.

pub mod engine;
pub mod error;
pub mod quality;
pub mod surface;

pub use engine::{
    EngineFactory, EngineNotification, EngineObserver, MediaSource, PlaybackEngine, ReadyState,
};
pub use error::{BridgeError, Result};
pub use quality::QualityVariant;
pub use surface::RenderSurface;
