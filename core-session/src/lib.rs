//! # Core Session
//!
//! Shared playback session management: exactly one playback engine per
//! logical video, observed by any number of interchangeable view adapters.
//!
//! ## Overview
//!
//! UI frameworks mount and unmount views aggressively (navigation, tab
//! switches, entering picture-in-picture), and naive players die with their
//! view. This crate decouples the two lifetimes: a [`SessionRegistry`] maps
//! each caller-supplied session identifier to one [`Session`] owning one
//! engine, and views participate through short-lived [`ViewAdapter`]s that
//! attach and detach freely while playback runs on uninterrupted.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SessionRegistry                       │
//! │   session id ──> Session ──> engine (created on 1st attach) │
//! └────────┬──────────────────────────────────────────▲─────────┘
//!          │ attach / detach / dispatch               │ EngineFactory
//!  ┌───────▼───────┐  ┌───────────────┐        ┌──────┴──────┐
//!  │  ViewAdapter  │  │  ViewAdapter  │  ....  │ host bridge │
//!  └───────────────┘  └───────────────┘        └─────────────┘
//! ```
//!
//! Key behaviors:
//!
//! - **Synthetic replay**: an attaching adapter receives a bounded,
//!   synthesized catch-up sequence before any live event, so a view that
//!   reattaches mid-playback renders the correct state immediately.
//! - **Primary-view election**: the most recent view to start playback
//!   holds the primary slot, authorizing automatic side effects such as
//!   auto picture-in-picture.
//! - **Buffering debounce**: engine stalls shorter than the configured
//!   quiet period never surface as activity events.
//! - **Defensive reconnection**: whenever the surface topology changes,
//!   every remaining surface is idempotently rebound to the engine.
//!
//! ## Example
//!
//! ```ignore
//! let registry = Arc::new(SessionRegistry::new(factory, SessionConfig::default())?);
//!
//! let mut adapter = registry.attach("video-42", surface).await?;
//! registry.dispatch(&adapter, SessionCommand::Load { source })?;
//! registry.dispatch(&adapter, SessionCommand::Play)?;
//!
//! while let Some(event) = adapter.recv().await {
//!     // render
//! }
//! ```

pub mod adapter;
mod attachment;
pub mod command;
pub mod config;
pub mod error;
mod reconnect;
pub mod registry;
pub mod session;
pub mod state;
mod synchronizer;

pub use adapter::{ViewAdapter, ViewId};
pub use command::SessionCommand;
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use registry::SessionRegistry;
pub use session::{Session, SessionId};
pub use state::{ActivityState, RestingState};
