//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the shared playback core:
//! - Logging and tracing infrastructure
//! - The session event union delivered to view adapters
//! - Event stream consumption helpers
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the session core depends on. It
//! establishes the logging conventions and the typed event vocabulary used
//! throughout the system; the session crate owns the state machines that
//! decide *when* events fire, this crate owns *what* an event is.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{ActivityEvent, ControlEvent, EventSeverity, EventStream, SessionEvent};
pub use logging::{init_logging, LogFormat, LoggingConfig};
