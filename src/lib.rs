//! Workspace facade crate.
//!
//! Re-exports the individual workspace crates so host applications can depend
//! on `multiview-workspace` alone instead of wiring `bridge-engine`,
//! `core-runtime`, and `core-session` individually.

pub use bridge_engine;
pub use core_runtime;
pub use core_session;
