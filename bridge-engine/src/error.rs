//! # Bridge Error Types
//!
//! Error types surfaced by host-provided engine and surface implementations.

use thiserror::Error;

/// Errors produced by platform playback bridges.
#[derive(Error, Debug)]
pub enum BridgeError {
    // ========================================================================
    // Load Errors
    // ========================================================================
    /// The media locator is malformed or references nothing playable.
    #[error("Invalid media locator: {0}")]
    InvalidLocator(String),

    /// The engine failed to load the media (network, decoder, container).
    #[error("Engine load failed: {0}")]
    LoadFailed(String),

    // ========================================================================
    // Command Errors
    // ========================================================================
    /// A playback command was rejected by the underlying engine.
    #[error("Engine command failed: {0}")]
    CommandFailed(String),

    /// Seek position is outside the loaded media's bounds.
    #[error("Seek position out of bounds: {0:?}")]
    SeekOutOfBounds(std::time::Duration),

    /// The requested quality variant is not available on this engine.
    #[error("Quality variant not available: {0}")]
    QualityUnavailable(String),

    // ========================================================================
    // Surface Errors
    // ========================================================================
    /// The rendering surface was destroyed by the host framework.
    #[error("Rendering surface lost: {0}")]
    SurfaceLost(String),

    /// Binding a surface to the engine failed.
    #[error("Surface binding failed: {0}")]
    BindingFailed(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// The engine instance was already released by the host.
    #[error("Engine released")]
    EngineReleased,

    /// Internal bridge error (should not occur in normal operation).
    #[error("Internal bridge error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Returns `true` if this error stems from loading media.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidLocator(_) | BridgeError::LoadFailed(_)
        )
    }

    /// Returns `true` if this error concerns the rendering surface rather
    /// than the engine itself.
    pub fn is_surface_error(&self) -> bool {
        matches!(
            self,
            BridgeError::SurfaceLost(_) | BridgeError::BindingFailed(_)
        )
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
