//! Selectable quality variants exposed by a playback engine.

use serde::{Deserialize, Serialize};

/// One selectable quality rendition of a media item.
///
/// Variants are immutable value objects: the session core fetches the list
/// once per session, caches it across attach/detach cycles, and hands out
/// clones. The `is_automatic` entry (adaptive selection) is conventionally
/// listed first by host engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityVariant {
    /// Human-readable label (e.g., "1080p", "Auto").
    pub label: String,
    /// Locator for this rendition, understood by the engine.
    pub locator: String,
    /// Average bitrate in bits per second, when reported.
    pub bitrate: Option<u64>,
    /// Frame width in pixels, when reported.
    pub width: Option<u32>,
    /// Frame height in pixels, when reported.
    pub height: Option<u32>,
    /// Whether this variant delegates rendition choice to the engine.
    pub is_automatic: bool,
}

impl QualityVariant {
    /// Create a fixed-rendition variant with the given label and locator.
    pub fn new(label: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            locator: locator.into(),
            bitrate: None,
            width: None,
            height: None,
            is_automatic: false,
        }
    }

    /// Create the adaptive ("Auto") variant.
    pub fn automatic(locator: impl Into<String>) -> Self {
        Self {
            label: "Auto".to_string(),
            locator: locator.into(),
            bitrate: None,
            width: None,
            height: None,
            is_automatic: true,
        }
    }

    /// Set the reported bitrate.
    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Set the reported frame dimensions.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}
