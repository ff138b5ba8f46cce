//! # Session Configuration
//!
//! Tunables for the shared playback session manager.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session manager configuration.
///
/// One configuration is shared by every session a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Quiet period a buffering stall must survive before a `Buffering`
    /// activity event is emitted on the live stream.
    ///
    /// Stalls shorter than this produce no activity event at all; observers
    /// keep seeing the prior play/pause state uninterrupted.
    ///
    /// Default: 400 ms.
    #[serde(default = "default_buffering_debounce")]
    pub buffering_debounce: Duration,

    /// Interval between periodic `TimeUpdated` control events.
    ///
    /// The tick also carries the engine's live (undebounced) stall flag.
    ///
    /// Default: 250 ms.
    #[serde(default = "default_position_update_interval")]
    pub position_update_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffering_debounce: default_buffering_debounce(),
            position_update_interval: default_position_update_interval(),
        }
    }
}

impl SessionConfig {
    /// Configuration for UIs that want snappy stall feedback.
    ///
    /// - Shorter quiet period (150 ms)
    /// - Faster position ticks (100 ms)
    pub fn responsive() -> Self {
        Self {
            buffering_debounce: Duration::from_millis(150),
            position_update_interval: Duration::from_millis(100),
        }
    }

    /// Configuration for list previews where churn is high and precision
    /// matters less.
    ///
    /// - Longer quiet period (800 ms)
    /// - Slower position ticks (1 s)
    pub fn relaxed() -> Self {
        Self {
            buffering_debounce: Duration::from_millis(800),
            position_update_interval: Duration::from_secs(1),
        }
    }

    /// Validate the configuration.
    ///
    /// A zero debounce is allowed (stalls surface immediately); a zero tick
    /// interval is not.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.position_update_interval.is_zero() {
            return Err("position_update_interval must be non-zero".to_string());
        }
        if self.buffering_debounce > Duration::from_secs(10) {
            return Err(format!(
                "buffering_debounce of {:?} exceeds the 10s sanity bound",
                self.buffering_debounce
            ));
        }
        Ok(())
    }
}

fn default_buffering_debounce() -> Duration {
    Duration::from_millis(400)
}

fn default_position_update_interval() -> Duration {
    Duration::from_millis(250)
}
