//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack used by the playback core:
//! - JSON, pretty-print, and compact output formats
//! - Module-level filtering through `RUST_LOG` or an explicit directive
//! - Optional span events for the session service loops
//!
//! ## Usage
//!
//! ```no_run
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Pretty)
//!     .with_filter("core_session=debug,info");
//!
//! init_logging(config).expect("failed to initialize logging");
//! tracing::info!("playback core started");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output for development.
    Pretty,
    /// Single-line output for terminals and CI.
    Compact,
    /// Structured JSON for log aggregation.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub filter: String,
    /// Whether to emit ANSI color codes (ignored for JSON).
    pub ansi: bool,
    /// Whether to include span close events with timing.
    pub span_timing: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            filter: "info".to_string(),
            ansi: true,
            span_timing: false,
        }
    }
}

impl LoggingConfig {
    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the fallback filter directive (e.g., `"core_session=debug,info"`).
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Enable span close events with timing information.
    pub fn with_span_timing(mut self, enabled: bool) -> Self {
        self.span_timing = enabled;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter directive. Returns
/// an error if the directive cannot be parsed or if a global subscriber was
/// already installed (initialize once per process; tests use per-test
/// dispatchers instead).
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::Config(format!("invalid filter directive: {e}")))?;

    let span_events = if config.span_timing {
        tracing_subscriber::fmt::format::FmtSpan::CLOSE
    } else {
        tracing_subscriber::fmt::format::FmtSpan::NONE
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(span_events);

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().with_ansi(config.ansi).try_init(),
        LogFormat::Compact => builder.compact().with_ansi(config.ansi).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| Error::LoggingInit(e.to_string()))
}
