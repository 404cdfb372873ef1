//! Structured logging setup
//!
//! Thin configuration layer over the `tracing` ecosystem. The engine emits
//! events at debug level (per-round query selection, per-arrival dedup) and
//! info level (threshold trigger, finished analysis); embedding
//! applications call [`init_logging`] once at startup to route them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ects_core::logging::{init_logging, LogConfig, LogLevel};
//!
//! let config = LogConfig {
//!     level: LogLevel::Debug,
//!     ..Default::default()
//! };
//! init_logging(&config);
//!
//! tracing::info!(distinct = 42, "inventory in progress");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON, machine-readable.
    Json,
    /// Human-readable multi-line output.
    Pretty,
    /// One line per event.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Compact
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level to emit.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Include timestamps.
    pub timestamps: bool,
    /// Module filter (e.g. `"ects_core=debug,ects_sim=trace"`); overrides
    /// `level` when set.
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            timestamps: true,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Verbose development configuration.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            ..Default::default()
        }
    }

    /// Errors only.
    pub fn quiet() -> Self {
        Self {
            level: LogLevel::Error,
            timestamps: false,
            ..Default::default()
        }
    }
}

/// Initialize the global logging subscriber.
///
/// Call once at application startup; later calls are silently ignored.
/// The `RUST_LOG` environment variable takes precedence over the
/// configured level when no explicit filter is given.
pub fn init_logging(config: &LogConfig) {
    let filter = if let Some(ref custom) = config.filter {
        EnvFilter::try_new(custom)
            .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.level)))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.level)))
    };

    let result = match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json();
            if config.timestamps {
                tracing::subscriber::set_global_default(
                    tracing_subscriber::registry().with(filter).with(layer),
                )
            } else {
                tracing::subscriber::set_global_default(
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer.without_time()),
                )
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer().pretty();
            if config.timestamps {
                tracing::subscriber::set_global_default(
                    tracing_subscriber::registry().with(filter).with(layer),
                )
            } else {
                tracing::subscriber::set_global_default(
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer.without_time()),
                )
            }
        }
        LogFormat::Compact => {
            let layer = fmt::layer().compact();
            if config.timestamps {
                tracing::subscriber::set_global_default(
                    tracing_subscriber::registry().with(filter).with(layer),
                )
            } else {
                tracing::subscriber::set_global_default(
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(layer.without_time()),
                )
            }
        }
    };

    // A second init attempt reports an error we deliberately swallow.
    let _ = result;
}
