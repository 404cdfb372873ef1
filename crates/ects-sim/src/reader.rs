//! Reader Abstraction
//!
//! Defines the common interface for sources of tag observations. A reader
//! delivers one identifier per read, possibly with duplicates, from its own
//! execution context; the consumer signals back when it has seen enough.

use serde::{Deserialize, Serialize};

use ects_core::params::DEFAULT_BIT_LENGTH;
use ects_core::types::TagCode;

/// Reader configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Number of tags present in the simulated radio field.
    pub inventory_size: usize,
    /// Identifier width in bits.
    pub bit_length: usize,
    /// Average read reports per second. Zero or negative means
    /// unthrottled delivery.
    pub reads_per_sec: f64,
    /// RNG seed for the read sequence; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            inventory_size: 100,
            bit_length: DEFAULT_BIT_LENGTH,
            reads_per_sec: 1000.0,
            seed: None,
        }
    }
}

impl ReaderConfig {
    /// Configuration delivering reads as fast as the consumer accepts them.
    pub fn unthrottled() -> Self {
        Self {
            reads_per_sec: 0.0,
            ..Default::default()
        }
    }
}

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Errors that can occur while driving a reader.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReaderError {
    #[error("reader not started")]
    NotStarted,

    #[error("reader already running")]
    AlreadyRunning,

    #[error("no observer attached")]
    NoObserver,

    #[error("inventory is empty")]
    EmptyInventory,

    #[error("failed to spawn reader thread: {0}")]
    Spawn(String),
}

/// Callback invoked once per read report. Returning `false` asks the
/// reader to stop producing further observations.
pub type ObserveFn = Box<dyn Fn(TagCode) -> bool + Send + Sync>;

/// Common interface for tag observation sources.
pub trait TagReader: Send {
    /// Reader name/description.
    fn name(&self) -> &str;

    /// Attach the observation callback. Must be called before `start`.
    fn set_observer(&mut self, observer: ObserveFn);

    /// Begin delivering observations.
    fn start(&mut self) -> ReaderResult<()>;

    /// Stop delivering observations and release the producing context.
    fn stop(&mut self) -> ReaderResult<()>;

    /// Is the reader currently producing?
    fn is_running(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.inventory_size, 100);
        assert_eq!(config.bit_length, 32);
        assert!(config.reads_per_sec > 0.0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_unthrottled_config() {
        let config = ReaderConfig::unthrottled();
        assert_eq!(config.reads_per_sec, 0.0);
        assert_eq!(config.inventory_size, 100);
    }
}
