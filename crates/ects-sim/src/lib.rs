//! # ECTS Reader Simulation
//!
//! Software simulation of the hardware acquisition layer feeding the
//! discrimination engine: a [`reader::TagReader`] delivers identifiers
//! from its own thread, duplicates and all, until the consumer signals it
//! has observed enough distinct tags.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ects_core::aggregator::TagAggregator;
//! use ects_core::params::AnalysisParams;
//! use ects_sim::reader::{ReaderConfig, TagReader};
//! use ects_sim::simulator::SimulatedReader;
//!
//! let params = AnalysisParams::builder()
//!     .population_size(50)
//!     .target_count(3)
//!     .build();
//! let aggregator = Arc::new(TagAggregator::new(params).unwrap().with_background_seed(1));
//!
//! let mut reader = SimulatedReader::new(ReaderConfig {
//!     seed: Some(7),
//!     inventory_size: 8,
//!     ..ReaderConfig::unthrottled()
//! });
//! let sink = Arc::clone(&aggregator);
//! reader.set_observer(Box::new(move |code| {
//!     let _ = sink.observe(code);
//!     !sink.should_stop()
//! }));
//!
//! reader.start().unwrap();
//! while reader.is_running() {
//!     std::thread::sleep(std::time::Duration::from_millis(1));
//! }
//! reader.stop().unwrap();
//!
//! assert!(aggregator.report().is_some());
//! ```

pub mod reader;
pub mod simulator;

pub use reader::{ObserveFn, ReaderConfig, ReaderError, ReaderResult, TagReader};
pub use simulator::SimulatedReader;
