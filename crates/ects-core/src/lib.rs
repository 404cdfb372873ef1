//! # ECTS Core Engine
//!
//! This crate evaluates the cost of singling a small set of *target* tags
//! out of a larger population using short distinguishing bit-substrings in
//! place of full identifiers, the way SELECT-based anti-collision query
//! protocols do during RFID inventory.
//!
//! ## Overview
//!
//! The pipeline has four synchronous stages plus one concurrent front end:
//!
//! - **Population generation**: synthesize the background codes assumed to
//!   share the radio field with the targets
//! - **Unique-substring extraction**: per target, find every bit window
//!   whose value occurs in no background code at the same offsets
//! - **Greedy query planning**: repeatedly broadcast the window shared by
//!   the most unresolved targets until all are resolved or candidates run
//!   out
//! - **Cost accounting**: mask payload bits plus fixed per-query overhead
//! - **Arrival aggregation**: deduplicate a live observation stream and
//!   trigger the pipeline once enough distinct targets have been seen
//!
//! ## Signal Flow
//!
//! ```text
//! reader stream → aggregator ─┬─ targets ──► extractor ──► planner ──► cost
//!                             └─ N − n  ──► population ──────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ects_core::prelude::*;
//!
//! let params = AnalysisParams::builder()
//!     .population_size(100)
//!     .target_count(5)
//!     .build();
//!
//! let targets = ects_core::population::generate_codes_seeded(5, 32, 7);
//! let report = ects_core::analysis::analyze_seeded(&targets, &params, 42).unwrap();
//!
//! assert_eq!(report.query_count, report.queries.len());
//! ```

pub mod aggregator;
pub mod analysis;
pub mod cost;
pub mod discriminator;
pub mod logging;
pub mod params;
pub mod planner;
pub mod population;
pub mod types;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::aggregator::{Arrival, ArrivalRecord, TagAggregator};
    pub use crate::analysis::AnalysisReport;
    pub use crate::cost::{CostModel, CostSummary};
    pub use crate::discriminator::Discriminator;
    pub use crate::params::{AnalysisParams, LengthPolicy};
    pub use crate::planner::{PlannerState, Query, QueryPlan};
    pub use crate::types::{EctsError, EctsResult, TagCode};
}
