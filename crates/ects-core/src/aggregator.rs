//! Tag arrival aggregation
//!
//! Consumes the stream of observed identifiers coming from a reader,
//! deduplicates it, and fires the discrimination analysis exactly once,
//! when the configured number of distinct targets has been seen.
//!
//! The reader side typically delivers reports from its own thread, so all
//! aggregation state lives behind a single mutex and [`TagAggregator::observe`]
//! is the one atomic entry point: it tells the caller whether the
//! observation was new, how many distinct codes are known, and, on the
//! triggering call only, hands back the finished [`AnalysisReport`]. After
//! the trigger the aggregator is stopped and further observations are
//! ignored, which keeps racing late reports harmless.
//!
//! Inter-arrival timing is a peripheral measurement: each new distinct code
//! is forwarded to an optional sink as `(code, distinct_count, interval_us)`
//! and never influences planning.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info};

use crate::analysis::{self, AnalysisReport};
use crate::params::AnalysisParams;
use crate::types::{EctsError, EctsResult, TagCode};

/// One record on the arrival side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    /// The newly observed code.
    pub code: TagCode,
    /// Distinct-count after this observation.
    pub distinct_count: usize,
    /// Microseconds since the previous distinct observation (since
    /// aggregator creation for the first one).
    pub interval_us: u64,
}

/// Result of one `observe` call.
#[derive(Debug, Clone)]
pub struct Arrival {
    /// Whether this code had not been seen before.
    pub is_new: bool,
    /// Distinct codes seen so far.
    pub distinct_count: usize,
    /// The analysis report, present only on the call that reached the
    /// target threshold.
    pub report: Option<AnalysisReport>,
}

type ArrivalSink = Box<dyn Fn(ArrivalRecord) + Send + Sync>;

struct Inner {
    seen: HashSet<TagCode>,
    order: Vec<TagCode>,
    last_arrival: Option<Instant>,
    report: Option<AnalysisReport>,
}

/// Thread-safe arrival aggregator.
///
/// # Example
///
/// ```
/// use ects_core::aggregator::TagAggregator;
/// use ects_core::params::AnalysisParams;
/// use ects_core::types::TagCode;
///
/// let params = AnalysisParams::builder()
///     .population_size(10)
///     .target_count(2)
///     .bit_length(4)
///     .build();
/// let aggregator = TagAggregator::new(params).unwrap().with_background_seed(1);
///
/// aggregator.observe(TagCode::from_text("1010").unwrap()).unwrap();
/// let arrival = aggregator.observe(TagCode::from_text("0111").unwrap()).unwrap();
/// assert!(arrival.report.is_some());
/// assert!(aggregator.should_stop());
/// ```
pub struct TagAggregator {
    params: AnalysisParams,
    inner: Mutex<Inner>,
    stopped: AtomicBool,
    started: Instant,
    sink: Option<ArrivalSink>,
    background_seed: Option<u64>,
}

impl TagAggregator {
    /// Create an aggregator, validating the configuration up front.
    ///
    /// A zero target count completes immediately: the report is the empty
    /// result and the stop signal is already raised.
    pub fn new(params: AnalysisParams) -> EctsResult<Self> {
        params.validate()?;
        if params.run_planner && params.target_count > 0 {
            // Surface bound errors now rather than at the trigger.
            params.window_bounds()?;
        }

        let trivial = params.target_count == 0;
        let report = if trivial {
            Some(analysis::analyze_seeded(&[], &params, 0)?)
        } else {
            None
        };

        Ok(Self {
            params,
            inner: Mutex::new(Inner {
                seen: HashSet::new(),
                order: Vec::new(),
                last_arrival: None,
                report,
            }),
            stopped: AtomicBool::new(trivial),
            started: Instant::now(),
            sink: None,
            background_seed: None,
        })
    }

    /// Attach a sink receiving one [`ArrivalRecord`] per new distinct code.
    pub fn with_arrival_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(ArrivalRecord) + Send + Sync + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Fix the background-population seed so the triggered analysis is
    /// reproducible.
    pub fn with_background_seed(mut self, seed: u64) -> Self {
        self.background_seed = Some(seed);
        self
    }

    /// Feed one observed identifier into the aggregator.
    ///
    /// Duplicate codes and observations arriving after the threshold are
    /// counted as non-new and otherwise ignored. The call that brings the
    /// distinct count to the configured target runs the analysis and
    /// returns the report.
    pub fn observe(&self, code: TagCode) -> EctsResult<Arrival> {
        if code.len() != self.params.bit_length {
            return Err(EctsError::CodeLengthMismatch {
                expected: self.params.bit_length,
                actual: code.len(),
            });
        }

        let mut inner = self.inner.lock().unwrap();

        if self.stopped.load(Ordering::Acquire) || !inner.seen.insert(code.clone()) {
            return Ok(Arrival {
                is_new: false,
                distinct_count: inner.seen.len(),
                report: None,
            });
        }

        inner.order.push(code.clone());
        let distinct = inner.seen.len();

        let now = Instant::now();
        let since = inner.last_arrival.unwrap_or(self.started);
        let interval_us = now.duration_since(since).as_micros() as u64;
        inner.last_arrival = Some(now);
        debug!(distinct, interval_us, "new tag observed");

        if let Some(sink) = &self.sink {
            sink(ArrivalRecord {
                code,
                distinct_count: distinct,
                interval_us,
            });
        }

        let report = if distinct == self.params.target_count {
            let mut rng = match self.background_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let report = analysis::analyze(&inner.order, &self.params, &mut rng)?;
            info!(
                queries = report.query_count,
                total_bits = report.total_bits,
                "target threshold reached"
            );
            inner.report = Some(report.clone());
            self.stopped.store(true, Ordering::Release);
            Some(report)
        } else {
            None
        };

        Ok(Arrival {
            is_new: true,
            distinct_count: distinct,
            report,
        })
    }

    /// Stop signal for the producing side: true once the threshold has
    /// been reached and the report computed.
    pub fn should_stop(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Distinct codes observed so far.
    pub fn distinct_count(&self) -> usize {
        self.inner.lock().unwrap().seen.len()
    }

    /// The computed report, if the threshold has been reached.
    pub fn report(&self) -> Option<AnalysisReport> {
        self.inner.lock().unwrap().report.clone()
    }

    /// The configuration this aggregator runs with.
    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn params(n: usize, total: usize) -> AnalysisParams {
        AnalysisParams::builder()
            .population_size(total)
            .target_count(n)
            .build()
    }

    #[test]
    fn test_duplicates_are_counted_once() {
        let aggregator = TagAggregator::new(params(3, 10)).unwrap();
        let code = TagCode::from_u32(0xDEAD_BEEF, 32).unwrap();
        assert!(aggregator.observe(code.clone()).unwrap().is_new);
        assert!(!aggregator.observe(code).unwrap().is_new);
        assert_eq!(aggregator.distinct_count(), 1);
    }

    #[test]
    fn test_threshold_fires_exactly_once() {
        let aggregator = TagAggregator::new(params(2, 10))
            .unwrap()
            .with_background_seed(5);
        let first = aggregator
            .observe(TagCode::from_u32(1, 32).unwrap())
            .unwrap();
        assert!(first.report.is_none());
        assert!(!aggregator.should_stop());

        let second = aggregator
            .observe(TagCode::from_u32(2, 32).unwrap())
            .unwrap();
        assert!(second.report.is_some());
        assert!(aggregator.should_stop());

        // Racing late arrivals are ignored, new or not.
        let late = aggregator
            .observe(TagCode::from_u32(3, 32).unwrap())
            .unwrap();
        assert!(!late.is_new);
        assert!(late.report.is_none());
        assert_eq!(aggregator.distinct_count(), 2);
    }

    #[test]
    fn test_report_is_retained() {
        let aggregator = TagAggregator::new(params(1, 5))
            .unwrap()
            .with_background_seed(9);
        assert!(aggregator.report().is_none());
        aggregator
            .observe(TagCode::from_u32(7, 32).unwrap())
            .unwrap();
        let report = aggregator.report().expect("report after threshold");
        assert_eq!(report.query_count, report.queries.len());
    }

    #[test]
    fn test_zero_target_threshold_completes_immediately() {
        let aggregator = TagAggregator::new(params(0, 5)).unwrap();
        assert!(aggregator.should_stop());
        let report = aggregator.report().unwrap();
        assert_eq!(report.query_count, 0);
        assert_eq!(report.total_bits, 0);
    }

    #[test]
    fn test_invalid_configuration_rejected_up_front() {
        assert!(TagAggregator::new(params(6, 5)).is_err());
    }

    #[test]
    fn test_wrong_width_code_rejected() {
        let aggregator = TagAggregator::new(params(2, 10)).unwrap();
        let narrow = TagCode::from_text("1010").unwrap();
        assert!(matches!(
            aggregator.observe(narrow),
            Err(EctsError::CodeLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_arrival_sink_sees_every_distinct_code() {
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink_records = Arc::clone(&records);
        let aggregator = TagAggregator::new(params(3, 12))
            .unwrap()
            .with_background_seed(2)
            .with_arrival_sink(move |record| {
                sink_records.lock().unwrap().push(record);
            });

        for value in [10, 10, 11, 12] {
            aggregator
                .observe(TagCode::from_u32(value, 32).unwrap())
                .unwrap();
        }

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 3);
        let counts: Vec<usize> = records.iter().map(|r| r.distinct_count).collect();
        assert_eq!(counts, vec![1, 2, 3]);
    }

    #[test]
    fn test_concurrent_producers_trigger_once() {
        let n = 10;
        let aggregator = Arc::new(
            TagAggregator::new(params(n, 40))
                .unwrap()
                .with_background_seed(3),
        );
        let codes = Arc::new(population::generate_codes_seeded(n, 32, 77));
        let triggers = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let aggregator = Arc::clone(&aggregator);
                let codes = Arc::clone(&codes);
                let triggers = Arc::clone(&triggers);
                std::thread::spawn(move || {
                    for code in codes.iter() {
                        let arrival = aggregator.observe(code.clone()).unwrap();
                        if arrival.report.is_some() {
                            triggers.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(aggregator.distinct_count(), n);
        assert_eq!(triggers.load(Ordering::SeqCst), 1);
        assert!(aggregator.report().is_some());
    }
}
