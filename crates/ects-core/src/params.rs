//! Analysis parameters and window-length policies
//!
//! Configuration for a discrimination run: the assumed population size `N`,
//! the number of target tags `n` to resolve, the identifier width, and the
//! policy that bounds which substring window lengths the extractor searches.
//!
//! ## Window-length policies
//!
//! The cost of extraction grows with the searched length range, so the range
//! can be bounded by an estimate of how long a substring must be before it
//! is likely to be unique against the background:
//!
//! | Policy | `L_min` | `L_max` |
//! |--------|---------|---------|
//! | `InformationTheoretic` | `floor(ln m − ln ln m)` | `ceil(log2(m·ln m))` |
//! | `Exhaustive`           | 1                       | code width           |
//! | `CollisionLowerBound`  | `ceil(log2(n²))`        | code width           |
//!
//! where `m = N − n` is the background size. The information-theoretic
//! bounds come from the expected shortest distinguishing substring against
//! `m` uniform random codes and the length at which uniqueness is near
//! certain. The collision lower bound is the birthday-style minimum length
//! below which `n` targets cannot all carry distinct windows.

use serde::{Deserialize, Serialize};

use crate::types::{EctsError, EctsResult};

/// Default identifier width in bits.
pub const DEFAULT_BIT_LENGTH: usize = 32;

/// Default fixed per-query protocol overhead in bits.
///
/// Covers the SELECT command framing around the mask payload: command code,
/// target/action fields, membank and pointer, length field, and CRC-16.
pub const DEFAULT_QUERY_OVERHEAD_BITS: u32 = 45;

/// Policy bounding the substring window lengths searched by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthPolicy {
    /// Expected-unique-length bounds derived from the background size.
    InformationTheoretic,
    /// Search every length from 1 up to the full code width.
    Exhaustive,
    /// Birthday-bound minimum length up to the full code width.
    CollisionLowerBound,
}

impl LengthPolicy {
    /// Map a raw mode number to a policy.
    ///
    /// Mode 0 is information-theoretic, 1 exhaustive, 2 collision lower
    /// bound. Any other value falls back to the exhaustive policy.
    pub fn from_u8(mode: u8) -> Self {
        match mode {
            0 => Self::InformationTheoretic,
            2 => Self::CollisionLowerBound,
            _ => Self::Exhaustive,
        }
    }
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self::Exhaustive
    }
}

/// Complete configuration for a discrimination run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Assumed total population size `N` (targets plus background).
    pub population_size: usize,
    /// Number of distinct target identifiers `n` to resolve.
    pub target_count: usize,
    /// Identifier width in bits.
    pub bit_length: usize,
    /// Window-length search policy.
    pub policy: LengthPolicy,
    /// Whether to run the greedy query planner. When disabled the result
    /// is always zero queries and zero bits.
    pub run_planner: bool,
    /// Fixed per-query protocol overhead in bits.
    pub query_overhead_bits: u32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            population_size: 1000,
            target_count: 100,
            bit_length: DEFAULT_BIT_LENGTH,
            policy: LengthPolicy::default(),
            run_planner: true,
            query_overhead_bits: DEFAULT_QUERY_OVERHEAD_BITS,
        }
    }
}

impl AnalysisParams {
    /// Create a new builder.
    pub fn builder() -> AnalysisParamsBuilder {
        AnalysisParamsBuilder::default()
    }

    /// Number of background codes, `N − n`.
    pub fn background_size(&self) -> usize {
        self.population_size.saturating_sub(self.target_count)
    }

    /// Check the configuration, failing fast before any generation or
    /// extraction work.
    pub fn validate(&self) -> EctsResult<()> {
        if self.target_count > self.population_size {
            return Err(EctsError::InvalidConfiguration(format!(
                "target count {} exceeds population size {}",
                self.target_count, self.population_size
            )));
        }
        if self.bit_length == 0 {
            return Err(EctsError::InvalidConfiguration(
                "bit length must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Compute the `(L_min, L_max)` window-length bounds for this
    /// configuration.
    ///
    /// Bounds are clamped to `[1, bit_length]`. The information-theoretic
    /// policy is undefined for a background of fewer than two codes and
    /// fails with [`EctsError::DegenerateLogInput`] rather than letting the
    /// logarithms produce NaN or infinities.
    pub fn window_bounds(&self) -> EctsResult<(usize, usize)> {
        let (lo, hi) = match self.policy {
            LengthPolicy::Exhaustive => (1_i64, self.bit_length as i64),
            LengthPolicy::InformationTheoretic => {
                let m = self.background_size();
                if m <= 1 {
                    return Err(EctsError::DegenerateLogInput { background: m });
                }
                let m = m as f64;
                let lo = (m.ln() - m.ln().ln()).floor() as i64;
                let hi = (m * m.ln()).log2().ceil() as i64;
                (lo, hi)
            }
            LengthPolicy::CollisionLowerBound => {
                let n = self.target_count;
                let lo = if n <= 1 {
                    1
                } else {
                    (n as f64 * n as f64).log2().ceil() as i64
                };
                (lo, self.bit_length as i64)
            }
        };

        let l_min = lo.max(1) as usize;
        let l_max = hi.min(self.bit_length as i64).max(0) as usize;
        if l_min > l_max {
            return Err(EctsError::InvalidConfiguration(format!(
                "window bounds [{l_min}, {l_max}] are empty for bit length {}",
                self.bit_length
            )));
        }
        Ok((l_min, l_max))
    }
}

/// Builder for [`AnalysisParams`].
#[derive(Debug, Default)]
pub struct AnalysisParamsBuilder {
    params: AnalysisParams,
}

impl AnalysisParamsBuilder {
    pub fn population_size(mut self, n: usize) -> Self {
        self.params.population_size = n;
        self
    }

    pub fn target_count(mut self, n: usize) -> Self {
        self.params.target_count = n;
        self
    }

    pub fn bit_length(mut self, bits: usize) -> Self {
        self.params.bit_length = bits;
        self
    }

    pub fn policy(mut self, policy: LengthPolicy) -> Self {
        self.params.policy = policy;
        self
    }

    pub fn run_planner(mut self, enabled: bool) -> Self {
        self.params.run_planner = enabled;
        self
    }

    pub fn query_overhead_bits(mut self, bits: u32) -> Self {
        self.params.query_overhead_bits = bits;
        self
    }

    pub fn build(self) -> AnalysisParams {
        self.params
    }
}
