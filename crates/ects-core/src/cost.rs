//! Protocol bit-cost accounting
//!
//! Converts a query plan into total air-interface overhead. Each SELECT
//! query costs its mask payload length plus a fixed per-command framing
//! overhead.

use serde::{Deserialize, Serialize};

use crate::params::DEFAULT_QUERY_OVERHEAD_BITS;
use crate::planner::{Query, QueryPlan};

/// Aggregate cost of an executed plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    /// Number of SELECT queries issued.
    pub query_count: usize,
    /// Total bits broadcast: mask payloads plus per-query overhead.
    pub total_bits: u64,
}

/// Per-query cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModel {
    query_overhead_bits: u32,
}

impl CostModel {
    /// Create a model with the given fixed per-query overhead.
    pub fn new(query_overhead_bits: u32) -> Self {
        Self {
            query_overhead_bits,
        }
    }

    /// Bits broadcast by one query, mask plus overhead.
    pub fn query_bits(&self, query: &Query) -> u64 {
        query.window_len() as u64 + u64::from(self.query_overhead_bits)
    }

    /// Total bits for a sequence of queries.
    pub fn total_bits(&self, queries: &[Query]) -> u64 {
        queries.iter().map(|q| self.query_bits(q)).sum()
    }

    /// Summarize a finished plan.
    pub fn summarize(&self, plan: &QueryPlan) -> CostSummary {
        CostSummary {
            query_count: plan.queries.len(),
            total_bits: self.total_bits(&plan.queries),
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_OVERHEAD_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerState;

    fn query(len: usize) -> Query {
        Query {
            bits: vec![true; len],
            start: 0,
            end: len,
            covered: vec![0],
        }
    }

    #[test]
    fn test_empty_plan_costs_nothing() {
        let plan = QueryPlan {
            queries: Vec::new(),
            unresolved: Vec::new(),
            state: PlannerState::Done,
        };
        let summary = CostModel::default().summarize(&plan);
        assert_eq!(summary.query_count, 0);
        assert_eq!(summary.total_bits, 0);
    }

    #[test]
    fn test_known_totals() {
        // Two queries of 3 and 5 mask bits at 45 bits overhead each:
        // 3 + 5 + 2 * 45 = 98
        let model = CostModel::new(45);
        assert_eq!(model.total_bits(&[query(3), query(5)]), 98);
    }

    #[test]
    fn test_total_is_sum_of_query_bits() {
        let model = CostModel::new(45);
        let queries = [query(1), query(4), query(9)];
        let per_query: u64 = queries.iter().map(|q| model.query_bits(q)).sum();
        assert_eq!(model.total_bits(&queries), per_query);
    }

    #[test]
    fn test_custom_overhead() {
        let model = CostModel::new(10);
        assert_eq!(model.total_bits(&[query(2)]), 12);
    }
}
