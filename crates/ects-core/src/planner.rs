//! Greedy SELECT query planning
//!
//! Turns a candidate discriminator list into the smallest set of broadcast
//! SELECT queries the planner can find greedily. Each round picks the bit
//! window shared by the most still-unresolved targets, resolves them all
//! with one query, and drops their remaining candidates so later rounds
//! never re-count covered targets.
//!
//! ## Round structure
//!
//! ```text
//!  candidates ──group by (bits, start, end)──► groups
//!                                                │ max distinct targets
//!                                                ▼
//!  unresolved ◄──remove covered────────── chosen query
//!  candidates ◄──drop covered targets' entries──┘
//! ```
//!
//! Grouping uses the full `(bits, start, end)` triple. Grouping by value and
//! offset alone would conflate windows of different length that happen to
//! start with the same bits at the same offset.
//!
//! Selection ties are broken deterministically: most targets covered, then
//! smallest start offset, then shortest window, then lexicographically
//! smallest bit value. Re-running the planner on the same candidate list
//! always yields the same plan.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

use crate::discriminator::Discriminator;

/// Planner execution state.
///
/// `Active` only occurs mid-run; a finished [`QueryPlan`] carries `Done`
/// when every target was resolved, or `Exhausted` when candidates ran out
/// with targets still unresolved. Exhaustion is a legitimate partial
/// result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannerState {
    Active,
    Exhausted,
    Done,
}

/// One broadcast SELECT query: a chosen bit window and the targets it
/// resolved in its round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Bit value broadcast in the query mask.
    pub bits: Vec<bool>,
    /// First bit offset of the window.
    pub start: usize,
    /// One past the last bit offset of the window.
    pub end: usize,
    /// Target indices resolved by this query, ascending.
    pub covered: Vec<usize>,
}

impl Query {
    /// Mask payload length in bits.
    pub fn window_len(&self) -> usize {
        self.end - self.start
    }
}

/// Result of a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Chosen queries in round order.
    pub queries: Vec<Query>,
    /// Target indices never covered by any query, ascending.
    pub unresolved: Vec<usize>,
    /// Terminal state, `Done` or `Exhausted`.
    pub state: PlannerState,
}

impl QueryPlan {
    /// True when every target was resolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

type GroupKey = (Vec<bool>, usize, usize);

/// Plan queries greedily for `target_count` targets over `candidates`.
///
/// Target indices in `candidates` refer to positions in the analyzed target
/// list; indices at or above `target_count` are tolerated but can never
/// appear in the unresolved set.
pub fn plan_queries(target_count: usize, candidates: Vec<Discriminator>) -> QueryPlan {
    let mut unresolved: BTreeSet<usize> = (0..target_count).collect();
    let mut remaining = candidates;
    let mut queries = Vec::new();

    let state = loop {
        if unresolved.is_empty() {
            break PlannerState::Done;
        }
        if remaining.is_empty() {
            break PlannerState::Exhausted;
        }

        let mut groups: HashMap<GroupKey, Vec<usize>> = HashMap::new();
        for c in &remaining {
            groups
                .entry((c.bits.clone(), c.start, c.end))
                .or_default()
                .push(c.target);
        }
        for targets in groups.values_mut() {
            targets.sort_unstable();
            targets.dedup();
        }

        // Total deterministic order: coverage, then start, then window
        // length, then bit value. HashMap iteration order cannot leak into
        // the result because no two groups compare equal.
        let best = groups.into_iter().max_by(|(ka, va), (kb, vb)| {
            va.len()
                .cmp(&vb.len())
                .then_with(|| kb.1.cmp(&ka.1))
                .then_with(|| (kb.2 - kb.1).cmp(&(ka.2 - ka.1)))
                .then_with(|| kb.0.cmp(&ka.0))
        });
        let ((bits, start, end), covered) = match best {
            Some(group) => group,
            None => break PlannerState::Exhausted,
        };

        debug!(
            round = queries.len() + 1,
            start,
            end,
            covered = covered.len(),
            "selected query window"
        );

        for target in &covered {
            unresolved.remove(target);
        }
        let covered_set: HashSet<usize> = covered.iter().copied().collect();
        remaining.retain(|c| !covered_set.contains(&c.target));

        queries.push(Query {
            bits,
            start,
            end,
            covered,
        });
    };

    QueryPlan {
        queries,
        unresolved: unresolved.into_iter().collect(),
        state,
    }
}
