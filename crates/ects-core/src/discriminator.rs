//! Unique-substring extraction
//!
//! For every target code, enumerates bit windows `(start, length)` and keeps
//! those whose value appears in no background code at the same offsets. Each
//! surviving window is a candidate discriminator: broadcasting it in a
//! SELECT mask singles the target out of the surrounding population.
//!
//! Windows are enumerated lengths-first from `l_min` to `l_max`, offsets
//! left-to-right within each length, so the candidate list order is
//! deterministic. A target may contribute zero, one, or many candidates;
//! zero means the target is indistinguishable within the searched range.
//!
//! With the `parallel` cargo feature enabled, [`extract_parallel`] searches
//! targets concurrently. Candidates are independent per target, and the
//! output is identical to the sequential path.

use serde::{Deserialize, Serialize};

use crate::types::TagCode;

/// A candidate discriminator: one target's unique bit window.
///
/// `start`/`end` bound the half-open bit range `[start, end)`; `target` is
/// the index of the owning code in the analyzed target list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    /// Index of the target code this window belongs to.
    pub target: usize,
    /// The window's bit value.
    pub bits: Vec<bool>,
    /// First bit offset of the window.
    pub start: usize,
    /// One past the last bit offset of the window.
    pub end: usize,
}

impl Discriminator {
    /// Window length in bits.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True only for a degenerate zero-width window.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// True when any background code carries exactly `window` over
/// `[start, end)`. Codes too short for the range cannot match.
fn background_matches(window: &[bool], background: &[TagCode], start: usize, end: usize) -> bool {
    background
        .iter()
        .any(|code| code.len() >= end && code.window(start, end) == window)
}

fn extract_for_target(
    target: usize,
    code: &TagCode,
    background: &[TagCode],
    l_min: usize,
    l_max: usize,
) -> Vec<Discriminator> {
    let mut found = Vec::new();
    for length in l_min..=l_max {
        if length == 0 || length > code.len() {
            continue;
        }
        for start in 0..=code.len() - length {
            let end = start + length;
            let window = code.window(start, end);
            if !background_matches(window, background, start, end) {
                found.push(Discriminator {
                    target,
                    bits: window.to_vec(),
                    start,
                    end,
                });
            }
        }
    }
    found
}

/// Extract all candidate discriminators for `targets` against `background`,
/// searching window lengths in `[l_min, l_max]`.
pub fn extract(
    targets: &[TagCode],
    background: &[TagCode],
    l_min: usize,
    l_max: usize,
) -> Vec<Discriminator> {
    targets
        .iter()
        .enumerate()
        .flat_map(|(idx, code)| extract_for_target(idx, code, background, l_min, l_max))
        .collect()
}

/// Parallel variant of [`extract`]; one rayon task per target.
#[cfg(feature = "parallel")]
pub fn extract_parallel(
    targets: &[TagCode],
    background: &[TagCode],
    l_min: usize,
    l_max: usize,
) -> Vec<Discriminator> {
    use rayon::prelude::*;

    targets
        .par_iter()
        .enumerate()
        .map(|(idx, code)| extract_for_target(idx, code, background, l_min, l_max))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(texts: &[&str]) -> Vec<TagCode> {
        texts
            .iter()
            .map(|t| TagCode::from_text(t).unwrap())
            .collect()
    }

    #[test]
    fn test_single_distinguishing_bit() {
        // Target starts with 1, all background codes start with 0. The
        // 1-bit window at offset 0 is the shortest discriminator.
        let targets = codes(&["1010"]);
        let background = codes(&["0010", "0110", "0001"]);
        let found = extract(&targets, &background, 1, 1);
        assert!(found.contains(&Discriminator {
            target: 0,
            bits: vec![true],
            start: 0,
            end: 1,
        }));
    }

    #[test]
    fn test_no_candidate_when_target_in_background() {
        // Every window of the target also occurs in the identical
        // background code, so nothing survives.
        let targets = codes(&["1010"]);
        let background = codes(&["1010", "0101"]);
        assert!(extract(&targets, &background, 1, 4).is_empty());
    }

    #[test]
    fn test_negative_existence_holds_by_construction() {
        let targets = codes(&["110100", "011011"]);
        let background = codes(&["101010", "010101", "111000", "000111"]);
        for d in extract(&targets, &background, 1, 6) {
            assert!(
                !background_matches(&d.bits, &background, d.start, d.end),
                "candidate {:?} collides with the background",
                d
            );
            assert_eq!(targets[d.target].window(d.start, d.end), &d.bits[..]);
        }
    }

    #[test]
    fn test_enumeration_order() {
        // Lengths ascend first, then offsets left-to-right within a length.
        let targets = codes(&["11"]);
        let background = codes(&["00"]);
        let found = extract(&targets, &background, 1, 2);
        let ranges: Vec<(usize, usize)> = found.iter().map(|d| (d.start, d.end)).collect();
        assert_eq!(ranges, vec![(0, 1), (1, 2), (0, 2)]);
    }

    #[test]
    fn test_empty_background_accepts_everything() {
        let targets = codes(&["101"]);
        let found = extract(&targets, &[], 1, 3);
        // 3 windows of length 1, 2 of length 2, 1 of length 3
        assert_eq!(found.len(), 6);
    }

    #[test]
    fn test_empty_targets() {
        let background = codes(&["101"]);
        assert!(extract(&[], &background, 1, 3).is_empty());
    }

    #[test]
    fn test_length_range_beyond_code_width() {
        // Lengths longer than the code itself contribute nothing.
        let targets = codes(&["10"]);
        let found = extract(&targets, &[], 1, 8);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_shared_window_found_for_both_targets() {
        // Both targets carry 11 at offset 0; the background does not.
        let targets = codes(&["1100", "1101"]);
        let background = codes(&["0011", "0101"]);
        let found = extract(&targets, &background, 2, 2);
        let owners: Vec<usize> = found
            .iter()
            .filter(|d| d.start == 0 && d.bits == vec![true, true])
            .map(|d| d.target)
            .collect();
        assert_eq!(owners, vec![0, 1]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let targets = crate::population::generate_codes_seeded(8, 32, 11);
        let background = crate::population::generate_codes_seeded(64, 32, 12);
        assert_eq!(
            extract(&targets, &background, 1, 8),
            extract_parallel(&targets, &background, 1, 8)
        );
    }
}
