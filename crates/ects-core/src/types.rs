//! Core types for tag discrimination
//!
//! This module defines the fundamental types used throughout the engine,
//! particularly [`TagCode`], the fixed-width binary identifier a passive
//! tag backscatters during inventory.
//!
//! ## Representation
//!
//! Tag codes are kept as explicit bit vectors rather than packed integers.
//! The discrimination algorithm works on arbitrary bit windows at arbitrary
//! offsets, so direct slice access to individual bits is the common
//! operation, and configured code widths are not limited to a machine word.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for engine operations
pub type EctsResult<T> = Result<T, EctsError>;

/// Errors that can occur during tag analysis
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EctsError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("window length formula undefined for background of size {background}; need at least 2 background codes")]
    DegenerateLogInput { background: usize },

    #[error("code length mismatch: expected {expected} bits, got {actual}")]
    CodeLengthMismatch { expected: usize, actual: usize },

    #[error("invalid bit character {0:?}; codes contain only '0' and '1'")]
    InvalidBitChar(char),
}

/// A fixed-width binary tag identifier.
///
/// Codes are immutable once created. Equality and hashing compare the full
/// bit pattern, which makes `TagCode` directly usable in deduplication sets.
///
/// # Example
///
/// ```
/// use ects_core::types::TagCode;
///
/// let code: TagCode = "10110010".parse().unwrap();
/// assert_eq!(code.len(), 8);
/// assert_eq!(code.window(2, 5), &[true, true, false]);
/// assert_eq!(code.to_string(), "10110010");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagCode {
    bits: Vec<bool>,
}

impl TagCode {
    /// Create a code from raw bits.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Parse a code from its `'0'`/`'1'` text form.
    pub fn from_text(text: &str) -> EctsResult<Self> {
        let bits = text
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(EctsError::InvalidBitChar(other)),
            })
            .collect::<EctsResult<Vec<bool>>>()?;
        Ok(Self { bits })
    }

    /// Build a code from the low `bit_length` bits of `value`, MSB first.
    ///
    /// Convenient for constructing known test populations. `bit_length`
    /// must not exceed 32.
    pub fn from_u32(value: u32, bit_length: usize) -> EctsResult<Self> {
        if bit_length > 32 {
            return Err(EctsError::InvalidConfiguration(format!(
                "from_u32 supports at most 32 bits, got {bit_length}"
            )));
        }
        let bits = (0..bit_length)
            .rev()
            .map(|i| (value >> i) & 1 == 1)
            .collect();
        Ok(Self { bits })
    }

    /// Code width in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for the zero-width code.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The full bit pattern.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// The half-open bit range `[start, end)`.
    ///
    /// # Panics
    /// Panics if `start > end` or `end > self.len()`.
    pub fn window(&self, start: usize, end: usize) -> &[bool] {
        &self.bits[start..end]
    }
}

impl fmt::Display for TagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl FromStr for TagCode {
    type Err = EctsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_text_roundtrip() {
        let code = TagCode::from_text("10110010").unwrap();
        assert_eq!(code.len(), 8);
        assert_eq!(code.to_string(), "10110010");
    }

    #[test]
    fn test_from_text_rejects_bad_char() {
        assert_eq!(
            TagCode::from_text("10x1"),
            Err(EctsError::InvalidBitChar('x'))
        );
    }

    #[test]
    fn test_from_u32_msb_first() {
        let code = TagCode::from_u32(0b1010, 4).unwrap();
        assert_eq!(code.bits(), &[true, false, true, false]);
    }

    #[test]
    fn test_from_u32_full_width() {
        let code = TagCode::from_u32(1, 32).unwrap();
        assert_eq!(code.len(), 32);
        assert!(code.bits()[31]);
        assert!(code.bits()[..31].iter().all(|&b| !b));
    }

    #[test]
    fn test_from_u32_rejects_wide_codes() {
        assert!(matches!(
            TagCode::from_u32(0, 33),
            Err(EctsError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_window() {
        let code = TagCode::from_text("0110").unwrap();
        assert_eq!(code.window(1, 3), &[true, true]);
        assert_eq!(code.window(0, 4), code.bits());
        assert!(code.window(2, 2).is_empty());
    }

    #[test]
    fn test_dedup_in_hash_set() {
        let mut seen = HashSet::new();
        assert!(seen.insert(TagCode::from_text("1010").unwrap()));
        assert!(!seen.insert(TagCode::from_text("1010").unwrap()));
        assert!(seen.insert(TagCode::from_text("1011").unwrap()));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_parse_via_from_str() {
        let code: TagCode = "001".parse().unwrap();
        assert_eq!(code.bits(), &[false, false, true]);
    }
}
