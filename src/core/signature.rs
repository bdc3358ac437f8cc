//! Canonical letter-set signatures.
//!
//! A [`Signature`] is the set of distinct letters in a word, packed into a
//! `u32` bitmask with one bit per letter `a..=z`. Equality, hashing,
//! disjointness, and union are all O(1) bit operations, which is what makes
//! the composition stages tractable: every candidate pairing reduces to a
//! single `AND`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ALPHABET_SIZE: u8 = 26;

/// The distinct-letter set of a word, as a bitmask over `a..=z`.
///
/// Two words share a signature exactly when they are anagrams of each other.
/// The derived `Ord` follows the raw mask value and is only used to keep
/// collections deterministic; it has no linguistic meaning.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Signature(u32);

impl Signature {
    /// Build a signature from a word, rejecting anything that is not a
    /// heterogram: every character must be an ASCII lowercase letter and
    /// must appear exactly once.
    pub fn try_from_word(word: &str) -> Option<Signature> {
        let mut mask = 0u32;
        for byte in word.bytes() {
            if !byte.is_ascii_lowercase() {
                return None;
            }
            let bit = 1u32 << (byte - b'a');
            if mask & bit != 0 {
                // repeated letter
                return None;
            }
            mask |= bit;
        }
        (mask != 0).then_some(Signature(mask))
    }

    /// True when the two signatures share no letter.
    pub fn is_disjoint(self, other: Signature) -> bool {
        self.0 & other.0 == 0
    }

    /// The combined letter set of both signatures.
    pub fn union(self, other: Signature) -> Signature {
        Signature(self.0 | other.0)
    }

    /// Number of distinct letters in the signature.
    pub fn letter_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Raw bitmask, exposed for benchmarks and debugging.
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..ALPHABET_SIZE {
            if self.0 & (1u32 << index) != 0 {
                write!(f, "{}", (b'a' + index) as char)?;
            }
        }
        Ok(())
    }
}

/// Error parsing a signature from its letter-string rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid signature string {0:?}")]
pub struct ParseSignatureError(pub String);

impl FromStr for Signature {
    type Err = ParseSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signature::try_from_word(s).ok_or_else(|| ParseSignatureError(s.to_string()))
    }
}
