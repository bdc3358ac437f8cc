//! Pairwise disjoint-union composition engine.
//!
//! Given two collections of signatures, emit every disjoint pairing keyed by
//! its union signature. Accumulation is commutative and associative, so the
//! result is independent of iteration order or partitioning, which is the property
//! the parallel executor relies on.

use crate::core::signature::Signature;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An unordered pair of signatures whose disjoint union produced a composite
/// signature. Stored canonically with `lo <= hi` so that `{a, b}` and
/// `{b, a}` compare equal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PairRecord {
    lo: Signature,
    hi: Signature,
}

impl PairRecord {
    /// Build the canonical unordered pair.
    pub fn new(a: Signature, b: Signature) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Both component signatures, low mask first.
    pub fn parts(self) -> [Signature; 2] {
        [self.lo, self.hi]
    }

    /// The disjoint union of both components.
    pub fn union(self) -> Signature {
        self.lo.union(self.hi)
    }
}

/// One pipeline stage: a composite signature mapped to every unordered pair
/// that produces it.
pub type CompositionMap = BTreeMap<Signature, BTreeSet<PairRecord>>;

/// Compose every disjoint `(outer, inner)` signature pair.
///
/// For each outer `s1` and inner `s2` with `s1 ∩ s2 = ∅`, the pair
/// `{s1, s2}` is recorded under the key `s1 ∪ s2`. When both collections are
/// the same (the first composition stage), symmetric duplicates collapse
/// because [`PairRecord`] is an unordered value. The disjointness test is the
/// sole correctness-critical branch: signatures sharing any letter are never
/// paired, and a signature can never pair with itself.
pub fn disjoint_unions(outer: &[Signature], inner: &[Signature]) -> CompositionMap {
    let mut result = CompositionMap::new();
    for &s1 in outer {
        for &s2 in inner {
            if s1.is_disjoint(s2) {
                result
                    .entry(s1.union(s2))
                    .or_default()
                    .insert(PairRecord::new(s1, s2));
            }
        }
    }
    result
}

/// Merge a partial composition map into an accumulator by per-key set union.
///
/// Never overwrites: two partitions may discover the same union signature
/// through different pairs, and both pair sets must survive the reduce.
pub fn merge_into(accumulator: &mut CompositionMap, partial: CompositionMap) {
    for (key, pairs) in partial {
        accumulator.entry(key).or_default().extend(pairs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sig(s: &str) -> Signature {
        s.parse().unwrap()
    }

    #[test]
    fn test_pair_record_is_unordered() {
        let a = sig("ab");
        let b = sig("cd");
        assert_eq!(PairRecord::new(a, b), PairRecord::new(b, a));
    }

    #[test]
    fn test_two_letter_example() {
        // Corpus {"ab", "cd", "ef", "ba"} classifies to three signatures.
        let sigs = vec![sig("ab"), sig("cd"), sig("ef")];
        let result = disjoint_unions(&sigs, &sigs);

        assert_eq!(result.len(), 3);
        assert_eq!(
            result[&sig("abcd")],
            BTreeSet::from([PairRecord::new(sig("ab"), sig("cd"))])
        );
        assert_eq!(
            result[&sig("abef")],
            BTreeSet::from([PairRecord::new(sig("ab"), sig("ef"))])
        );
        assert_eq!(
            result[&sig("cdef")],
            BTreeSet::from([PairRecord::new(sig("cd"), sig("ef"))])
        );
    }

    #[test]
    fn test_no_self_union() {
        let sigs = vec![sig("ab")];
        let result = disjoint_unions(&sigs, &sigs);
        assert!(result.is_empty());
    }

    #[test]
    fn test_overlapping_signatures_never_pair() {
        let result = disjoint_unions(&[sig("ab")], &[sig("bc")]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_merge_into_unions_value_sets() {
        let mut acc = disjoint_unions(&[sig("ab")], &[sig("cd")]);
        let partial = disjoint_unions(&[sig("cd")], &[sig("ab")]);
        // Same key, same unordered pair: merging must not duplicate.
        merge_into(&mut acc, partial);
        assert_eq!(acc[&sig("abcd")].len(), 1);

        // A different pair under the same key must be kept alongside.
        let other = disjoint_unions(&[sig("ac")], &[sig("bd")]);
        merge_into(&mut acc, other);
        assert_eq!(acc[&sig("abcd")].len(), 2);
    }

    fn arbitrary_signatures() -> impl Strategy<Value = Vec<Signature>> {
        // Masks over the first 12 letters keep the pair space dense enough
        // that disjoint pairs actually occur.
        proptest::collection::vec(1u32..(1 << 12), 1..24).prop_map(|masks| {
            masks
                .into_iter()
                .map(|m| {
                    let rendered: String = (0u8..12)
                        .filter(|i| m & (1u32 << i) != 0)
                        .map(|i| (b'a' + i) as char)
                        .collect();
                    rendered.parse().unwrap()
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_pairs_are_disjoint_and_cardinalities_add(
            outer in arbitrary_signatures(),
            inner in arbitrary_signatures(),
        ) {
            let result = disjoint_unions(&outer, &inner);
            for (key, pairs) in &result {
                for pair in pairs {
                    let [a, b] = pair.parts();
                    prop_assert!(a.is_disjoint(b));
                    prop_assert_eq!(a.union(b), *key);
                    prop_assert_eq!(
                        key.letter_count(),
                        a.letter_count() + b.letter_count()
                    );
                }
            }
        }

        #[test]
        fn prop_result_is_order_independent(
            outer in arbitrary_signatures(),
            inner in arbitrary_signatures(),
        ) {
            let forward = disjoint_unions(&outer, &inner);
            let mut reversed_outer = outer.clone();
            reversed_outer.reverse();
            let backward = disjoint_unions(&reversed_outer, &inner);
            prop_assert_eq!(forward, backward);
        }
    }
}
