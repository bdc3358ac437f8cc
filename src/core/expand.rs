//! Backward expansion of composed signatures.
//!
//! Walks the composition graph from top-level union signatures down to base
//! word signatures. The graph is a DAG, not a tree: the same component
//! signature is reachable through many paths, so both walks memoize by
//! signature instead of recomputing.

use crate::core::classify::AnagramClasses;
use crate::core::compose::{CompositionMap, PairRecord};
use crate::core::signature::Signature;
use crate::errors::Error;
use anyhow::Result;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// What one signature expands into: base signatures carry words directly,
/// composite signatures carry the pairs that produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeExpansion {
    Words(BTreeSet<String>),
    Pairs(BTreeSet<PairRecord>),
}

/// The navigable result: every signature reachable from the starting set,
/// mapped to its expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigableMap {
    pub entries: BTreeMap<Signature, NodeExpansion>,
}

/// Read access to every stage of a completed pipeline, indexed by signature
/// cardinality.
#[derive(Debug, Clone)]
pub struct StageLookup {
    word_length: u32,
    classes: AnagramClasses,
    compositions: [CompositionMap; 4],
}

impl StageLookup {
    /// Assemble a lookup over the base classes and the 2- through 5-word
    /// composition maps.
    pub fn new(
        word_length: usize,
        classes: AnagramClasses,
        two_word: CompositionMap,
        three_word: CompositionMap,
        four_word: CompositionMap,
        five_word: CompositionMap,
    ) -> Self {
        Self {
            word_length: word_length as u32,
            classes,
            compositions: [two_word, three_word, four_word, five_word],
        }
    }

    /// Base word length the stage cardinalities are multiples of.
    pub fn word_length(&self) -> u32 {
        self.word_length
    }

    fn words_for(&self, signature: Signature) -> Result<&BTreeSet<String>> {
        self.classes.get(&signature).ok_or_else(|| {
            Error::MissingStageEntry {
                signature: signature.to_string(),
                cardinality: signature.letter_count(),
            }
            .into()
        })
    }

    fn pairs_for(&self, signature: Signature) -> Result<&BTreeSet<PairRecord>> {
        let cardinality = signature.letter_count();
        let misaligned = || Error::UnalignedCardinality {
            cardinality,
            word_length: self.word_length,
        };
        if self.word_length == 0 || cardinality % self.word_length != 0 {
            return Err(misaligned().into());
        }
        let stage = cardinality / self.word_length;
        if !(2..=5).contains(&stage) {
            return Err(misaligned().into());
        }
        self.compositions[(stage - 2) as usize]
            .get(&signature)
            .ok_or_else(|| {
                Error::MissingStageEntry {
                    signature: signature.to_string(),
                    cardinality,
                }
                .into()
            })
    }

    /// Expand every starting signature into the navigable map.
    ///
    /// Work-stack walk: pop a signature; at base cardinality record its
    /// words, otherwise record its pairs and queue both components. The
    /// visited check makes shared sub-signatures cost one lookup each.
    /// Termination holds because every pair component has strictly fewer
    /// letters than its parent.
    pub fn navigable_map(
        &self,
        starting_points: impl IntoIterator<Item = Signature>,
    ) -> Result<NavigableMap> {
        let mut entries: BTreeMap<Signature, NodeExpansion> = BTreeMap::new();
        let mut work: VecDeque<Signature> = starting_points.into_iter().collect();

        while let Some(signature) = work.pop_back() {
            if entries.contains_key(&signature) {
                continue;
            }
            if signature.letter_count() == self.word_length {
                entries.insert(
                    signature,
                    NodeExpansion::Words(self.words_for(signature)?.clone()),
                );
            } else {
                let pairs = self.pairs_for(signature)?.clone();
                for pair in &pairs {
                    for part in pair.parts() {
                        work.push_front(part);
                    }
                }
                entries.insert(signature, NodeExpansion::Pairs(pairs));
            }
        }

        Ok(NavigableMap { entries })
    }

    /// Every concrete word tuple whose letters union to exactly `start`.
    ///
    /// One tuple per distinct decomposition path, deduplicated; tuples are
    /// canonicalized by sorting, and their words are pairwise letter-disjoint
    /// by construction. Anagram alternatives multiply tuples through the
    /// cartesian product over each base signature's word set.
    pub fn word_tuples(&self, start: Signature) -> Result<BTreeSet<Vec<String>>> {
        let mut memo: BTreeMap<Signature, BTreeSet<Vec<Signature>>> = BTreeMap::new();
        let decompositions = self.decompositions(start, &mut memo)?;

        let mut tuples = BTreeSet::new();
        for base_signatures in &decompositions {
            let word_sets: Vec<&BTreeSet<String>> = base_signatures
                .iter()
                .map(|signature| self.words_for(*signature))
                .collect::<Result<_>>()?;
            for combination in word_sets
                .iter()
                .map(|words| words.iter())
                .multi_cartesian_product()
            {
                let mut tuple: Vec<String> = combination.into_iter().cloned().collect();
                tuple.sort();
                tuples.insert(tuple);
            }
        }
        Ok(tuples)
    }

    /// All ways to split a signature into base-cardinality signatures, as
    /// sorted vectors (components are pairwise disjoint, so sorting gives a
    /// canonical set rendering).
    fn decompositions(
        &self,
        signature: Signature,
        memo: &mut BTreeMap<Signature, BTreeSet<Vec<Signature>>>,
    ) -> Result<BTreeSet<Vec<Signature>>> {
        if let Some(known) = memo.get(&signature) {
            return Ok(known.clone());
        }
        if signature.letter_count() == self.word_length {
            // Probe the class map so a dangling base signature fails here
            // rather than later during tuple assembly.
            self.words_for(signature)?;
            let single = BTreeSet::from([vec![signature]]);
            memo.insert(signature, single.clone());
            return Ok(single);
        }

        let pairs = self.pairs_for(signature)?.clone();
        let mut result = BTreeSet::new();
        for pair in pairs {
            let [left, right] = pair.parts();
            let left_splits = self.decompositions(left, memo)?;
            let right_splits = self.decompositions(right, memo)?;
            for left_split in &left_splits {
                for right_split in &right_splits {
                    let mut merged = left_split.clone();
                    merged.extend(right_split.iter().copied());
                    merged.sort();
                    result.insert(merged);
                }
            }
        }
        memo.insert(signature, result.clone());
        Ok(result)
    }
}

/// Structural acyclicity and consistency check over a navigable map.
///
/// The graph is a DAG by construction, cardinality strictly increases along
/// composition edges, but the check is run before the artifact is emitted
/// anyway: every pair must have strictly smaller, mutually disjoint
/// components whose union reproduces the parent exactly.
pub fn verify_acyclic(map: &NavigableMap) -> Result<()> {
    for (signature, node) in &map.entries {
        if let NodeExpansion::Pairs(pairs) = node {
            for pair in pairs {
                let [left, right] = pair.parts();
                let shrinks = left.letter_count() < signature.letter_count()
                    && right.letter_count() < signature.letter_count();
                if !shrinks || !left.is_disjoint(right) || left.union(right) != *signature {
                    return Err(Error::GraphInvariant {
                        parent: signature.to_string(),
                        left: left.to_string(),
                        right: right.to_string(),
                    }
                    .into());
                }
            }
        }
    }
    Ok(())
}
