//! Core types and algorithms: letter signatures, anagram classification,
//! the disjoint-union composition engine, its parallel executor, and the
//! backward expansion of composed signatures into word tuples.

pub mod classify;
pub mod compose;
pub mod expand;
pub mod parallel;
pub mod signature;

pub use classify::{anagram_classes, heterogram_words, AnagramClasses};
pub use compose::{disjoint_unions, merge_into, CompositionMap, PairRecord};
pub use expand::{verify_acyclic, NavigableMap, NodeExpansion, StageLookup};
pub use parallel::{compose_partitioned, ParallelConfig};
pub use signature::Signature;
