// Export modules for library usage
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod pipeline;

// Re-export commonly used types
pub use crate::core::{
    anagram_classes, compose_partitioned, disjoint_unions, heterogram_words, merge_into,
    verify_acyclic, AnagramClasses, CompositionMap, NavigableMap, NodeExpansion, PairRecord,
    ParallelConfig, Signature, StageLookup,
};

pub use crate::cache::StageStore;
pub use crate::config::PipelineConfig;
pub use crate::errors::Error;
pub use crate::io::corpus::{HttpSource, WordSource};
pub use crate::pipeline::Pipeline;
