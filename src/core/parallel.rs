//! Parallel map-reduce execution of the composition engine.
//!
//! The outer signature collection is partitioned into chunks, the inner
//! collection is broadcast read-only to every worker as a reference-counted
//! snapshot, each chunk runs the engine independently on rayon's thread
//! pool, and the partial maps are merged sequentially in the coordinating
//! thread once every chunk has completed.

use crate::core::compose::{disjoint_unions, merge_into, CompositionMap};
use crate::core::signature::Signature;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default value for parallel processing enabled
fn default_enabled() -> bool {
    true
}

/// Configuration for parallel stage composition.
///
/// When disabled, stages are composed sequentially in the coordinating
/// thread, which is useful for debugging and for the equivalence tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Enable parallel composition (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum worker count (default: all available cores)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
        }
    }
}

impl ParallelConfig {
    /// Create a config with parallel composition disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Get the effective worker count.
    ///
    /// Returns the configured `max_concurrency`, or the number of available
    /// CPU cores if not specified.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(num_cpus)
    }
}

/// Returns the number of available CPU cores.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// Compose `outer × inner` with the outer collection partitioned across
/// workers.
///
/// Chunk size is `ceil(outer / workers)`. Workers mutate nothing shared;
/// each receives its own clone of the `Arc` snapshot of the inner
/// collection. The `collect` is a full barrier; reduction starts only after
/// every partition has finished, and runs sequentially so the per-key set
/// unions happen in one place.
pub fn compose_partitioned(
    outer: &[Signature],
    inner: &Arc<[Signature]>,
    config: &ParallelConfig,
) -> CompositionMap {
    if !config.enabled || outer.len() <= 1 {
        return disjoint_unions(outer, inner);
    }

    let workers = config.effective_concurrency().max(1);
    let chunk_size = outer.len().div_ceil(workers);

    let partials: Vec<CompositionMap> = outer
        .par_chunks(chunk_size)
        .map(|chunk| {
            let snapshot = Arc::clone(inner);
            disjoint_unions(chunk, &snapshot)
        })
        .collect();

    let mut merged = CompositionMap::new();
    for partial in partials {
        merge_into(&mut merged, partial);
    }
    merged
}
