//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wordclique operations
#[derive(Debug, Error)]
pub enum Error {
    /// Word-list fetch failures (network or HTTP status)
    #[error("failed to fetch word list from {url}")]
    CorpusFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A stored value does not decode as the type expected for its key
    #[error("stored value for key {key:?} does not match its expected shape")]
    ShapeMismatch { key: String },

    /// The store file itself is unreadable as a key-value index
    #[error("store file {path:?} is corrupt")]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: postcard::Error,
    },

    /// A signature reachable during expansion has no entry in its stage map
    #[error("no stage entry for signature {signature:?} ({cardinality} letters)")]
    MissingStageEntry { signature: String, cardinality: u32 },

    /// A signature's cardinality does not map onto any stage
    #[error("signature cardinality {cardinality} does not align with base word length {word_length}")]
    UnalignedCardinality { cardinality: u32, word_length: u32 },

    /// A pair record fails the strict-decrease or exact-union check
    #[error("composition graph invariant broken at {parent:?}: pair ({left:?}, {right:?})")]
    GraphInvariant {
        parent: String,
        left: String,
        right: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
