//! I/O boundaries: corpus loading and the result artifact.

pub mod artifact;
pub mod corpus;
