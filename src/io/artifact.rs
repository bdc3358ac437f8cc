//! Result artifact serialization.
//!
//! The navigable expansion result is dumped as JSON keyed by signature
//! letter strings. JSON round-trips the structure exactly and its
//! deserialization executes nothing, which is the whole reason it was
//! chosen over a language-literal dump.

use crate::core::compose::CompositionMap;
use crate::core::expand::{NavigableMap, NodeExpansion};
use crate::core::signature::Signature;
use crate::core::AnagramClasses;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// One artifact node: base signatures carry their words, composite
/// signatures carry their producing pairs as letter-string twins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNode {
    Words(BTreeSet<String>),
    Pairs(BTreeSet<[String; 2]>),
}

/// Serialized rendering of a navigable map, keyed by letter strings.
pub type Artifact = BTreeMap<String, ArtifactNode>;

/// Render a navigable map into its artifact form.
pub fn artifact_from_navigable(map: &NavigableMap) -> Artifact {
    map.entries
        .iter()
        .map(|(signature, node)| {
            let rendered = match node {
                NodeExpansion::Words(words) => ArtifactNode::Words(words.clone()),
                NodeExpansion::Pairs(pairs) => ArtifactNode::Pairs(
                    pairs
                        .iter()
                        .map(|pair| {
                            let [lo, hi] = pair.parts();
                            [lo.to_string(), hi.to_string()]
                        })
                        .collect(),
                ),
            };
            (signature.to_string(), rendered)
        })
        .collect()
}

/// Render every stage map under its stage name, base classes included.
pub fn artifact_from_stages(
    classes: &AnagramClasses,
    stages: &[(&str, &CompositionMap)],
) -> BTreeMap<String, Artifact> {
    let mut dump = BTreeMap::new();
    dump.insert(
        "anagrams".to_string(),
        classes
            .iter()
            .map(|(signature, words)| {
                (signature.to_string(), ArtifactNode::Words(words.clone()))
            })
            .collect(),
    );
    for (name, map) in stages {
        let rendered: Artifact = map
            .iter()
            .map(|(signature, pairs)| {
                (
                    signature.to_string(),
                    ArtifactNode::Pairs(
                        pairs
                            .iter()
                            .map(|pair| {
                                let [lo, hi] = pair.parts();
                                [lo.to_string(), hi.to_string()]
                            })
                            .collect(),
                    ),
                )
            })
            .collect();
        dump.insert((*name).to_string(), rendered);
    }
    dump
}

/// Write a JSON value to `path`, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write artifact {}", path.display()))?;
    log::info!("wrote artifact {}", path.display());
    Ok(())
}

/// Read an artifact back from `path`.
pub fn read_artifact(path: &Path) -> Result<Artifact> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read artifact {}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
}

/// Parse an artifact key back into a signature.
pub fn parse_key(key: &str) -> Result<Signature> {
    key.parse()
        .with_context(|| format!("artifact key {key:?} is not a signature"))
}
