//! Memoized single-file stage store.
//!
//! A get-or-compute cache keyed by stage name. Values are serialized with
//! postcard and tagged with the type they were stored as; reading a key as a
//! different type is a fatal shape mismatch, never a silent coercion. Every
//! compute event appends its wall-clock duration to a per-key timing
//! history under `<key>_times`.
//!
//! The store is an owned value with scoped acquisition: it exists between
//! `open` and drop, so use-after-close cannot be expressed. It is not safe
//! for concurrent writers: exactly one process may hold a store open for
//! the duration of a pipeline run.

use crate::errors::Error;
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A stored value plus the type tag it was serialized as.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    kind: String,
    bytes: Vec<u8>,
}

/// Single-file key-value store for stage results and timing histories.
#[derive(Debug)]
pub struct StageStore {
    path: PathBuf,
    entries: BTreeMap<String, StoredEntry>,
}

impl StageStore {
    /// Open the store file, creating parent directories as needed. A file
    /// that exists but does not decode as a store index is a fatal error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let bytes = fs::read(&path)
                .with_context(|| format!("failed to read store file {}", path.display()))?;
            postcard::from_bytes(&bytes).map_err(|source| Error::StoreCorrupt {
                path: path.clone(),
                source,
            })?
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create store directory {}", parent.display())
                })?;
            }
            BTreeMap::new()
        };
        log::debug!(
            "opened store {} with {} entries",
            path.display(),
            entries.len()
        );
        Ok(Self { path, entries })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Decode the value stored under `key`, if any.
    ///
    /// A value stored as a different type, or bytes that fail to decode,
    /// surface as [`Error::ShapeMismatch`].
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if entry.kind != std::any::type_name::<T>() {
            return Err(Error::ShapeMismatch {
                key: key.to_string(),
            }
            .into());
        }
        let value = postcard::from_bytes(&entry.bytes).map_err(|_| Error::ShapeMismatch {
            key: key.to_string(),
        })?;
        Ok(Some(value))
    }

    /// Return the stored value for `key`, or run `compute`, persist its
    /// result, and append the elapsed time to the key's timing history.
    ///
    /// `force` recomputes even when a value is present. Forcing one key does
    /// not cascade to keys derived from it; callers owning a dependency
    /// chain must force each link themselves.
    pub fn get_or_compute<T, F>(&mut self, key: &str, force: bool, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if !force {
            if let Some(value) = self.lookup(key)? {
                log::debug!("found cached value for {key}");
                return Ok(value);
            }
            log::info!("cached value for {key} not found, computing");
        } else {
            log::info!("disregarding cached value for {key}, computing");
        }

        let started = Instant::now();
        let value = compute()?;
        let elapsed_ns = started.elapsed().as_nanos() as u64;

        self.insert(key, &value)?;
        self.append_time(key, elapsed_ns)?;
        self.flush()?;
        log::info!("{key} computed in {elapsed_ns} ns");
        Ok(value)
    }

    /// Elapsed-time samples (nanoseconds) from every compute event for
    /// `key`, oldest first.
    pub fn times_ns(&self, key: &str) -> Result<Vec<u64>> {
        Ok(self.lookup(&times_key(key))?.unwrap_or_default())
    }

    fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let bytes = postcard::to_allocvec(value)
            .with_context(|| format!("failed to serialize value for {key}"))?;
        self.entries.insert(
            key.to_string(),
            StoredEntry {
                kind: std::any::type_name::<T>().to_string(),
                bytes,
            },
        );
        Ok(())
    }

    fn append_time(&mut self, key: &str, elapsed_ns: u64) -> Result<()> {
        let times_key = times_key(key);
        let mut times: Vec<u64> = self.lookup(&times_key)?.unwrap_or_default();
        times.push(elapsed_ns);
        self.insert(&times_key, &times)
    }

    /// Write the whole index atomically: temp file in the same directory,
    /// then rename over the target.
    fn flush(&self) -> Result<()> {
        let bytes = postcard::to_allocvec(&self.entries).context("failed to serialize store")?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &bytes)
            .with_context(|| format!("failed to write temp store file {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "failed to rename {} -> {}",
                temp_path.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

fn times_key(key: &str) -> String {
    format!("{key}_times")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> StageStore {
        StageStore::open(dir.path().join("stages.store")).unwrap()
    }

    #[test]
    fn test_miss_computes_and_caches() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let value: u64 = store.get_or_compute("answer", false, || Ok(41 + 1)).unwrap();
        assert_eq!(value, 42);
        assert!(store.contains("answer"));

        // Second call must not invoke the closure.
        let value: u64 = store
            .get_or_compute("answer", false, || panic!("should not recompute"))
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_force_recomputes() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.get_or_compute("k", false, || Ok(1u64)).unwrap();
        let value: u64 = store.get_or_compute("k", true, || Ok(2u64)).unwrap();
        assert_eq!(value, 2);

        let cached: Option<u64> = store.lookup("k").unwrap();
        assert_eq!(cached, Some(2));
    }

    #[test]
    fn test_timing_history_appends_per_compute() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.get_or_compute("k", false, || Ok(1u64)).unwrap();
        assert_eq!(store.times_ns("k").unwrap().len(), 1);

        // A cache hit records nothing.
        store.get_or_compute("k", false, || Ok(1u64)).unwrap();
        assert_eq!(store.times_ns("k").unwrap().len(), 1);

        store.get_or_compute("k", true, || Ok(1u64)).unwrap();
        assert_eq!(store.times_ns("k").unwrap().len(), 2);
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store
            .get_or_compute("k", false, || Ok(vec![1u64, 2, 3]))
            .unwrap();

        let err = store.lookup::<BTreeSet<String>>("k").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ShapeMismatch { .. })
        ));

        // get_or_compute must also refuse rather than silently recompute.
        let err = store
            .get_or_compute("k", false, || Ok(BTreeSet::<String>::new()))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = open_store(&dir);
            store
                .get_or_compute("k", false, || Ok("persisted".to_string()))
                .unwrap();
        }
        let store = open_store(&dir);
        let value: Option<String> = store.lookup("k").unwrap();
        assert_eq!(value, Some("persisted".to_string()));
        assert_eq!(store.times_ns("k").unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_store_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stages.store");
        fs::write(&path, b"\xff\xff\xff\xff not a store").unwrap();

        let err = StageStore::open(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::StoreCorrupt { .. })
        ));
    }

    #[test]
    fn test_compute_failure_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let result: Result<u64> =
            store.get_or_compute("k", false, || Err(anyhow::anyhow!("compute failed")));
        assert!(result.is_err());
        assert!(!store.contains("k"));
        assert!(store.times_ns("k").unwrap().is_empty());
    }
}
