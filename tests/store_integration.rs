use std::collections::BTreeSet;
use tempfile::TempDir;
use wordclique::{Error, StageStore};

#[test]
fn test_stores_at_different_paths_are_independent() {
    let dir = TempDir::new().unwrap();
    let mut store_a = StageStore::open(dir.path().join("a.store")).unwrap();
    let mut store_b = StageStore::open(dir.path().join("b.store")).unwrap();

    store_a.get_or_compute("k", false, || Ok(1u64)).unwrap();
    store_b.get_or_compute("k", false, || Ok(2u64)).unwrap();

    assert_eq!(store_a.lookup::<u64>("k").unwrap(), Some(1));
    assert_eq!(store_b.lookup::<u64>("k").unwrap(), Some(2));
}

#[test]
fn test_shape_mismatch_detected_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stages.store");

    {
        let mut store = StageStore::open(&path).unwrap();
        store
            .get_or_compute("stage", false, || Ok(vec![7u64, 8, 9]))
            .unwrap();
    }

    let store = StageStore::open(&path).unwrap();
    let err = store.lookup::<BTreeSet<String>>("stage").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_timing_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stages.store");

    {
        let mut store = StageStore::open(&path).unwrap();
        store.get_or_compute("stage", false, || Ok(1u64)).unwrap();
        store.get_or_compute("stage", true, || Ok(2u64)).unwrap();
    }

    let store = StageStore::open(&path).unwrap();
    let times = store.times_ns("stage").unwrap();
    assert_eq!(times.len(), 2);
}

#[test]
fn test_missing_parent_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/deep/stages.store");
    let mut store = StageStore::open(&path).unwrap();
    store.get_or_compute("k", false, || Ok(1u64)).unwrap();
    assert!(path.exists());
}
