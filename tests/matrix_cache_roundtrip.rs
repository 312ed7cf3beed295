use heatmap_sieve::config::TravelMode;
use heatmap_sieve::heatmap_error::HeatmapError;
use heatmap_sieve::io::travel_time_matrix::{BulkProvenance, TravelTimeMatrix};
use heatmap_sieve::io::{CacheKey, CachedMatrix, Column, MatrixCache};

fn key(batch_id: u64) -> CacheKey {
    CacheKey::for_mode(TravelMode::Walking, "standard", batch_id).unwrap()
}

fn bulk_matrix() -> TravelTimeMatrix {
    TravelTimeMatrix::new(vec![87_001, 87_002, 87_002], vec![3.0, 7.5, 12.0]).with_provenance(
        BulkProvenance {
            west: vec![34_120; 3],
            north: vec![22_870; 3],
            zoom: vec![16; 3],
            width: vec![128; 3],
            height: vec![96; 3],
        },
    )
}

#[test]
fn numeric_and_string_columns_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path());
    let matrix = bulk_matrix()
        .to_cached()
        .unwrap()
        .with_column(
            "meta",
            vec![
                r#"{"poi":"atm"}"#.to_string(),
                String::new(),
                "ünïcode".to_string(),
            ],
        )
        .unwrap();

    let path = cache.store(&key(42), &matrix).unwrap();
    assert_eq!(path, dir.path().join("walking/standard/42.ttm"));
    assert!(cache.contains(&key(42)));

    let back = cache.load(&key(42)).unwrap();
    assert_eq!(back, matrix);
    assert!(matches!(back.get("grid_ids"), Some(Column::Int(_))));
    assert!(matches!(back.get("travel_times"), Some(Column::Float(_))));
    assert!(matches!(back.get("meta"), Some(Column::Str(_))));
    assert_eq!(TravelTimeMatrix::from_cached(&back).unwrap(), bulk_matrix());
}

#[test]
fn store_replaces_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path());
    cache.store(&key(1), &bulk_matrix().to_cached().unwrap()).unwrap();

    let smaller = TravelTimeMatrix::new(vec![5], vec![1.0]).to_cached().unwrap();
    cache.store(&key(1), &smaller).unwrap();
    assert_eq!(cache.load(&key(1)).unwrap(), smaller);

    let entries: Vec<_> = std::fs::read_dir(dir.path().join("walking/standard"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("1.ttm")]);
}

#[test]
fn missing_key_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path());
    assert!(matches!(
        cache.load(&key(9)),
        Err(HeatmapError::CacheNotFound { .. })
    ));
    assert!(!cache.contains(&key(9)));
    assert_eq!(cache.remove(&key(9)), Ok(false));
}

#[test]
fn unwritable_base_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"x").unwrap();
    let cache = MatrixCache::new(&blocker);
    let err = cache
        .store(&key(3), &CachedMatrix::new())
        .unwrap_err();
    assert!(matches!(err, HeatmapError::CacheStorage { .. }), "{err:?}");
}

#[test]
fn failed_rename_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path());
    let neighbour = TravelTimeMatrix::new(vec![9], vec![2.5]).to_cached().unwrap();
    cache.store(&key(2), &neighbour).unwrap();

    // a non-empty directory squatting on the target path makes the rename fail
    let target = cache.path_for(&key(1));
    std::fs::create_dir_all(target.join("occupied")).unwrap();

    let err = cache
        .store(&key(1), &bulk_matrix().to_cached().unwrap())
        .unwrap_err();
    assert!(matches!(err, HeatmapError::CacheStorage { .. }), "{err:?}");

    let mut entries: Vec<String> = std::fs::read_dir(dir.path().join("walking/standard"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["1.ttm".to_string(), "2.ttm".to_string()]);
    assert!(target.join("occupied").is_dir());
    assert_eq!(cache.load(&key(2)).unwrap(), neighbour);
}

#[test]
fn corrupt_file_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path());
    let path = cache.store(&key(5), &bulk_matrix().to_cached().unwrap()).unwrap();
    std::fs::write(&path, b"TTMC\x01garbage").unwrap();
    assert!(matches!(
        cache.load(&key(5)),
        Err(HeatmapError::CacheFormat(_))
    ));
}

#[test]
fn remove_deletes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path());
    cache.store(&key(8), &CachedMatrix::new()).unwrap();
    assert_eq!(cache.remove(&key(8)), Ok(true));
    assert!(!cache.contains(&key(8)));
}

#[test]
fn cached_matrix_feeds_the_sample_store() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MatrixCache::new(dir.path());
    cache.store(&key(77), &bulk_matrix().to_cached().unwrap()).unwrap();
    let samples = TravelTimeMatrix::from_cached(&cache.load(&key(77)).unwrap())
        .unwrap()
        .into_samples()
        .unwrap();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples.grid_ids(), &[87_001, 87_002, 87_002]);
}
