use crate::{
    error::AnalysisError,
    name::{decode, ParamKind},
    record::RawResults,
    store::{BenchmarkStore, SharedStore},
    test_util::{raw, record, repeated, store, SORT_NAMES},
    ValueChannel,
};
use std::thread;

#[test]
pub fn load_rejects_malformed_names() {
    let (store, rejected) = BenchmarkStore::load(RawResults {
        records: vec![
            raw("BM_Ok/1", 10.0),
            raw("<int>/1", 10.0),
            raw("BM_Open<int/1", 10.0),
        ],
        ..Default::default()
    });

    assert_eq!(store.len(), 1);
    assert_eq!(rejected.len(), 2);
    assert!(rejected
        .iter()
        .all(|error| matches!(error, AnalysisError::MalformedName { .. })));
}

#[test]
pub fn metadata_is_scanned() {
    let mut with_bytes = raw("BM_Copy<int,8>/1/2/3", 10.0);
    with_bytes.bytes_per_second = Some(1.0e6);

    let store = BenchmarkStore::from_records(vec![
        record(with_bytes),
        record(repeated("BM_Sort/8", &[1.0, 2.0])),
    ]);
    let meta = store.metadata();

    assert!(meta.has_aggregate);
    assert!(meta.has_bytes_sec);
    assert!(!meta.has_items_sec);
    assert_eq!(meta.max_templates, 2);
    assert_eq!(meta.max_arguments, 3);
    assert!(meta.has_params());
    assert!(!BenchmarkStore::default().metadata().has_params());
}

#[test]
pub fn duplicate_names_are_renamed() {
    let store = store(&["BM_A/1", "BM_A/1", "BM_A/1"]);

    let names = store
        .records()
        .iter()
        .map(|record| record.full_name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["BM_A/1", "BM_A#2/1", "BM_A#3/1"]);
    // raw names stay untouched
    assert!(store.records().iter().all(|record| record.name == "BM_A/1"));
}

#[test]
pub fn param_name_falls_back_to_empty() {
    let store = store(&SORT_NAMES);

    assert_eq!(store.param_name(ParamKind::Template, 0, 0), "int");
    assert_eq!(store.param_name(ParamKind::Argument, 4, 0), "16");
    assert_eq!(store.param_name(ParamKind::Argument, 4, 2), "");
    assert_eq!(store.param_name(ParamKind::Argument, 99, 0), "");
    assert_eq!(store.param_name(ParamKind::Empty, 0, 0), "");
}

#[test]
pub fn append_keeps_existing_and_counts() {
    let mut left = store(&["BM_A/1", "BM_A/2"]);
    let right = store(&["BM_A/2", "BM_B/1"]);

    left.append_results(right);

    assert_eq!(left.len(), 4);
    let names = left
        .records()
        .iter()
        .map(|record| record.full_name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["BM_A/1", "BM_A/2", "BM_A#2/2", "BM_B/1"]);
    assert_eq!(
        left.segment_families(&left.all_indices()).len(),
        3,
        "renamed records form their own family"
    );
}

#[test]
pub fn overwrite_replaces_in_place() {
    let mut left = store(&["BM_A/1", "BM_A/2", "BM_A/3"]);
    let right = BenchmarkStore::from_records(vec![
        record(raw("BM_A/2", 99_000.0)),
        record(raw("BM_A/4", 1_000.0)),
    ]);

    left.overwrite_results(right);

    assert_eq!(left.len(), 4);
    let position = left
        .find(&decode("BM_A/2").unwrap())
        .expect("overwritten record is still there");
    assert_eq!(position, 1);
    assert_eq!(
        left.record(position).unwrap().value(ValueChannel::CpuTime),
        99.0
    );
    assert_eq!(
        left.records()
            .iter()
            .filter(|record| record.full_name() == "BM_A/2")
            .count(),
        1
    );
    assert_eq!(left.record(3).unwrap().full_name(), "BM_A/4");
}

#[test]
pub fn merges_recompute_metadata() {
    let mut left = store(&["BM_A/1"]);
    assert!(!left.metadata().has_aggregate);

    left.append_results(BenchmarkStore::from_records(vec![record(repeated(
        "BM_B<int>/1/2",
        &[1.0, 2.0, 3.0],
    ))]));
    let meta = *left.metadata();
    assert!(meta.has_aggregate);
    assert_eq!(meta.max_templates, 1);
    assert_eq!(meta.max_arguments, 2);

    left.overwrite_results(BenchmarkStore::from_records(vec![record(raw(
        "BM_B<int>/1/2",
        5.0,
    ))]));
    assert!(!left.metadata().has_aggregate);
}

#[test]
pub fn shared_store_snapshots() {
    let shared = SharedStore::new(store(&["BM_A/1"]));
    let before = shared.read();

    let writer = {
        let shared = shared.clone();
        thread::spawn(move || shared.append_results(store(&["BM_B/1"])))
    };

    // the reader keeps a consistent view while it holds its guard
    assert_eq!(before.len(), 1);
    drop(before);
    writer.join().unwrap();

    assert_eq!(shared.read().len(), 2);
    assert_eq!(shared.snapshot().len(), 2);

    shared.replace(BenchmarkStore::default());
    assert!(shared.read().is_empty());
}
