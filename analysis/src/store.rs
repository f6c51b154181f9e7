use crate::{
    error::AnalysisError,
    name::{DecodedName, ParamKind},
    record::{BenchmarkRecord, RawResults},
};
use parking_lot::{lock_api::ArcRwLockReadGuard, RawRwLock, RwLock};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tracing::{debug, error, info, warn};

/// Summary of a store used to populate axis and value choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub has_aggregate: bool,
    pub has_bytes_sec: bool,
    pub has_items_sec: bool,
    pub max_templates: usize,
    pub max_arguments: usize,
}

impl StoreMetadata {
    pub fn scan(records: &[BenchmarkRecord]) -> Self {
        records.iter().fold(Self::default(), |meta, record| Self {
            has_aggregate: meta.has_aggregate || record.has_aggregate,
            has_bytes_sec: meta.has_bytes_sec || record.bytes_per_second.is_some(),
            has_items_sec: meta.has_items_sec || record.items_per_second.is_some(),
            max_templates: meta.max_templates.max(record.templates().len()),
            max_arguments: meta.max_arguments.max(record.arguments().len()),
        })
    }

    /// true if any record can be placed on a name based axis
    pub fn has_params(&self) -> bool {
        self.max_arguments > 0 || self.max_templates > 0
    }
}

/// Ordered, owned collection of decoded benchmark records
///
/// Full decoded names are unique within a store. Grouping and statistics only
/// ever read from it; it changes through `append_results` and
/// `overwrite_results`, which swap in a new record list and metadata at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkStore {
    records: Vec<BenchmarkRecord>,
    meta: StoreMetadata,
}

impl BenchmarkStore {
    /// Decode all raw records of one results file
    ///
    /// Records with a malformed name are left out and returned next to the
    /// store. Records decoding to an already seen full name are renamed the
    /// same way `append_results` does it.
    #[tracing::instrument(level = "debug", skip(raw), fields(records = raw.records.len()))]
    pub fn load(raw: RawResults) -> (Self, Vec<AnalysisError>) {
        let mut rejected = Vec::new();
        let mut records = Vec::with_capacity(raw.records.len());

        for raw_record in raw.records {
            match BenchmarkRecord::from_raw(raw_record) {
                Ok(record) => records.push(record),
                Err(error) => {
                    error!(error = ?error, "Skipped benchmark: {error}");
                    rejected.push(error);
                }
            }
        }

        let store = Self::from_records(records);
        let meta = store.metadata();

        if (raw.has_aggregate, raw.has_bytes_sec, raw.has_items_sec)
            != (meta.has_aggregate, meta.has_bytes_sec, meta.has_items_sec)
        {
            warn!(
                reported = ?(raw.has_aggregate, raw.has_bytes_sec, raw.has_items_sec),
                scanned = ?(meta.has_aggregate, meta.has_bytes_sec, meta.has_items_sec),
                "Reader flags disagree with the loaded records, using the records"
            );
        }

        (store, rejected)
    }

    pub fn from_records(records: Vec<BenchmarkRecord>) -> Self {
        let mut store = Self::default();
        store.extend_unique(records);

        store
    }

    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&BenchmarkRecord> {
        self.records.get(index)
    }

    pub fn metadata(&self) -> &StoreMetadata {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// every record index in input order
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.records.len()).collect()
    }

    /// Label of a name component of the record at `record`
    ///
    /// Empty when the record has fewer components than `index + 1` or when
    /// the record does not exist.
    pub fn param_name(&self, kind: ParamKind, record: usize, index: usize) -> &str {
        self.records
            .get(record)
            .map(|record| record.param(kind, index))
            .unwrap_or("")
    }

    /// position of the record with this exact full name
    pub fn find(&self, name: &DecodedName) -> Option<usize> {
        self.records.iter().position(|record| &record.decoded == name)
    }

    /// Add every incoming record after the existing ones
    ///
    /// Existing records are untouched. An incoming record whose full name is
    /// already taken gets a `#2`, `#3`, ... suffix on its base name, which
    /// places it in its own family next to the original.
    #[tracing::instrument(level = "debug", skip_all, fields(incoming = other.len()))]
    pub fn append_results(&mut self, other: BenchmarkStore) {
        let mut records = self.records.clone();
        let before = records.len();
        let renamed = push_unique(&mut records, other.records);

        info!(
            appended = records.len() - before,
            renamed = renamed,
            "Appended benchmark results"
        );
        self.replace(records);
    }

    /// Replace records with the same full name in place, append the others
    #[tracing::instrument(level = "debug", skip_all, fields(incoming = other.len()))]
    pub fn overwrite_results(&mut self, other: BenchmarkStore) {
        let mut records = self.records.clone();
        let mut positions: HashMap<DecodedName, usize> = records
            .iter()
            .enumerate()
            .map(|(index, record)| (record.decoded.clone(), index))
            .collect();
        let mut replaced = 0usize;
        let mut appended = 0usize;

        for record in other.records {
            match positions.get(&record.decoded) {
                Some(&index) => {
                    debug!(name = %record.decoded, "Overwriting benchmark");
                    records[index] = record;
                    replaced += 1;
                }
                None => {
                    positions.insert(record.decoded.clone(), records.len());
                    records.push(record);
                    appended += 1;
                }
            }
        }

        info!(
            replaced = replaced,
            appended = appended,
            "Overwrote benchmark results"
        );
        self.replace(records);
    }

    fn extend_unique(&mut self, incoming: Vec<BenchmarkRecord>) {
        let mut records = std::mem::take(&mut self.records);
        push_unique(&mut records, incoming);
        self.replace(records);
    }

    fn replace(&mut self, records: Vec<BenchmarkRecord>) {
        self.meta = StoreMetadata::scan(&records);
        self.records = records;
    }
}

/// push `incoming` keeping full names unique, returns how many were renamed
fn push_unique(records: &mut Vec<BenchmarkRecord>, incoming: Vec<BenchmarkRecord>) -> usize {
    let mut taken: HashSet<DecodedName> =
        records.iter().map(|record| record.decoded.clone()).collect();
    let mut renamed = 0;

    for mut record in incoming {
        if taken.contains(&record.decoded) {
            let base_name = record.decoded.base_name.clone();
            let mut suffix = 2usize;

            while taken.contains(&record.decoded) {
                record.decoded.base_name = format!("{base_name}#{suffix}");
                suffix += 1;
            }

            debug!(
                name = %record.name,
                renamed = %record.decoded,
                "Renamed colliding benchmark"
            );
            renamed += 1;
        }

        taken.insert(record.decoded.clone());
        records.push(record);
    }

    renamed
}

/// Thread safe handle on a store
///
/// Merges hold the write lock for the whole swap, queries run concurrently on
/// read guards of a stable snapshot.
#[derive(Debug, Clone, Default)]
pub struct SharedStore(Arc<RwLock<BenchmarkStore>>);

impl SharedStore {
    pub fn new(store: BenchmarkStore) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    pub fn read(&self) -> ArcRwLockReadGuard<RawRwLock, BenchmarkStore> {
        self.0.read_arc()
    }

    pub fn replace(&self, store: BenchmarkStore) {
        *self.0.write() = store;
    }

    pub fn append_results(&self, other: BenchmarkStore) {
        self.0.write().append_results(other);
    }

    pub fn overwrite_results(&self, other: BenchmarkStore) {
        self.0.write().overwrite_results(other);
    }

    /// copy of the current store
    pub fn snapshot(&self) -> BenchmarkStore {
        self.0.read().clone()
    }
}
