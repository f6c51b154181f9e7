use crate::{
    record::{BenchmarkRecord, RawRecord, SampleChannel},
    store::BenchmarkStore,
};
use std::collections::BTreeMap;

/// single run record, times in nanoseconds
pub fn raw(name: &str, cpu_time: f64) -> RawRecord {
    RawRecord {
        name: name.to_owned(),
        real_time: cpu_time * 1.5,
        cpu_time,
        iterations: 1000.0,
        ..Default::default()
    }
}

/// record with repeated cpu time trials
pub fn repeated(name: &str, cpu_samples: &[f64]) -> RawRecord {
    let mut samples = BTreeMap::new();
    samples.insert(SampleChannel::CpuTime, cpu_samples.to_vec());
    samples.insert(
        SampleChannel::RealTime,
        cpu_samples.iter().map(|sample| sample * 1.5).collect(),
    );

    RawRecord {
        samples,
        ..raw(name, cpu_samples[0])
    }
}

pub fn record(raw: RawRecord) -> BenchmarkRecord {
    BenchmarkRecord::from_raw(raw).expect("test record names are well formed")
}

/// store of single run records, the n-th name runs (n + 1) * 1000 ns
pub fn store(names: &[&str]) -> BenchmarkStore {
    BenchmarkStore::from_records(
        names
            .iter()
            .enumerate()
            .map(|(position, name)| record(raw(name, (position + 1) as f64 * 1000.0)))
            .collect(),
    )
}

pub const SORT_NAMES: [&str; 6] = [
    "BM_Sort<int>/8/1",
    "BM_Sort<int>/16/1",
    "BM_Sort<int>/32/1",
    "BM_Sort<float>/8/1",
    "BM_Sort<float>/16/1",
    "BM_Sort<float>/32/1",
];
