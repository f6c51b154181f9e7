use serde_json::json;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Google Benchmark report of single runs, cpu times in nanoseconds
pub fn results_json(benchmarks: &[(&str, f64)]) -> String {
    let entries = benchmarks
        .iter()
        .map(|(name, cpu_time)| {
            json!({
                "name": name,
                "run_name": name,
                "run_type": "iteration",
                "iterations": 1000,
                "real_time": cpu_time * 2.0,
                "cpu_time": cpu_time,
                "time_unit": "ns"
            })
        })
        .collect::<Vec<_>>();

    json!({
        "context": { "executable": "./bench" },
        "benchmarks": entries
    })
    .to_string()
}

pub fn write_results(directory: &Path, file: &str, benchmarks: &[(&str, f64)]) -> PathBuf {
    let path = directory.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, results_json(benchmarks)).unwrap();

    path
}
