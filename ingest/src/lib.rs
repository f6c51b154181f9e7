//! Readers turning benchmark harness output into `RawResults`

pub mod gbench;

pub use gbench::{parse_str, read_file};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read results file")]
    Read(#[from] std::io::Error),
    #[error("Failed to deserialize results: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Benchmark {name} uses unsupported time unit '{unit}'")]
    TimeUnit { name: String, unit: String },
}
