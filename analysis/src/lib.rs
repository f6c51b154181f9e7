//! Model and grouping engine for micro-benchmark results
//!
//! Raw records are decoded into a `BenchmarkStore`, which answers the
//! grouping queries charts are built from.

pub mod chart;
pub mod error;
pub mod grouping;
pub mod labels;
pub mod name;
pub mod record;
pub mod stats;
pub mod store;

pub use chart::{plan_chart, ChartKind, ChartPlan, PlotAxis, PlotParams};
pub use error::AnalysisError;
pub use grouping::{check_matrix, Subset};
pub use name::{decode, DecodedName, ParamKind};
pub use record::{BenchmarkRecord, RawRecord, RawResults, SampleChannel, TimeUnit, ValueChannel};
pub use stats::YStats;
pub use store::{BenchmarkStore, SharedStore, StoreMetadata};

#[cfg(test)]
mod grouping_test;
#[cfg(test)]
mod store_test;
#[cfg(test)]
pub(crate) mod test_util;
