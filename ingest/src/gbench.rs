use crate::IngestError;
use benchview_analysis::record::{RawAggregate, RawRecord, RawResults, SampleChannel, TimeUnit};
use itertools::Itertools;
use serde::Deserialize;
use std::{
    collections::{hash_map::Entry, BTreeMap, HashMap},
    fs::File,
    io::BufReader,
    path::Path,
};
use tracing::{debug, warn};

/// Top level of a Google Benchmark JSON report
#[derive(Deserialize, Debug)]
struct Report {
    #[serde(default)]
    context: Option<Context>,
    #[serde(default)]
    benchmarks: Vec<RunEntry>,
}

#[derive(Deserialize, Debug)]
struct Context {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    host_name: Option<String>,
    #[serde(default)]
    executable: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
enum RunType {
    #[default]
    Iteration,
    Aggregate,
    #[serde(other)]
    Other,
}

/// One entry of `benchmarks`, a single repetition or an aggregate over them
#[derive(Deserialize, Debug)]
struct RunEntry {
    name: String,
    #[serde(default)]
    run_name: Option<String>,
    #[serde(default)]
    run_type: RunType,
    #[serde(default)]
    aggregate_name: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    error_occurred: bool,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    iterations: f64,
    #[serde(default)]
    real_time: f64,
    #[serde(default)]
    cpu_time: f64,
    #[serde(default)]
    time_unit: Option<String>,
    #[serde(default)]
    bytes_per_second: Option<f64>,
    #[serde(default)]
    items_per_second: Option<f64>,
}

impl RunEntry {
    fn is_aggregate(&self) -> bool {
        self.run_type == RunType::Aggregate || self.aggregate_name.is_some()
    }

    fn time_unit(&self) -> Result<TimeUnit, IngestError> {
        match self.time_unit.as_deref() {
            None => Ok(TimeUnit::default()),
            Some(unit) => unit.parse().map_err(|unit| IngestError::TimeUnit {
                name: self.name.clone(),
                unit,
            }),
        }
    }

    fn channels(&self) -> impl Iterator<Item = (SampleChannel, f64)> {
        [
            (SampleChannel::CpuTime, Some(self.cpu_time)),
            (SampleChannel::RealTime, Some(self.real_time)),
            (SampleChannel::BytesPerSecond, self.bytes_per_second),
            (SampleChannel::ItemsPerSecond, self.items_per_second),
        ]
        .into_iter()
        .filter_map(|(channel, value)| value.map(|value| (channel, value)))
    }
}

/// Repetitions of one logical benchmark folded together
struct Folded {
    record: RawRecord,
    samples: BTreeMap<SampleChannel, Vec<f64>>,
    repetitions: usize,
}

impl Folded {
    fn new(name: String, entry: &RunEntry, unit: TimeUnit) -> Self {
        Self {
            record: RawRecord {
                name,
                container: entry.label.clone(),
                time_unit: unit,
                real_time: entry.real_time,
                cpu_time: entry.cpu_time,
                iterations: entry.iterations,
                bytes_per_second: entry.bytes_per_second,
                items_per_second: entry.items_per_second,
                ..Default::default()
            },
            samples: entry
                .channels()
                .map(|(channel, value)| (channel, vec![value]))
                .collect(),
            repetitions: 1,
        }
    }

    /// add a further repetition, times converted to the unit of the first one
    fn push(&mut self, entry: &RunEntry, unit: TimeUnit) {
        let factor = unit.to_micros(1.0) / self.record.time_unit.to_micros(1.0);

        if unit != self.record.time_unit {
            debug!(
                name = %self.record.name,
                from = %unit,
                to = %self.record.time_unit,
                "Converting repetition time unit"
            );
        }

        for (channel, value) in entry.channels() {
            let value = if channel.is_time() {
                value * factor
            } else {
                value
            };
            self.samples.entry(channel).or_default().push(value);
        }
        self.repetitions += 1;
    }

    fn finish(self) -> RawRecord {
        if self.repetitions < 2 {
            return self.record;
        }

        let aggregates = self
            .samples
            .iter()
            .map(|(channel, samples)| (*channel, RawAggregate::from_samples(samples)))
            .collect();

        RawRecord {
            samples: self.samples,
            aggregates,
            ..self.record
        }
    }
}

/// Read a Google Benchmark JSON report from `path`
#[tracing::instrument(level = "debug")]
pub fn read_file(path: &Path) -> Result<RawResults, IngestError> {
    let reader = BufReader::new(File::open(path)?);
    let report: Report = serde_json::from_reader(reader)?;

    fold(report)
}

/// Parse a Google Benchmark JSON report held in memory
pub fn parse_str(json: &str) -> Result<RawResults, IngestError> {
    fold(serde_json::from_str(json)?)
}

/// fold repetitions into one record per run name, first seen order
fn fold(report: Report) -> Result<RawResults, IngestError> {
    if let Some(context) = report.context.as_ref() {
        debug!(
            date = ?context.date,
            host = ?context.host_name,
            executable = ?context.executable,
            "Read benchmark context"
        );
    }

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut folded: Vec<Folded> = Vec::new();
    let mut skipped_aggregates = 0usize;

    for entry in report.benchmarks {
        if entry.error_occurred {
            warn!(
                name = %entry.name,
                message = ?entry.error_message,
                "Skipped benchmark that reported an error"
            );
            continue;
        }
        if entry.is_aggregate() {
            skipped_aggregates += 1;
            continue;
        }
        if entry.run_type == RunType::Other {
            warn!(name = %entry.name, "Skipped benchmark entry of unknown run type");
            continue;
        }

        let unit = entry.time_unit()?;
        let name = entry.run_name.clone().unwrap_or_else(|| entry.name.clone());

        match positions.entry(name) {
            Entry::Occupied(position) => folded[*position.get()].push(&entry, unit),
            Entry::Vacant(position) => {
                let name = position.key().clone();
                position.insert(folded.len());
                folded.push(Folded::new(name, &entry, unit));
            }
        }
    }

    let has_aggregate = folded.iter().any(|folded| folded.repetitions > 1);
    let records = folded.into_iter().map(Folded::finish).collect_vec();
    let has_bytes_sec = records
        .iter()
        .any(|record| record.bytes_per_second.is_some());
    let has_items_sec = records
        .iter()
        .any(|record| record.items_per_second.is_some());

    debug!(
        records = records.len(),
        skipped_aggregates = skipped_aggregates,
        "Folded benchmark repetitions"
    );

    Ok(RawResults {
        records,
        has_aggregate,
        has_bytes_sec,
        has_items_sec,
    })
}
