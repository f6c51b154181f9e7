use crate::{
    error::AnalysisError,
    name::{self, DecodedName, ParamKind},
    stats::{self, YStats},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Unit of the raw per-trial time samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "us")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
}

impl TimeUnit {
    /// convert a value expressed in this unit to microseconds
    pub fn to_micros(self, value: f64) -> f64 {
        match self {
            Self::Nanoseconds => value * 0.001,
            Self::Microseconds => value,
            Self::Milliseconds => value * 1_000.0,
            Self::Seconds => value * 1_000_000.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "ns" => Ok(Self::Nanoseconds),
            "us" => Ok(Self::Microseconds),
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            unknown => Err(unknown.to_owned()),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channels that carry one sample per repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleChannel {
    CpuTime,
    RealTime,
    BytesPerSecond,
    ItemsPerSecond,
}

impl SampleChannel {
    pub fn is_time(self) -> bool {
        matches!(self, Self::CpuTime | Self::RealTime)
    }
}

/// Which statistic of a channel is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    /// the measurement itself, the first repetition for aggregate records
    Value,
    Min,
    Mean,
    Median,
}

/// Every value a chart can put on its Y axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ValueChannel {
    CpuTime,
    CpuTimeMin,
    CpuTimeMean,
    CpuTimeMedian,
    RealTime,
    RealTimeMin,
    RealTimeMean,
    RealTimeMedian,
    Iterations,
    Bytes,
    BytesMin,
    BytesMean,
    BytesMedian,
    Items,
    ItemsMin,
    ItemsMean,
    ItemsMedian,
}

impl ValueChannel {
    /// sampled channel and statistic, `None` for iterations
    pub fn source(self) -> Option<(SampleChannel, Reduction)> {
        use Reduction::*;
        use SampleChannel::*;

        Some(match self {
            Self::CpuTime => (CpuTime, Value),
            Self::CpuTimeMin => (CpuTime, Min),
            Self::CpuTimeMean => (CpuTime, Mean),
            Self::CpuTimeMedian => (CpuTime, Median),
            Self::RealTime => (RealTime, Value),
            Self::RealTimeMin => (RealTime, Min),
            Self::RealTimeMean => (RealTime, Mean),
            Self::RealTimeMedian => (RealTime, Median),
            Self::Iterations => return None,
            Self::Bytes => (BytesPerSecond, Value),
            Self::BytesMin => (BytesPerSecond, Min),
            Self::BytesMean => (BytesPerSecond, Mean),
            Self::BytesMedian => (BytesPerSecond, Median),
            Self::Items => (ItemsPerSecond, Value),
            Self::ItemsMin => (ItemsPerSecond, Min),
            Self::ItemsMean => (ItemsPerSecond, Mean),
            Self::ItemsMedian => (ItemsPerSecond, Median),
        })
    }

    /// axis title, times in microseconds and throughputs in thousands
    pub fn title(self) -> &'static str {
        match self {
            Self::CpuTime => "CPU time (us)",
            Self::CpuTimeMin => "CPU min time (us)",
            Self::CpuTimeMean => "CPU mean time (us)",
            Self::CpuTimeMedian => "CPU median time (us)",
            Self::RealTime => "Real time (us)",
            Self::RealTimeMin => "Real min time (us)",
            Self::RealTimeMean => "Real mean time (us)",
            Self::RealTimeMedian => "Real median time (us)",
            Self::Iterations => "Iterations",
            Self::Bytes => "Bytes/s (k)",
            Self::BytesMin => "Bytes/s min (k)",
            Self::BytesMean => "Bytes/s mean (k)",
            Self::BytesMedian => "Bytes/s median (k)",
            Self::Items => "Items/s (k)",
            Self::ItemsMin => "Items/s min (k)",
            Self::ItemsMean => "Items/s mean (k)",
            Self::ItemsMedian => "Items/s median (k)",
        }
    }
}

/// Precomputed statistics of a repeated channel, in the unit of the samples
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawAggregate {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl RawAggregate {
    pub fn from_samples(samples: &[f64]) -> Self {
        let stats = stats::aggregate(samples);

        Self {
            min: stats.min,
            max: stats.max,
            mean: stats::mean(samples),
            median: stats.median,
        }
    }
}

/// One benchmark as handed over by a results-file reader
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub time_unit: TimeUnit,
    pub real_time: f64,
    pub cpu_time: f64,
    pub iterations: f64,
    #[serde(default)]
    pub bytes_per_second: Option<f64>,
    #[serde(default)]
    pub items_per_second: Option<f64>,
    /// per-repetition samples, empty unless repetitions were run
    #[serde(default)]
    pub samples: BTreeMap<SampleChannel, Vec<f64>>,
    /// statistics over `samples`, computed from them when missing
    #[serde(default)]
    pub aggregates: BTreeMap<SampleChannel, RawAggregate>,
}

/// Everything a results-file reader produces for one file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawResults {
    pub records: Vec<RawRecord>,
    pub has_aggregate: bool,
    pub has_bytes_sec: bool,
    pub has_items_sec: bool,
}

/// Normalized values of one channel
///
/// Times are in microseconds and throughputs in thousands per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelValues {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl ChannelValues {
    fn single(value: f64) -> Self {
        Self {
            value,
            min: value,
            max: value,
            mean: value,
            median: value,
        }
    }

    fn get(&self, reduction: Reduction) -> f64 {
        match reduction {
            Reduction::Value => self.value,
            Reduction::Min => self.min,
            Reduction::Mean => self.mean,
            Reduction::Median => self.median,
        }
    }
}

/// One decoded measurement unit of a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// raw name as found in the results file
    pub name: String,
    pub decoded: DecodedName,
    pub container: Option<String>,
    pub time_unit: TimeUnit,
    pub iterations: f64,
    pub real_time: ChannelValues,
    pub cpu_time: ChannelValues,
    pub bytes_per_second: Option<ChannelValues>,
    pub items_per_second: Option<ChannelValues>,
    /// raw samples, times in `time_unit`, throughputs in thousands per second
    pub samples: BTreeMap<SampleChannel, Vec<f64>>,
    pub has_aggregate: bool,
}

const THROUGHPUT_SCALE: f64 = 0.001;

impl BenchmarkRecord {
    pub fn from_raw(raw: RawRecord) -> Result<Self, AnalysisError> {
        let decoded = name::decode(&raw.name)?;
        let unit = raw.time_unit;
        let has_aggregate = !raw.samples.is_empty();

        let channel = |channel: SampleChannel, value: f64| {
            let scale = |value: f64| {
                if channel.is_time() {
                    unit.to_micros(value)
                } else {
                    value * THROUGHPUT_SCALE
                }
            };

            let aggregate = raw.aggregates.get(&channel).copied().or_else(|| {
                raw.samples
                    .get(&channel)
                    .filter(|samples| !samples.is_empty())
                    .map(|samples| RawAggregate::from_samples(samples))
            });

            match aggregate {
                Some(aggregate) => ChannelValues {
                    value: scale(value),
                    min: scale(aggregate.min),
                    max: scale(aggregate.max),
                    mean: scale(aggregate.mean),
                    median: scale(aggregate.median),
                },
                None => ChannelValues::single(scale(value)),
            }
        };

        let real_time = channel(SampleChannel::RealTime, raw.real_time);
        let cpu_time = channel(SampleChannel::CpuTime, raw.cpu_time);
        let bytes_per_second = raw
            .bytes_per_second
            .map(|value| channel(SampleChannel::BytesPerSecond, value));
        let items_per_second = raw
            .items_per_second
            .map(|value| channel(SampleChannel::ItemsPerSecond, value));

        let samples = raw
            .samples
            .into_iter()
            .map(|(channel, samples)| {
                let samples = if channel.is_time() {
                    samples
                } else {
                    samples
                        .into_iter()
                        .map(|value| value * THROUGHPUT_SCALE)
                        .collect()
                };

                (channel, samples)
            })
            .collect();

        Ok(Self {
            name: raw.name,
            decoded,
            container: raw.container.filter(|container| !container.is_empty()),
            time_unit: unit,
            iterations: raw.iterations,
            real_time,
            cpu_time,
            bytes_per_second,
            items_per_second,
            samples,
            has_aggregate,
        })
    }

    pub fn base_name(&self) -> &str {
        &self.decoded.base_name
    }

    pub fn templates(&self) -> &[String] {
        &self.decoded.templates
    }

    pub fn arguments(&self) -> &[String] {
        &self.decoded.arguments
    }

    /// label of the name component, "" when the record has fewer components
    pub fn param(&self, kind: ParamKind, index: usize) -> &str {
        self.decoded.param(kind, index)
    }

    pub fn full_name(&self) -> String {
        self.decoded.to_string()
    }

    pub fn channel(&self, channel: SampleChannel) -> Option<&ChannelValues> {
        match channel {
            SampleChannel::CpuTime => Some(&self.cpu_time),
            SampleChannel::RealTime => Some(&self.real_time),
            SampleChannel::BytesPerSecond => self.bytes_per_second.as_ref(),
            SampleChannel::ItemsPerSecond => self.items_per_second.as_ref(),
        }
    }

    /// scalar for the Y axis, 0 for a throughput the record does not have
    pub fn value(&self, channel: ValueChannel) -> f64 {
        match channel.source() {
            None => self.iterations,
            Some((sampled, reduction)) => self
                .channel(sampled)
                .map(|values| values.get(reduction))
                .unwrap_or(0.0),
        }
    }

    /// Box statistics of the channel behind `channel`
    ///
    /// All zeros unless the record holds repeated trials. Time samples are
    /// normalized to microseconds first.
    pub fn statistics(&self, channel: ValueChannel) -> YStats {
        if !self.has_aggregate {
            return YStats::default();
        }

        let Some((sampled, _)) = channel.source() else {
            return YStats::default();
        };

        match self.samples.get(&sampled) {
            Some(samples) if sampled.is_time() => {
                let normalized = samples
                    .iter()
                    .map(|sample| self.time_unit.to_micros(*sample))
                    .collect::<Vec<_>>();

                stats::aggregate(&normalized)
            }
            Some(samples) => stats::aggregate(samples),
            None => YStats::default(),
        }
    }
}
