use crate::config::ConfigErrors;
use benchview_analysis::{
    chart::{available_charts, available_values, axis_choices},
    AnalysisError, BenchmarkRecord, BenchmarkStore, ChartKind, PlotAxis, PlotParams,
    StoreMetadata, ValueChannel,
};
use globset::GlobBuilder;
use itertools::Itertools;
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output")]
    Io(#[from] io::Error),
    #[error("Failed to serialize YAML output")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to serialize JSON output")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    pub fn write<W: Write, T: Serialize>(self, out: &mut W, value: &T) -> Result<(), OutputError> {
        match self {
            Self::Yaml => serde_yaml::to_writer(&mut *out, value)?,
            Self::Json => {
                serde_json::to_writer_pretty(&mut *out, value)?;
                writeln!(out)?;
            }
        }

        Ok(())
    }
}

/// Indices of the records whose full name matches `filter`, all without one
pub fn select(store: &BenchmarkStore, filter: Option<&str>) -> Result<Vec<usize>, ConfigErrors> {
    let Some(pattern) = filter else {
        return Ok(store.all_indices());
    };

    let matcher = GlobBuilder::new(pattern).build()?.compile_matcher();
    let selected = store
        .records()
        .iter()
        .positions(|record| matcher.is_match(record.full_name()))
        .collect_vec();

    debug!(
        filter = pattern,
        selected = selected.len(),
        total = store.len(),
        "Filtered benchmarks"
    );

    Ok(selected)
}

/// value columns of the tree, minimum values for repeated trials
fn tree_columns(meta: &StoreMetadata) -> Vec<ValueChannel> {
    use ValueChannel::*;

    let (real, cpu, bytes, items) = if meta.has_aggregate {
        (RealTimeMin, CpuTimeMin, BytesMin, ItemsMin)
    } else {
        (RealTime, CpuTime, Bytes, Items)
    };

    let mut columns = vec![real, cpu];
    if meta.has_bytes_sec {
        columns.push(bytes);
    }
    if meta.has_items_sec {
        columns.push(items);
    }

    columns
}

fn format_value(record: &BenchmarkRecord, channel: ValueChannel) -> String {
    match channel.source() {
        Some((sampled, _)) if record.channel(sampled).is_none() => "-".to_owned(),
        _ => format!("{:.3}", record.value(channel)),
    }
}

/// Write the family, container and record tree of the selected records
pub fn write_tree<W: Write>(out: &mut W, store: &BenchmarkStore, indices: &[usize]) -> io::Result<()> {
    let columns = tree_columns(store.metadata());

    writeln!(
        out,
        "{}",
        ["Benchmark", "Templates", "Arguments"]
            .into_iter()
            .chain(columns.iter().map(|column| column.title()))
            .join("\t")
    )?;

    for family in store.segment_families(indices) {
        writeln!(out, "{}", family.name)?;

        for container in store.segment_containers(&family.indices) {
            let indent = if container.name.is_empty() {
                "  "
            } else {
                writeln!(out, "  [{}]", container.name)?;
                "    "
            };

            for record in container.indices.iter().filter_map(|&index| store.record(index)) {
                writeln!(
                    out,
                    "{indent}{}\t{}\t{}\t{}",
                    record.full_name(),
                    record.templates().join(", "),
                    record.arguments().join("/"),
                    columns
                        .iter()
                        .map(|column| format_value(record, *column))
                        .join("\t")
                )?;
            }
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AxisOption {
    pub label: String,
    #[serde(flatten)]
    pub axis: PlotAxis,
}

#[derive(Debug, Serialize)]
pub struct ChartOptions {
    pub chart: ChartKind,
    pub title: &'static str,
    pub values: Vec<ValueChannel>,
}

/// Everything a chart can be requested with for one store
#[derive(Debug, Serialize)]
pub struct OptionsReport {
    pub records: usize,
    pub metadata: StoreMetadata,
    pub axes: Vec<AxisOption>,
    pub charts: Vec<ChartOptions>,
}

pub fn options(store: &BenchmarkStore) -> OptionsReport {
    let meta = store.metadata();

    OptionsReport {
        records: store.len(),
        metadata: *meta,
        axes: axis_choices(meta)
            .into_iter()
            .map(|axis| AxisOption {
                label: axis.label(),
                axis,
            })
            .collect(),
        charts: available_charts(meta)
            .into_iter()
            .map(|chart| ChartOptions {
                chart,
                title: chart.title(),
                values: available_values(meta, chart),
            })
            .collect(),
    }
}

/// Chart request assembled from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlotRequest {
    pub chart: Option<ChartKind>,
    pub x: Option<PlotAxis>,
    pub y: Option<ValueChannel>,
    pub z: Option<PlotAxis>,
}

impl PlotRequest {
    /// Fill unset fields from `defaults`, then from the first choice `meta` offers
    pub fn resolve(
        &self,
        defaults: Option<&PlotParams>,
        meta: &StoreMetadata,
    ) -> Result<PlotParams, AnalysisError> {
        let chart = self
            .chart
            .or(defaults.map(|defaults| defaults.chart))
            .or_else(|| available_charts(meta).first().copied())
            .ok_or_else(|| AnalysisError::InvalidPlot("no chart type is available".to_owned()))?;

        let x = self
            .x
            .or(defaults.map(|defaults| defaults.x))
            .or_else(|| axis_choices(meta).first().copied())
            .unwrap_or(PlotAxis::EMPTY);

        let y = self
            .y
            .or(defaults.map(|defaults| defaults.y))
            .or_else(|| available_values(meta, chart).first().copied())
            .ok_or_else(|| {
                AnalysisError::InvalidPlot(format!("no value is available for {}", chart.title()))
            })?;

        let z = self
            .z
            .or(defaults.map(|defaults| defaults.z))
            .unwrap_or(PlotAxis::EMPTY);

        Ok(PlotParams { chart, x, y, z })
    }
}
