use crate::{
    error::AnalysisError,
    grouping::{check_matrix, Subset},
    labels::LabelReconciler,
    name::{param_value, AxisScale, ParamKind},
    record::{SampleChannel, ValueChannel},
    stats::YStats,
    store::{BenchmarkStore, StoreMetadata},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Chart types a plan can be prepared for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ChartKind {
    Line,
    Spline,
    Bar,
    HorizontalBar,
    Box,
    #[cfg_attr(feature = "clap", value(name = "bars3d"))]
    Bars3d,
    #[cfg_attr(feature = "clap", value(name = "surface3d"))]
    Surface3d,
}

impl ChartKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Line => "Lines",
            Self::Spline => "Splines",
            Self::Bar => "Bars",
            Self::HorizontalBar => "HBars",
            Self::Box => "Boxes",
            Self::Bars3d => "3D Bars",
            Self::Surface3d => "3D Surface",
        }
    }

    /// only 3-D charts use a Z axis
    pub fn is_3d(self) -> bool {
        matches!(self, Self::Bars3d | Self::Surface3d)
    }

    /// charts placing points at numeric X positions
    fn needs_param_axis(self) -> bool {
        matches!(self, Self::Line | Self::Spline | Self::Surface3d)
    }
}

/// One plot axis: a name component kind and its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotAxis {
    pub kind: ParamKind,
    #[serde(default)]
    pub index: usize,
}

impl PlotAxis {
    pub const EMPTY: Self = Self {
        kind: ParamKind::Empty,
        index: 0,
    };

    pub fn argument(index: usize) -> Self {
        Self {
            kind: ParamKind::Argument,
            index,
        }
    }

    pub fn template(index: usize) -> Self {
        Self {
            kind: ParamKind::Template,
            index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == ParamKind::Empty
    }

    pub fn label(&self) -> String {
        self.kind.axis_label(self.index)
    }
}

/// A chart request: chart type and what goes on each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotParams {
    pub chart: ChartKind,
    #[serde(default)]
    pub x: PlotAxis,
    pub y: ValueChannel,
    #[serde(default)]
    pub z: PlotAxis,
}

impl PlotParams {
    /// Z axis actually used, always empty for 2-D charts
    pub fn z_axis(&self) -> PlotAxis {
        if self.chart.is_3d() {
            self.z
        } else {
            PlotAxis::EMPTY
        }
    }

    pub fn validate(&self, meta: &StoreMetadata) -> Result<(), AnalysisError> {
        if !available_charts(meta).contains(&self.chart) {
            return Err(AnalysisError::InvalidPlot(format!(
                "{} charts are not available for these results",
                self.chart.title()
            )));
        }

        if self.chart.needs_param_axis() && self.x.is_empty() {
            return Err(AnalysisError::InvalidPlot(format!(
                "{} charts need an argument or template on the X axis",
                self.chart.title()
            )));
        }

        let z = self.z_axis();
        for (axis_name, axis) in [("X", self.x), ("Z", z)] {
            let max = match axis.kind {
                ParamKind::Empty => continue,
                ParamKind::Argument => meta.max_arguments,
                ParamKind::Template => meta.max_templates,
            };

            if axis.index >= max {
                return Err(AnalysisError::InvalidPlot(format!(
                    "{axis_name} axis uses {} but the results have {max}",
                    axis.label()
                )));
            }
        }

        if !z.is_empty() && z == self.x {
            return Err(AnalysisError::InvalidPlot(format!(
                "X and Z axes both use {}",
                self.x.label()
            )));
        }

        let missing = match self.y.source() {
            Some((SampleChannel::BytesPerSecond, _)) => !meta.has_bytes_sec,
            Some((SampleChannel::ItemsPerSecond, _)) => !meta.has_items_sec,
            _ => false,
        };
        if missing {
            return Err(AnalysisError::InvalidPlot(format!(
                "the results have no values for {}",
                self.y.title()
            )));
        }

        Ok(())
    }
}

/// Chart types that make sense for a store
pub fn available_charts(meta: &StoreMetadata) -> Vec<ChartKind> {
    let mut charts = Vec::with_capacity(7);

    if meta.has_params() {
        charts.extend([ChartKind::Line, ChartKind::Spline]);
    }
    charts.extend([ChartKind::Bar, ChartKind::HorizontalBar]);
    if meta.has_aggregate {
        charts.push(ChartKind::Box);
    }
    charts.push(ChartKind::Bars3d);
    if meta.has_params() {
        charts.push(ChartKind::Surface3d);
    }

    charts
}

/// Y values offered for a chart type
///
/// Repeated trials offer their min/mean/median, except for boxes which show
/// the whole distribution of the plain channel.
pub fn available_values(meta: &StoreMetadata, chart: ChartKind) -> Vec<ValueChannel> {
    use ValueChannel::*;

    let mut values = Vec::new();

    if !meta.has_aggregate || chart == ChartKind::Box {
        values.extend([RealTime, CpuTime, Iterations]);
        if meta.has_bytes_sec {
            values.push(Bytes);
        }
        if meta.has_items_sec {
            values.push(Items);
        }
    } else {
        values.extend([
            RealTimeMin,
            RealTimeMean,
            RealTimeMedian,
            CpuTimeMin,
            CpuTimeMean,
            CpuTimeMedian,
            Iterations,
        ]);
        if meta.has_bytes_sec {
            values.extend([BytesMin, BytesMean, BytesMedian]);
        }
        if meta.has_items_sec {
            values.extend([ItemsMin, ItemsMean, ItemsMedian]);
        }
    }

    values
}

/// X/Z axis choices, arguments first
pub fn axis_choices(meta: &StoreMetadata) -> Vec<PlotAxis> {
    (0..meta.max_arguments)
        .map(PlotAxis::argument)
        .chain((0..meta.max_templates).map(PlotAxis::template))
        .collect()
}

/// One plotted value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// index of the record in the store
    pub record: usize,
    /// X category label
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// row label of 3-D charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<YStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

/// Grouped data of one chart, ready for a renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlan {
    pub chart: ChartKind,
    pub x_title: String,
    pub y_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_title: Option<String>,
    /// reconciled X categories, a single "" when they collide
    pub column_labels: Vec<String>,
    /// reconciled row categories of 3-D bars, a single "" when they collide
    pub row_labels: Vec<String>,
    pub series: Vec<Series>,
    /// series left out and why
    pub diagnostics: Vec<String>,
}

impl ChartPlan {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|series| series.points.is_empty())
    }
}

/// Group the selected records of `store` for one chart
#[tracing::instrument(level = "debug", skip(store, indices), fields(selected = indices.len()))]
pub fn plan_chart(
    store: &BenchmarkStore,
    indices: &[usize],
    params: &PlotParams,
) -> Result<ChartPlan, AnalysisError> {
    params.validate(store.metadata())?;

    let mut planner = Planner::new(store, params);
    match params.chart {
        ChartKind::Line | ChartKind::Spline => planner.lines(indices),
        ChartKind::Bar | ChartKind::HorizontalBar => planner.bars(indices, false),
        ChartKind::Box => planner.bars(indices, true),
        ChartKind::Bars3d if params.z_axis().is_empty() => planner.bars_3d(indices),
        ChartKind::Bars3d => planner.bars_3d_by_z(indices),
        ChartKind::Surface3d if params.z_axis().is_empty() => planner.surface(indices),
        ChartKind::Surface3d => planner.surface_by_z(indices),
    }

    Ok(planner.finish())
}

struct Planner<'a> {
    store: &'a BenchmarkStore,
    params: &'a PlotParams,
    x_scale: AxisScale,
    z_scale: AxisScale,
    columns: LabelReconciler,
    rows: LabelReconciler,
    series: Vec<Series>,
    diagnostics: Vec<String>,
}

impl<'a> Planner<'a> {
    fn new(store: &'a BenchmarkStore, params: &'a PlotParams) -> Self {
        Self {
            store,
            params,
            x_scale: AxisScale::new(),
            z_scale: AxisScale::new(),
            columns: LabelReconciler::new(),
            rows: LabelReconciler::new(),
            series: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn diagnose(&mut self, message: String) {
        warn!("{message}");
        self.diagnostics.push(message);
    }

    fn x_subsets(&self, indices: &[usize]) -> Vec<Subset> {
        let x = self.params.x;
        self.store.group_param(x.kind, indices, x.index, "X")
    }

    fn x_label(&self, record: usize) -> String {
        let x = self.params.x;
        self.store.param_name(x.kind, record, x.index).to_owned()
    }

    fn y_value(&self, record: usize) -> f64 {
        self.store
            .record(record)
            .map(|record| record.value(self.params.y))
            .unwrap_or(0.0)
    }

    fn point(&self, record: usize, label: String, x: f64) -> Point {
        Point {
            record,
            label,
            x,
            y: self.y_value(record),
            z: None,
            row: None,
            stats: None,
        }
    }

    /// points of one row at numeric X positions
    fn numeric_row(&mut self, subset: &Subset, z: Option<f64>, row: Option<&str>) -> Vec<Point> {
        let mut fallback = 0.0;
        let mut points = Vec::with_capacity(subset.indices.len());

        for &record in &subset.indices {
            let label = self.x_label(record);
            let x = param_value(&label, &mut self.x_scale, &mut fallback);

            points.push(Point {
                z,
                row: row.map(str::to_owned),
                ..self.point(record, label, x)
            });
        }

        points
    }

    fn lines(&mut self, indices: &[usize]) {
        for subset in self.x_subsets(indices) {
            if subset.indices.len() < 2 {
                self.diagnose(format!(
                    "Not enough points to trace line for: {}",
                    subset.name
                ));
                continue;
            }

            let points = self.numeric_row(&subset, None, None);
            self.series.push(Series {
                name: subset.name,
                points,
            });
        }

        if self.series.is_empty() {
            self.diagnose("No series with at least 2 points to display".to_owned());
        }
    }

    /// bars and boxes: one series per X group, X categories reconciled
    fn bars(&mut self, indices: &[usize], with_stats: bool) {
        for subset in self.x_subsets(indices) {
            let mut labels = Vec::with_capacity(subset.indices.len());
            let points = subset
                .indices
                .iter()
                .enumerate()
                .map(|(position, &record)| {
                    let label = self.x_label(record);
                    labels.push(label.clone());
                    let mut point = self.point(record, label, position as f64);

                    if with_stats {
                        let stats = self
                            .store
                            .record(record)
                            .map(|record| record.statistics(self.params.y))
                            .unwrap_or_default();
                        point.y = stats.median;
                        point.stats = Some(stats);
                    }

                    point
                })
                .collect();

            self.columns.push(labels);
            self.series.push(Series {
                name: subset.name,
                points,
            });
        }
    }

    /// one series, one row per X group
    fn bars_3d(&mut self, indices: &[usize]) {
        let mut points = Vec::new();
        let mut row_names = Vec::new();

        for (row, subset) in self.x_subsets(indices).into_iter().enumerate() {
            let mut labels = Vec::with_capacity(subset.indices.len());

            for (column, &record) in subset.indices.iter().enumerate() {
                let label = self.x_label(record);
                labels.push(label.clone());
                points.push(Point {
                    z: Some(row as f64),
                    row: Some(subset.name.clone()),
                    ..self.point(record, label, column as f64)
                });
            }

            self.columns.push(labels);
            row_names.push(subset.name);
        }

        self.rows.push(row_names);
        if !points.is_empty() {
            self.series.push(Series {
                name: String::new(),
                points,
            });
        }
    }

    /// one series per benchmark shape, one row per Z value, columns along X
    fn bars_3d_by_z(&mut self, indices: &[usize]) {
        let (x, z) = (self.params.x, self.params.z_axis());

        for shape in self
            .store
            .segment_2d_names(indices, x.kind, x.index, z.kind, z.index)
        {
            let mut points = Vec::new();
            let mut row_labels = Vec::new();

            for (row, z_subset) in self
                .store
                .segment_param(z.kind, &shape.indices, z.index)
                .into_iter()
                .enumerate()
            {
                for x_subset in self.x_subsets(&z_subset.indices) {
                    let mut labels = Vec::with_capacity(x_subset.indices.len());

                    for (column, &record) in x_subset.indices.iter().enumerate() {
                        let label = self.x_label(record);
                        labels.push(label.clone());
                        points.push(Point {
                            z: Some(row as f64),
                            row: Some(z_subset.name.clone()),
                            ..self.point(record, label, column as f64)
                        });
                    }

                    self.columns.push(labels);
                }
                row_labels.push(z_subset.name);
            }

            self.rows.push(row_labels);
            self.series.push(Series {
                name: shape.name,
                points,
            });
        }
    }

    /// single surface, one row per X group
    fn surface(&mut self, indices: &[usize]) {
        let subsets = self.x_subsets(indices);

        if let Err(error) = check_matrix(&subsets) {
            self.diagnose(format!("Cannot trace surface: {error}"));
            return;
        }

        let points = subsets
            .iter()
            .enumerate()
            .flat_map(|(row, subset)| {
                self.numeric_row(subset, Some(row as f64), Some(&subset.name))
            })
            .collect::<Vec<_>>();

        if !points.is_empty() {
            self.series.push(Series {
                name: String::new(),
                points,
            });
        }
    }

    /// one surface per benchmark shape, rows placed at their Z value
    fn surface_by_z(&mut self, indices: &[usize]) {
        let (x, z) = (self.params.x, self.params.z_axis());

        for shape in self
            .store
            .segment_2d_names(indices, x.kind, x.index, z.kind, z.index)
        {
            let z_subsets = self.store.segment_param(z.kind, &shape.indices, z.index);

            if z_subsets.is_empty() {
                self.diagnose(format!("No Z-value to trace surface for: {}", shape.name));
                continue;
            }
            if let Err(error) = check_matrix(&z_subsets) {
                self.diagnose(format!("Cannot trace surface for {}: {error}", shape.name));
                continue;
            }

            let mut points = Vec::new();
            let mut z_fallback = 0.0;

            for z_subset in z_subsets {
                let z_value = param_value(&z_subset.name, &mut self.z_scale, &mut z_fallback);

                for x_subset in self.x_subsets(&z_subset.indices) {
                    points.extend(self.numeric_row(
                        &x_subset,
                        Some(z_value),
                        Some(&z_subset.name),
                    ));
                }
            }

            self.series.push(Series {
                name: shape.name,
                points,
            });
        }
    }

    fn finish(mut self) -> ChartPlan {
        if self.series.is_empty() && self.diagnostics.is_empty() {
            self.diagnose("No compatible series to display".to_owned());
        }

        let (x, z) = (self.params.x, self.params.z_axis());
        let x_title = match self.params.chart {
            ChartKind::Line | ChartKind::Spline | ChartKind::Surface3d => {
                self.x_scale.title(x.kind, x.index)
            }
            _ => x.label(),
        };
        let z_title = (!z.is_empty()).then(|| self.z_scale.title(z.kind, z.index));

        debug!(
            series = self.series.len(),
            diagnostics = self.diagnostics.len(),
            "Prepared chart"
        );

        ChartPlan {
            chart: self.params.chart,
            x_title,
            y_title: self.params.y.title().to_owned(),
            z_title,
            column_labels: self.columns.finish(),
            row_labels: self.rows.finish(),
            series: self.series,
            diagnostics: self.diagnostics,
        }
    }
}
