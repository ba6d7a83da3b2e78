//! Chart selection and geometry.
//!
//! `build_plot` validates the requested kind and column arity, drops rows
//! with missing values in the participating columns (pairwise, so positions
//! stay aligned), coerces axes where the kind demands it, and produces a
//! renderer-ready [`PlotSpec`]. Rasterization is a collaborator concern; the
//! spec serializes to JSON and stops there.

use std::collections::HashMap;
use std::fmt;
use std::fs;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime};
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    cli::PlotArgs,
    data::format_number,
    dataset::{Cell, Column, Dataset},
    error::RequestError,
    frequency,
    io_utils,
    stats::NumericDistribution,
};

pub const HISTOGRAM_BINS: usize = 30;
pub const DENSITY_BINS: usize = 50;
pub const HEATMAP_BINS: usize = 10;
/// Maximum number of x-axis tick labels on a line plot.
pub const LINE_TICK_CAP: usize = 15;
/// Minimum share of coercible values for a heatmap axis to be treated as
/// numeric, and for a line x-axis to be treated as datetime.
pub const AXIS_COERCION_THRESHOLD: f64 = 75.0;

const MIN_WIDTH: f64 = 8.0;
const MAX_WIDTH: f64 = 24.0;
const MIN_HEIGHT: f64 = 6.0;
const MAX_HEIGHT: f64 = 18.0;
const LEVEL_STEP: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Histogram,
    Density,
    Barchart,
    Piechart,
    Boxplot,
    Violin,
    Scatter,
    Line,
    Heatmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    Two,
    OneOrTwo,
}

impl PlotKind {
    pub fn parse(value: &str) -> Result<Self, RequestError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "histogram" => Ok(PlotKind::Histogram),
            "density" => Ok(PlotKind::Density),
            "barchart" => Ok(PlotKind::Barchart),
            "piechart" => Ok(PlotKind::Piechart),
            "boxplot" => Ok(PlotKind::Boxplot),
            "violin" => Ok(PlotKind::Violin),
            "scatter" => Ok(PlotKind::Scatter),
            "line" => Ok(PlotKind::Line),
            "heatmap" => Ok(PlotKind::Heatmap),
            other => Err(RequestError::invalid(format!(
                "unsupported plot kind '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlotKind::Histogram => "histogram",
            PlotKind::Density => "density",
            PlotKind::Barchart => "barchart",
            PlotKind::Piechart => "piechart",
            PlotKind::Boxplot => "boxplot",
            PlotKind::Violin => "violin",
            PlotKind::Scatter => "scatter",
            PlotKind::Line => "line",
            PlotKind::Heatmap => "heatmap",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            PlotKind::Histogram
            | PlotKind::Density
            | PlotKind::Barchart
            | PlotKind::Piechart => Arity::One,
            PlotKind::Boxplot | PlotKind::Violin => Arity::OneOrTwo,
            PlotKind::Scatter | PlotKind::Line | PlotKind::Heatmap => Arity::Two,
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarSlice {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViolinGroup {
    pub label: String,
    pub median: f64,
    pub curve: Vec<CurvePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinePoint {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisTick {
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Histogram {
        bins: Vec<HistogramBin>,
    },
    Curve {
        points: Vec<CurvePoint>,
    },
    Bars {
        bars: Vec<BarSlice>,
        label_rotation: u32,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
    Boxes {
        groups: Vec<BoxStats>,
    },
    Violins {
        groups: Vec<ViolinGroup>,
    },
    Points {
        points: Vec<PairPoint>,
    },
    Line {
        points: Vec<LinePoint>,
        ticks: Vec<AxisTick>,
    },
    Heatmap {
        x_labels: Vec<String>,
        y_labels: Vec<String>,
        counts: Vec<Vec<usize>>,
        max_count: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotSpec {
    pub kind: PlotKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: f64,
    pub height: f64,
    pub geometry: Geometry,
}

/// Builds a chart specification for one or two columns of the dataset.
pub fn build_plot(
    dataset: &Dataset,
    primary: &str,
    kind: PlotKind,
    secondary: Option<&str>,
) -> Result<PlotSpec, RequestError> {
    let first = dataset
        .column(primary)
        .ok_or_else(|| RequestError::ColumnNotFound(primary.to_string()))?;
    let second = secondary
        .map(|name| {
            dataset
                .column(name)
                .ok_or_else(|| RequestError::ColumnNotFound(name.to_string()))
        })
        .transpose()?;

    match (kind.arity(), second.is_some()) {
        (Arity::One, true) => {
            return Err(RequestError::invalid(format!(
                "plot kind '{kind}' takes a single column"
            )));
        }
        (Arity::Two, false) => {
            return Err(RequestError::invalid(format!(
                "plot kind '{kind}' requires a second column"
            )));
        }
        _ => {}
    }

    match kind {
        PlotKind::Histogram => histogram_spec(first),
        PlotKind::Density => density_spec(first),
        PlotKind::Barchart => barchart_spec(first),
        PlotKind::Piechart => piechart_spec(first),
        PlotKind::Boxplot => boxplot_spec(first, second),
        PlotKind::Violin => violin_spec(first, second),
        PlotKind::Scatter => {
            let second = require_second(kind, second)?;
            scatter_spec(first, second)
        }
        PlotKind::Line => {
            let second = require_second(kind, second)?;
            line_spec(first, second)
        }
        PlotKind::Heatmap => {
            let second = require_second(kind, second)?;
            heatmap_spec(first, second)
        }
    }
}

/// Histogram-plus-boxplot artifacts attached to a numeric column profile.
/// The histogram uses at most 15 bins, capped by the number of distinct
/// values so sparse columns keep one bar per value.
pub fn distribution_plots(
    dataset: &Dataset,
    name: &str,
) -> Result<Vec<PlotSpec>, RequestError> {
    let column = dataset
        .column(name)
        .ok_or_else(|| RequestError::ColumnNotFound(name.to_string()))?;
    let values = numeric_values(column);
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let bins = HISTOGRAM_BINS.min(15).min(column.unique_count().max(1));
    let (width, height) = canvas_size(1, 1);
    let histogram = PlotSpec {
        kind: PlotKind::Histogram,
        title: format!("Distribution of {name}"),
        x_label: "Value".to_string(),
        y_label: "Frequency".to_string(),
        width,
        height,
        geometry: Geometry::Histogram {
            bins: compute_bins(&values, bins),
        },
    };
    let boxplot = boxplot_spec(column, None)?;
    Ok(vec![histogram, boxplot])
}

fn require_second<'a>(
    kind: PlotKind,
    second: Option<&'a Column>,
) -> Result<&'a Column, RequestError> {
    second.ok_or_else(|| {
        RequestError::invalid(format!("plot kind '{kind}' requires a second column"))
    })
}

fn no_usable_values(name: &str) -> RequestError {
    RequestError::invalid(format!("column '{name}' has no usable values to plot"))
}

/// Non-missing numeric values of a single column.
fn numeric_values(column: &Column) -> Vec<f64> {
    column.cells.iter().filter_map(Cell::to_numeric).collect()
}

/// Row indices where every participating column has a value.
fn present_rows(columns: &[&Column]) -> Vec<usize> {
    let rows = columns.first().map(|c| c.len()).unwrap_or(0);
    (0..rows)
        .filter(|row| columns.iter().all(|c| !c.cells[*row].is_null()))
        .collect()
}

/// Canvas size in inches, derived from the categorical level count on each
/// axis. A purely numeric axis contributes one level; when exactly one axis
/// scales with its levels the other is held near a 4:3 aspect.
fn canvas_size(x_levels: usize, y_levels: usize) -> (f64, f64) {
    let mut width = (x_levels as f64 * LEVEL_STEP).clamp(MIN_WIDTH, MAX_WIDTH);
    let mut height = (y_levels as f64 * LEVEL_STEP).clamp(MIN_HEIGHT, MAX_HEIGHT);
    if y_levels == 1 && x_levels > 1 {
        height = (width * 0.75).clamp(MIN_HEIGHT, MAX_HEIGHT);
    } else if x_levels == 1 && y_levels > 1 {
        width = (height * 1.25).clamp(MIN_WIDTH, MAX_WIDTH);
    }
    (width, height)
}

fn compute_bins(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for value in values {
        let idx = (((value - min) / width) as usize).min(bin_count - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: min + (idx + 1) as f64 * width,
            count,
        })
        .collect()
}

fn histogram_spec(column: &Column) -> Result<PlotSpec, RequestError> {
    let values = numeric_values(column);
    if values.is_empty() {
        return Err(no_usable_values(&column.name));
    }
    let (width, height) = canvas_size(1, 1);
    Ok(PlotSpec {
        kind: PlotKind::Histogram,
        title: format!("Histogram of {}", column.name),
        x_label: column.name.clone(),
        y_label: "Frequency".to_string(),
        width,
        height,
        geometry: Geometry::Histogram {
            bins: compute_bins(&values, HISTOGRAM_BINS),
        },
    })
}

/// Density curve: a fine histogram resampled into a polyline through the
/// bin centers, normalized so the area under the curve is one.
fn density_curve(values: &[f64], bin_count: usize) -> Vec<CurvePoint> {
    let bins = compute_bins(values, bin_count);
    let total = values.len() as f64;
    bins.into_iter()
        .map(|bin| {
            let width = bin.end - bin.start;
            let y = if width > 0.0 {
                bin.count as f64 / (total * width)
            } else {
                1.0
            };
            CurvePoint {
                x: (bin.start + bin.end) / 2.0,
                y,
            }
        })
        .collect()
}

fn density_spec(column: &Column) -> Result<PlotSpec, RequestError> {
    let values = numeric_values(column);
    if values.is_empty() {
        return Err(no_usable_values(&column.name));
    }
    let (width, height) = canvas_size(1, 1);
    Ok(PlotSpec {
        kind: PlotKind::Density,
        title: format!("Density Plot of {}", column.name),
        x_label: column.name.clone(),
        y_label: "Density".to_string(),
        width,
        height,
        geometry: Geometry::Curve {
            points: density_curve(&values, DENSITY_BINS),
        },
    })
}

fn barchart_spec(column: &Column) -> Result<PlotSpec, RequestError> {
    let counts = frequency::value_counts(column);
    if counts.is_empty() {
        return Err(no_usable_values(&column.name));
    }
    let bars = counts
        .into_iter()
        .map(|(label, count)| BarSlice { label, count })
        .collect::<Vec<_>>();
    let (width, height) = canvas_size(bars.len(), 1);
    Ok(PlotSpec {
        kind: PlotKind::Barchart,
        title: format!("Bar Chart of {}", column.name),
        x_label: column.name.clone(),
        y_label: "Count".to_string(),
        width,
        height,
        geometry: Geometry::Bars {
            bars,
            label_rotation: 45,
        },
    })
}

fn piechart_spec(column: &Column) -> Result<PlotSpec, RequestError> {
    let counts = frequency::value_counts(column);
    if counts.is_empty() {
        return Err(no_usable_values(&column.name));
    }
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    let slices = counts
        .into_iter()
        .map(|(label, count)| PieSlice {
            label,
            count,
            percent: crate::data::round_to(count as f64 / total as f64 * 100.0, 2),
        })
        .collect();
    Ok(PlotSpec {
        kind: PlotKind::Piechart,
        title: format!("Pie Chart of {}", column.name),
        x_label: String::new(),
        y_label: String::new(),
        width: MIN_WIDTH,
        height: MIN_WIDTH,
        geometry: Geometry::Pie { slices },
    })
}

/// Groups the numeric values of `column` by the display value of `group`,
/// in first-seen order. Rows missing either side or failing numeric
/// coercion are dropped pairwise.
fn grouped_values(column: &Column, group: &Column) -> Vec<(String, Vec<f64>)> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<f64>> = HashMap::new();
    for row in present_rows(&[column, group]) {
        let Some(value) = column.cells[row].to_numeric() else {
            continue;
        };
        let key = group.cells[row].display();
        match buckets.get_mut(&key) {
            Some(bucket) => bucket.push(value),
            None => {
                order.push(key.clone());
                buckets.insert(key, vec![value]);
            }
        }
    }
    order
        .into_iter()
        .map(|key| {
            let values = buckets.remove(&key).unwrap_or_default();
            (key, values)
        })
        .collect()
}

fn box_stats(label: String, values: Vec<f64>) -> Option<BoxStats> {
    let dist = NumericDistribution::from_values(values);
    let q1 = dist.quantile(0.25)?;
    let median = dist.median()?;
    let q3 = dist.quantile(0.75)?;
    let (low, high) = dist.outlier_bounds()?;
    let inside = dist
        .values()
        .iter()
        .filter(|v| **v >= low && **v <= high)
        .copied()
        .collect::<Vec<_>>();
    let whisker_low = inside.first().copied().unwrap_or(q1);
    let whisker_high = inside.last().copied().unwrap_or(q3);
    let outliers = dist
        .values()
        .iter()
        .filter(|v| **v < low || **v > high)
        .copied()
        .collect();
    Some(BoxStats {
        label,
        lower_quartile: q1,
        median,
        upper_quartile: q3,
        whisker_low,
        whisker_high,
        outliers,
    })
}

fn distribution_groups(
    column: &Column,
    group: Option<&Column>,
) -> Result<Vec<(String, Vec<f64>)>, RequestError> {
    let groups = match group {
        Some(group) => grouped_values(column, group),
        None => {
            let values = numeric_values(column);
            if values.is_empty() {
                Vec::new()
            } else {
                vec![(column.name.clone(), values)]
            }
        }
    };
    if groups.is_empty() {
        return Err(no_usable_values(&column.name));
    }
    Ok(groups)
}

fn boxplot_spec(column: &Column, group: Option<&Column>) -> Result<PlotSpec, RequestError> {
    let groups = distribution_groups(column, group)?;
    let title = match group {
        Some(group) => format!("Boxplot of {} by {}", column.name, group.name),
        None => format!("Boxplot of {}", column.name),
    };
    let x_label = group.map(|g| g.name.clone()).unwrap_or_default();
    let (width, height) = canvas_size(groups.len(), 1);
    let boxes = groups
        .into_iter()
        .filter_map(|(label, values)| box_stats(label, values))
        .collect::<Vec<_>>();
    if boxes.is_empty() {
        return Err(no_usable_values(&column.name));
    }
    Ok(PlotSpec {
        kind: PlotKind::Boxplot,
        title,
        x_label,
        y_label: column.name.clone(),
        width,
        height,
        geometry: Geometry::Boxes { groups: boxes },
    })
}

fn violin_spec(column: &Column, group: Option<&Column>) -> Result<PlotSpec, RequestError> {
    let groups = distribution_groups(column, group)?;
    let title = match group {
        Some(group) => format!("Violin Plot of {} by {}", column.name, group.name),
        None => format!("Violin Plot of {}", column.name),
    };
    let x_label = group.map(|g| g.name.clone()).unwrap_or_default();
    let (width, height) = canvas_size(groups.len(), 1);
    let violins = groups
        .into_iter()
        .filter_map(|(label, values)| {
            let dist = NumericDistribution::from_values(values);
            let median = dist.median()?;
            Some(ViolinGroup {
                label,
                median,
                curve: density_curve(dist.values(), DENSITY_BINS),
            })
        })
        .collect::<Vec<_>>();
    if violins.is_empty() {
        return Err(no_usable_values(&column.name));
    }
    Ok(PlotSpec {
        kind: PlotKind::Violin,
        title,
        x_label,
        y_label: column.name.clone(),
        width,
        height,
        geometry: Geometry::Violins { groups: violins },
    })
}

fn scatter_spec(first: &Column, second: &Column) -> Result<PlotSpec, RequestError> {
    let points = present_rows(&[first, second])
        .into_iter()
        .filter_map(|row| {
            let x = first.cells[row].to_numeric()?;
            let y = second.cells[row].to_numeric()?;
            Some(PairPoint { x, y })
        })
        .collect::<Vec<_>>();
    if points.is_empty() {
        return Err(no_usable_values(&first.name));
    }
    let (width, height) = canvas_size(1, 1);
    Ok(PlotSpec {
        kind: PlotKind::Scatter,
        title: format!("Scatter Plot of {} vs {}", first.name, second.name),
        x_label: first.name.clone(),
        y_label: second.name.clone(),
        width,
        height,
        geometry: Geometry::Points { points },
    })
}

/// X-axis key of a line plot: timestamps when the axis coerces, otherwise
/// the raw category in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum LineKey {
    Stamp(NaiveDateTime),
    Category(String),
}

impl LineKey {
    fn display(&self) -> String {
        match self {
            LineKey::Stamp(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            LineKey::Category(s) => s.clone(),
        }
    }
}

fn line_tick_format(first: &NaiveDateTime, last: &NaiveDateTime) -> &'static str {
    if first.date() == last.date() {
        "%H:%M:%S"
    } else if first.year() == last.year() {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    }
}

fn line_spec(first: &Column, second: &Column) -> Result<PlotSpec, RequestError> {
    let rows = present_rows(&[first, second]);
    if rows.is_empty() {
        return Err(no_usable_values(&first.name));
    }
    let coercible = rows
        .iter()
        .filter(|row| first.cells[**row].to_stamp().is_some())
        .count();
    let datetime_axis =
        coercible as f64 / rows.len() as f64 * 100.0 >= AXIS_COERCION_THRESHOLD;

    let mut order: Vec<LineKey> = Vec::new();
    let mut sums: HashMap<LineKey, (f64, usize)> = HashMap::new();
    for row in rows {
        let Some(y) = second.cells[row].to_numeric() else {
            continue;
        };
        let key = if datetime_axis {
            match first.cells[row].to_stamp() {
                Some(stamp) => LineKey::Stamp(stamp),
                None => continue,
            }
        } else {
            LineKey::Category(first.cells[row].display())
        };
        match sums.get_mut(&key) {
            Some((sum, count)) => {
                *sum += y;
                *count += 1;
            }
            None => {
                order.push(key.clone());
                sums.insert(key, (y, 1));
            }
        }
    }
    if order.is_empty() {
        return Err(no_usable_values(&second.name));
    }

    order.sort();
    let points = order
        .iter()
        .map(|key| {
            let (sum, count) = sums[key];
            LinePoint {
                x: key.display(),
                y: sum / count as f64,
            }
        })
        .collect::<Vec<_>>();

    let step = order.len().div_ceil(LINE_TICK_CAP);
    let stamp_format = match (order.first(), order.last()) {
        (Some(LineKey::Stamp(first)), Some(LineKey::Stamp(last))) => {
            Some(line_tick_format(first, last))
        }
        _ => None,
    };
    let ticks = order
        .iter()
        .enumerate()
        .step_by(step.max(1))
        .map(|(index, key)| {
            let label = match (key, stamp_format) {
                (LineKey::Stamp(dt), Some(fmt)) => dt.format(fmt).to_string(),
                _ => key.display(),
            };
            AxisTick { index, label }
        })
        .collect::<Vec<_>>();

    let (width, height) = canvas_size(points.len().min(LINE_TICK_CAP), 1);
    Ok(PlotSpec {
        kind: PlotKind::Line,
        title: format!("Line Plot of {} vs {}", first.name, second.name),
        x_label: first.name.clone(),
        y_label: second.name.clone(),
        width,
        height,
        geometry: Geometry::Line { points, ticks },
    })
}

/// Axis discretization for the heatmap cross-tabulation.
enum AxisBins {
    Numeric { min: f64, width: f64, labels: Vec<String> },
    Categories { labels: Vec<String> },
}

impl AxisBins {
    fn labels(&self) -> &[String] {
        match self {
            AxisBins::Numeric { labels, .. } | AxisBins::Categories { labels } => labels,
        }
    }

    fn index_of(&self, cell: &Cell) -> Option<usize> {
        match self {
            AxisBins::Numeric { min, width, labels } => {
                let value = cell.to_numeric()?;
                if *width == 0.0 {
                    return Some(0);
                }
                Some((((value - min) / width) as usize).min(labels.len() - 1))
            }
            AxisBins::Categories { labels } => {
                let key = cell.display();
                labels.iter().position(|label| *label == key)
            }
        }
    }
}

fn axis_bins(column: &Column, rows: &[usize]) -> Option<AxisBins> {
    let values = rows
        .iter()
        .filter_map(|row| column.cells[*row].to_numeric())
        .collect::<Vec<_>>();
    let numeric = values.len() as f64 / rows.len() as f64 * 100.0 >= AXIS_COERCION_THRESHOLD;
    if numeric {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min > max {
            return None;
        }
        if min == max {
            return Some(AxisBins::Numeric {
                min,
                width: 0.0,
                labels: vec![format_number(min)],
            });
        }
        let width = (max - min) / HEATMAP_BINS as f64;
        let labels = (0..HEATMAP_BINS)
            .map(|idx| {
                format!(
                    "{} - {}",
                    format_number(min + idx as f64 * width),
                    format_number(min + (idx + 1) as f64 * width)
                )
            })
            .collect();
        Some(AxisBins::Numeric { min, width, labels })
    } else {
        let labels = rows
            .iter()
            .map(|row| column.cells[*row].display())
            .unique()
            .sorted()
            .collect::<Vec<_>>();
        if labels.is_empty() {
            return None;
        }
        Some(AxisBins::Categories { labels })
    }
}

fn heatmap_spec(first: &Column, second: &Column) -> Result<PlotSpec, RequestError> {
    let rows = present_rows(&[first, second]);
    if rows.is_empty() {
        return Err(no_usable_values(&first.name));
    }
    let x_bins = axis_bins(first, &rows).ok_or_else(|| no_usable_values(&first.name))?;
    let y_bins = axis_bins(second, &rows).ok_or_else(|| no_usable_values(&second.name))?;

    let mut counts = vec![vec![0usize; x_bins.labels().len()]; y_bins.labels().len()];
    for row in rows {
        let (Some(x_idx), Some(y_idx)) = (
            x_bins.index_of(&first.cells[row]),
            y_bins.index_of(&second.cells[row]),
        ) else {
            continue;
        };
        counts[y_idx][x_idx] += 1;
    }
    let max_count = counts
        .iter()
        .flat_map(|row| row.iter())
        .copied()
        .max()
        .unwrap_or(0);

    let (width, height) = canvas_size(x_bins.labels().len(), y_bins.labels().len());
    Ok(PlotSpec {
        kind: PlotKind::Heatmap,
        title: format!("Heatmap of {} vs {}", first.name, second.name),
        x_label: first.name.clone(),
        y_label: second.name.clone(),
        width,
        height,
        geometry: Geometry::Heatmap {
            x_labels: x_bins.labels().to_vec(),
            y_labels: y_bins.labels().to_vec(),
            counts,
            max_count,
        },
    })
}

pub fn execute(args: &PlotArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = Dataset::from_csv_path(&args.input, delimiter, encoding, 0)
        .with_context(|| format!("Loading dataset from {:?}", args.input))?;

    let kind = PlotKind::parse(&args.kind)?;
    let spec = build_plot(&dataset, &args.x, kind, args.y.as_deref())?;
    let rendered = serde_json::to_string_pretty(&spec)?;
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            fs::write(path, rendered).with_context(|| format!("Writing plot spec to {path:?}"))?;
        }
        _ => println!("{rendered}"),
    }
    info!("Built {} spec for column '{}'", spec.kind, args.x);
    Ok(())
}
