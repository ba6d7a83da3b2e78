//! Numeric distribution statistics for the column profiler.
//!
//! All statistics are computed over the successfully coerced values only;
//! a statistic that is undefined for the input (empty column, single value
//! for the standard deviation) is simply absent from the summary.

use crate::data::{format_number, round_to};
use crate::summary::{Fact, Summary};

pub const OUTLIER_IQR_FACTOR: f64 = 1.5;

/// A sorted numeric sample.
#[derive(Debug, Clone)]
pub struct NumericDistribution {
    sorted: Vec<f64>,
}

impl NumericDistribution {
    pub fn from_values(values: Vec<f64>) -> Self {
        let mut sorted = values;
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.sorted
    }

    pub fn min(&self) -> Option<f64> {
        self.sorted.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.sorted.last().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.sorted.is_empty() {
            return None;
        }
        Some(self.sorted.iter().sum::<f64>() / self.sorted.len() as f64)
    }

    /// Sample standard deviation; undefined for fewer than two values.
    pub fn std_dev(&self) -> Option<f64> {
        if self.sorted.len() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let variance = self
            .sorted
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / (self.sorted.len() as f64 - 1.0);
        Some(variance.max(0.0).sqrt())
    }

    pub fn median(&self) -> Option<f64> {
        self.quantile(0.5)
    }

    /// Linearly interpolated quantile over the sorted sample.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.sorted.is_empty() {
            return None;
        }
        let pos = q * (self.sorted.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;
        if lower == upper {
            return Some(self.sorted[lower]);
        }
        let fraction = pos - lower as f64;
        Some(self.sorted[lower] + (self.sorted[upper] - self.sorted[lower]) * fraction)
    }

    pub fn zero_count(&self) -> usize {
        self.sorted.iter().filter(|v| **v == 0.0).count()
    }

    /// Fence positions of the 1.5×IQR rule, when the quartiles exist.
    pub fn outlier_bounds(&self) -> Option<(f64, f64)> {
        let q1 = self.quantile(0.25)?;
        let q3 = self.quantile(0.75)?;
        let iqr = q3 - q1;
        Some((
            q1 - OUTLIER_IQR_FACTOR * iqr,
            q3 + OUTLIER_IQR_FACTOR * iqr,
        ))
    }

    pub fn outlier_count(&self) -> usize {
        match self.outlier_bounds() {
            Some((low, high)) => self
                .sorted
                .iter()
                .filter(|v| **v < low || **v > high)
                .count(),
            None => 0,
        }
    }
}

/// Appends the numeric facts to a column summary, in display order. Facts
/// whose statistic is undefined are omitted.
pub fn numeric_facts(dist: &NumericDistribution, summary: &mut Summary) {
    let zero_count = dist.zero_count();
    if zero_count > 0 {
        summary.set("Zero", Fact::Count(zero_count));
    }
    if let Some(mean) = dist.mean() {
        summary.set("Mean", Fact::Number(round_to(mean, 4)));
    }
    if let Some(median) = dist.median() {
        summary.set("Median", Fact::Number(median));
    }
    if let (Some(min), Some(max)) = (dist.min(), dist.max()) {
        summary.set(
            "Range",
            Fact::text(format!("{} - {}", format_number(min), format_number(max))),
        );
    }
    if let Some(std_dev) = dist.std_dev() {
        summary.set("Standard Deviation", Fact::Number(round_to(std_dev, 4)));
    }
    if let Some(q1) = dist.quantile(0.25) {
        summary.set("Lower Quartile", Fact::Number(q1));
    }
    if let Some(q3) = dist.quantile(0.75) {
        summary.set("Upper Quartile", Fact::Number(q3));
    }
    let outliers = dist.outlier_count();
    if outliers > 0 {
        summary.set("Outlier Count (1.5x IQR)", Fact::Count(outliers));
    }
}
