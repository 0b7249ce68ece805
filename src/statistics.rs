//! Statistic engine: numeric extraction and summary statistics over datasets.
//!
//! All functions are pure and never fail. Empty input yields `0.0` for
//! `average` and `median`; `min`/`max` return `None` so callers must handle
//! the empty case themselves.

use strum::{AsRefStr, EnumIter, EnumString};

use crate::data::{as_strict_number, coerce_number, Record};

/// Statistic keywords accepted in reference expressions
#[derive(AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum Statistic {
    #[strum(serialize = "average", serialize = "mean")]
    Average,
    #[strum(serialize = "median")]
    Median,
    #[strum(serialize = "max", serialize = "maximum")]
    Max,
    #[strum(serialize = "min", serialize = "minimum")]
    Min,
}

impl Statistic {
    /// Evaluate the statistic, `None` when `values` is empty
    pub fn evaluate(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Statistic::Average => Some(average(values)),
            Statistic::Median => Some(median(values)),
            Statistic::Max => max(values),
            Statistic::Min => min(values),
        }
    }
}

/// Extract numeric values from a dataset in row order.
///
/// With a field name, that field is read from each row and numeric strings
/// are coerced. Without one, every field of every row is scanned but only
/// true JSON numbers are taken, so unrelated text columns are never coerced.
pub fn extract(data: &[Record], field: Option<&str>) -> Vec<f64> {
    match field {
        Some(field) => data
            .iter()
            .filter_map(|row| row.get(field).and_then(coerce_number))
            .collect(),
        None => data
            .iter()
            .flat_map(|row| row.values().filter_map(as_strict_number))
            .collect(),
    }
}

/// Arithmetic mean, `0.0` for empty input
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of the values, `0.0` for empty input
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len();
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    #[allow(clippy::manual_is_multiple_of)]
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    median
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().cloned().reduce(f64::max)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().cloned().reduce(f64::min)
}

/// Container for the summary statistics of one column
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Compute all summary statistics at once, `None` for empty input
pub fn summarize(values: &[f64]) -> Option<Summary> {
    Some(Summary {
        count: values.len(),
        average: average(values),
        median: median(values),
        min: min(values)?,
        max: max(values)?,
    })
}
