//! Chart-type inference from the shape of the data.
//!
//! Only consulted when the caller did not declare a chart kind. Checks run in
//! priority order and the first match wins. Structural patterns (flow and
//! hierarchy records) come before the numeric-count heuristics, since flow or
//! hierarchy data can satisfy a numeric rule by accident.

use serde::{Deserialize, Serialize};

use crate::config::ChartKind;
use crate::data::{coerce_number, FieldAccess, Record};

/// Tunable thresholds for the count-based heuristics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceThresholds {
    /// Minimum records for scatter and radar detection
    pub structural_min_records: usize,
    pub funnel_min_records: usize,
    pub funnel_max_records: usize,
    /// Share of consecutive pairs that must be non-increasing
    pub funnel_decreasing_ratio: f64,
    pub pie_min_records: usize,
    pub pie_max_records: usize,
}

impl Default for InferenceThresholds {
    fn default() -> Self {
        Self {
            structural_min_records: 3,
            funnel_min_records: 2,
            funnel_max_records: 15,
            funnel_decreasing_ratio: 0.6,
            pie_min_records: 3,
            pie_max_records: 20,
        }
    }
}

/// source/target/value in every record
fn is_flow(data: &[Record]) -> bool {
    data.all_have_fields(&["source", "target", "value"])
}

/// name/children on the first record, or name plus numeric value everywhere
fn is_hierarchy(data: &[Record]) -> bool {
    let nested = data
        .first()
        .is_some_and(|row| row.contains_key("children") && row.contains_key("name"));

    nested || (data.all_have_fields(&["name"]) && data.is_numeric_everywhere("value"))
}

fn all_numeric(data: &[Record], series: &[String]) -> bool {
    series.iter().all(|field| data.is_numeric_everywhere(field))
}

/// Single positive, mostly decreasing series
fn is_funnel(data: &[Record], field: &str, thresholds: &InferenceThresholds) -> bool {
    let n = data.len();
    if n < thresholds.funnel_min_records || n > thresholds.funnel_max_records {
        return false;
    }

    let values: Option<Vec<f64>> = data
        .iter()
        .map(|row| row.get(field).and_then(coerce_number))
        .collect();
    let Some(values) = values else {
        return false;
    };
    if values.iter().any(|v| *v <= 0.0) {
        return false;
    }

    let pairs = values.len().saturating_sub(1);
    if pairs == 0 {
        return false;
    }
    let non_increasing = values.windows(2).filter(|w| w[1] <= w[0]).count();

    non_increasing as f64 / pairs as f64 >= thresholds.funnel_decreasing_ratio
}

/// Choose a chart kind with the default thresholds
pub fn infer_chart_kind(data: &[Record], series: &[String]) -> ChartKind {
    infer_chart_kind_with(data, series, &InferenceThresholds::default())
}

/// Choose a chart kind from the data shape and the selected series
pub fn infer_chart_kind_with(
    data: &[Record],
    series: &[String],
    thresholds: &InferenceThresholds,
) -> ChartKind {
    let records = data.len();

    let kind = if is_flow(data) {
        ChartKind::Sankey
    } else if is_hierarchy(data) {
        ChartKind::Treemap
    } else if series.len() == 2
        && records >= thresholds.structural_min_records
        && all_numeric(data, series)
    {
        ChartKind::Scatter
    } else if series.len() >= 3
        && records >= thresholds.structural_min_records
        && all_numeric(data, series)
    {
        ChartKind::Radar
    } else if series.len() == 1 && is_funnel(data, &series[0], thresholds) {
        ChartKind::Funnel
    } else if series.len() == 1
        && (thresholds.pie_min_records..=thresholds.pie_max_records).contains(&records)
    {
        ChartKind::Pie
    } else if series.len() >= 2 {
        ChartKind::Composed
    } else {
        ChartKind::Bar
    };

    tracing::debug!(
        "Inferred chart kind {} from {} records and {} series",
        kind.as_ref(),
        records,
        series.len()
    );
    kind
}
