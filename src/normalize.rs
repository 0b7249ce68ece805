//! Configuration normalization.
//!
//! Turns a sparse [`RawChartConfig`] into a [`CanonicalConfig`]:
//! 1. resolve the dataset (inline data first, then `datasetId` lookup)
//! 2. pick the x-axis field (declared, else first field of the first record)
//! 3. pick series (declared, else every other field numeric in some record)
//! 4. infer the chart kind when none is declared
//! 5. build the per-series type map for composed charts only
//! 6. build the dual-axis map from `leftAxis`/`rightAxis`
//! 7. resolve reference elements against the data
//!
//! Everything else is passed through untouched. Failures in steps 1-3 are
//! fatal and no partial configuration is returned. Reference elements that
//! fail to resolve are kept without a value and reported by [`validate_config`].

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::brush::validate_brush_config;
use crate::config::{AxisSide, CanonicalConfig, RawChartConfig, SeriesKind};
use crate::data::{
    dataset_from_value, DataError, Dataset, DatasetLookup, FieldAccess, LookupError, Record,
};
use crate::infer::{infer_chart_kind_with, InferenceThresholds};
use crate::reference::{build_elements, validate_elements};

/// Keys computed by normalization that must not be carried over from input
const DERIVED_KEYS: &[&str] = &["axisMap"];

// ============================================================================
// Error Types
// ============================================================================

/// Fatal configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("No data supplied: provide inline data or a datasetId")]
    MissingData,

    #[error(transparent)]
    MalformedData(#[from] DataError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Data is empty")]
    EmptyData,

    #[error("First record has no fields")]
    NoFields,

    #[error("x-axis field '{field}' not found in data (available fields: {available})")]
    MissingXKey { field: String, available: String },

    #[error("No numeric field available for series (fields: {0})")]
    NoSeries(String),
}

// ============================================================================
// Normalizer
// ============================================================================

/// Normalizes raw configurations against a dataset lookup
pub struct Normalizer<'a> {
    lookup: &'a dyn DatasetLookup,
    thresholds: InferenceThresholds,
}

impl<'a> Normalizer<'a> {
    pub fn new(lookup: &'a dyn DatasetLookup) -> Self {
        Self {
            lookup,
            thresholds: InferenceThresholds::default(),
        }
    }

    /// Use custom inference thresholds
    pub fn with_thresholds(mut self, thresholds: InferenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Normalize loosely typed JSON
    pub fn normalize_value(&self, value: Value) -> Result<CanonicalConfig, ConfigError> {
        let raw = RawChartConfig::from_value(value)?;
        self.normalize(raw)
    }

    /// Normalize a raw configuration
    pub fn normalize(&self, raw: RawChartConfig) -> Result<CanonicalConfig, ConfigError> {
        let RawChartConfig {
            kind,
            data,
            dataset_id,
            x_key,
            series,
            series_types,
            mut options,
            mut extra,
        } = raw;

        let data = self.resolve_data(data, dataset_id.as_deref())?;
        let x_key = select_x_key(&data, x_key)?;
        let series = select_series(&data, &x_key, series)?;

        let kind = match kind {
            Some(kind) => kind,
            None => infer_chart_kind_with(&data, &series, &self.thresholds),
        };

        let series_types = kind
            .mixes_series_kinds()
            .then(|| build_series_types(&series, series_types.as_ref()));

        let axis_map = build_axis_map(
            &series,
            options.left_axis.as_deref(),
            options.right_axis.as_deref(),
        );

        if let Some(references) = options.references.take() {
            let field = series.first().map(String::as_str);
            options.references = Some(build_elements(&references, &data, field));
        }

        for key in DERIVED_KEYS {
            extra.remove(*key);
        }

        tracing::debug!(
            "Normalized {} chart: {} rows, x={}, series=[{}]",
            kind.as_ref(),
            data.len(),
            x_key,
            series.join(", ")
        );

        Ok(CanonicalConfig {
            kind,
            data,
            dataset_id,
            x_key,
            series,
            series_types,
            axis_map,
            options,
            extra,
        })
    }

    fn resolve_data(
        &self,
        inline: Option<Value>,
        dataset_id: Option<&str>,
    ) -> Result<Dataset, ConfigError> {
        let data = match (inline, dataset_id) {
            (Some(value), _) => dataset_from_value(&value)?,
            (None, Some(id)) => self.lookup.lookup(id)?,
            (None, None) => return Err(ConfigError::MissingData),
        };

        let first = data.first().ok_or(ConfigError::EmptyData)?;
        if first.is_empty() {
            return Err(ConfigError::NoFields);
        }
        Ok(data)
    }
}

/// Normalize with default thresholds
pub fn normalize(
    raw: RawChartConfig,
    lookup: &dyn DatasetLookup,
) -> Result<CanonicalConfig, ConfigError> {
    Normalizer::new(lookup).normalize(raw)
}

// ============================================================================
// Field Selection
// ============================================================================

/// Every field name in the data, in order of first appearance
fn all_fields(data: &[Record]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for row in data {
        for key in row.keys() {
            if !fields.contains(key) {
                fields.push(key.clone());
            }
        }
    }
    fields
}

fn select_x_key(data: &[Record], declared: Option<String>) -> Result<String, ConfigError> {
    let field = match declared {
        Some(field) => field,
        None => data
            .first_fields()
            .into_iter()
            .next()
            .ok_or(ConfigError::NoFields)?,
    };

    if !data.iter().any(|row| row.contains_key(&field)) {
        return Err(ConfigError::MissingXKey {
            field,
            available: all_fields(data).join(", "),
        });
    }
    Ok(field)
}

fn select_series(
    data: &[Record],
    x_key: &str,
    declared: Option<Vec<String>>,
) -> Result<Vec<String>, ConfigError> {
    if let Some(series) = declared.filter(|s| !s.is_empty()) {
        for field in &series {
            if !data.is_numeric_somewhere(field) {
                tracing::warn!("Declared series '{}' has no numeric values", field);
            }
        }
        return Ok(series);
    }

    let fields = all_fields(data);
    let series: Vec<String> = fields
        .iter()
        .filter(|f| f.as_str() != x_key && data.is_numeric_somewhere(f))
        .cloned()
        .collect();

    if series.is_empty() {
        return Err(ConfigError::NoSeries(fields.join(", ")));
    }
    Ok(series)
}

/// Declared entries win; the first series defaults to bar, the rest to line
fn build_series_types(
    series: &[String],
    declared: Option<&BTreeMap<String, SeriesKind>>,
) -> BTreeMap<String, SeriesKind> {
    series
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let fallback = if i == 0 { SeriesKind::Bar } else { SeriesKind::Line };
            let kind = declared
                .and_then(|d| d.get(name).copied())
                .unwrap_or(fallback);
            (name.clone(), kind)
        })
        .collect()
}

/// Series -> axis side for selected series; right wins if listed on both
fn build_axis_map(
    series: &[String],
    left: Option<&[String]>,
    right: Option<&[String]>,
) -> Option<BTreeMap<String, AxisSide>> {
    if left.is_none() && right.is_none() {
        return None;
    }

    let mut map = BTreeMap::new();
    for (side, fields) in [(AxisSide::Left, left), (AxisSide::Right, right)] {
        for field in fields.unwrap_or_default() {
            if series.contains(field) {
                map.insert(field.clone(), side);
            }
        }
    }

    (!map.is_empty()).then_some(map)
}

// ============================================================================
// Validation
// ============================================================================

/// Non-fatal problems in a canonical configuration, one message each
pub fn validate_config(config: &CanonicalConfig) -> Vec<String> {
    let mut issues = validate_elements(
        config.references(),
        config.data(),
        config.series().first().map(String::as_str),
    );

    if let Some(brush) = config.options().brush.as_ref() {
        if let Err(e) = validate_brush_config(brush, config.data()) {
            issues.push(format!("Brush: {}", e));
        }
    }

    issues
}
