//! Reference lines and areas.
//!
//! A reference element carries a value expression that is resolved against
//! the chart's data on every normalization pass:
//! - a number is used as-is
//! - `"80%"` is 80% of the column maximum
//! - `"average"`, `"mean"`, `"median"`, `"max"`, `"maximum"`, `"min"`,
//!   `"minimum"` (any case) evaluate that statistic over the column
//! - any other string must parse as a plain number
//!
//! Areas take a two-element `[low, high]` range of such expressions.
//!
//! Resolution never fails a batch: an element whose value cannot be resolved
//! simply has no `resolved` slot. [`validate_elements`] reports why.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use crate::config::AxisSide;
use crate::data::{value_kind, Record};
use crate::statistics::{self, Statistic};

/// Leading numeric portion of a percentage expression
static PERCENT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?<number>[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?)")
        .expect("Failed to compile percentage regex")
});

// ============================================================================
// Error Types
// ============================================================================

/// Reasons a reference value cannot be resolved
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReferenceError {
    #[error("Reference value is undefined")]
    Undefined,

    #[error("Reference value must be a number or string, got {0}")]
    WrongType(&'static str),

    #[error("Invalid percentage '{0}'")]
    InvalidPercentage(String),

    #[error(
        "Unrecognized reference value '{0}' (expected a number, a percentage such as \"50%\", \
         or one of: average, mean, median, max, maximum, min, minimum)"
    )]
    UnknownKeyword(String),

    #[error("No numeric data available to compute '{0}'")]
    NoNumericData(String),

    #[error("Area value must be a two-element [low, high] range, got {0} element(s)")]
    InvalidRange(usize),

    #[error("Area value must be a [low, high] range, got {0}")]
    NotARange(&'static str),
}

// ============================================================================
// Enumerations
// ============================================================================

#[derive(AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "camelCase")]
pub enum ReferenceKind {
    Line,
    Area,
}

/// Where along the axis a reference element is anchored
#[derive(AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "camelCase")]
pub enum Position {
    Start,
    Middle,
    End,
}

#[derive(AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "camelCase")]
pub enum LabelPosition {
    Top,
    Bottom,
    Left,
    Right,
    Center,
    InsideTop,
    InsideBottom,
    InsideLeft,
    InsideRight,
    InsideTopLeft,
    InsideTopRight,
    InsideBottomLeft,
    InsideBottomRight,
}

/// Joined list of an enum's accepted spellings, for error messages
fn accepted<E: IntoEnumIterator + AsRef<str>>() -> String {
    E::iter()
        .map(|e| e.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Reference Element
// ============================================================================

/// Concrete value(s) of a resolved reference element
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolved {
    Point(f64),
    Range(f64, f64),
}

/// A reference line or shaded area overlaid on a chart.
///
/// `kind`, `position` and `label_position` stay as text so that a bad value
/// is reported by [`validate_elements`] instead of rejecting the whole config.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceElement {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Column the statistic is computed over; defaults to the chart's first series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<AxisSide>,
    /// Written by [`build_elements`]; any incoming value is discarded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Resolved>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReferenceElement {
    pub fn line(value: Value) -> Self {
        Self {
            kind: Some(ReferenceKind::Line.as_ref().to_string()),
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn area(low: Value, high: Value) -> Self {
        Self {
            kind: Some(ReferenceKind::Area.as_ref().to_string()),
            value: Some(Value::Array(vec![low, high])),
            ..Default::default()
        }
    }

    /// Parsed element kind, `None` when missing or unrecognized
    pub fn reference_kind(&self) -> Option<ReferenceKind> {
        self.kind
            .as_deref()
            .and_then(|k| ReferenceKind::from_str(k).ok())
    }

    pub fn parsed_position(&self) -> Option<Position> {
        self.position
            .as_deref()
            .and_then(|p| Position::from_str(p).ok())
    }

    pub fn parsed_label_position(&self) -> Option<LabelPosition> {
        self.label_position
            .as_deref()
            .and_then(|p| LabelPosition::from_str(p).ok())
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Numeric values of `field` (or every numeric cell) that a statistic needs
fn values_for(
    data: &[Record],
    field: Option<&str>,
    expression: &str,
) -> Result<Vec<f64>, ReferenceError> {
    let values = statistics::extract(data, field);
    if values.is_empty() {
        return Err(ReferenceError::NoNumericData(expression.to_string()));
    }
    Ok(values)
}

fn evaluate_text(text: &str, data: &[Record], field: Option<&str>) -> Result<f64, ReferenceError> {
    let trimmed = text.trim();

    if let Some(body) = trimmed.strip_suffix('%') {
        let percentage = PERCENT_PREFIX
            .captures(body)
            .and_then(|c| c["number"].parse::<f64>().ok())
            .filter(|p| p.is_finite())
            .ok_or_else(|| ReferenceError::InvalidPercentage(text.to_string()))?;

        let values = values_for(data, field, text)?;
        let max = statistics::max(&values).ok_or_else(|| ReferenceError::NoNumericData(text.to_string()))?;
        return Ok(max * percentage / 100.0);
    }

    if let Ok(statistic) = Statistic::from_str(trimmed) {
        let values = values_for(data, field, text)?;
        return statistic
            .evaluate(&values)
            .ok_or_else(|| ReferenceError::NoNumericData(text.to_string()));
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ReferenceError::UnknownKeyword(text.to_string()))
}

/// Resolve a scalar expression, explaining any failure
pub fn evaluate(expression: &Value, data: &[Record], field: Option<&str>) -> Result<f64, ReferenceError> {
    match expression {
        Value::Null => Err(ReferenceError::Undefined),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(ReferenceError::WrongType("number")),
        Value::String(s) => evaluate_text(s, data, field),
        other => Err(ReferenceError::WrongType(value_kind(other))),
    }
}

/// Resolve a scalar expression; `None` if it cannot be resolved
pub fn resolve(expression: &Value, data: &[Record], field: Option<&str>) -> Option<f64> {
    evaluate(expression, data, field).ok()
}

/// Resolve a `[low, high]` range expression, reordering so `low <= high`
pub fn evaluate_range(
    expression: &Value,
    data: &[Record],
    field: Option<&str>,
) -> Result<(f64, f64), ReferenceError> {
    let bounds = match expression {
        Value::Null => return Err(ReferenceError::Undefined),
        Value::Array(items) => items,
        other => return Err(ReferenceError::NotARange(value_kind(other))),
    };
    if bounds.len() != 2 {
        return Err(ReferenceError::InvalidRange(bounds.len()));
    }

    let a = evaluate(&bounds[0], data, field)?;
    let b = evaluate(&bounds[1], data, field)?;
    Ok(if a <= b { (a, b) } else { (b, a) })
}

pub fn resolve_range(expression: &Value, data: &[Record], field: Option<&str>) -> Option<(f64, f64)> {
    evaluate_range(expression, data, field).ok()
}

/// Check an optional expression, returning the normalized value or the reason it is invalid
pub fn validate(
    expression: Option<&Value>,
    data: &[Record],
    field: Option<&str>,
) -> Result<f64, ReferenceError> {
    evaluate(expression.unwrap_or(&Value::Null), data, field)
}

/// Resolve one element's value according to its kind
fn evaluate_element(
    element: &ReferenceElement,
    data: &[Record],
    field: Option<&str>,
) -> Result<Resolved, ReferenceError> {
    let value = element.value.as_ref().unwrap_or(&Value::Null);
    let field = element.data_key.as_deref().or(field);

    match element.reference_kind() {
        Some(ReferenceKind::Area) => {
            evaluate_range(value, data, field).map(|(low, high)| Resolved::Range(low, high))
        }
        _ => evaluate(value, data, field).map(Resolved::Point),
    }
}

/// Resolve every element, keeping all other fields unchanged.
///
/// Elements that fail to resolve come back with `resolved: None`.
pub fn build_elements(
    elements: &[ReferenceElement],
    data: &[Record],
    field: Option<&str>,
) -> Vec<ReferenceElement> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let mut built = element.clone();
            built.resolved = match evaluate_element(element, data, field) {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    tracing::warn!("Reference element {} left unresolved: {}", index, e);
                    None
                }
            };
            built
        })
        .collect()
}

/// One human-readable message per invalid element
pub fn validate_elements(
    elements: &[ReferenceElement],
    data: &[Record],
    field: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        let mut problems: Vec<String> = Vec::new();

        match element.kind.as_deref() {
            None => problems.push("missing type (expected line or area)".to_string()),
            Some(kind) if element.reference_kind().is_none() => problems.push(format!(
                "invalid type '{}' (expected {})",
                kind,
                accepted::<ReferenceKind>()
            )),
            Some(_) => {}
        }

        // an unknown or missing type still has its value checked as a line
        if let Err(e) = evaluate_element(element, data, field) {
            problems.push(e.to_string());
        }

        if let Some(opacity) = element.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                problems.push(format!("opacity {} must be between 0 and 1", opacity));
            }
        }

        if let Some(position) = element.position.as_deref() {
            if element.parsed_position().is_none() {
                problems.push(format!(
                    "invalid position '{}' (expected {})",
                    position,
                    accepted::<Position>()
                ));
            }
        }

        if let Some(label_position) = element.label_position.as_deref() {
            if element.parsed_label_position().is_none() {
                problems.push(format!(
                    "invalid labelPosition '{}' (expected {})",
                    label_position,
                    accepted::<LabelPosition>()
                ));
            }
        }

        if !problems.is_empty() {
            errors.push(format!(
                "Reference element {}: {}",
                index,
                problems.join("; ")
            ));
        }
    }

    errors
}
