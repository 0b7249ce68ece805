//! Tabular dataset types and the dataset lookup collaborator.
//!
//! A dataset is an ordered list of records. Row order is significant because
//! brush ranges and synchronized tooltips address rows by index. No schema is
//! enforced: whether a field is numeric is decided per operation by whether
//! its value coerces to a finite number.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// A single row: field name -> loosely typed value
pub type Record = Map<String, Value>;

/// An owned dataset in row order
pub type Dataset = Vec<Record>;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by a [`DatasetLookup`] implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// No dataset is registered under the identifier
    #[error("Dataset not found: {0}")]
    NotFound(String),

    /// The stored payload is not an array of objects
    #[error("Dataset {id} is malformed: {reason}")]
    Malformed { id: String, reason: String },
}

/// Errors raised while turning a JSON value into a dataset
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// The value is not a JSON array
    #[error("Data must be an array of records, got {0}")]
    NotAnArray(&'static str),

    /// An element of the array is not a JSON object
    #[error("Record {index} is not an object (got {kind})")]
    NotAnObject { index: usize, kind: &'static str },
}

// ============================================================================
// Numeric Coercion
// ============================================================================

/// Coerce a value to a finite number.
///
/// Numbers pass through, strings are trimmed and parsed. Everything else
/// (bool, null, arrays, objects) is not numeric.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Strict numeric check: only JSON numbers count, strings never do
pub fn as_strict_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Short name of a JSON value's type, for error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert an arbitrary JSON value into a dataset
pub fn dataset_from_value(value: &Value) -> Result<Dataset, DataError> {
    let rows = value
        .as_array()
        .ok_or_else(|| DataError::NotAnArray(value_kind(value)))?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            row.as_object()
                .cloned()
                .ok_or_else(|| DataError::NotAnObject {
                    index,
                    kind: value_kind(row),
                })
        })
        .collect()
}

// ============================================================================
// Field Access
// ============================================================================

/// Helper trait for reading columns out of a dataset by field name
pub trait FieldAccess {
    /// Numeric value of `field` in every row where it coerces, in row order
    fn numeric_column(&self, field: &str) -> Vec<f64>;

    /// True when `field` is present and numeric in every row
    fn is_numeric_everywhere(&self, field: &str) -> bool;

    /// True when `field` coerces to a number in at least one row
    fn is_numeric_somewhere(&self, field: &str) -> bool;

    /// True when every row carries all of `fields`
    fn all_have_fields(&self, fields: &[&str]) -> bool;

    /// Field names of the first row, in insertion order
    fn first_fields(&self) -> Vec<String>;
}

impl FieldAccess for [Record] {
    fn numeric_column(&self, field: &str) -> Vec<f64> {
        self.iter()
            .filter_map(|row| row.get(field).and_then(coerce_number))
            .collect()
    }

    fn is_numeric_everywhere(&self, field: &str) -> bool {
        !self.is_empty()
            && self
                .iter()
                .all(|row| row.get(field).and_then(coerce_number).is_some())
    }

    fn is_numeric_somewhere(&self, field: &str) -> bool {
        self.iter()
            .any(|row| row.get(field).and_then(coerce_number).is_some())
    }

    fn all_have_fields(&self, fields: &[&str]) -> bool {
        !self.is_empty()
            && self
                .iter()
                .all(|row| fields.iter().all(|f| row.contains_key(*f)))
    }

    fn first_fields(&self) -> Vec<String> {
        self.first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// Dataset Lookup
// ============================================================================

/// External collaborator that resolves an opaque dataset identifier
pub trait DatasetLookup {
    /// Fetch the dataset registered under `id`
    fn lookup(&self, id: &str) -> Result<Dataset, LookupError>;
}

/// Lookup that knows no datasets; every identifier is not found
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDatasets;

impl DatasetLookup for NoDatasets {
    fn lookup(&self, id: &str) -> Result<Dataset, LookupError> {
        Err(LookupError::NotFound(id.to_string()))
    }
}

/// In-memory dataset store keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatasets {
    datasets: HashMap<String, Dataset>,
}

impl InMemoryDatasets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a dataset
    pub fn insert(&mut self, id: impl Into<String>, data: Dataset) {
        self.datasets.insert(id.into(), data);
    }

    /// Register a dataset from raw JSON, validating its shape
    pub fn insert_json(&mut self, id: impl Into<String>, value: &Value) -> Result<(), LookupError> {
        let id = id.into();
        let data = dataset_from_value(value).map_err(|e| LookupError::Malformed {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        self.datasets.insert(id, data);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Dataset> {
        self.datasets.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.datasets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl DatasetLookup for InMemoryDatasets {
    fn lookup(&self, id: &str) -> Result<Dataset, LookupError> {
        self.datasets
            .get(id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }
}
