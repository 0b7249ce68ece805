//! autochart - chart configuration resolution for tabular JSON data
//!
//! This library turns a loosely typed chart configuration plus a dataset into
//! a fully resolved configuration that a rendering layer can draw without
//! guessing. Drawing itself is out of scope.
//!
//! ## Module Structure
//!
//! - [`data`] - Dataset types, numeric coercion and the dataset lookup trait
//! - [`statistics`] - Numeric extraction and summary statistics
//! - [`reference`] - Reference line/area value resolution and validation
//! - [`infer`] - Chart-type inference from data shape
//! - [`config`] - Raw and canonical configuration types
//! - [`normalize`] - Raw to canonical configuration pipeline
//! - [`sync`] - Cross-chart tooltip and brush synchronization
//! - [`brush`] - Visible range state machine
//! - [`settings`] - Tunable thresholds and interaction defaults

pub mod brush;
pub mod config;
pub mod data;
pub mod infer;
pub mod normalize;
pub mod reference;
pub mod settings;
pub mod statistics;
pub mod sync;

pub use config::{CanonicalConfig, ChartKind, RawChartConfig};
pub use data::{Dataset, DatasetLookup, InMemoryDatasets, Record};
pub use normalize::{normalize, validate_config, ConfigError, Normalizer};
pub use sync::SyncRegistry;
