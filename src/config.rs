//! Chart configuration types.
//!
//! Two distinct types model the two ends of normalization:
//! - [`RawChartConfig`] is what a caller hands in: every field optional,
//!   unknown keys preserved verbatim.
//! - [`CanonicalConfig`] is what the renderer receives: chart kind, x-axis
//!   field and series list are always concrete. It can only be produced by
//!   [`crate::normalize`] and exposes read-only accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use strum::{AsRefStr, EnumIter, EnumString};

use crate::brush::BrushConfig;
use crate::data::Dataset;
use crate::reference::ReferenceElement;

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of chart the renderer should draw
#[derive(
    AsRefStr, Clone, Copy, Debug, EnumIter, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
    Radar,
    Funnel,
    /// Hierarchical data (name/children or name/value records)
    Treemap,
    /// Flow data (source/target/value records)
    Sankey,
    /// Mixed bar/line/area series on shared axes
    Composed,
    RadialBar,
}

impl ChartKind {
    /// Whether the renderer needs a per-series type map for this kind
    pub fn mixes_series_kinds(&self) -> bool {
        matches!(self, ChartKind::Composed)
    }
}

/// Trace type of one series inside a composed chart
#[derive(AsRefStr, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SeriesKind {
    Bar,
    Line,
    Area,
}

/// How multiple series are stacked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackMode {
    #[default]
    None,
    Stacked,
    Percent,
}

/// Line interpolation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurveType {
    Linear,
    #[default]
    Monotone,
    Natural,
    Step,
    StepBefore,
    StepAfter,
    Basis,
    Cardinal,
}

/// What clicking a legend entry does
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegendClickAction {
    #[default]
    Toggle,
    Highlight,
    None,
}

/// How synchronized charts address the shared tooltip/brush position
#[derive(AsRefStr, Clone, Copy, Debug, Default, EnumString, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SyncMethod {
    /// Same row index in every chart
    #[default]
    Index,
    /// Same x-axis value, looked up per chart
    Value,
}

/// Y axis a series is plotted against
#[derive(AsRefStr, Clone, Copy, Debug, EnumString, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AxisSide {
    Left,
    Right,
}

// ============================================================================
// Shared Options
// ============================================================================

/// Legend settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_action: Option<LegendClickAction>,
}

/// Optional presentation fields.
///
/// Shared by the raw and canonical configurations. Normalization passes each
/// one through unchanged when present and leaves it absent otherwise, so the
/// renderer applies its own defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_mode: Option<StackMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_type: Option<CurveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brush: Option<BrushConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ReferenceElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_axis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_axis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_method: Option<SyncMethod>,
}

// ============================================================================
// Raw Configuration
// ============================================================================

/// Caller-supplied configuration; any field may be absent
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChartConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
    /// Inline data; kept loosely typed so shape errors surface from normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_types: Option<BTreeMap<String, SeriesKind>>,
    #[serde(flatten)]
    pub options: DisplayOptions,
    /// Unrecognized keys, passed through opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawChartConfig {
    /// Parse a raw configuration from loosely typed JSON
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Start a configuration around inline data
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }
}

// ============================================================================
// Canonical Configuration
// ============================================================================

/// Fully resolved, renderer-ready configuration
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalConfig {
    #[serde(rename = "type")]
    pub(crate) kind: ChartKind,
    pub(crate) data: Dataset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) dataset_id: Option<String>,
    pub(crate) x_key: String,
    pub(crate) series: Vec<String>,
    /// Present only for composed charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) series_types: Option<BTreeMap<String, SeriesKind>>,
    /// Series -> axis side, restricted to selected series
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) axis_map: Option<BTreeMap<String, AxisSide>>,
    #[serde(flatten)]
    pub(crate) options: DisplayOptions,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl CanonicalConfig {
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn data(&self) -> &[crate::data::Record] {
        &self.data
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    pub fn x_key(&self) -> &str {
        &self.x_key
    }

    pub fn series(&self) -> &[String] {
        &self.series
    }

    pub fn series_types(&self) -> Option<&BTreeMap<String, SeriesKind>> {
        self.series_types.as_ref()
    }

    pub fn axis_map(&self) -> Option<&BTreeMap<String, AxisSide>> {
        self.axis_map.as_ref()
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    pub fn references(&self) -> &[ReferenceElement] {
        self.options.references.as_deref().unwrap_or(&[])
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Serialize to JSON for the rendering collaborator
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
