//! Brush (visible range) state machine.
//!
//! Ranges are half-open `[start_index, end_index)` row ranges. Every mutation
//! goes through clamping so the invariant `0 <= start < end <= data_length`
//! holds after each call, whatever the input. Invalid requests are corrected
//! to the nearest valid range rather than rejected; only a zero-length
//! dataset is an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Record;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from brush state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrushError {
    #[error("Brush requires a non-empty dataset")]
    EmptyData,
}

/// Reasons a brush configuration is rejected by [`validate_brush_config`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BrushConfigError {
    #[error("Brush requires data to be a non-empty array")]
    EmptyData,

    #[error("dataStartIndex must be non-negative, got {0}")]
    NegativeStart(i64),

    #[error("dataEndIndex {end} exceeds data length {len}")]
    EndBeyondData { end: i64, len: usize },

    #[error("dataStartIndex {start} must be less than dataEndIndex {end}")]
    StartNotBeforeEnd { start: i64, end: i64 },

    #[error("Brush height must be positive, got {0}")]
    NonPositiveHeight(f64),

    #[error("Brush opacity must be between 0 and 1, got {0}")]
    OpacityOutOfRange(f64),
}

// ============================================================================
// Configuration
// ============================================================================

/// Declared brush settings as supplied in a chart configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_start_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_end_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traveller_width: Option<f64>,
}

/// Check a brush configuration against its data
pub fn validate_brush_config(config: &BrushConfig, data: &[Record]) -> Result<(), BrushConfigError> {
    if data.is_empty() {
        return Err(BrushConfigError::EmptyData);
    }
    let len = data.len();

    if let Some(start) = config.data_start_index {
        if start < 0 {
            return Err(BrushConfigError::NegativeStart(start));
        }
    }
    if let Some(end) = config.data_end_index {
        if end > len as i64 {
            return Err(BrushConfigError::EndBeyondData { end, len });
        }
    }
    if let (Some(start), Some(end)) = (config.data_start_index, config.data_end_index) {
        if start >= end {
            return Err(BrushConfigError::StartNotBeforeEnd { start, end });
        }
    }
    if let Some(height) = config.height {
        if height <= 0.0 {
            return Err(BrushConfigError::NonPositiveHeight(height));
        }
    }
    if let Some(opacity) = config.opacity {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(BrushConfigError::OpacityOutOfRange(opacity));
        }
    }

    Ok(())
}

// ============================================================================
// Range Operations
// ============================================================================

/// A non-empty half-open row range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl BrushRange {
    /// The whole dataset
    pub fn full(data_length: usize) -> Self {
        Self {
            start_index: 0,
            end_index: data_length,
        }
    }

    /// Number of rows covered; zero for an inverted range
    pub fn width(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_full(&self, data_length: usize) -> bool {
        self.start_index == 0 && self.end_index == data_length
    }
}

fn require_data(data_length: usize) -> Result<(), BrushError> {
    if data_length == 0 {
        return Err(BrushError::EmptyData);
    }
    Ok(())
}

/// Initial range from a declared config.
///
/// Declared bounds are clamped into the data. If that leaves an empty or
/// inverted range, the full range is used instead and a warning is logged.
pub fn build_range(config: &BrushConfig, data_length: usize) -> Result<BrushRange, BrushError> {
    require_data(data_length)?;
    let len = data_length as i64;

    let start = config.data_start_index.unwrap_or(0).max(0);
    let end = config.data_end_index.unwrap_or(len).min(len);

    if start >= end {
        tracing::warn!(
            "Brush range [{:?}, {:?}) is empty for {} rows, using full range",
            config.data_start_index,
            config.data_end_index,
            data_length
        );
        return Ok(BrushRange::full(data_length));
    }

    Ok(BrushRange {
        start_index: start as usize,
        end_index: end as usize,
    })
}

/// Clamp an arbitrary requested range into a valid non-empty range
pub fn on_change(start: i64, end: i64, data_length: usize) -> Result<BrushRange, BrushError> {
    require_data(data_length)?;
    let len = data_length as i64;

    let start = start.clamp(0, len - 1);
    let end = end.max(start + 1).min(len);

    Ok(BrushRange {
        start_index: start as usize,
        end_index: end as usize,
    })
}

/// The full range for `data_length` rows
pub fn reset_range(data_length: usize) -> Result<BrushRange, BrushError> {
    require_data(data_length)?;
    Ok(BrushRange::full(data_length))
}

/// Rows `[start, end)` after clamping both ends into the data; empty if inverted
pub fn filter_by_range(data: &[Record], start: i64, end: i64) -> &[Record] {
    let len = data.len() as i64;
    let start = start.clamp(0, len) as usize;
    let end = end.clamp(0, len) as usize;

    if start >= end {
        return &[];
    }
    &data[start..end]
}

// ============================================================================
// Keyboard and Touch Input
// ============================================================================

/// Arrow-key input on a focused brush
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushKey {
    /// Move the window toward the start
    Left,
    /// Move the window toward the end
    Right,
    /// Widen both edges
    Up,
    /// Narrow both edges
    Down,
}

/// Apply one key press with step `step`
pub fn on_key(range: BrushRange, key: BrushKey, step: usize, data_length: usize) -> BrushRange {
    let mut start_index = range.start_index;
    let mut end_index = range.end_index.max(start_index);

    match key {
        BrushKey::Left => {
            let shift = step.min(start_index);
            start_index -= shift;
            end_index -= shift;
        }
        BrushKey::Right => {
            let shift = step.min(data_length.saturating_sub(end_index));
            start_index += shift;
            end_index += shift;
        }
        BrushKey::Up => {
            start_index = start_index.saturating_sub(step);
            end_index = end_index.saturating_add(step).min(data_length);
        }
        BrushKey::Down => {
            let width = end_index.saturating_sub(start_index);
            let shrink = step.min(width.saturating_sub(1) / 2);
            start_index += shrink;
            end_index -= shrink;
        }
    }

    BrushRange {
        start_index,
        end_index,
    }
}

/// Phase of a touch gesture on the brush area
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    /// Finger down: sets the start edge
    Start,
    /// Finger moving: sets the end edge
    Move,
}

/// Row index under a pointer, proportional to its position in the container
pub fn touch_index(x: f64, container_width: f64, data_length: usize) -> usize {
    if data_length == 0 || container_width.is_nan() || container_width <= 0.0 || !x.is_finite() {
        return 0;
    }

    let last = (data_length - 1) as f64;
    let ratio = (x / container_width).clamp(0.0, 1.0);
    (ratio * last).round().clamp(0.0, last) as usize
}

// ============================================================================
// State Machine
// ============================================================================

/// Observable phase of a brush
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushPhase {
    Disabled,
    FullRange,
    Subrange,
    /// A reset was just applied and no further input has arrived
    Resetting,
}

/// Live brush state for one chart
#[derive(Clone, Debug, PartialEq)]
pub struct BrushState {
    range: BrushRange,
    data_length: usize,
    enabled: bool,
    resetting: bool,
}

impl BrushState {
    /// Create the state from a declared config; a config is enabled unless it says otherwise
    pub fn build(config: &BrushConfig, data_length: usize) -> Result<Self, BrushError> {
        Ok(Self {
            range: build_range(config, data_length)?,
            data_length,
            enabled: config.enabled.unwrap_or(true),
            resetting: false,
        })
    }

    pub fn range(&self) -> BrushRange {
        self.range
    }

    pub fn data_length(&self) -> usize {
        self.data_length
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    pub fn phase(&self) -> BrushPhase {
        if !self.enabled {
            BrushPhase::Disabled
        } else if self.resetting {
            BrushPhase::Resetting
        } else if self.range.is_full(self.data_length) {
            BrushPhase::FullRange
        } else {
            BrushPhase::Subrange
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Apply a drag to `[start, end)`; ignored while disabled
    pub fn on_change(&mut self, start: i64, end: i64) -> Result<BrushRange, BrushError> {
        if !self.enabled {
            return Ok(self.range);
        }
        self.range = on_change(start, end, self.data_length)?;
        self.resetting = false;
        Ok(self.range)
    }

    /// Return to the full range; the state reports `Resetting` until the next input
    pub fn reset(&mut self) -> Result<BrushRange, BrushError> {
        self.range = reset_range(self.data_length)?;
        self.resetting = true;
        Ok(self.range)
    }

    /// Leave the resetting phase without changing the range
    pub fn finish_reset(&mut self) {
        self.resetting = false;
    }

    pub fn on_key(&mut self, key: BrushKey, step: usize) -> BrushRange {
        if !self.enabled {
            return self.range;
        }
        self.range = on_key(self.range, key, step, self.data_length);
        self.resetting = false;
        self.range
    }

    /// Move the start edge (touch start) or end edge (touch move) under the pointer
    pub fn on_touch(
        &mut self,
        phase: TouchPhase,
        x: f64,
        container_width: f64,
    ) -> Result<BrushRange, BrushError> {
        if !self.enabled {
            return Ok(self.range);
        }
        let index = touch_index(x, container_width, self.data_length) as i64;
        let (start, end) = match phase {
            TouchPhase::Start => (index, self.range.end_index as i64),
            TouchPhase::Move => (self.range.start_index as i64, index + 1),
        };
        self.on_change(start, end)
    }

    /// Rows currently inside the brush; all rows while disabled
    pub fn visible<'a>(&self, data: &'a [Record]) -> &'a [Record] {
        if !self.enabled {
            return data;
        }
        filter_by_range(
            data,
            self.range.start_index as i64,
            self.range.end_index as i64,
        )
    }
}
