//! Cross-chart synchronization of tooltip and brush state.
//!
//! Charts that share a sync id read and write one [`SyncGroupState`] held in a
//! [`SyncRegistry`]. The registry is an ordinary value owned by the embedding
//! application and passed by reference; there is no global state.
//!
//! Every mutation notifies the observers of that key synchronously, before the
//! call returns. Observers receive a shared reference to the group state and
//! cannot reach the registry from inside the callback, so a notification can
//! never re-enter a mutation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::config::SyncMethod;
use crate::data::Record;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from sync state mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Brush updates must carry both bounds
    #[error("Brush sync requires both startIndex and endIndex (missing {0})")]
    IncompleteBrush(&'static str),
}

// ============================================================================
// State Types
// ============================================================================

/// Pointer position in chart coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// Shared tooltip state of a sync group
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipState {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// x-axis value under the pointer, used by value-based sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
    pub sync_id: String,
}

/// Partial tooltip update; `None` fields keep their previous value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TooltipUpdate {
    pub active: Option<bool>,
    pub index: Option<usize>,
    pub label: Option<Value>,
    pub coordinate: Option<Coordinate>,
    pub data_key: Option<String>,
}

impl TooltipUpdate {
    /// Activate the tooltip at a row index
    pub fn at_index(index: usize) -> Self {
        Self {
            active: Some(true),
            index: Some(index),
            ..Default::default()
        }
    }
}

/// Brush update; both bounds are required
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrushUpdate {
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
}

impl BrushUpdate {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index: Some(start_index),
            end_index: Some(end_index),
        }
    }
}

/// Shared brush range of a sync group
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedBrush {
    pub start_index: usize,
    pub end_index: usize,
    pub sync_id: String,
}

/// Everything shared by one sync group
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncGroupState {
    pub tooltip: Option<TooltipState>,
    pub brush: Option<SyncedBrush>,
}

// ============================================================================
// Registry
// ============================================================================

type Observer = Box<dyn FnMut(&str, &SyncGroupState)>;

/// Handle returned by [`SyncRegistry::subscribe`]; pass it back to unsubscribe
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping the subscription handle makes it impossible to unsubscribe"]
pub struct Subscription {
    key: String,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Owner of all sync group state and observers
#[derive(Default)]
pub struct SyncRegistry {
    groups: HashMap<String, SyncGroupState>,
    observers: HashMap<String, Vec<(u64, Observer)>>,
    next_id: u64,
}

impl fmt::Debug for SyncRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRegistry")
            .field("groups", &self.groups)
            .field(
                "observers",
                &self
                    .observers
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.len()))
                    .collect::<HashMap<_, _>>(),
            )
            .finish()
    }
}

impl SyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for `key`
    pub fn subscribe<F>(&mut self, key: &str, observer: F) -> Subscription
    where
        F: FnMut(&str, &SyncGroupState) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.observers
            .entry(key.to_string())
            .or_default()
            .push((id, Box::new(observer)));

        Subscription {
            key: key.to_string(),
            id,
        }
    }

    /// Remove an observer; returns false if it was already gone
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let Some(list) = self.observers.get_mut(&subscription.key) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != subscription.id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.observers.remove(&subscription.key);
        }
        removed
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.observers.get(key).map_or(0, Vec::len)
    }

    /// Current state of a group, if it has ever been touched
    pub fn group(&self, key: &str) -> Option<&SyncGroupState> {
        self.groups.get(key)
    }

    fn notify(&mut self, key: &str) {
        let Some(state) = self.groups.get(key) else {
            return;
        };
        if let Some(list) = self.observers.get_mut(key) {
            for (_, observer) in list.iter_mut() {
                observer(key, state);
            }
        }
    }

    /// Merge a partial update into the group's tooltip and notify observers
    pub fn set_tooltip(&mut self, key: &str, update: TooltipUpdate) -> TooltipState {
        let group = self.groups.entry(key.to_string()).or_default();
        let tooltip = group.tooltip.get_or_insert_with(TooltipState::default);

        if let Some(active) = update.active {
            tooltip.active = active;
        }
        if let Some(index) = update.index {
            tooltip.index = Some(index);
        }
        if let Some(label) = update.label {
            tooltip.label = Some(label);
        }
        if let Some(coordinate) = update.coordinate {
            tooltip.coordinate = Some(coordinate);
        }
        if let Some(data_key) = update.data_key {
            tooltip.data_key = Some(data_key);
        }
        tooltip.sync_id = key.to_string();

        let snapshot = tooltip.clone();
        self.notify(key);
        snapshot
    }

    /// The group's tooltip, only while it is active
    pub fn get_active_tooltip(&self, key: &str) -> Option<&TooltipState> {
        self.groups
            .get(key)
            .and_then(|g| g.tooltip.as_ref())
            .filter(|t| t.active)
    }

    /// Deactivate the tooltip, keeping its last position
    pub fn clear_tooltip(&mut self, key: &str) {
        let group = self.groups.entry(key.to_string()).or_default();
        if let Some(tooltip) = group.tooltip.as_mut() {
            tooltip.active = false;
        }
        self.notify(key);
    }

    /// Replace the group's brush range and notify observers
    pub fn set_brush(&mut self, key: &str, update: BrushUpdate) -> Result<SyncedBrush, SyncError> {
        let start_index = update
            .start_index
            .ok_or(SyncError::IncompleteBrush("startIndex"))?;
        let end_index = update
            .end_index
            .ok_or(SyncError::IncompleteBrush("endIndex"))?;

        let brush = SyncedBrush {
            start_index,
            end_index,
            sync_id: key.to_string(),
        };
        self.groups.entry(key.to_string()).or_default().brush = Some(brush.clone());
        self.notify(key);
        Ok(brush)
    }

    pub fn get_brush(&self, key: &str) -> Option<&SyncedBrush> {
        self.groups.get(key).and_then(|g| g.brush.as_ref())
    }

    pub fn clear_brush(&mut self, key: &str) {
        self.groups.entry(key.to_string()).or_default().brush = None;
        self.notify(key);
    }
}

// ============================================================================
// Index / Value Translation
// ============================================================================

/// JSON equality, treating numerically equal numbers as the same value
fn values_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// First row whose `field` equals `value`
pub fn find_index_by_value(data: &[Record], field: &str, value: &Value) -> Option<usize> {
    data.iter()
        .position(|row| row.get(field).is_some_and(|v| values_match(v, value)))
}

/// Value of `field` at `index`, `None` outside the data
pub fn find_value_by_index<'a>(data: &'a [Record], field: &str, index: usize) -> Option<&'a Value> {
    data.get(index).and_then(|row| row.get(field))
}

/// One chart's data together with its x-axis field
#[derive(Clone, Copy, Debug)]
pub struct ChartData<'a> {
    pub data: &'a [Record],
    pub key: &'a str,
}

impl<'a> ChartData<'a> {
    pub fn new(data: &'a [Record], key: &'a str) -> Self {
        Self { data, key }
    }
}

/// Translate a row index from one chart to another.
///
/// `Index` reuses the index and rejects it if the target is shorter.
/// `Value` looks up the x value in the source and finds the same x value in
/// the target.
pub fn translate_index(
    index: usize,
    from: ChartData<'_>,
    to: ChartData<'_>,
    method: SyncMethod,
) -> Option<usize> {
    match method {
        SyncMethod::Index => (index < to.data.len()).then_some(index),
        SyncMethod::Value => {
            let value = find_value_by_index(from.data, from.key, index)?;
            find_index_by_value(to.data, to.key, value)
        }
    }
}

/// Translate a half-open `[start, end)` range from one chart to another.
///
/// `Index` clamps the range into the target and rejects it only if nothing is
/// left. `Value` translates the first and last row and reorders the result if
/// the target runs the other way.
pub fn translate_range(
    range: (usize, usize),
    from: ChartData<'_>,
    to: ChartData<'_>,
    method: SyncMethod,
) -> Option<(usize, usize)> {
    let (start, end) = range;
    if start >= end {
        return None;
    }

    match method {
        SyncMethod::Index => {
            let len = to.data.len();
            let (start, end) = (start.min(len), end.min(len));
            (start < end).then_some((start, end))
        }
        SyncMethod::Value => {
            let first = translate_index(start, from, to, method)?;
            let last = translate_index(end - 1, from, to, method)?;
            Some((first.min(last), first.max(last) + 1))
        }
    }
}
