//! The shared view window and its validation rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The plot-owned view window. Panels receive immutable snapshots during a
/// reflow cycle and hand changes back through explicit commits; they never
/// hold a reference into the live store.
///
/// `extras` carries arbitrary custom fields plus one namespaced sub-object
/// per panel, keyed by panel id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub chr: String,
    pub start: f64,
    pub end: f64,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, Value>,
}

/// Span clamps applied by region validation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegionLimits {
    pub min_region_scale: Option<f64>,
    pub max_region_scale: Option<f64>,
}

/// A partial update committed into the view state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateUpdate {
    pub chr: Option<String>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub extras: serde_json::Map<String, Value>,
}

impl StateUpdate {
    pub fn region(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    pub fn chromosome(chr: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            chr: Some(chr.into()),
            ..Self::region(start, end)
        }
    }
}

impl ViewState {
    pub fn from_map(map: serde_json::Map<String, Value>, limits: &RegionLimits) -> Self {
        let mut state: ViewState =
            serde_json::from_value(Value::Object(map)).unwrap_or_default();
        let update = StateUpdate::region(state.start, state.end);
        state.apply(update, limits);
        state
    }

    /// Validates and writes a partial update. Start/end are rounded to
    /// non-negative integers, ordered, and the span is clamped into the
    /// configured region-scale window centered on the original midpoint.
    pub fn apply(&mut self, update: StateUpdate, limits: &RegionLimits) {
        if let Some(chr) = update.chr {
            self.chr = chr;
        }

        let mut start = update.start.unwrap_or(self.start);
        let mut end = update.end.unwrap_or(self.end);
        if start.is_nan() {
            start = self.start;
        }
        if end.is_nan() {
            end = self.end;
        }
        start = start.round().max(0.0);
        end = end.round().max(0.0);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }

        let span = end - start;
        let clamped = match (limits.min_region_scale, limits.max_region_scale) {
            (Some(min), _) if span < min => Some(min),
            (_, Some(max)) if span > max => Some(max),
            _ => None,
        };
        if let Some(target) = clamped {
            let mid = (start + end) / 2.0;
            start = (mid - target / 2.0).round();
            end = (mid + target / 2.0).round();
            if start < 0.0 {
                // keep the span, slide the window right
                end -= start;
                start = 0.0;
            }
        }

        self.start = start;
        self.end = end;

        for (key, value) in update.extras {
            self.extras.insert(key, value);
        }
    }

    /// The namespaced sub-object a panel reads and writes, created on first
    /// access.
    pub fn panel_namespace(&mut self, panel_id: &str) -> &mut serde_json::Map<String, Value> {
        let entry = self
            .extras
            .entry(panel_id.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(serde_json::Map::new());
        }
        entry.as_object_mut().expect("namespace is an object")
    }

    /// Drops a removed panel's namespace.
    pub fn clear_panel_namespace(&mut self, panel_id: &str) {
        self.extras.remove(panel_id);
    }
}
