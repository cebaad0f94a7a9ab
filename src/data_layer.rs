//! Data layers: per-series axis bindings, records and element statuses.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eyre::{bail, Result};
use futures::future::BoxFuture;
use parking_lot::RwLock;

use crate::config::{AxisOptions, LayerOptions};
use crate::extent::{axis_extent, Axis, Record};
use crate::ticks::Tick;
use crate::view_state::ViewState;

/// Data collaborator: turns the current view window into records. The
/// returned future resolves once the records for this layer are ready;
/// failures surface on the owning panel's error sink without touching
/// sibling panels.
pub trait DataSource: Send + Sync {
    fn remap(&self, view: &ViewState) -> BoxFuture<'static, Result<Vec<Record>>>;
}

pub type SharedDataSource = Arc<RwLock<dyn DataSource>>;

/// Display status applied to individual layer elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Highlighted,
    Selected,
    Faded,
    Hidden,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Highlighted,
        Status::Selected,
        Status::Faded,
        Status::Hidden,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Status::Highlighted => "highlighted",
            Status::Selected => "selected",
            Status::Faded => "faded",
            Status::Hidden => "hidden",
        }
    }
}

/// One renderable series within a panel.
pub struct DataLayer {
    pub id: String,
    pub layer_type: String,
    /// Position in the panel's render order; kept contiguous from 0 by the
    /// owning panel.
    pub z_index: usize,
    pub x_axis: AxisOptions,
    pub y_axis: AxisOptions,
    pub records: Vec<Record>,
    pub source: Option<SharedDataSource>,
    statuses: HashMap<Status, HashSet<String>>,
}

impl DataLayer {
    pub fn new(options: LayerOptions) -> Result<Self> {
        let Some(layer_type) = options.layer_type else {
            bail!("data layer {:?} is missing the required type", options.id);
        };
        if options.id.is_empty() {
            bail!("data layer of type {layer_type:?} is missing an id");
        }
        match options.y_axis.axis {
            Some(1) | Some(2) | None => {}
            Some(other) => bail!(
                "data layer {:?} binds invalid y axis {other} (expected 1 or 2)",
                options.id
            ),
        }
        Ok(Self {
            id: options.id,
            layer_type,
            z_index: 0,
            x_axis: options.x_axis,
            y_axis: options.y_axis,
            records: Vec::new(),
            source: None,
            statuses: HashMap::new(),
        })
    }

    pub fn with_source(mut self, source: SharedDataSource) -> Self {
        self.source = Some(source);
        self
    }

    /// The vertical axis this layer's y binding targets.
    pub fn y_axis_slot(&self) -> Axis {
        match self.y_axis.axis {
            Some(2) => Axis::Y2,
            _ => Axis::Y1,
        }
    }

    pub fn axis_options(&self, axis: Axis) -> &AxisOptions {
        match axis {
            Axis::X => &self.x_axis,
            Axis::Y1 | Axis::Y2 => &self.y_axis,
        }
    }

    /// The extent this layer's records demand of `axis`, or `None` when the
    /// binding does not target it.
    pub fn extent(&self, axis: Axis) -> Option<(f64, f64)> {
        if axis.is_vertical() && self.y_axis_slot() != axis {
            return None;
        }
        axis_extent(&self.records, self.axis_options(axis))
    }

    /// Tick hints this layer offers the panel for `axis`.
    pub fn suggested_ticks(&self, axis: Axis) -> Option<&[Tick]> {
        self.axis_options(axis).ticks.as_deref()
    }

    /// Toggles `status` for one element.
    pub fn set_status(&mut self, status: Status, element: &str, on: bool) {
        let set = self.statuses.entry(status).or_default();
        if on {
            set.insert(element.to_string());
        } else {
            set.remove(element);
        }
    }

    /// Toggles `status` for every element at once. Turning a status on for
    /// all elements is represented by the record ids currently loaded.
    pub fn set_status_all(&mut self, status: Status, on: bool) {
        let set = self.statuses.entry(status).or_default();
        if on {
            set.extend(
                self.records
                    .iter()
                    .filter_map(|record| record.get("id"))
                    .filter_map(|value| value.as_str().map(str::to_string)),
            );
        } else {
            set.clear();
        }
    }

    pub fn has_status(&self, status: Status, element: &str) -> bool {
        self.statuses
            .get(&status)
            .is_some_and(|set| set.contains(element))
    }

    pub fn elements_with_status(&self, status: Status) -> impl Iterator<Item = &str> {
        self.statuses
            .get(&status)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    // Convenience wrappers over the one generic toggle, one per status.
    pub fn highlight(&mut self, element: &str, on: bool) {
        self.set_status(Status::Highlighted, element, on);
    }

    pub fn select(&mut self, element: &str, on: bool) {
        self.set_status(Status::Selected, element, on);
    }

    pub fn fade(&mut self, element: &str, on: bool) {
        self.set_status(Status::Faded, element, on);
    }

    pub fn hide(&mut self, element: &str, on: bool) {
        self.set_status(Status::Hidden, element, on);
    }

    /// Forces a permanent extent onto one of this layer's axis bindings and
    /// strips every option that could re-expand it on the next extent pass.
    pub fn apply_extent_override(&mut self, axis: Axis, floor: f64, ceiling: f64) {
        let options = match axis {
            Axis::X => &mut self.x_axis,
            Axis::Y1 | Axis::Y2 => &mut self.y_axis,
        };
        options.floor = Some(floor);
        options.ceiling = Some(ceiling);
        options.lower_buffer = None;
        options.upper_buffer = None;
        options.min_extent = None;
        options.ticks = None;
    }
}

impl std::fmt::Debug for DataLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLayer")
            .field("id", &self.id)
            .field("layer_type", &self.layer_type)
            .field("z_index", &self.z_index)
            .field("records", &self.records.len())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}
