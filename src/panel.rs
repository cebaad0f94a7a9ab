//! Panels: rectangular plot regions owning geometry, axes and data layers.

use eyre::{bail, Result};
use serde_json::Value;

use crate::config::{
    AxisLayout, InteractionOptions, LayerOptions, MarginOptions, PanelOptions, TickSpec,
};
use crate::data_layer::DataLayer;
use crate::events::{Event, EventBus, EventKind};
use crate::extent::{merge_extents, Axis};
use crate::interaction::{adjusted_range, DragMethod, Interaction};
use crate::scales::LinearScale;
use crate::ticks::{format_position, pretty_ticks, ClipMode, Tick};
use crate::view_state::ViewState;

/// The margin-inset drawing region, origin relative to the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClipArea {
    pub origin: (f32, f32),
    pub width: f32,
    pub height: f32,
}

/// One of a panel's three axis slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelAxis {
    pub layout: AxisLayout,
    pub extent: Option<(f64, f64)>,
    pub scale: Option<LinearScale>,
    pub ticks: Vec<Tick>,
}

/// Everything the rendering collaborator needs to draw one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisRender {
    pub scale: LinearScale,
    pub ticks: Vec<Tick>,
    pub positions: Vec<f64>,
    pub label: Option<String>,
}

#[derive(Debug)]
pub struct Panel {
    pub id: String,
    /// Position in the plot's vertical stack, maintained by the plot.
    pub y_index: usize,
    origin: (f32, f32),
    width: f32,
    height: f32,
    min_width: f32,
    min_height: f32,
    margin: MarginOptions,
    clip_area: ClipArea,
    pub proportional_width: Option<f64>,
    pub proportional_height: Option<f64>,
    pub proportional_origin: (f64, f64),
    pub interaction: InteractionOptions,
    x_axis: PanelAxis,
    y1_axis: PanelAxis,
    y2_axis: PanelAxis,
    layers: Vec<DataLayer>,
    pub hooks: EventBus,
    initialized: bool,
    dirty: bool,
}

impl Panel {
    pub fn new(options: PanelOptions) -> Result<Self> {
        if options.id.is_empty() {
            bail!("panel is missing an id");
        }
        let axis_slot = |layout: AxisLayout| PanelAxis {
            layout,
            ..Default::default()
        };
        let mut panel = Self {
            id: options.id,
            y_index: 0,
            origin: (0.0, 0.0),
            width: options.width,
            height: options.height,
            min_width: options.min_width,
            min_height: options.min_height,
            margin: options.margin,
            clip_area: ClipArea::default(),
            proportional_width: options.proportional_width,
            proportional_height: options.proportional_height,
            proportional_origin: (0.0, 0.0),
            interaction: options.interaction,
            x_axis: axis_slot(options.axes.x),
            y1_axis: axis_slot(options.axes.y1),
            y2_axis: axis_slot(options.axes.y2),
            layers: Vec::new(),
            hooks: EventBus::default(),
            initialized: false,
            dirty: false,
        };
        for layer_layout in options.data_layers {
            panel.add_layer(layer_layout)?;
        }
        panel.update_clip_area();
        Ok(panel)
    }

    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn margin(&self) -> MarginOptions {
        self.margin
    }

    pub fn clip_area(&self) -> ClipArea {
        self.clip_area
    }

    pub fn axis(&self, axis: Axis) -> &PanelAxis {
        match axis {
            Axis::X => &self.x_axis,
            Axis::Y1 => &self.y1_axis,
            Axis::Y2 => &self.y2_axis,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut PanelAxis {
        match axis {
            Axis::X => &mut self.x_axis,
            Axis::Y1 => &mut self.y1_axis,
            Axis::Y2 => &mut self.y2_axis,
        }
    }

    pub fn layers(&self) -> &[DataLayer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&DataLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut DataLayer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn layers_mut(&mut self) -> &mut [DataLayer] {
        &mut self.layers
    }

    /// Adds a data layer from a raw layout value. Placement follows the
    /// requested `z_index`: absent appends, a non-negative index inserts at
    /// that position, a negative one counts back from the end (`-1` lands
    /// second-to-last). All layers are renumbered contiguously afterwards.
    pub fn add_layer(&mut self, layout: Value) -> Result<&mut DataLayer> {
        let options = LayerOptions::from_value(layout)?;
        if self.layers.iter().any(|layer| layer.id == options.id) {
            bail!(
                "duplicate data layer id {:?} in panel {:?}",
                options.id,
                self.id
            );
        }
        let requested = options.z_index;
        let layer = DataLayer::new(options)?;
        let index = match requested {
            None => self.layers.len(),
            Some(z) if z < 0 => (self.layers.len() as i64 + z).max(0) as usize,
            Some(z) => (z as usize).min(self.layers.len()),
        };
        self.layers.insert(index, layer);
        self.renumber_layers();
        Ok(&mut self.layers[index])
    }

    pub fn remove_layer(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.layers.iter().position(|layer| layer.id == id) else {
            bail!("no data layer {:?} in panel {:?}", id, self.id);
        };
        self.layers.remove(index);
        self.renumber_layers();
        Ok(())
    }

    fn renumber_layers(&mut self) {
        for (index, layer) in self.layers.iter_mut().enumerate() {
            layer.z_index = index;
        }
    }

    /// Applies explicit dimensions (rounded, clamped to minimums) or, with
    /// either argument missing, re-derives them from the proportional share
    /// of the plot. The clip area always follows.
    pub fn set_dimensions(
        &mut self,
        width: Option<f32>,
        height: Option<f32>,
        plot_size: (f32, f32),
    ) {
        match (width, height) {
            (Some(w), Some(h)) if w.is_finite() && h.is_finite() => {
                self.width = w.round().max(self.min_width);
                self.height = h.round().max(self.min_height);
            }
            _ => {
                if let Some(pw) = self.proportional_width {
                    self.width = ((pw * plot_size.0 as f64).round() as f32).max(self.min_width);
                }
                if let Some(ph) = self.proportional_height {
                    self.height = ((ph * plot_size.1 as f64).round() as f32).max(self.min_height);
                }
            }
        }
        self.update_clip_area();
        if self.initialized {
            self.dirty = true;
            let event = Event::from_panel(EventKind::LayoutChanged, self.id.clone());
            self.hooks.emit(&event);
        }
    }

    /// Moves the panel. NaN or negative coordinates are ignored per axis;
    /// continuous pointer input must never crash the layout.
    pub fn set_origin(&mut self, x: Option<f32>, y: Option<f32>) {
        if let Some(x) = x {
            if x.is_finite() && x >= 0.0 {
                self.origin.0 = x;
            }
        }
        if let Some(y) = y {
            if y.is_finite() && y >= 0.0 {
                self.origin.1 = y;
            }
        }
    }

    /// Applies the provided non-negative margins, then resolves overlap: a
    /// margin pair exceeding the panel extent on its axis is shrunk
    /// symmetrically by half the overflow (floored, remainder on the second
    /// side) and re-clamped to zero. The clip area is recomputed last.
    pub fn set_margins(
        &mut self,
        top: Option<f32>,
        right: Option<f32>,
        bottom: Option<f32>,
        left: Option<f32>,
    ) {
        let apply = |slot: &mut f32, value: Option<f32>| {
            if let Some(v) = value {
                if v.is_finite() && v >= 0.0 {
                    *slot = v.round();
                }
            }
        };
        apply(&mut self.margin.top, top);
        apply(&mut self.margin.right, right);
        apply(&mut self.margin.bottom, bottom);
        apply(&mut self.margin.left, left);

        let v_overflow = self.margin.top + self.margin.bottom - self.height;
        if v_overflow > 0.0 {
            let shrink = (v_overflow / 2.0).floor();
            self.margin.top -= shrink;
            self.margin.bottom -= v_overflow - shrink;
        }
        let h_overflow = self.margin.left + self.margin.right - self.width;
        if h_overflow > 0.0 {
            let shrink = (h_overflow / 2.0).floor();
            self.margin.left -= shrink;
            self.margin.right -= h_overflow - shrink;
        }
        self.margin.top = self.margin.top.max(0.0);
        self.margin.right = self.margin.right.max(0.0);
        self.margin.bottom = self.margin.bottom.max(0.0);
        self.margin.left = self.margin.left.max(0.0);

        self.update_clip_area();
    }

    fn update_clip_area(&mut self) {
        self.clip_area = ClipArea {
            origin: (self.margin.left, self.margin.top),
            width: (self.width - self.margin.left - self.margin.right).max(0.0),
            height: (self.height - self.margin.top - self.margin.bottom).max(0.0),
        };
    }

    /// Rebuilds all three axis extents from the data layers. Decoupled
    /// bindings are skipped; an x axis whose extent source is `"state"` is
    /// pinned to the shared view window regardless of layer data.
    pub fn generate_extents(&mut self, view: &ViewState) {
        let mut x = None;
        let mut y1 = None;
        let mut y2 = None;
        for layer in &self.layers {
            if !layer.x_axis.decoupled {
                x = merge_extents(x, layer.extent(Axis::X));
            }
            if !layer.y_axis.decoupled {
                match layer.y_axis_slot() {
                    Axis::Y1 => y1 = merge_extents(y1, layer.extent(Axis::Y1)),
                    Axis::Y2 => y2 = merge_extents(y2, layer.extent(Axis::Y2)),
                    Axis::X => {}
                }
            }
        }
        self.x_axis.extent = x;
        self.y1_axis.extent = y1;
        self.y2_axis.extent = y2;

        if self.x_axis.layout.extent.as_deref() == Some("state") {
            self.x_axis.extent = Some((view.start, view.end));
        }
    }

    /// Resolves the tick list for one axis. Precedence: an explicit tick
    /// array from the layout wins outright; a tick-config object collects
    /// layer suggestions in z order with the config overriding conflicting
    /// keys; otherwise round-number ticks are generated from the extent.
    pub fn generate_ticks(&mut self, axis: Axis) -> &[Tick] {
        let ticks = match self.axis(axis).layout.ticks.clone() {
            Some(TickSpec::Positions(list)) => list,
            Some(TickSpec::Overrides(config)) => {
                let mut merged = Vec::new();
                for layer in &self.layers {
                    if let Some(suggested) = layer.suggested_ticks(axis) {
                        merged.extend(suggested.iter().map(|tick| tick.merged_with(&config)));
                    }
                }
                merged
            }
            None => self
                .axis(axis)
                .extent
                .map(|extent| {
                    pretty_ticks(extent, ClipMode::Both, 5)
                        .into_iter()
                        .map(Tick::at)
                        .collect()
                })
                .unwrap_or_default(),
        };
        let slot = self.axis_mut(axis);
        slot.ticks = ticks;
        &slot.ticks
    }

    /// Builds the axis scale over the clip area, applying any in-flight
    /// interaction: a drag on this axis shifts or rescales the pixel range,
    /// a pending wheel zoom overrides the x domain. Returns the render
    /// payload only when the axis is eligible (render flag set and the
    /// scale well-formed).
    pub fn render_axis(&mut self, axis: Axis, interaction: Option<&Interaction>) -> Option<AxisRender> {
        self.generate_ticks(axis);

        let clip = self.clip_area;
        let Some(mut domain) = self.axis(axis).extent else {
            self.axis_mut(axis).scale = None;
            return None;
        };

        let base_range = match axis {
            Axis::X => (0.0, clip.width),
            Axis::Y1 | Axis::Y2 => (clip.height, 0.0),
        };
        let mut range = base_range;
        match interaction {
            Some(Interaction::Dragging(session)) if session.method.axis() == axis => {
                range = adjusted_range(base_range, session);
            }
            Some(Interaction::Zooming(session)) if axis == Axis::X => {
                domain = session.extent;
            }
            _ => {}
        }

        let scale = LinearScale::new(domain, range);
        let slot = self.axis_mut(axis);
        slot.scale = Some(scale.clone());

        if !slot.layout.render || !scale.is_well_formed() {
            return None;
        }

        let mut ticks = slot.ticks.clone();
        if axis == Axis::X && slot.layout.extent.as_deref() == Some("state") {
            for tick in &mut ticks {
                if tick.label.is_none() {
                    tick.label = Some(format_position(tick.position));
                }
            }
        }
        let positions = ticks.iter().map(|tick| tick.position).collect();

        Some(AxisRender {
            scale,
            ticks,
            positions,
            label: slot.layout.label.clone(),
        })
    }

    /// True when a drag of this kind may start on this panel.
    pub fn allows(&self, method: DragMethod) -> bool {
        match method {
            DragMethod::Background => self.interaction.drag_background_to_pan,
            DragMethod::XTick => self.interaction.drag_x_ticks_to_scale,
            DragMethod::Y1Tick => self.interaction.drag_y1_ticks_to_scale,
            DragMethod::Y2Tick => self.interaction.drag_y2_ticks_to_scale,
        }
    }

    /// True when this panel participates in cross-panel linking on `axis`.
    pub fn linked_on(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.interaction.x_linked,
            Axis::Y1 => self.interaction.y1_linked,
            Axis::Y2 => self.interaction.y2_linked,
        }
    }

    /// Runs this panel's hooks for `event`; the return value tells the
    /// caller whether to bubble the event to the plot bus.
    pub fn emit(&mut self, event: &Event, propagate_to_parent: bool) -> bool {
        self.hooks.emit(event);
        propagate_to_parent
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Consumes the pending re-render flag set by geometry changes.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
