//! The plot: ordered panel stack, shared view state, layout solving and the
//! top-level interaction session.

use std::collections::HashSet;
use std::time::Instant;

use eyre::{bail, Result};
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{PanelOptions, PlotOptions, ResponsiveResize};
use crate::events::{Event, EventBus, EventKind};
use crate::extent::Axis;
use crate::interaction::{
    adjusted_range, DragMethod, DragSession, Interaction, ZoomSession, WHEEL_COMMIT_DELAY,
    WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use crate::panel::Panel;
use crate::render::{ErrorSink, Renderer};
use crate::scales::LinearScale;
use crate::view_state::{RegionLimits, StateUpdate, ViewState};

pub struct Plot {
    pub id: String,
    width: f32,
    height: f32,
    min_width: f32,
    min_height: f32,
    aspect_ratio: f32,
    configured_aspect: Option<f32>,
    responsive_resize: ResponsiveResize,
    region_limits: RegionLimits,
    pub state: ViewState,
    panels: Vec<Panel>,
    pub interaction: Interaction,
    pub hooks: EventBus,
    renderer: Option<Box<dyn Renderer>>,
    error_sink: Option<Box<dyn ErrorSink>>,
}

impl Plot {
    /// Builds a plot from a raw layout tree. The tree is merged over the
    /// schema defaults first, then each panel (and each of its layers) is
    /// merged and validated in turn. Configuration errors abort
    /// construction.
    pub fn new(id: impl Into<String>, layout: Value) -> Result<Self> {
        let options = PlotOptions::from_value(layout)?;
        let region_limits = RegionLimits {
            min_region_scale: options.min_region_scale,
            max_region_scale: options.max_region_scale,
        };
        let state = ViewState::from_map(options.state, &region_limits);

        let width = options.width.max(1.0);
        let height = options.height.max(1.0);
        let mut plot = Self {
            id: id.into(),
            width,
            height,
            min_width: options.min_width,
            min_height: options.min_height,
            aspect_ratio: width / height,
            configured_aspect: options.aspect_ratio,
            responsive_resize: options.responsive_resize,
            region_limits,
            state,
            panels: Vec::new(),
            interaction: Interaction::Idle,
            hooks: EventBus::default(),
            renderer: None,
            error_sink: None,
        };
        for panel_layout in options.panels {
            plot.add_panel(panel_layout)?;
        }
        plot.set_dimensions(Some(width), Some(height));
        info!(plot = %plot.id, panels = plot.panels.len(), "plot created");
        Ok(plot)
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

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn region_limits(&self) -> RegionLimits {
        self.region_limits
    }

    /// Panels in y-index order.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.id == id)
    }

    pub fn panel_mut(&mut self, id: &str) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|panel| panel.id == id)
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    pub fn set_error_sink(&mut self, sink: Box<dyn ErrorSink>) {
        self.error_sink = Some(sink);
    }

    /// Adds a panel from a raw layout value and repositions the stack.
    /// Placement follows the requested `y_index` (negative counts back from
    /// the end); indices are renumbered contiguously afterwards.
    pub fn add_panel(&mut self, layout: Value) -> Result<String> {
        let options = PanelOptions::from_value(layout)?;
        if self.panels.iter().any(|panel| panel.id == options.id) {
            bail!("duplicate panel id {:?}", options.id);
        }
        let requested = options.y_index;
        let panel = Panel::new(options)?;
        let id = panel.id.clone();
        let index = match requested {
            None => self.panels.len(),
            Some(y) if y < 0 => (self.panels.len() as i64 + y).max(0) as usize,
            Some(y) => (y as usize).min(self.panels.len()),
        };
        self.panels.insert(index, panel);
        self.renumber_panels();
        self.position_panels();
        self.state.panel_namespace(&id);
        if let Some(panel) = self.panel_mut(&id) {
            panel.mark_initialized();
        }
        debug!(plot = %self.id, panel = %id, "panel added");
        Ok(id)
    }

    /// Removes a panel, drops its view-state namespace and repositions the
    /// remaining stack.
    pub fn remove_panel(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.panels.iter().position(|panel| panel.id == id) else {
            bail!("no panel {id:?} in plot {:?}", self.id);
        };
        self.panels.remove(index);
        self.state.clear_panel_namespace(id);
        let owner_gone = match &self.interaction {
            Interaction::Dragging(session) => session.owner == id,
            Interaction::Zooming(session) => session.owner == id,
            Interaction::Idle => false,
        };
        if owner_gone {
            self.interaction = Interaction::Idle;
        }
        self.renumber_panels();
        self.position_panels();
        self.hooks.emit(&Event::from_panel(EventKind::PanelRemoved, id));
        Ok(())
    }

    fn renumber_panels(&mut self) {
        for (index, panel) in self.panels.iter_mut().enumerate() {
            panel.y_index = index;
        }
    }

    /// Reconciles proportional panel heights into absolute geometry.
    ///
    /// Two passes on purpose: origins are accumulated from the panels'
    /// *current* heights first, so a panel that just changed size ripples
    /// through without the caller re-deriving anything; discrete dimensions
    /// are only reassigned at the end, after the plot's own size has been
    /// re-resolved from the stack.
    pub fn position_panels(&mut self) {
        if self.panels.is_empty() {
            return;
        }
        let panel_count = self.panels.len();

        for panel in &mut self.panels {
            if panel.proportional_width.is_none() {
                let derived = if self.width > 0.0 {
                    (panel.width() / self.width) as f64
                } else {
                    0.0
                };
                panel.proportional_width = Some(if derived > 0.0 { derived } else { 1.0 });
            }
            if panel.proportional_height.is_none() {
                let derived = if self.height > 0.0 {
                    (panel.height() / self.height) as f64
                } else {
                    0.0
                };
                panel.proportional_height = Some(if derived > 0.0 {
                    derived
                } else {
                    1.0 / panel_count as f64
                });
            }
        }

        // unified margins across the x-linked set
        let mut linked_left = 0.0f32;
        let mut linked_right = 0.0f32;
        for panel in self.panels.iter().filter(|p| p.interaction.x_linked) {
            linked_left = linked_left.max(panel.margin().left);
            linked_right = linked_right.max(panel.margin().right);
        }

        let sum: f64 = self
            .panels
            .iter()
            .filter_map(|panel| panel.proportional_height)
            .sum();
        if !(sum > 0.0) || !sum.is_finite() {
            return;
        }
        for panel in &mut self.panels {
            if let Some(ph) = panel.proportional_height {
                panel.proportional_height = Some(ph / sum);
            }
        }

        let mut y_offset = 0.0f32;
        for panel in &mut self.panels {
            panel.set_origin(Some(0.0), Some(y_offset));
            y_offset += panel.height();
            if panel.interaction.x_linked {
                // margins only ever grow to match the linked set
                let left = linked_left.max(panel.margin().left);
                let right = linked_right.max(panel.margin().right);
                if left != panel.margin().left || right != panel.margin().right {
                    panel.set_margins(None, Some(right), None, Some(left));
                }
            }
        }
        let total_height = y_offset;
        for panel in &mut self.panels {
            let y = if total_height > 0.0 {
                (panel.origin().1 / total_height) as f64
            } else {
                0.0
            };
            panel.proportional_origin = (0.0, y);
        }

        self.set_dimensions(None, None);
        let plot_size = (self.width, self.height);
        for panel in &mut self.panels {
            let width = panel
                .proportional_width
                .map(|pw| (pw * plot_size.0 as f64) as f32);
            let height = panel
                .proportional_height
                .map(|ph| (ph * plot_size.1 as f64) as f32);
            match (width, height) {
                (Some(w), Some(h)) => panel.set_dimensions(Some(w), Some(h), plot_size),
                _ => panel.set_dimensions(None, None, plot_size),
            }
        }
        debug!(plot = %self.id, width = self.width, height = self.height, "panels positioned");
    }

    /// Resolves the plot's discrete size. With explicit dimensions the
    /// panel set is proportionally resized and repositioned to fit; without
    /// them the size is derived from the stack (widest panel, summed
    /// heights). Panel minimums are aggregated first — a proportional panel
    /// needs `min_height / proportional_height` of total height to honor
    /// its own minimum.
    pub fn set_dimensions(&mut self, width: Option<f32>, height: Option<f32>) {
        let mut min_width = self.min_width.max(1.0);
        let mut min_height = self.min_height.max(1.0);
        for panel in &self.panels {
            min_width = min_width.max(panel.min_width());
            let required = match panel.proportional_height {
                Some(ph) if ph > 0.0 => ((panel.min_height() as f64) / ph).ceil() as f32,
                _ => panel.min_height(),
            };
            min_height = min_height.max(required);
        }
        self.min_width = min_width;
        self.min_height = min_height;

        match (width, height) {
            (Some(w), Some(h)) if w.is_finite() && h.is_finite() => {
                let (w, h) = match self.responsive_resize {
                    ResponsiveResize::None => (w, h),
                    ResponsiveResize::Width => (w, self.height),
                    ResponsiveResize::WidthAndHeight => {
                        let aspect = self.configured_aspect.unwrap_or(self.aspect_ratio);
                        if aspect > 0.0 {
                            (w, w / aspect)
                        } else {
                            (w, h)
                        }
                    }
                };
                self.width = w.round().max(min_width);
                self.height = h.round().max(min_height);

                if !self.panels.is_empty() {
                    let plot_size = (self.width, self.height);
                    for panel in &mut self.panels {
                        let pw = panel.proportional_width.unwrap_or(1.0);
                        match panel.proportional_height {
                            Some(ph) => panel.set_dimensions(
                                Some((pw * plot_size.0 as f64) as f32),
                                Some((ph * plot_size.1 as f64) as f32),
                                plot_size,
                            ),
                            None => panel.set_dimensions(None, None, plot_size),
                        }
                    }
                    self.position_panels();
                }
            }
            _ => {
                if !self.panels.is_empty() {
                    let w = self
                        .panels
                        .iter()
                        .map(Panel::width)
                        .fold(0.0f32, f32::max);
                    let h: f32 = self.panels.iter().map(Panel::height).sum();
                    self.width = w.round().max(min_width);
                    self.height = h.round().max(min_height);
                } else {
                    self.width = self.width.max(min_width);
                    self.height = self.height.max(min_height);
                }
            }
        }

        if self.height > 0.0 {
            self.aspect_ratio = self.width / self.height;
        }
        self.hooks.emit(&Event::new(EventKind::LayoutChanged));
    }

    /// Responsive entry point: adapts the plot to a new container width
    /// according to the configured resize policy.
    pub fn rescale_to(&mut self, container_width: f32) {
        match self.responsive_resize {
            ResponsiveResize::None => {}
            _ => self.set_dimensions(Some(container_width), Some(self.height)),
        }
    }

    /// Validates and commits a partial state update, then refreshes every
    /// panel's data and geometry.
    pub async fn apply_state(&mut self, update: StateUpdate) {
        self.state.apply(update, &self.region_limits);
        let event = Event::new(EventKind::StateChanged).with_data(json!({
            "chr": self.state.chr,
            "start": self.state.start,
            "end": self.state.end,
        }));
        self.hooks.emit(&event);
        self.refresh().await;
    }

    /// Requests fresh records from every layer's data source, then
    /// regenerates extents, ticks and scales panel by panel. A failing
    /// layer future abandons the cycle for its panel only — the error goes
    /// to the error sink and sibling panels complete normally.
    pub async fn refresh(&mut self) {
        let snapshot = self.state.clone();
        self.hooks.emit(&Event::new(EventKind::DataRequested));

        let mut jobs = Vec::new();
        for (panel_index, panel) in self.panels.iter().enumerate() {
            for (layer_index, layer) in panel.layers().iter().enumerate() {
                if let Some(source) = &layer.source {
                    let future = source.read().remap(&snapshot);
                    jobs.push((panel_index, layer_index, future));
                }
            }
        }
        let results = join_all(jobs.into_iter().map(
            |(panel_index, layer_index, future)| async move {
                (panel_index, layer_index, future.await)
            },
        ))
        .await;

        let mut failed: HashSet<usize> = HashSet::new();
        for (panel_index, layer_index, result) in results {
            match result {
                Ok(records) => {
                    if let Some(layer) = self.panels[panel_index].layers_mut().get_mut(layer_index)
                    {
                        layer.records = records;
                    }
                }
                Err(error) => {
                    let panel_id = self.panels[panel_index].id.clone();
                    warn!(panel = %panel_id, %error, "data refresh failed");
                    if failed.insert(panel_index) {
                        if let Some(sink) = self.error_sink.as_deref_mut() {
                            sink.show_error(&panel_id, &error.to_string());
                        }
                    }
                }
            }
        }

        let Plot {
            panels,
            renderer,
            error_sink,
            hooks,
            ..
        } = self;
        for (panel_index, panel) in panels.iter_mut().enumerate() {
            if failed.contains(&panel_index) {
                continue;
            }
            if let Some(sink) = error_sink.as_deref_mut() {
                sink.clear_error(&panel.id);
            }
            panel.generate_extents(&snapshot);
            for axis in Axis::ALL {
                panel.render_axis(axis, None);
            }
            if let Some(renderer) = renderer.as_deref_mut() {
                renderer.render_panel(panel);
                for layer in panel.layers() {
                    renderer.render_layer(panel, layer);
                }
            }
            let event = Event::from_panel(EventKind::DataRendered, panel.id.clone());
            if panel.emit(&event, true) {
                hooks.emit(&event);
            }
            panel.take_dirty();
        }
    }

    /// The other panels a gesture on `owner` drags along: every panel
    /// sharing the owner's link flag on the gesture axis.
    pub fn linked_panels(&self, owner: &str, axis: Axis) -> HashSet<String> {
        let Some(owner_panel) = self.panel(owner) else {
            return HashSet::new();
        };
        if !owner_panel.linked_on(axis) {
            return HashSet::new();
        }
        self.panels
            .iter()
            .filter(|panel| panel.id != owner && panel.linked_on(axis))
            .map(|panel| panel.id.clone())
            .collect()
    }

    /// Opens a drag session on a panel. A session already in flight is
    /// implicitly discarded; a gesture the panel's flags do not allow is
    /// ignored.
    pub fn start_drag(
        &mut self,
        panel_id: &str,
        method: DragMethod,
        x: f32,
        y: f32,
        with_modifier: bool,
    ) {
        let Some(panel) = self.panel(panel_id) else {
            return;
        };
        if !panel.allows(method) {
            return;
        }
        let axis = method.axis();
        let clip = panel.clip_area();
        let origin = panel.origin();
        let anchor = match axis {
            Axis::X => x - origin.0 - clip.origin.0,
            Axis::Y1 | Axis::Y2 => y - origin.1 - clip.origin.1,
        };
        let linked = self.linked_panels(panel_id, axis);
        self.interaction = Interaction::Dragging(DragSession {
            owner: panel_id.to_string(),
            linked,
            method,
            zooming: with_modifier && method != DragMethod::Background,
            start: (x, y),
            delta: (0.0, 0.0),
            anchor,
        });
    }

    /// Updates the pointer delta and re-renders the owner and its linked
    /// set against the shifted range. No-op outside a drag.
    pub fn drag_move(&mut self, x: f32, y: f32) {
        let Interaction::Dragging(session) = &mut self.interaction else {
            return;
        };
        session.delta = (x - session.start.0, y - session.start.1);
        self.render_session_panels();
    }

    /// Commits the session. X gestures write the final window into view
    /// state (triggering a data refresh); y gestures burn floor/ceiling
    /// overrides into every affected layer so the forced range survives
    /// later extent passes. A zero-delta session commits nothing.
    pub async fn stop_drag(&mut self) {
        let Interaction::Dragging(session) = std::mem::take(&mut self.interaction) else {
            return;
        };
        if session.delta == (0.0, 0.0) {
            return;
        }
        let axis = session.method.axis();
        let Some(owner) = self.panel(&session.owner) else {
            return;
        };
        let clip = owner.clip_area();
        let Some(extent) = owner.axis(axis).extent else {
            return;
        };
        let base_range = match axis {
            Axis::X => (0.0, clip.width),
            Axis::Y1 | Axis::Y2 => (clip.height, 0.0),
        };
        let scale = LinearScale::new(extent, adjusted_range(base_range, &session));

        match axis {
            Axis::X => {
                let start = scale.invert(0.0);
                let end = scale.invert(clip.width);
                self.apply_state(StateUpdate::region(start, end)).await;
            }
            Axis::Y1 | Axis::Y2 => {
                let mut ceiling = scale.invert(0.0);
                let mut floor = scale.invert(clip.height);
                if floor > ceiling {
                    std::mem::swap(&mut floor, &mut ceiling);
                }
                let snapshot = self.state.clone();
                let mut affected = vec![session.owner.clone()];
                affected.extend(session.linked.iter().cloned());
                for id in affected {
                    let Some(panel) = self.panel_mut(&id) else {
                        continue;
                    };
                    for layer in panel.layers_mut() {
                        if layer.y_axis_slot() == axis && !layer.y_axis.decoupled {
                            layer.apply_extent_override(axis, floor, ceiling);
                        }
                    }
                    panel.generate_extents(&snapshot);
                    for axis in Axis::ALL {
                        panel.render_axis(axis, None);
                    }
                }
                self.render_committed(&session.owner, &session.linked);
            }
        }
    }

    /// Accumulates a wheel-zoom step. The pending extent shrinks or grows
    /// about its midpoint, bounded by the plot's region-scale limits, and
    /// the commit deadline restarts: a fresh event always cancels the stale
    /// one, so the commit reflects the latest accumulated state.
    pub fn wheel_zoom(&mut self, panel_id: &str, delta: f32, with_modifier: bool, now: Instant) {
        if !with_modifier {
            return;
        }
        let Some(panel) = self.panel(panel_id) else {
            return;
        };
        if !panel.interaction.scroll_to_zoom {
            return;
        }
        let factor = if delta < 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
        let current = match &self.interaction {
            Interaction::Zooming(session) if session.owner == panel_id => session.extent,
            _ => panel
                .axis(Axis::X)
                .extent
                .unwrap_or((self.state.start, self.state.end)),
        };
        let mid = (current.0 + current.1) / 2.0;
        let mut span = (current.1 - current.0) * factor;
        if let Some(min) = self.region_limits.min_region_scale {
            span = span.max(min);
        }
        if let Some(max) = self.region_limits.max_region_scale {
            span = span.min(max);
        }
        let extent = (mid - span / 2.0, mid + span / 2.0);
        let linked = self.linked_panels(panel_id, Axis::X);
        self.interaction = Interaction::Zooming(ZoomSession {
            owner: panel_id.to_string(),
            linked,
            extent,
            deadline: now + WHEEL_COMMIT_DELAY,
        });
        self.render_session_panels();
    }

    /// Commits a pending wheel zoom whose debounce deadline has passed.
    /// Returns whether a commit happened.
    pub async fn poll_interaction(&mut self, now: Instant) -> bool {
        let due = matches!(&self.interaction, Interaction::Zooming(session) if now >= session.deadline);
        if !due {
            return false;
        }
        let Interaction::Zooming(session) = std::mem::take(&mut self.interaction) else {
            return false;
        };
        self.apply_state(StateUpdate::region(session.extent.0, session.extent.1))
            .await;
        true
    }

    /// Drops any in-flight session without committing.
    pub fn cancel_interaction(&mut self) {
        self.interaction = Interaction::Idle;
    }

    fn render_session_panels(&mut self) {
        let interaction = self.interaction.clone();
        let Plot {
            panels, renderer, ..
        } = self;
        for panel in panels.iter_mut() {
            if !interaction.affects(&panel.id) {
                continue;
            }
            for axis in Axis::ALL {
                panel.render_axis(axis, Some(&interaction));
            }
            if let Some(renderer) = renderer.as_deref_mut() {
                renderer.render_panel(panel);
            }
        }
    }

    fn render_committed(&mut self, owner: &str, linked: &HashSet<String>) {
        let Plot {
            panels, renderer, ..
        } = self;
        for panel in panels.iter_mut() {
            if panel.id != owner && !linked.contains(&panel.id) {
                continue;
            }
            if let Some(renderer) = renderer.as_deref_mut() {
                renderer.render_panel(panel);
            }
        }
    }
}

impl std::fmt::Debug for Plot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plot")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("panels", &self.panels.len())
            .field("interaction", &self.interaction)
            .finish()
    }
}
