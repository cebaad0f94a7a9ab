//! The drag/zoom interaction state machine.
//!
//! A session is transient: it exists between gesture start and commit, and
//! at most one is alive per plot. While a drag is in flight the affected
//! panels render against a *shifted pixel range*; the data extent itself is
//! only written back on commit.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::extent::Axis;

/// Wheel-zoom factor per event, zooming in.
pub const WHEEL_ZOOM_IN: f64 = 0.9;
/// Wheel-zoom factor per event, zooming out.
pub const WHEEL_ZOOM_OUT: f64 = 1.1;
/// Quiet period after the last wheel event before the pending extent is
/// committed to view state.
pub const WHEEL_COMMIT_DELAY: Duration = Duration::from_millis(500);
/// Exponent bound fed to `constrain` for drag-zoom scalars.
pub const ZOOM_EXPONENT_LIMIT: f64 = 3.0;

/// What started the gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMethod {
    Background,
    XTick,
    Y1Tick,
    Y2Tick,
}

impl DragMethod {
    /// The axis a gesture of this kind operates on.
    pub fn axis(&self) -> Axis {
        match self {
            DragMethod::Background | DragMethod::XTick => Axis::X,
            DragMethod::Y1Tick => Axis::Y1,
            DragMethod::Y2Tick => Axis::Y2,
        }
    }
}

/// An in-flight pointer drag.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub owner: String,
    pub linked: HashSet<String>,
    pub method: DragMethod,
    /// Modifier held on a tick drag: scale the range instead of shifting it.
    pub zooming: bool,
    pub start: (f32, f32),
    pub delta: (f32, f32),
    /// Gesture start along the active axis, relative to the owner's clip
    /// area; zoom drags scale the range about this point.
    pub anchor: f32,
}

impl DragSession {
    pub fn affects(&self, panel_id: &str) -> bool {
        self.owner == panel_id || self.linked.contains(panel_id)
    }

    /// Pointer travel along the gesture axis.
    pub fn axis_delta(&self) -> f32 {
        match self.method.axis() {
            Axis::X => self.delta.0,
            Axis::Y1 | Axis::Y2 => -self.delta.1,
        }
    }
}

/// A wheel-zoom session holding the pending x extent until the debounce
/// deadline passes.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomSession {
    pub owner: String,
    pub linked: HashSet<String>,
    pub extent: (f64, f64),
    pub deadline: Instant,
}

impl ZoomSession {
    pub fn affects(&self, panel_id: &str) -> bool {
        self.owner == panel_id || self.linked.contains(panel_id)
    }
}

/// The plot-wide interaction state. Field combinations that used to be
/// "set by convention" are unrepresentable here: a session is either a drag
/// or a pending zoom, never a mix.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(DragSession),
    Zooming(ZoomSession),
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn drag(&self) -> Option<&DragSession> {
        match self {
            Interaction::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn zoom(&self) -> Option<&ZoomSession> {
        match self {
            Interaction::Zooming(session) => Some(session),
            _ => None,
        }
    }

    pub fn affects(&self, panel_id: &str) -> bool {
        match self {
            Interaction::Idle => false,
            Interaction::Dragging(session) => session.affects(panel_id),
            Interaction::Zooming(session) => session.affects(panel_id),
        }
    }
}

/// Clamps `value` into `[10^-limit, 10^limit]`, preserving sign. Keeps
/// drag-zoom scalars off zero and infinity when the pointer crosses the
/// anchor.
pub fn constrain(value: f64, limit_exponent: f64) -> f64 {
    let floor = 10f64.powf(-limit_exponent);
    let ceiling = 10f64.powf(limit_exponent);
    let magnitude = if value.is_finite() { value.abs() } else { ceiling };
    let clamped = magnitude.clamp(floor, ceiling);
    if value < 0.0 {
        -clamped
    } else {
        clamped
    }
}

/// The pixel range an affected axis renders against while `session` is in
/// flight: pans translate the base range, zoom drags scale it about the
/// gesture anchor.
pub fn adjusted_range(base: (f32, f32), session: &DragSession) -> (f32, f32) {
    let d = session.axis_delta();
    if session.zooming {
        let anchor = session.anchor;
        let scalar = constrain(anchor as f64 / (anchor as f64 + d as f64), ZOOM_EXPONENT_LIMIT);
        let project = |endpoint: f32| anchor + ((endpoint - anchor) as f64 * scalar) as f32;
        (project(base.0), project(base.1))
    } else {
        let shift = match session.method.axis() {
            Axis::X => session.delta.0,
            Axis::Y1 | Axis::Y2 => session.delta.1,
        };
        (base.0 + shift, base.1 + shift)
    }
}
