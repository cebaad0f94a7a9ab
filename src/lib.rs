//! trackplot: layout and interaction engine for multi-panel region plots.
//!
//! The crate owns the geometry solving, axis domain/tick derivation and the
//! drag/zoom state machine of a vertically stacked panel plot. Drawing,
//! data fetching and error display are collaborator traits implemented by
//! the host.

pub mod config;
pub mod data_layer;
pub mod events;
pub mod extent;
pub mod interaction;
pub mod panel;
pub mod plot;
pub mod render;
pub mod scales;
pub mod ticks;
pub mod view_state;

pub use config::{merge, AxisOptions, LayerOptions, PanelOptions, PlotOptions};
pub use data_layer::{DataLayer, DataSource, Status};
pub use events::{Event, EventBus, EventKind};
pub use extent::{axis_extent, Axis, Record};
pub use interaction::{DragMethod, Interaction};
pub use panel::Panel;
pub use plot::Plot;
pub use render::{ErrorSink, NullRenderer, Renderer};
pub use scales::LinearScale;
pub use ticks::{format_position, pretty_ticks, ClipMode, Tick};
pub use view_state::{RegionLimits, StateUpdate, ViewState};
