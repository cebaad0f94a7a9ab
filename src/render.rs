//! Collaborator seams: drawing and error display happen outside the core.

use crate::data_layer::DataLayer;
use crate::panel::Panel;

/// Drawing collaborator. The core hands over panels whose geometry, scales
/// and ticks are already computed; implementations issue the actual
/// primitives.
pub trait Renderer: Send {
    fn render_panel(&mut self, _panel: &Panel) {}
    fn render_layer(&mut self, _panel: &Panel, _layer: &DataLayer) {}
}

/// Error-overlay collaborator, invoked when a panel's data refresh fails.
pub trait ErrorSink: Send {
    fn show_error(&mut self, _panel_id: &str, _message: &str) {}
    fn clear_error(&mut self, _panel_id: &str) {}
}

/// Default collaborator that draws nothing; useful headless and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}
