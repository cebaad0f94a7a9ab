//! Declarative configuration: default trees, the layout merge, and the
//! typed options the merged trees deserialize into.

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ticks::{Tick, TickOverrides};

/// Copies every default the caller left unspecified onto `custom`, in place.
///
/// A key already present in `custom` is never overwritten, including
/// explicit `false`, `0` and `null`. Objects merge recursively; arrays are
/// replaced wholesale (a custom array fully shadows the default one).
/// Unknown keys in `custom` pass through untouched.
pub fn merge(custom: &mut Value, defaults: &Value) {
    let (Value::Object(custom), Value::Object(defaults)) = (custom, defaults) else {
        return;
    };
    for (key, default_value) in defaults {
        match custom.get_mut(key) {
            None => {
                custom.insert(key.clone(), default_value.clone());
            }
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    merge(existing, default_value);
                }
            }
        }
    }
}

pub fn default_plot_options() -> Value {
    json!({
        "width": 800,
        "height": 400,
        "min_width": 400,
        "min_height": 200,
        "aspect_ratio": null,
        "responsive_resize": "none",
        "min_region_scale": null,
        "max_region_scale": null,
        "panels": [],
        "state": {}
    })
}

pub fn default_panel_options() -> Value {
    json!({
        "id": "",
        "y_index": null,
        "width": 0,
        "height": 0,
        "min_width": 1,
        "min_height": 1,
        "proportional_width": null,
        "proportional_height": null,
        "margin": { "top": 0, "right": 0, "bottom": 0, "left": 0 },
        "interaction": {
            "drag_background_to_pan": false,
            "drag_x_ticks_to_scale": false,
            "drag_y1_ticks_to_scale": false,
            "drag_y2_ticks_to_scale": false,
            "scroll_to_zoom": false,
            "x_linked": false,
            "y1_linked": false,
            "y2_linked": false
        },
        "axes": {
            "x": { "extent": "state" },
            "y1": {},
            "y2": {}
        },
        "data_layers": []
    })
}

pub fn default_layer_options() -> Value {
    json!({
        "id": "",
        "type": null,
        "z_index": null,
        "x_axis": { "field": "position" },
        "y_axis": { "axis": 1 }
    })
}

/// Responsive-resize policy applied by `Plot::set_dimensions`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsiveResize {
    #[default]
    None,
    Width,
    WidthAndHeight,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub aspect_ratio: Option<f32>,
    pub responsive_resize: ResponsiveResize,
    pub min_region_scale: Option<f64>,
    pub max_region_scale: Option<f64>,
    /// Raw panel layouts; each is merged against `default_panel_options`
    /// when the panel is added.
    pub panels: Vec<Value>,
    pub state: serde_json::Map<String, Value>,
}

impl PlotOptions {
    pub fn from_value(mut custom: Value) -> Result<Self> {
        merge(&mut custom, &default_plot_options());
        serde_json::from_value(custom).wrap_err("invalid plot layout")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginOptions {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionOptions {
    pub drag_background_to_pan: bool,
    pub drag_x_ticks_to_scale: bool,
    pub drag_y1_ticks_to_scale: bool,
    pub drag_y2_ticks_to_scale: bool,
    pub scroll_to_zoom: bool,
    pub x_linked: bool,
    pub y1_linked: bool,
    pub y2_linked: bool,
}

/// Fixed tick positions (highest precedence) or per-tick overrides merged
/// over layer suggestions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TickSpec {
    Positions(Vec<Tick>),
    Overrides(TickOverrides),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLayout {
    pub render: bool,
    pub label: Option<String>,
    /// `"state"` pins the x extent to the shared view window instead of the
    /// layer data.
    pub extent: Option<String>,
    pub ticks: Option<TickSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesLayout {
    pub x: AxisLayout,
    pub y1: AxisLayout,
    pub y2: AxisLayout,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
    pub id: String,
    /// Stacking position; negative counts back from the end of the stack.
    pub y_index: Option<i64>,
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub proportional_width: Option<f64>,
    pub proportional_height: Option<f64>,
    pub margin: MarginOptions,
    pub interaction: InteractionOptions,
    pub axes: AxesLayout,
    /// Raw layer layouts; each is merged against `default_layer_options`
    /// when the layer is added.
    pub data_layers: Vec<Value>,
}

impl PanelOptions {
    pub fn from_value(mut custom: Value) -> Result<Self> {
        merge(&mut custom, &default_panel_options());
        serde_json::from_value(custom).wrap_err("invalid panel layout")
    }
}

/// Extent/buffer configuration tying one layer dimension to an axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisOptions {
    pub field: Option<String>,
    /// Which vertical axis a y binding targets: 1 or 2.
    pub axis: Option<u8>,
    pub lower_buffer: Option<f64>,
    pub upper_buffer: Option<f64>,
    pub min_extent: Option<(f64, f64)>,
    pub floor: Option<f64>,
    pub ceiling: Option<f64>,
    pub decoupled: bool,
    /// Tick suggestions this layer offers its panel.
    pub ticks: Option<Vec<Tick>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOptions {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: Option<String>,
    /// Render order within the panel; negative counts back from the end.
    pub z_index: Option<i64>,
    pub x_axis: AxisOptions,
    pub y_axis: AxisOptions,
}

impl LayerOptions {
    pub fn from_value(mut custom: Value) -> Result<Self> {
        merge(&mut custom, &default_layer_options());
        serde_json::from_value(custom).wrap_err("invalid data layer layout")
    }
}
