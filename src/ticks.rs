//! Round-number tick generation for linear axes.

use serde::{Deserialize, Serialize};

/// Which out-of-range boundary ticks to drop after generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    Low,
    High,
    Both,
    #[default]
    Neither,
}

/// A single axis tick. `label`, `style` and `transform` are only populated
/// for "rich" ticks supplied through layout config or layer suggestions;
/// generated ticks carry the position alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub position: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub transform: Option<String>,
}

impl Tick {
    pub fn at(position: f64) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Overlays `overrides` onto this tick. Override keys win on conflict.
    pub fn merged_with(&self, overrides: &TickOverrides) -> Tick {
        let mut tick = self.clone();
        if let Some(label) = &overrides.label {
            tick.label = Some(label.clone());
        }
        for (key, value) in &overrides.style {
            tick.style.insert(key.clone(), value.clone());
        }
        if let Some(transform) = &overrides.transform {
            tick.transform = Some(transform.clone());
        }
        tick
    }
}

/// Per-tick overrides from an axis layout's tick config (no fixed positions).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickOverrides {
    pub label: Option<String>,
    pub style: serde_json::Map<String, serde_json::Value>,
    pub transform: Option<String>,
}

/// Generates "pretty" round-number tick positions over `[lo, hi]`, after
/// R's classic `pretty` heuristic. The walk always emits one tick past `hi`;
/// `clip` then drops boundary ticks falling outside the interval.
///
/// Degenerate ranges (`lo == hi`, zero span) terminate: the step unit is
/// recomputed from the interval magnitude with a non-zero fallback.
pub fn pretty_ticks(range: (f64, f64), clip: ClipMode, target_count: usize) -> Vec<f64> {
    let (lo, hi) = range;
    let n = target_count.max(1) as f64;
    let min_n = n / 3.0;
    let shrink_sml = 0.75;
    let high_u_bias = 1.5;
    let u5_bias = 0.5 + 1.5 * high_u_bias;

    let d = (hi - lo).abs();
    let mut c = d / n;
    if d.log10() < -2.0 {
        c = d * shrink_sml / min_n;
    }
    if !c.is_finite() || c <= 0.0 {
        // zero-span fallback: derive the step from the interval magnitude
        c = (lo.abs().max(hi.abs()).max(1.0) * shrink_sml / min_n).max(f64::EPSILON);
    }

    let base = 10f64.powf(c.log10().floor());
    let decimals = if base < 1.0 {
        (base.log10().round().abs() as i32).max(0)
    } else {
        0
    };

    let mut unit = base;
    if (2.0 * base - c) < high_u_bias * (c - unit) {
        unit = 2.0 * base;
        if (5.0 * base - c) < u5_bias * (c - unit) {
            unit = 5.0 * base;
            if (10.0 * base - c) < high_u_bias * (c - unit) {
                unit = 10.0 * base;
            }
        }
    }

    let round_unit = |value: f64| {
        if decimals > 0 {
            let f = 10f64.powi(decimals);
            (value * f).round() / f
        } else {
            value
        }
    };

    let mut ticks = Vec::new();
    let mut position = round_unit((lo / unit).floor() * unit);
    while position < hi {
        ticks.push(position);
        let next = round_unit(position + unit);
        if next <= position {
            // unit fell below the float resolution at this magnitude
            break;
        }
        position = next;
    }
    ticks.push(position);

    if matches!(clip, ClipMode::Low | ClipMode::Both) && ticks.first().is_some_and(|&t| t < lo) {
        ticks.remove(0);
    }
    if matches!(clip, ClipMode::High | ClipMode::Both) && ticks.last().is_some_and(|&t| t > hi) {
        ticks.pop();
    }

    ticks
}

/// Formats a base-pair position with an Mb/Kb suffix for axis labels.
pub fn format_position(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e6 {
        format!("{:.2} Mb", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2} Kb", value / 1e3)
    } else {
        format!("{:.0} b", value)
    }
}
