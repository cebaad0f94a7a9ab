//! Axis extent resolution from data-layer records.

use eyre::{bail, Result};
use rayon::prelude::*;

use crate::config::AxisOptions;

/// A single data record: a flat field/value map.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Record counts above this are folded in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// The fixed set of axes a data layer may bind to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y1,
    Y2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y1, Axis::Y2];

    pub fn from_name(name: &str) -> Result<Axis> {
        match name {
            "x" => Ok(Axis::X),
            "y1" => Ok(Axis::Y1),
            "y2" => Ok(Axis::Y2),
            other => bail!("invalid axis identifier: {other:?} (expected x, y1 or y2)"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y1 => "y1",
            Axis::Y2 => "y2",
        }
    }

    pub fn is_vertical(&self) -> bool {
        !matches!(self, Axis::X)
    }
}

/// Resolves the `[min, max]` extent a layer's records demand of an axis.
///
/// Steps, in an order that must not be rearranged: raw min/max of the
/// numeric field values, proportional buffers on each side, widening over
/// `min_extent`, then the hard `floor`/`ceiling` clamp. The clamp runs last
/// so it wins over any expansion the earlier steps produced.
///
/// Returns `None` when no numeric values exist and no `min_extent` is
/// configured. Never errors on empty or degenerate data.
pub fn axis_extent(records: &[Record], opts: &AxisOptions) -> Option<(f64, f64)> {
    let raw = opts
        .field
        .as_deref()
        .and_then(|field| field_min_max(records, field));

    let (mut min, mut max) = match raw {
        Some(extent) => extent,
        // fewer than one numeric value: the configured min_extent passes
        // through verbatim, skipping buffers and clamps
        None => return opts.min_extent,
    };

    let mut span = max - min;
    if span == 0.0 {
        span = max.abs();
    }
    if span == 0.0 {
        span = f64::EPSILON;
    }

    if let Some(buffer) = opts.lower_buffer {
        min -= span * buffer;
    }
    if let Some(buffer) = opts.upper_buffer {
        max += span * buffer;
    }

    if let Some((lo, hi)) = opts.min_extent {
        min = min.min(lo);
        max = max.max(hi);
    }

    if let Some(floor) = opts.floor {
        min = min.max(floor);
    }
    if let Some(ceiling) = opts.ceiling {
        max = max.min(ceiling);
    }

    Some((min, max))
}

/// Min/max over the finite numeric values of `field`, folded in parallel
/// for large record sets.
fn field_min_max(records: &[Record], field: &str) -> Option<(f64, f64)> {
    let fold = |acc: Option<(f64, f64)>, value: f64| match acc {
        None => Some((value, value)),
        Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
    };

    if records.len() >= PARALLEL_THRESHOLD {
        records
            .par_iter()
            .filter_map(|record| numeric_field(record, field))
            .fold(|| None, fold)
            .reduce(|| None, |a, b| merge_extents(a, b))
    } else {
        records
            .iter()
            .filter_map(|record| numeric_field(record, field))
            .fold(None, fold)
    }
}

fn numeric_field(record: &Record, field: &str) -> Option<f64> {
    record
        .get(field)
        .and_then(serde_json::Value::as_f64)
        .filter(|value| value.is_finite())
}

/// Running min/max merge of two optional extents.
pub fn merge_extents(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => Some((a_lo.min(b_lo), a_hi.max(b_hi))),
        (extent, None) | (None, extent) => extent,
    }
}
