//! Linear domain-to-pixel scales.

/// Maps a data domain onto a pixel range. Degenerate domains are widened by
/// half a unit on each side so the mapping stays invertible.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        let (mut d_min, mut d_max) = domain;
        if (d_max - d_min).abs() < f64::EPSILON {
            d_min -= 0.5;
            d_max += 0.5;
        }
        Self {
            domain: (d_min, d_max),
            range,
        }
    }

    pub fn map(&self, value: f64) -> f32 {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;
        let t = (value - d_min) / (d_max - d_min);
        let result = (r_min as f64 + t * (r_max - r_min) as f64) as f32;
        if result.is_nan() || result.is_infinite() {
            0.0
        } else {
            result
        }
    }

    pub fn invert(&self, pixel: f32) -> f64 {
        let (r_min, r_max) = self.range;
        let span = (r_max - r_min) as f64;
        if span == 0.0 {
            return self.domain.0;
        }
        self.domain.0 + (pixel - r_min) as f64 * (self.domain.1 - self.domain.0) / span
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn update_domain(&mut self, min: f64, max: f64) {
        *self = Self::new((min, max), self.range);
    }

    pub fn update_range(&mut self, min: f32, max: f32) {
        self.range = (min, max);
    }

    /// Same scale projected onto a different pixel range. Used while a drag
    /// is in flight: the domain stays put, only the range shifts.
    pub fn with_range(&self, range: (f32, f32)) -> Self {
        Self {
            domain: self.domain,
            range,
        }
    }

    /// Returns (m, c) such that `pixel = value * m + c`.
    pub fn coeffs(&self) -> (f32, f32) {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;
        let m = (r_max - r_min) as f64 / (d_max - d_min);
        let c = r_min as f64 - m * d_min;
        (m as f32, c as f32)
    }

    /// A scale is renderable only when its coefficients are finite; NaN or
    /// infinite extents must not reach the axis renderer.
    pub fn is_well_formed(&self) -> bool {
        let (m, c) = self.coeffs();
        m.is_finite() && c.is_finite()
    }
}
