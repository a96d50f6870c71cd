//! Scales and domain resolution: linear axis scales with asymmetric
//! padding, the square-root size scale, the choropleth color ramp, and
//! the brush/pan domain math shared by all chart renderers.

/// Padding factors for axis domains. The lower/left bound gets slightly
/// more breathing room than the upper/right one so point markers drawn
/// with a visible stroke do not clip at the axis line.
const PADDING_MIN_FACTOR: f64 = 0.04;
const PADDING_MAX_FACTOR: f64 = 0.02;

/// Expand a data extent into an axis domain with asymmetric padding.
/// A collapsed extent is widened by one unit on each side.
pub fn padded_domain(extent: (f64, f64)) -> [f64; 2] {
    let (lo, hi) = extent;
    let range = hi - lo;
    if range.abs() < f64::EPSILON {
        return [lo - 1.0, hi + 1.0];
    }
    [lo - range * PADDING_MIN_FACTOR, hi + range * PADDING_MAX_FACTOR]
}

/// Linear mapping between a data domain and a pixel range.
///
/// The pixel range may be inverted (`[height, 0]` for a Y axis), which
/// keeps all pan/invert math sign-correct without special cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn set_domain(&mut self, domain: [f64; 2]) {
        self.domain = domain;
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    fn domain_span(&self) -> f64 {
        let span = self.domain[1] - self.domain[0];
        if span.abs() < f64::EPSILON { 1.0 } else { span }
    }

    /// Data value → pixel position.
    pub fn scale(&self, value: f64) -> f32 {
        let t = (value - self.domain[0]) / self.domain_span();
        (self.range[0] + t * (self.range[1] - self.range[0])) as f32
    }

    /// Pixel position → data value.
    pub fn invert(&self, px: f32) -> f64 {
        let span_px = self.range[1] - self.range[0];
        let t = if span_px.abs() < f64::EPSILON {
            0.0
        } else {
            (px as f64 - self.range[0]) / span_px
        };
        self.domain[0] + t * self.domain_span()
    }

    /// Pixels per data unit; negative for an inverted range.
    pub fn pixels_per_unit(&self) -> f64 {
        (self.range[1] - self.range[0]) / self.domain_span()
    }
}

/// Convert a rectangular brush selection (pixel corners) into a pair of
/// zoomed domains via the inverse scales. `p0`/`p1` are any two opposite
/// corners; the Y pixel axis is assumed inverted (top < bottom px).
pub fn brush_domains(
    x: &LinearScale,
    y: &LinearScale,
    p0: (f32, f32),
    p1: (f32, f32),
) -> ([f64; 2], [f64; 2]) {
    let (x0, x1) = (p0.0.min(p1.0), p0.0.max(p1.0));
    let (y0, y1) = (p0.1.min(p1.1), p0.1.max(p1.1));
    let x_domain = [x.invert(x0), x.invert(x1)];
    let y_domain = [y.invert(y1), y.invert(y0)];
    (x_domain, y_domain)
}

/// Translate a domain by a pixel delta through the scale's
/// pixels-per-unit ratio. Dragging right (positive `delta_px`) moves the
/// view left, so the domain shifts by `-delta / ppu`.
pub fn pan_domain(start: [f64; 2], delta_px: f32, scale: &LinearScale) -> [f64; 2] {
    let shift = -(delta_px as f64) / scale.pixels_per_unit();
    [start[0] + shift, start[1] + shift]
}

/// Square-root radius scale: visual *area* is proportional to value.
/// Clamped at both radius ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    domain: [f64; 2],
    radius: [f32; 2],
}

impl SqrtScale {
    pub fn new(domain: [f64; 2], radius: [f32; 2]) -> Self {
        Self { domain, radius }
    }

    pub fn radius(&self, value: f64) -> f32 {
        let lo = self.domain[0].max(0.0).sqrt();
        let hi = self.domain[1].max(0.0).sqrt();
        let span = hi - lo;
        let t = if span.abs() < f64::EPSILON {
            0.5
        } else {
            ((value.max(0.0).sqrt() - lo) / span).clamp(0.0, 1.0)
        };
        self.radius[0] + t as f32 * (self.radius[1] - self.radius[0])
    }
}

/// Viridis control points, every eighth of the ramp.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],    // #440154
    [72, 40, 120],  // #482878
    [62, 74, 137],  // #3e4a89
    [49, 104, 142], // #31688e
    [38, 130, 142], // #26828e
    [31, 158, 137], // #1f9e89
    [53, 183, 121], // #35b779
    [110, 206, 88], // #6ece58
    [253, 231, 37], // #fde725
];

/// Sample the viridis ramp at `t` in `[0, 1]` (clamped).
pub fn viridis(t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let pos = t * (VIRIDIS.len() - 1) as f64;
    let i = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = pos - i as f64;
    let a = VIRIDIS[i];
    let b = VIRIDIS[i + 1];
    let mix = |lo: u8, hi: u8| (lo as f64 + (hi as f64 - lo as f64) * frac).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Choropleth fill for a value against a fixed global domain, so a given
/// value maps to the same color regardless of the displayed year.
/// `None` for missing values; a collapsed domain maps to the ramp middle.
pub fn color_for_value(value: Option<f64>, min: f64, max: f64) -> Option<[u8; 3]> {
    let value = value?;
    if !value.is_finite() {
        return None;
    }
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return Some(viridis(0.5));
    }
    Some(viridis((value - min) / range))
}
