//! Chart renderers.
//!
//! Each renderer is split into a pure `layout_*` function that turns
//! `(plot size, filtered data, resolved scales, view flags)` into a scene
//! struct, and a thin egui paint pass. Interactions come back as
//! [`ChartEvent`]s that the owning tab applies to the view state —
//! renderers never read or mutate global state.

pub mod gesture;
pub mod histogram;
pub mod line;
pub mod map;
pub mod scatter;

use egui::Color32;

/// High-contrast continent palette shared by scatter, histogram, and
/// legend rendering.
pub const CONTINENT_COLORS: [(&str, Color32); 7] = [
    ("Africa", Color32::from_rgb(0xf9, 0x73, 0x16)), // orange
    ("Asia", Color32::from_rgb(0xa8, 0x55, 0xf7)),   // vivid purple
    ("Europe", Color32::from_rgb(0x25, 0x63, 0xeb)), // royal blue
    ("North America", Color32::from_rgb(0x22, 0xc5, 0x5e)), // vivid green
    ("South America", Color32::from_rgb(0xef, 0x44, 0x44)), // red
    ("Oceania", Color32::from_rgb(0xea, 0xb3, 0x08)), // golden yellow
    ("Antarctica", Color32::from_rgb(0x64, 0x74, 0x8b)), // slate gray
];

/// Default point color when a continent is unknown.
pub const DEFAULT_POINT_COLOR: Color32 = Color32::from_rgb(0x25, 0x63, 0xeb);

pub fn continent_color(continent: &str) -> Color32 {
    CONTINENT_COLORS
        .iter()
        .find(|(name, _)| *name == continent)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_POINT_COLOR)
}

/// Line colors for multi-country time-series charts.
pub const COUNTRY_COLORS: [Color32; 10] = [
    Color32::from_rgb(0x25, 0x63, 0xeb), // blue
    Color32::from_rgb(0xdc, 0x26, 0x26), // red
    Color32::from_rgb(0x16, 0xa3, 0x4a), // green
    Color32::from_rgb(0x93, 0x33, 0xea), // purple
    Color32::from_rgb(0xea, 0x58, 0x0c), // orange
    Color32::from_rgb(0x08, 0x91, 0xb2), // cyan
    Color32::from_rgb(0xc0, 0x26, 0xd3), // fuchsia
    Color32::from_rgb(0x65, 0xa3, 0x0d), // lime
    Color32::from_rgb(0x0d, 0x94, 0x88), // teal
    Color32::from_rgb(0xe1, 0x1d, 0x48), // rose
];

pub fn country_color(position: usize) -> Color32 {
    COUNTRY_COLORS[position % COUNTRY_COLORS.len()]
}

/// Interactions a renderer reports back to its owning tab.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// A brush selection or a finished pan committed new domains.
    ZoomCommitted {
        x_domain: [f64; 2],
        y_domain: [f64; 2],
    },
    /// Continuous pan update while the drag is in flight.
    Panned {
        x_domain: [f64; 2],
        y_domain: [f64; 2],
    },
    /// Reset button or double-click: restore the original domains.
    ZoomReset,
    /// Legend click toggled a continent's visibility.
    ContinentToggled(String),
}

/// Evenly spaced "nice" tick positions covering a domain.
///
/// Steps are powers of ten times 1, 2, or 5, so labels stay round while
/// panning and zooming.
pub fn nice_ticks(domain: [f64; 2], target_count: usize) -> Vec<f64> {
    let (lo, hi) = (domain[0].min(domain[1]), domain[0].max(domain[1]));
    let span = hi - lo;
    if !(span > 0.0) || !span.is_finite() || target_count == 0 {
        return vec![lo];
    }
    let raw_step = span / target_count as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let step = if residual >= 5.0 {
        10.0 * magnitude
    } else if residual >= 2.0 {
        5.0 * magnitude
    } else if residual >= 1.0 {
        2.0 * magnitude
    } else {
        magnitude
    };
    let start = (lo / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut t = start;
    while t <= hi + step * 1e-9 {
        // snap values like 0.30000000000000004 back onto the grid
        ticks.push((t / step).round() * step);
        t += step;
    }
    ticks
}

/// Round a positive upper bound up to the next nice tick step.
pub fn nice_ceil(value: f64) -> f64 {
    if !(value > 0.0) || !value.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let residual = value / magnitude;
    let factor = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Tick counts follow the plot width the way the margins do.
pub fn tick_count_for_width(width: f32) -> usize {
    if width < 500.0 {
        4
    } else if width < 760.0 {
        5
    } else {
        6
    }
}
