//! Number formatting for axis ticks, tooltips, and table cells.

use num_format::{Locale, ToFormattedString};

/// Trim trailing zeros (and a trailing dot) from a fixed-point string.
fn trim_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Group the integer part of `value` with thousands separators and keep
/// up to `max_frac` fraction digits, trailing zeros trimmed.
fn grouped(value: f64, max_frac: usize) -> String {
    let negative = value < 0.0;
    // round first so a fraction like .9999 carries into the integer part
    let rounded = format!("{:.*}", max_frac, value.abs());
    let (int_str, frac_str) = match rounded.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rounded.as_str(), ""),
    };
    let frac_digits = frac_str.trim_end_matches('0');
    let int_part: i64 = int_str.parse().unwrap_or(0);
    let mut out = int_part.to_formatted_string(&Locale::en);
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(frac_digits);
    }
    if negative && (int_part != 0 || !frac_digits.is_empty()) {
        out.insert(0, '-');
    }
    out
}

/// Compact axis tick label: `1000000 -> "1M"`, `2500 -> "2.5K"`, small
/// magnitudes in scientific notation.
pub fn format_axis_tick(value: f64) -> String {
    let abs = value.abs();

    if abs == 0.0 {
        return "0".to_string();
    }
    if abs < 0.001 {
        return format!("{value:.1e}");
    }
    if abs < 1.0 {
        return trim_zeros(&format!("{value:.3}"));
    }

    let abbreviated = |scaled: f64, suffix: &str| {
        if scaled.fract() == 0.0 {
            format!("{scaled:.0}{suffix}")
        } else {
            format!("{scaled:.1}{suffix}")
        }
    };
    if abs >= 1e9 {
        return abbreviated(value / 1e9, "B");
    }
    if abs >= 1e6 {
        return abbreviated(value / 1e6, "M");
    }
    if abs >= 1e3 {
        return abbreviated(value / 1e3, "K");
    }

    if abs >= 100.0 {
        return format!("{}", value.round() as i64);
    }
    if abs >= 10.0 {
        return trim_zeros(&format!("{value:.1}"));
    }
    trim_zeros(&format!("{value:.2}"))
}

/// Tooltip value: more digits than a tick, thousands separators for
/// mid-size magnitudes, B/M abbreviation above a million.
pub fn format_tooltip_value(value: f64) -> String {
    let abs = value.abs();

    if abs == 0.0 {
        return "0".to_string();
    }
    if abs < 0.001 {
        return format!("{value:.2e}");
    }
    if abs < 1.0 {
        return trim_zeros(&format!("{value:.4}"));
    }
    if abs >= 1e9 {
        return format!("{}B", grouped(value / 1e9, 2));
    }
    if abs >= 1e6 {
        return format!("{}M", grouped(value / 1e6, 2));
    }
    if abs >= 1e3 {
        return grouped(value, 1);
    }
    if abs >= 100.0 {
        return grouped(value, 1);
    }
    grouped(value, 2)
}

/// Table cell: fixed decimal places with thousands separators, em dash
/// for missing values.
pub fn format_cell(value: Option<f64>, decimals: i32) -> String {
    let Some(value) = value else {
        return "—".to_string();
    };
    if !value.is_finite() {
        return "—".to_string();
    }
    let decimals = decimals.max(0) as usize;
    let negative = value < 0.0;
    let rounded = format!("{:.*}", decimals, value.abs());
    let (int_str, frac_str) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (rounded.clone(), String::new()),
    };
    let int_part: i64 = int_str.parse().unwrap_or(0);
    let mut out = int_part.to_formatted_string(&Locale::en);
    if !frac_str.is_empty() {
        out.push('.');
        out.push_str(&frac_str);
    }
    if negative && rounded.trim_matches(|c| c == '0' || c == '.') != "" {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_abbreviate_magnitudes() {
        assert_eq!(format_axis_tick(0.0), "0");
        assert_eq!(format_axis_tick(1_000_000.0), "1M");
        assert_eq!(format_axis_tick(2_500_000_000.0), "2.5B");
        assert_eq!(format_axis_tick(1_500.0), "1.5K");
        assert_eq!(format_axis_tick(250.0), "250");
        assert_eq!(format_axis_tick(12.0), "12");
        assert_eq!(format_axis_tick(3.25), "3.25");
        assert_eq!(format_axis_tick(0.5), "0.5");
    }

    #[test]
    fn tick_scientific_for_tiny_values() {
        assert_eq!(format_axis_tick(0.00015), "1.5e-4");
    }

    #[test]
    fn tooltip_groups_thousands() {
        assert_eq!(format_tooltip_value(1234.0), "1,234");
        assert_eq!(format_tooltip_value(1_250_000.0), "1.25M");
        assert_eq!(format_tooltip_value(0.1234), "0.1234");
    }

    #[test]
    fn cells_fix_decimals_and_dash_nulls() {
        assert_eq!(format_cell(None, 2), "—");
        assert_eq!(format_cell(Some(1234.5), 2), "1,234.50");
        assert_eq!(format_cell(Some(7.0), 0), "7");
        assert_eq!(format_cell(Some(-1234.5), 1), "-1,234.5");
    }
}
