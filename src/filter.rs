//! Pure filtering and aggregation over raw rows.
//!
//! Everything here is a function of its inputs; no I/O, no view state.
//! The owning tab runs the pipeline: apply selection → recompute the
//! filtered view → render.

use crate::models::{DataPoint, RawRow, TimeSeriesRow, Year};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Anything carrying a country code can be filtered by country selection.
pub trait HasCountry {
    fn country_code(&self) -> &str;
}

impl HasCountry for DataPoint {
    fn country_code(&self) -> &str {
        &self.country_code
    }
}

impl HasCountry for RawRow {
    fn country_code(&self) -> &str {
        &self.country_code
    }
}

impl HasCountry for TimeSeriesRow {
    fn country_code(&self) -> &str {
        &self.country_code
    }
}

/// Keep only rows whose country is in the selection.
///
/// An empty selection means "show nothing" — that is the widget policy,
/// not a missing-data condition.
pub fn filter_by_country_selection<T: HasCountry + Clone>(
    rows: &[T],
    selected: &BTreeSet<String>,
) -> Vec<T> {
    if selected.is_empty() {
        return Vec::new();
    }
    rows.iter()
        .filter(|row| selected.contains(row.country_code()))
        .cloned()
        .collect()
}

/// Collapse a multi-year point set to one synthetic row per country with
/// the arithmetic mean of each numeric field. The size field is averaged
/// only over rows where it is present. Output rows carry [`Year::Avg`].
///
/// Idempotent: averaging an already-averaged set returns the same values.
pub fn average_across_years(points: &[DataPoint]) -> Vec<DataPoint> {
    struct Acc {
        x_sum: f64,
        y_sum: f64,
        n: usize,
        s_sum: f64,
        s_n: usize,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for p in points {
        let acc = groups.entry(p.country_code.as_str()).or_insert(Acc {
            x_sum: 0.0,
            y_sum: 0.0,
            n: 0,
            s_sum: 0.0,
            s_n: 0,
        });
        acc.x_sum += p.x_value;
        acc.y_sum += p.y_value;
        acc.n += 1;
        if let Some(s) = p.s_value {
            acc.s_sum += s;
            acc.s_n += 1;
        }
    }

    groups
        .into_iter()
        .map(|(code, acc)| DataPoint {
            country_code: code.to_string(),
            year: Year::Avg,
            x_value: acc.x_sum / acc.n as f64,
            y_value: acc.y_sum / acc.n as f64,
            s_value: (acc.s_n > 0).then(|| acc.s_sum / acc.s_n as f64),
        })
        .collect()
}

/// Size-modality policy: a point missing the active size value is
/// excluded from rendering, not given a default radius.
pub fn drop_missing_size(points: &[DataPoint]) -> Vec<DataPoint> {
    points
        .iter()
        .filter(|p| p.s_value.is_some())
        .cloned()
        .collect()
}

/// One member of a histogram bin, kept for drill-down tooltips.
#[derive(Debug, Clone, PartialEq)]
pub struct BinMember {
    pub country_code: String,
    pub year: Year,
    pub value: f64,
}

/// One equal-width histogram bin over `[lo, hi)`; the last bin also
/// accepts values landing exactly on its upper edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub members: Vec<BinMember>,
}

impl Bin {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// Equal-width binning with reproducible edges.
///
/// The bin width is `(max - min) / bin_count` over the given extent, and
/// the lowest edge is floor-aligned to a multiple of the width, so the
/// edges do not shift with the data distribution. Members are sorted
/// ascending by value within each bin.
pub fn compute_histogram_bins(
    values: &[BinMember],
    extent: (f64, f64),
    bin_count: usize,
) -> Vec<Bin> {
    assert!(bin_count > 0, "bin_count must be positive");

    let (min, max) = extent;
    let mut bin_width = (max - min) / bin_count as f64;
    if !(bin_width > 0.0) || !bin_width.is_finite() {
        // collapsed extent: keep the edge grid well-defined
        bin_width = 1.0 / bin_count as f64;
    }
    let min_edge = (min / bin_width).floor() * bin_width;

    let mut bins: Vec<Bin> = (0..bin_count)
        .map(|i| Bin {
            lo: min_edge + i as f64 * bin_width,
            hi: min_edge + (i + 1) as f64 * bin_width,
            members: Vec::new(),
        })
        .collect();

    for member in values {
        let idx = ((member.value - min_edge) / bin_width).floor();
        let idx = (idx.max(0.0) as usize).min(bin_count - 1);
        bins[idx].members.push(member.clone());
    }

    for bin in &mut bins {
        bin.members
            .sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap());
    }

    bins
}

/// Per-category count of a bin's members, sorted descending so the
/// largest category is drawn at the bottom of the stack. Members whose
/// category cannot be resolved are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

pub fn stack_by_category<F>(members: &[BinMember], category_of: F) -> Vec<CategoryCount>
where
    F: Fn(&str) -> Option<String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for member in members {
        if let Some(category) = category_of(&member.country_code) {
            *counts.entry(category).or_default() += 1;
        }
    }
    let mut stacked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    stacked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    stacked
}
