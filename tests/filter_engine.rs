use std::collections::BTreeSet;
use worldstats::filter::{
    BinMember, average_across_years, compute_histogram_bins, drop_missing_size,
    filter_by_country_selection, stack_by_category,
};
use worldstats::models::{DataPoint, Year};

fn dp(code: &str, year: i32, x: f64, y: f64, s: Option<f64>) -> DataPoint {
    DataPoint {
        country_code: code.into(),
        year: Year::Exact(year),
        x_value: x,
        y_value: y,
        s_value: s,
    }
}

fn member(code: &str, value: f64) -> BinMember {
    BinMember {
        country_code: code.into(),
        year: Year::Exact(2020),
        value,
    }
}

#[test]
fn empty_country_selection_shows_nothing() {
    let rows = vec![dp("DEU", 2020, 1.0, 2.0, None), dp("FRA", 2020, 3.0, 4.0, None)];
    let selected: BTreeSet<String> = BTreeSet::new();
    assert!(filter_by_country_selection(&rows, &selected).is_empty());
}

#[test]
fn country_selection_keeps_only_selected() {
    let rows = vec![
        dp("DEU", 2020, 1.0, 2.0, None),
        dp("FRA", 2020, 3.0, 4.0, None),
        dp("JPN", 2020, 5.0, 6.0, None),
    ];
    let selected: BTreeSet<String> = ["DEU", "JPN"].iter().map(|s| s.to_string()).collect();
    let filtered = filter_by_country_selection(&rows, &selected);
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|r| selected.contains(&r.country_code)));
}

#[test]
fn averaging_two_years_is_the_arithmetic_mean() {
    let rows = vec![
        dp("DEU", 2019, 10.0, 100.0, Some(4.0)),
        dp("DEU", 2020, 20.0, 300.0, None),
    ];
    let averaged = average_across_years(&rows);
    assert_eq!(averaged.len(), 1);
    let row = &averaged[0];
    assert_eq!(row.country_code, "DEU");
    assert_eq!(row.year, Year::Avg);
    assert_eq!(row.x_value, 15.0);
    assert_eq!(row.y_value, 200.0);
    // the size field averages only over rows where it is present
    assert_eq!(row.s_value, Some(4.0));
}

#[test]
fn averaging_is_idempotent() {
    let rows = vec![
        dp("DEU", 2019, 10.0, 1.0, Some(2.0)),
        dp("DEU", 2020, 20.0, 3.0, Some(4.0)),
        dp("FRA", 2019, 5.0, 7.0, None),
    ];
    let once = average_across_years(&rows);
    let twice = average_across_years(&once);
    assert_eq!(once, twice);
}

#[test]
fn missing_size_points_are_excluded() {
    let rows = vec![
        dp("DEU", 2020, 1.0, 2.0, Some(9.0)),
        dp("FRA", 2020, 3.0, 4.0, None),
    ];
    let kept = drop_missing_size(&rows);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].country_code, "DEU");
}

#[test]
fn histogram_has_exactly_twenty_equal_width_bins() {
    let values: Vec<BinMember> = (0..57)
        .map(|i| member(&format!("C{i:02}"), 3.0 + i as f64 * 0.9))
        .collect();
    let lo = values.iter().map(|m| m.value).fold(f64::INFINITY, f64::min);
    let hi = values
        .iter()
        .map(|m| m.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let bins = compute_histogram_bins(&values, (lo, hi), 20);

    assert_eq!(bins.len(), 20);
    let width = bins[0].hi - bins[0].lo;
    for bin in &bins {
        assert!((bin.hi - bin.lo - width).abs() < 1e-9);
    }
    // every value lands in exactly one bin
    let total: usize = bins.iter().map(|b| b.count()).sum();
    assert_eq!(total, values.len());
    // edges are floor-aligned to a multiple of the bin width
    let aligned = (bins[0].lo / width).round() * width;
    assert!((bins[0].lo - aligned).abs() < 1e-9);
}

#[test]
fn histogram_members_are_sorted_ascending() {
    let values = vec![
        member("AAA", 5.0),
        member("BBB", 1.0),
        member("CCC", 3.0),
        member("DDD", 2.0),
    ];
    let bins = compute_histogram_bins(&values, (0.0, 100.0), 20);
    let first = &bins[0];
    let sorted: Vec<f64> = first.members.iter().map(|m| m.value).collect();
    let mut expected = sorted.clone();
    expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(sorted, expected);
}

#[test]
fn histogram_accepts_value_on_extended_last_edge() {
    let values = vec![member("AAA", 0.0), member("BBB", 10.0)];
    let bins = compute_histogram_bins(&values, (0.0, 10.0), 20);
    let total: usize = bins.iter().map(|b| b.count()).sum();
    assert_eq!(total, 2);
    assert_eq!(bins[19].count(), 1);
}

#[test]
fn histogram_collapsed_extent_still_yields_full_grid() {
    let values = vec![member("AAA", 7.0), member("BBB", 7.0)];
    let bins = compute_histogram_bins(&values, (7.0, 7.0), 20);
    assert_eq!(bins.len(), 20);
    let total: usize = bins.iter().map(|b| b.count()).sum();
    assert_eq!(total, 2);
}

#[test]
fn stacking_sorts_categories_by_descending_count() {
    let members = vec![
        member("DEU", 1.0),
        member("FRA", 2.0),
        member("JPN", 3.0),
        member("CHN", 4.0),
        member("IND", 5.0),
        member("XXX", 6.0),
    ];
    let continent = |code: &str| match code {
        "DEU" | "FRA" => Some("Europe".to_string()),
        "JPN" | "CHN" | "IND" => Some("Asia".to_string()),
        _ => None,
    };
    let stacked = stack_by_category(&members, continent);
    assert_eq!(stacked.len(), 2);
    assert_eq!(stacked[0].category, "Asia");
    assert_eq!(stacked[0].count, 3);
    assert_eq!(stacked[1].category, "Europe");
    assert_eq!(stacked[1].count, 2);
}
