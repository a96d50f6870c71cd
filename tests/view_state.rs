use worldstats::models::{CountryMeta, IndicatorMeta, YearRange};
use worldstats::state::{
    Axis, AxisExtents, ChartId, RangeKey, SECOND_CHART_MIN_WIDTH, SelectionState, ViewState,
    YearMode,
};

fn indicator(id: &str, category: &str) -> IndicatorMeta {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "label": id.to_uppercase(),
        "category": category,
    }))
    .unwrap()
}

fn country(code: &str, name: &str, continent: &str) -> CountryMeta {
    serde_json::from_value(serde_json::json!({
        "country_code": code,
        "country_name": name,
        "flag": "",
        "continent": continent,
    }))
    .unwrap()
}

fn view_with_data() -> ViewState {
    let mut view = ViewState::new();
    view.set_metadata(
        vec![
            indicator("gdp", "Economy"),
            indicator("corruption", "Politics"),
            indicator("population", "Demographics"),
            indicator("hdi", "Society"),
        ],
        vec![
            country("DEU", "Germany", "Europe"),
            country("JPN", "Japan", "Asia"),
        ],
    );
    view
}

fn extents() -> AxisExtents {
    AxisExtents {
        x_extent: [0.0, 10.0],
        y_extent: [1.0, 5.0],
    }
}

#[test]
fn axis_change_clears_zoom_and_locked_range_entry() {
    let mut view = view_with_data();
    view.set_axis(ChartId::Primary, Axis::X, "gdp");
    view.set_axis(ChartId::Primary, Axis::Y, "corruption");

    let key = view.range_key(ChartId::Primary);
    view.store_locked_range(key.clone(), extents());
    view.commit_zoom(ChartId::Primary, [2.0, 4.0], [1.5, 3.0]);
    assert!(view.chart(ChartId::Primary).is_zoomed());

    // change x to hdi: zoom dies, and the (chart, hdi, corruption)
    // entry (populated earlier in this scenario) is dropped
    let future_key = RangeKey {
        chart: ChartId::Primary,
        x: "hdi".to_string(),
        y: "corruption".to_string(),
    };
    view.store_locked_range(future_key.clone(), extents());
    view.set_axis(ChartId::Primary, Axis::X, "hdi");

    assert!(!view.chart(ChartId::Primary).is_zoomed());
    assert!(view.chart(ChartId::Primary).zoom.is_none());
    assert!(view.locked_range(&future_key).is_none());
    // the old pair's entry is untouched; it is reused when the user
    // navigates back
    assert!(view.locked_range(&key).is_some());
}

#[test]
fn year_change_preserves_zoom_and_locked_range() {
    let mut view = view_with_data();
    let key = view.range_key(ChartId::Primary);
    view.store_locked_range(key.clone(), extents());
    view.commit_zoom(ChartId::Primary, [2.0, 4.0], [1.5, 3.0]);

    view.set_compare_year(2015);
    view.set_compare_year(1999);

    assert!(view.chart(ChartId::Primary).is_zoomed());
    assert_eq!(view.locked_range(&key), Some(extents()));
}

#[test]
fn locked_range_is_stable_across_year_scrubbing() {
    let mut view = view_with_data();
    let key = view.range_key(ChartId::Primary);
    view.store_locked_range(key.clone(), extents());

    view.set_compare_year(2000);
    let at_2000 = view.locked_range(&key);
    view.set_compare_year(2020);
    let at_2020 = view.locked_range(&key);
    assert_eq!(at_2000, at_2020);
    assert_eq!(at_2000, Some(extents()));
}

#[test]
fn zoom_is_bound_to_the_axis_pair_it_was_created_under() {
    let mut view = view_with_data();
    view.set_axis(ChartId::Primary, Axis::X, "gdp");
    view.set_axis(ChartId::Primary, Axis::Y, "corruption");
    view.commit_zoom(ChartId::Primary, [1.0, 2.0], [3.0, 4.0]);

    let zoom = view.chart(ChartId::Primary).active_zoom().unwrap();
    assert_eq!(zoom.bound_x, "gdp");
    assert_eq!(zoom.bound_y, "corruption");
    assert_eq!(zoom.x_domain, [1.0, 2.0]);
}

#[test]
fn swap_axes_clears_zoom() {
    let mut view = view_with_data();
    view.commit_zoom(ChartId::Primary, [1.0, 2.0], [3.0, 4.0]);
    let x_before = view.chart(ChartId::Primary).x_index.clone();
    let y_before = view.chart(ChartId::Primary).y_index.clone();

    view.swap_axes(ChartId::Primary);

    assert_eq!(view.chart(ChartId::Primary).x_index, y_before);
    assert_eq!(view.chart(ChartId::Primary).y_index, x_before);
    assert!(!view.chart(ChartId::Primary).is_zoomed());
}

#[test]
fn charts_have_independent_state() {
    let mut view = view_with_data();
    view.commit_zoom(ChartId::Primary, [1.0, 2.0], [3.0, 4.0]);
    view.toggle_continent(ChartId::Primary, "Asia");

    assert!(!view.chart(ChartId::Secondary).is_zoomed());
    assert!(view.chart(ChartId::Secondary).hidden_continents.is_empty());
    assert!(
        view.chart(ChartId::Primary)
            .hidden_continents
            .contains("Asia")
    );
}

#[test]
fn identical_axes_select_the_histogram_path() {
    let mut view = view_with_data();
    view.set_axis(ChartId::Primary, Axis::X, "gdp");
    view.set_axis(ChartId::Primary, Axis::Y, "gdp");
    assert!(view.chart(ChartId::Primary).is_histogram());
    view.set_axis(ChartId::Primary, Axis::Y, "corruption");
    assert!(!view.chart(ChartId::Primary).is_histogram());
}

#[test]
fn range_keys_are_structured_not_string_concatenated() {
    // "1-a-b-c" style string keys could collide; tuples cannot
    let a = RangeKey {
        chart: ChartId::Primary,
        x: "a-b".to_string(),
        y: "c".to_string(),
    };
    let b = RangeKey {
        chart: ChartId::Primary,
        x: "a".to_string(),
        y: "b-c".to_string(),
    };
    assert_ne!(a, b);
}

#[test]
fn selection_state_enforces_subset_and_all_flag() {
    let mut sel = SelectionState::with_all_selected(vec![
        "Europe".to_string(),
        "Asia".to_string(),
    ]);
    assert!(sel.all_selected());

    sel.toggle("Asia");
    assert!(!sel.all_selected());
    assert!(sel.is_selected("Europe"));

    // ids outside the available list never enter the selection
    sel.toggle("Atlantis");
    assert!(!sel.is_selected("Atlantis"));
    sel.select_many(["Atlantis", "Asia"].into_iter());
    assert!(!sel.is_selected("Atlantis"));
    assert!(sel.all_selected());

    // deselect-then-reselect everything is indistinguishable from the
    // initial all-selected state
    sel.clear();
    assert!(sel.selected.is_empty());
    sel.select_all();
    assert!(sel.all_selected());
}

#[test]
fn second_chart_materializes_above_the_width_threshold() {
    let mut view = view_with_data();
    view.update_layout_width(SECOND_CHART_MIN_WIDTH - 100.0);
    assert!(!view.second_chart_enabled);
    assert!(!view.second_chart_active());

    view.update_layout_width(SECOND_CHART_MIN_WIDTH + 100.0);
    view.second_chart_initialized = true;
    assert!(view.second_chart_active());

    // narrowing pauses it but does not tear it down
    view.update_layout_width(800.0);
    assert!(!view.second_chart_active());
    assert!(view.second_chart_initialized);
}

#[test]
fn compare_year_bounds_union_pair_ranges() {
    let mut view = view_with_data();
    view.global_years = YearRange {
        min_year: Some(1990),
        max_year: Some(2023),
    };
    assert_eq!(view.compare_year_bounds(), Some((1990, 2023)));

    view.pair_years.insert(
        ChartId::Primary,
        YearRange {
            min_year: Some(2000),
            max_year: Some(2010),
        },
    );
    view.pair_years.insert(
        ChartId::Secondary,
        YearRange {
            min_year: Some(2005),
            max_year: Some(2020),
        },
    );
    assert_eq!(view.compare_year_bounds(), Some((2000, 2020)));

    // out-of-range year snaps to the newest available
    view.compare_year = Some(1950);
    assert_eq!(view.clamp_compare_year(), Some(2020));
    // an in-range year is kept
    view.compare_year = Some(2004);
    assert_eq!(view.clamp_compare_year(), Some(2004));
}

#[test]
fn year_mode_defaults_to_exact() {
    let view = ViewState::new();
    assert_eq!(view.year_mode, YearMode::Exact);
}
