use std::collections::{BTreeMap, BTreeSet};
use worldstats::app::table::{filter_rows, reorder_column, sort_rows};
use worldstats::models::RawRow;
use worldstats::state::SelectionState;
use worldstats::widgets::{OptionItem, WidgetEvent, apply_events};

fn row(code: &str, name: &str, continent: &str, gdp: Option<f64>) -> RawRow {
    let mut values = BTreeMap::new();
    values.insert("gdp".to_string(), gdp);
    RawRow {
        country_code: code.into(),
        country_name: name.into(),
        country_display_name: name.into(),
        continent: Some(continent.into()),
        flag: String::new(),
        year: 2020,
        values,
    }
}

#[test]
fn search_matches_are_case_insensitive_substrings() {
    let option = OptionItem::new("gdp", "GDP per capita [US$]");
    assert!(option.matches(""));
    assert!(option.matches("gdp"));
    assert!(option.matches("per cap"));
    assert!(!option.matches("corruption"));
}

#[test]
fn countries_also_match_on_their_code() {
    let option = OptionItem::with_code("DEU", "🇩🇪 Germany");
    assert!(option.matches("germ"));
    assert!(option.matches("deu"));
    assert!(!option.matches("fra"));
}

#[test]
fn group_select_and_clear_touch_only_that_group() {
    let mut selection = SelectionState::with_all_selected(vec![
        "DEU".to_string(),
        "FRA".to_string(),
        "JPN".to_string(),
        "CHN".to_string(),
    ]);
    let mut collapsed = BTreeSet::new();

    // clear the "Europe" group only
    let changed = apply_events(
        &mut selection,
        &mut collapsed,
        &[WidgetEvent::ClearMany(vec![
            "DEU".to_string(),
            "FRA".to_string(),
        ])],
    );
    assert!(changed);
    assert!(!selection.is_selected("DEU"));
    assert!(!selection.is_selected("FRA"));
    assert!(selection.is_selected("JPN"));
    assert!(selection.is_selected("CHN"));

    // reselect it
    apply_events(
        &mut selection,
        &mut collapsed,
        &[WidgetEvent::SelectMany(vec![
            "DEU".to_string(),
            "FRA".to_string(),
        ])],
    );
    assert!(selection.all_selected());
}

#[test]
fn collapse_toggles_do_not_count_as_selection_changes() {
    let mut selection = SelectionState::with_all_selected(vec!["DEU".to_string()]);
    let mut collapsed = BTreeSet::new();
    let changed = apply_events(
        &mut selection,
        &mut collapsed,
        &[WidgetEvent::ToggleCollapse("Europe".to_string())],
    );
    assert!(!changed);
    assert!(collapsed.contains("Europe"));
    apply_events(
        &mut selection,
        &mut collapsed,
        &[WidgetEvent::ToggleCollapse("Europe".to_string())],
    );
    assert!(!collapsed.contains("Europe"));
}

#[test]
fn empty_continent_selection_renders_no_rows() {
    let rows = vec![
        row("DEU", "Germany", "Europe", Some(1.0)),
        row("JPN", "Japan", "Asia", Some(2.0)),
    ];
    let countries: BTreeSet<String> =
        ["DEU".to_string(), "JPN".to_string()].into_iter().collect();
    let continents = BTreeSet::new();
    assert!(filter_rows(&rows, &countries, &continents).is_empty());
}

#[test]
fn filters_combine_country_and_continent() {
    let rows = vec![
        row("DEU", "Germany", "Europe", Some(1.0)),
        row("FRA", "France", "Europe", Some(2.0)),
        row("JPN", "Japan", "Asia", Some(3.0)),
    ];
    let countries: BTreeSet<String> =
        ["DEU".to_string(), "JPN".to_string()].into_iter().collect();
    let continents: BTreeSet<String> = ["Europe".to_string()].into_iter().collect();
    let filtered = filter_rows(&rows, &countries, &continents);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].country_code, "DEU");
}

#[test]
fn sorting_numeric_columns_puts_nulls_last_in_both_directions() {
    let mut rows = vec![
        row("AAA", "Aland", "Europe", Some(5.0)),
        row("BBB", "Bland", "Europe", None),
        row("CCC", "Cland", "Europe", Some(1.0)),
    ];
    sort_rows(&mut rows, "gdp", true);
    let order: Vec<&str> = rows.iter().map(|r| r.country_code.as_str()).collect();
    assert_eq!(order, vec!["CCC", "AAA", "BBB"]);

    sort_rows(&mut rows, "gdp", false);
    let order: Vec<&str> = rows.iter().map(|r| r.country_code.as_str()).collect();
    assert_eq!(order, vec!["AAA", "CCC", "BBB"]);
}

#[test]
fn sorting_by_name_is_case_insensitive() {
    let mut rows = vec![
        row("BBB", "zimbabwe", "Africa", None),
        row("AAA", "Albania", "Europe", None),
    ];
    sort_rows(&mut rows, "country_name", true);
    assert_eq!(rows[0].country_code, "AAA");
    sort_rows(&mut rows, "country_name", false);
    assert_eq!(rows[0].country_code, "BBB");
}

#[test]
fn column_reorder_moves_only_indicator_columns() {
    let mut order: Vec<String> = ["rank", "country_name", "continent", "gdp", "hdi", "corruption"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    reorder_column(&mut order, "corruption", "gdp");
    assert_eq!(
        order,
        ["rank", "country_name", "continent", "corruption", "gdp", "hdi"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
    );

    // fixed columns refuse to move or be displaced
    reorder_column(&mut order, "country_name", "gdp");
    reorder_column(&mut order, "gdp", "rank");
    assert_eq!(order[0], "rank");
    assert_eq!(order[1], "country_name");
}

#[test]
fn selection_tag_row_collapses_to_all_exactly_when_everything_is_selected() {
    let mut selection =
        SelectionState::with_all_selected(vec!["a".to_string(), "b".to_string()]);
    assert!(selection.all_selected());
    selection.toggle("a");
    assert!(!selection.all_selected());
    selection.toggle("a");
    assert!(selection.all_selected());
    // empty available never reads as "all"
    let empty = SelectionState::new(Vec::new());
    assert!(!empty.all_selected());
}
