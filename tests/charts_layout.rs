use std::collections::{BTreeSet, HashMap};
use worldstats::charts::gesture::{GestureInput, GestureOutput, GestureState};
use worldstats::charts::histogram::{HistogramInput, layout_histogram};
use worldstats::charts::line::{LineInput, layout_line};
use worldstats::charts::map::{MapInput, layout_map};
use worldstats::charts::scatter::{ScatterInput, layout_scatter};
use worldstats::models::{DataPoint, Year, WorldShape};
use worldstats::scale::brush_domains;
use worldstats::state::{AxisExtents, DomainPair, ZoomTransform};

fn dp(code: &str, x: f64, y: f64, s: Option<f64>) -> DataPoint {
    DataPoint {
        country_code: code.into(),
        year: Year::Exact(2020),
        x_value: x,
        y_value: y,
        s_value: s,
    }
}

fn continent_of(code: &str) -> Option<String> {
    match code {
        "DEU" | "FRA" | "GBR" => Some("Europe".to_string()),
        "JPN" | "CHN" => Some("Asia".to_string()),
        _ => None,
    }
}

fn five_countries() -> Vec<DataPoint> {
    vec![
        dp("DEU", 1.0, 10.0, None),
        dp("FRA", 2.0, 20.0, None),
        dp("GBR", 3.0, 30.0, None),
        dp("JPN", 4.0, 40.0, None),
        dp("CHN", 5.0, 50.0, None),
    ]
}

#[test]
fn five_countries_render_five_points() {
    let data = five_countries();
    let hidden = BTreeSet::new();
    let input = ScatterInput {
        size: (400.0, 400.0),
        data: &data,
        fixed_extents: None,
        zoom: None,
        size_domain: None,
        hidden_continents: &hidden,
        all_years: false,
        compact: false,
    };
    let scene = layout_scatter(&input, continent_of);
    assert_eq!(scene.marks.len(), 5);
    assert_eq!(scene.marks.iter().filter(|m| m.visible).count(), 5);
    assert_eq!(scene.point_count, 5);
    assert_eq!(scene.continents, vec!["Asia".to_string(), "Europe".to_string()]);
}

#[test]
fn same_data_renders_as_twenty_bin_histogram_when_axes_match() {
    // the x == y selection takes the histogram path over the same rows
    let data = five_countries();
    let hidden = BTreeSet::new();
    let input = HistogramInput {
        size: (400.0, 400.0),
        data: &data,
        fixed_extent: None,
        hidden_continents: &hidden,
    };
    let scene = layout_histogram(&input, continent_of);
    assert_eq!(scene.bins.len(), 20);
    assert_eq!(scene.total_count, 5);
    let members: usize = scene.bins.iter().map(|b| b.count()).sum();
    assert_eq!(members, 5);
}

#[test]
fn hidden_continent_marks_are_invisible_but_counted_in_badge() {
    let data = five_countries();
    let hidden: BTreeSet<String> = ["Asia".to_string()].into();
    let input = ScatterInput {
        size: (400.0, 400.0),
        data: &data,
        fixed_extents: None,
        zoom: None,
        size_domain: None,
        hidden_continents: &hidden,
        all_years: false,
        compact: false,
    };
    let scene = layout_scatter(&input, continent_of);
    assert_eq!(scene.marks.iter().filter(|m| m.visible).count(), 3);
    // the badge reflects the display filter's input, not its output
    assert_eq!(scene.point_count, 5);
}

#[test]
fn missing_size_value_excludes_the_point_when_size_modality_is_on() {
    let data = vec![
        dp("DEU", 1.0, 10.0, Some(100.0)),
        dp("FRA", 2.0, 20.0, None),
    ];
    let hidden = BTreeSet::new();
    let input = ScatterInput {
        size: (400.0, 400.0),
        data: &data,
        fixed_extents: None,
        zoom: None,
        size_domain: Some((0.0, 1000.0)),
        hidden_continents: &hidden,
        all_years: false,
        compact: false,
    };
    let scene = layout_scatter(&input, continent_of);
    let visible: Vec<_> = scene.marks.iter().filter(|m| m.visible).collect();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].country_code, "DEU");
    assert_eq!(scene.point_count, 1);
}

#[test]
fn locked_extents_override_the_data_extent() {
    let data = vec![dp("DEU", 4.0, 4.0, None), dp("FRA", 6.0, 6.0, None)];
    let hidden = BTreeSet::new();
    let fixed = AxisExtents {
        x_extent: [0.0, 10.0],
        y_extent: [0.0, 10.0],
    };
    let input = ScatterInput {
        size: (400.0, 400.0),
        data: &data,
        fixed_extents: Some(fixed),
        zoom: None,
        size_domain: None,
        hidden_continents: &hidden,
        all_years: false,
        compact: false,
    };
    let scene = layout_scatter(&input, continent_of);
    // padded full-history domain, not the current year's tight extent
    assert!(scene.x_scale.domain()[0] < 0.0);
    assert!(scene.x_scale.domain()[1] > 10.0);
}

#[test]
fn stored_zoom_overrides_domains_and_flags_the_scene() {
    let data = five_countries();
    let hidden = BTreeSet::new();
    let zoom = ZoomTransform {
        x_domain: [2.0, 3.0],
        y_domain: [15.0, 35.0],
        bound_x: "a".into(),
        bound_y: "b".into(),
    };
    let input = ScatterInput {
        size: (400.0, 400.0),
        data: &data,
        fixed_extents: None,
        zoom: Some(&zoom),
        size_domain: None,
        hidden_continents: &hidden,
        all_years: false,
        compact: false,
    };
    let scene = layout_scatter(&input, continent_of);
    assert!(scene.zoomed);
    assert_eq!(scene.x_scale.domain(), [2.0, 3.0]);
    // the unzoomed domain is kept for reset
    assert!(scene.original_x_domain[0] < 1.0);
    assert!(scene.original_x_domain[1] > 5.0);
}

#[test]
fn brushing_a_scene_produces_a_strict_subset_and_reset_restores() {
    let data = five_countries();
    let hidden = BTreeSet::new();
    let input = ScatterInput {
        size: (400.0, 400.0),
        data: &data,
        fixed_extents: None,
        zoom: None,
        size_domain: None,
        hidden_continents: &hidden,
        all_years: false,
        compact: false,
    };
    let scene = layout_scatter(&input, continent_of);

    let mut gesture = GestureState::new();
    gesture.update(GestureInput::PointerDown((100.0, 100.0)), false);
    gesture.update(GestureInput::PointerMove((300.0, 250.0)), false);
    let out = gesture.update(GestureInput::PointerUp((300.0, 250.0)), false);
    let GestureOutput::BrushCommitted { from, to } = out else {
        panic!("expected a committed brush, got {out:?}");
    };
    let (x_domain, y_domain) = brush_domains(&scene.x_scale, &scene.y_scale, from, to);

    let orig_x = scene.original_x_domain;
    let orig_y = scene.original_y_domain;
    assert!(x_domain[0] > orig_x[0] && x_domain[1] < orig_x[1]);
    assert!(y_domain[0] > orig_y[0] && y_domain[1] < orig_y[1]);

    // reset path: a new layout without a stored zoom re-derives exactly
    // the original domains
    let reset_scene = layout_scatter(&input, continent_of);
    assert_eq!(reset_scene.x_scale.domain(), orig_x);
    assert_eq!(reset_scene.y_scale.domain(), orig_y);
}

#[test]
fn histogram_stack_skips_hidden_but_keeps_the_scale() {
    let data = five_countries();
    let no_hidden = BTreeSet::new();
    let all_visible = layout_histogram(
        &HistogramInput {
            size: (400.0, 400.0),
            data: &data,
            fixed_extent: None,
            hidden_continents: &no_hidden,
        },
        continent_of,
    );
    let hidden: BTreeSet<String> = ["Europe".to_string()].into();
    let filtered = layout_histogram(
        &HistogramInput {
            size: (400.0, 400.0),
            data: &data,
            fixed_extent: None,
            hidden_continents: &hidden,
        },
        continent_of,
    );
    assert!(filtered.segments.len() < all_visible.segments.len());
    assert!(filtered.segments.iter().all(|s| s.continent != "Europe"));
    // hiding a continent must not rescale the y axis
    assert_eq!(filtered.y_scale.domain(), all_visible.y_scale.domain());
}

#[test]
fn line_layout_pads_y_and_respects_zoom() {
    let series = vec![(
        "DEU".to_string(),
        egui::Color32::RED,
        vec![(2000, 10.0), (2001, 20.0), (2002, 30.0)],
    )];
    let scene = layout_line(&LineInput {
        size: (400.0, 200.0),
        series: &series,
        zoom: None,
    });
    assert_eq!(scene.original_x_domain, [2000.0, 2002.0]);
    // 10 % padding on both y sides
    assert!((scene.original_y_domain[0] - 8.0).abs() < 1e-9);
    assert!((scene.original_y_domain[1] - 32.0).abs() < 1e-9);
    assert!(!scene.zoomed);

    let zoomed = layout_line(&LineInput {
        size: (400.0, 200.0),
        series: &series,
        zoom: Some(DomainPair {
            x: [2000.5, 2001.5],
            y: [15.0, 25.0],
        }),
    });
    assert!(zoomed.zoomed);
    assert_eq!(zoomed.x_scale.domain(), [2000.5, 2001.5]);
}

#[test]
fn map_layout_colors_only_countries_with_data_in_the_filter() {
    let shapes = vec![
        WorldShape {
            code: "DEU".into(),
            rings: vec![vec![[5.0, 47.0], [15.0, 47.0], [15.0, 55.0], [5.0, 55.0]]],
        },
        WorldShape {
            code: "JPN".into(),
            rings: vec![vec![[129.0, 31.0], [146.0, 31.0], [146.0, 45.0]]],
        },
        WorldShape {
            code: "XXX".into(),
            rings: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]],
        },
    ];
    let mut values = HashMap::new();
    values.insert("DEU".to_string(), 10.0);
    values.insert("JPN".to_string(), 90.0);

    let scene = layout_map(
        &MapInput {
            size: (720.0, 360.0),
            shapes: &shapes,
            values: &values,
            color_domain: Some((0.0, 100.0)),
            continent: "Europe",
        },
        continent_of,
    );
    let by_code: HashMap<&str, _> = scene
        .shapes
        .iter()
        .map(|s| (s.code.as_str(), s.fill))
        .collect();
    assert!(by_code["DEU"].is_some());
    // outside the continent filter: rendered as no-data
    assert!(by_code["JPN"].is_none());
    assert!(by_code["XXX"].is_none());
}

#[test]
fn map_colors_do_not_shift_with_the_displayed_year() {
    // the color domain is global; the same value gets the same fill no
    // matter which year's rows produced it
    let shape = WorldShape {
        code: "DEU".into(),
        rings: vec![vec![[5.0, 47.0], [15.0, 47.0], [15.0, 55.0]]],
    };
    let mut year_a = HashMap::new();
    year_a.insert("DEU".to_string(), 42.0);
    let mut year_b = HashMap::new();
    year_b.insert("DEU".to_string(), 42.0);

    let build = |values: &HashMap<String, f64>| {
        layout_map(
            &MapInput {
                size: (720.0, 360.0),
                shapes: std::slice::from_ref(&shape),
                values,
                color_domain: Some((0.0, 100.0)),
                continent: "all",
            },
            continent_of,
        )
        .shapes[0]
            .fill
    };
    assert_eq!(build(&year_a), build(&year_b));
}
