use worldstats::models::{
    CountryMeta, DataPoint, Feature, IndicatorMeta, RawRow, TimeSeriesRow, ValueFormat, Year,
    YearRange, build_country_label,
};

#[test]
fn indicator_metadata_fills_defaults() {
    let json = r#"[
        {"id": "gdp", "label": "GDP per capita", "unit": "US$", "decimals": 0,
         "format": "number", "category": "Economy",
         "description": "Gross domestic product per person",
         "source": "World Bank", "sourceUrl": "https://example.org",
         "scale": {"label": "0-10", "lowLabel": "low", "highLabel": "high",
                   "gradientClass": "g"}},
        {"id": "corruption", "label": "Corruption Index"}
    ]"#;
    let parsed: Vec<IndicatorMeta> = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].decimals, 0);
    assert_eq!(parsed[0].scale.as_ref().unwrap().low_label, "low");

    let bare = &parsed[1];
    assert_eq!(bare.unit, "");
    assert_eq!(bare.decimals, 2);
    assert_eq!(bare.format, ValueFormat::Number);
    assert_eq!(bare.category, "Other");
    assert!(bare.scale.is_none());
    assert_eq!(bare.display_label(), "Corruption Index");
    assert_eq!(parsed[0].display_label(), "GDP per capita [US$]");
}

#[test]
fn country_labels_combine_flag_and_name() {
    let json = r#"{"country_code": "DEU", "country_name": " Germany ",
                   "flag": "🇩🇪", "continent": "Europe"}"#;
    let country: CountryMeta = serde_json::from_str(json).unwrap();
    assert_eq!(country.label(), "🇩🇪 Germany");
    assert_eq!(build_country_label("France", ""), "France");
    assert_eq!(build_country_label("  ", ""), "");
}

#[test]
fn year_accepts_integers_and_the_avg_sentinel() {
    let exact: Year = serde_json::from_str("2020").unwrap();
    assert_eq!(exact, Year::Exact(2020));
    let avg: Year = serde_json::from_str("\"avg\"").unwrap();
    assert_eq!(avg, Year::Avg);
    // round trip keeps the representations
    assert_eq!(serde_json::to_string(&exact).unwrap(), "2020");
    assert_eq!(serde_json::to_string(&avg).unwrap(), "\"avg\"");
    assert_eq!(avg.as_exact(), None);
    assert_eq!(exact.as_exact(), Some(2020));
}

#[test]
fn data_points_tolerate_enrichment_fields() {
    let json = r#"[{"country_code": "DEU", "year": 2020, "x_value": 1.5,
                    "y_value": 2.5, "country_name": "Germany",
                    "continent": "Europe", "flag": "🇩🇪"},
                   {"country_code": "JPN", "year": "avg", "x_value": 3.0,
                    "y_value": 4.0, "s_value": 125000000.0}]"#;
    let points: Vec<DataPoint> = serde_json::from_str(json).unwrap();
    assert_eq!(points[0].s_value, None);
    assert_eq!(points[1].year, Year::Avg);
    assert_eq!(points[1].s_value, Some(125000000.0));
}

#[test]
fn raw_rows_flatten_indicator_columns() {
    let json = r#"{"country_code": "DEU", "country_name": "Germany",
                   "country_display_name": "🇩🇪 Germany",
                   "continent": "Europe", "flag": "🇩🇪", "year": 2020,
                   "gdp": 46000.5, "corruption": null, "hdi": 0.95}"#;
    let row: RawRow = serde_json::from_str(json).unwrap();
    assert_eq!(row.value("gdp"), Some(46000.5));
    assert_eq!(row.value("corruption"), None);
    assert_eq!(row.value("unknown_index"), None);
    assert_eq!(row.values.len(), 3);
}

#[test]
fn time_series_rows_flatten_too() {
    let json = r#"[{"country_code": "DEU", "year": 2019, "gdp": 1.0, "hdi": null},
                   {"country_code": "DEU", "year": 2020, "gdp": 2.0, "hdi": 0.9}]"#;
    let rows: Vec<TimeSeriesRow> = serde_json::from_str(json).unwrap();
    assert_eq!(rows[0].value("hdi"), None);
    assert_eq!(rows[1].value("gdp"), Some(2.0));
}

#[test]
fn year_range_accepts_nulls() {
    let empty: YearRange = serde_json::from_str(r#"{"min_year": null, "max_year": null}"#).unwrap();
    assert_eq!(empty.bounds(), None);
    let full: YearRange = serde_json::from_str(r#"{"min_year": 1990, "max_year": 2023}"#).unwrap();
    assert_eq!(full.bounds(), Some((1990, 2023)));
}

#[test]
fn geojson_features_resolve_codes_and_rings() {
    let json = r#"{
        "id": "DEU",
        "properties": {},
        "geometry": {"type": "Polygon",
                     "coordinates": [[[5.0, 47.0], [15.0, 47.0], [10.0, 55.0]]]}
    }"#;
    let feature: Feature = serde_json::from_str(json).unwrap();
    assert_eq!(feature.country_code(), Some("DEU".to_string()));
    assert_eq!(feature.rings().len(), 1);
    assert_eq!(feature.rings()[0].len(), 3);

    // property-based code plus MultiPolygon geometry
    let json = r#"{
        "properties": {"ISO_A3": "JPN"},
        "geometry": {"type": "MultiPolygon",
                     "coordinates": [[[[129.0, 31.0], [146.0, 31.0], [140.0, 45.0]]],
                                     [[[127.0, 26.0], [128.5, 26.0], [128.0, 27.0]]]]}
    }"#;
    let feature: Feature = serde_json::from_str(json).unwrap();
    assert_eq!(feature.country_code(), Some("JPN".to_string()));
    assert_eq!(feature.rings().len(), 2);

    // the -99 placeholder is not a code
    let json = r#"{"properties": {"ISO_A3": "-99"}, "geometry": null}"#;
    let feature: Feature = serde_json::from_str(json).unwrap();
    assert_eq!(feature.country_code(), None);
    assert!(feature.rings().is_empty());
}
