use std::collections::BTreeMap;
use worldstats::models::RawRow;
use worldstats::stats::indicator_summary;

fn row(code: &str, values: &[(&str, Option<f64>)]) -> RawRow {
    RawRow {
        country_code: code.into(),
        country_name: code.into(),
        country_display_name: code.into(),
        continent: Some("Europe".into()),
        flag: String::new(),
        year: 2020,
        values: values
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn summaries_handle_missing_and_median_even_odd() {
    // gdp over [1,2,3,4] -> median (2+3)/2 = 2.5
    // hdi over [10, None, 30] -> missing = 1, median = 20
    let rows = vec![
        row("AAA", &[("gdp", Some(1.0)), ("hdi", Some(10.0))]),
        row("BBB", &[("gdp", Some(2.0)), ("hdi", None)]),
        row("CCC", &[("gdp", Some(3.0)), ("hdi", Some(30.0))]),
        row("DDD", &[("gdp", Some(4.0))]),
    ];
    let indexes = vec!["gdp".to_string(), "hdi".to_string()];
    let mut got = indicator_summary(&rows, &indexes);
    got.sort_by(|a, b| a.indicator_id.cmp(&b.indicator_id));

    let gdp = &got[0];
    assert_eq!(gdp.indicator_id, "gdp");
    assert_eq!(gdp.count, 4);
    assert_eq!(gdp.missing, 0);
    assert_eq!(gdp.min, Some(1.0));
    assert_eq!(gdp.max, Some(4.0));
    assert!((gdp.mean.unwrap() - 2.5).abs() < 1e-9);
    assert!((gdp.median.unwrap() - 2.5).abs() < 1e-9);

    let hdi = &got[1];
    assert_eq!(hdi.count, 2);
    // one explicit null plus one row without the column at all
    assert_eq!(hdi.missing, 2);
    assert_eq!(hdi.min, Some(10.0));
    assert_eq!(hdi.max, Some(30.0));
    assert_eq!(hdi.mean.unwrap(), 20.0);
    assert_eq!(hdi.median.unwrap(), 20.0);
}

#[test]
fn absent_indicator_yields_an_all_missing_summary() {
    let rows = vec![row("AAA", &[("gdp", Some(1.0))])];
    let got = indicator_summary(&rows, &["nonexistent".to_string()]);
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].count, 0);
    assert_eq!(got[0].missing, 1);
    assert_eq!(got[0].median, None);
}
