//! Tests that hit a live dashboard API. Run with:
//! `WORLDSTATS_API=http://localhost:8004 cargo test --features online`
#![cfg(feature = "online")]

use worldstats::Client;
use worldstats::api::YearQuery;

fn client() -> Client {
    let base = std::env::var("WORLDSTATS_API")
        .unwrap_or_else(|_| "http://localhost:8004".to_string());
    Client::new(base)
}

#[test]
fn indicators_and_countries_load() {
    let client = client();
    let indicators = client.fetch_indicators().expect("indicators");
    assert!(!indicators.is_empty());
    let countries = client.fetch_countries().expect("countries");
    assert!(!countries.is_empty());
    assert!(countries.iter().all(|c| c.code.len() == 3));
}

#[test]
fn year_range_narrows_with_a_pair() {
    let client = client();
    let global = client.fetch_year_range(&YearQuery::Global).expect("global");
    let Some((lo, hi)) = global.bounds() else {
        panic!("no global year range");
    };
    assert!(lo <= hi);
}

#[test]
fn points_and_extents_agree() {
    let client = client();
    let indicators = client.fetch_indicators().expect("indicators");
    if indicators.len() < 2 {
        return;
    }
    let (x, y) = (&indicators[0].id, &indicators[1].id);
    let all = client.fetch_points(x, y, None, None).expect("points");
    if all.is_empty() {
        return;
    }
    let extent = client.fetch_index_extent(x, None).expect("extent");
    if let Some((lo, hi)) = extent.bounds() {
        assert!(all.iter().all(|p| p.x_value >= lo && p.x_value <= hi));
    }
}
