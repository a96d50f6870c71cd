//! Synchronous client for the dashboard's **read-only query API**.
//!
//! All operations return tidy records from [`crate::models`]. The error
//! contract follows the dashboard's degradation policy:
//!
//! - Any non-2xx response is treated as **"no data"** (empty list / null
//!   range), logged, and never surfaced as an error.
//! - Transient server errors (5xx) and network hiccups are retried with a
//!   short backoff; a network failure that survives the retries surfaces
//!   as [`FetchError`], which callers catch and degrade from (keep the
//!   last good data visible, never crash a view).

use crate::models::{
    CountryMeta, DataPoint, FeatureCollection, IndicatorMeta, RawRow, TimeSeriesRow, ValueRange,
    WorldShape, YearRange,
};
use log::warn;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Failure of a fetch that could not be degraded to a "no data" answer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;

// Allow -, _, . unescaped in ids (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value.trim(), SAFE).to_string()
}

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().map(enc).collect::<Vec<_>>().join(",")
}

/// Which year-range question to ask, mirroring the `/api/years` variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearQuery {
    /// Full dataset span.
    Global,
    /// Years where both indicators of a scatter pair are present.
    Pair { x: String, y: String },
    /// Years where a single indicator is present (map view).
    Single(String),
    /// Years where at least one of the indicators is present (table view).
    Many(Vec<String>),
}

impl YearQuery {
    fn query_string(&self) -> String {
        match self {
            YearQuery::Global => String::new(),
            YearQuery::Pair { x, y } => format!("?xIndex={}&yIndex={}", enc(x), enc(y)),
            YearQuery::Single(index) => format!("?index={}", enc(index)),
            YearQuery::Many(indexes) => {
                format!("?indexes={}", enc_join(indexes.iter().map(|s| s.as_str())))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new("http://localhost:8004")
    }
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("worldstats/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// GET a JSON payload. `Ok(None)` means the server answered with a
    /// non-2xx status (degraded to "no data"); `Err` means the network
    /// failed even after retries.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<Option<T>> {
        let mut last_err: Option<reqwest::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r
                        .json::<T>()
                        .map(Some)
                        .map_err(|source| FetchError::Decode {
                            url: url.to_string(),
                            source,
                        });
                }
                Ok(r) if r.status().is_server_error() => {
                    last_err = None; // retry
                }
                Ok(r) => {
                    warn!("GET {url} answered {}; treating as no data", r.status());
                    return Ok(None);
                }
                Err(e) => last_err = Some(e),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        match last_err {
            Some(source) => Err(FetchError::Transport {
                url: url.to_string(),
                source,
            }),
            None => {
                warn!("GET {url} kept answering 5xx; treating as no data");
                Ok(None)
            }
        }
    }

    /// Fetch indicator metadata, in the server's category order.
    pub fn fetch_indicators(&self) -> FetchResult<Vec<IndicatorMeta>> {
        let url = format!("{}/api/indicators", self.base_url);
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// Fetch country metadata.
    pub fn fetch_countries(&self) -> FetchResult<Vec<CountryMeta>> {
        let url = format!("{}/api/countries", self.base_url);
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// Fetch the year span matching `query`. Both bounds are `None` when
    /// no data matches.
    pub fn fetch_year_range(&self, query: &YearQuery) -> FetchResult<YearRange> {
        let url = format!("{}/api/years{}", self.base_url, query.query_string());
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// Fetch paired-indicator points.
    ///
    /// - `year`: `Some(y)` for a single year, `None` for the full history
    ///   (`allYears=true`).
    /// - `size_index`: optional third indicator driving marker size.
    pub fn fetch_points(
        &self,
        x_index: &str,
        y_index: &str,
        year: Option<i32>,
        size_index: Option<&str>,
    ) -> FetchResult<Vec<DataPoint>> {
        let size_param = size_index
            .filter(|s| !s.is_empty())
            .map(|s| format!("&sizeIndex={}", enc(s)))
            .unwrap_or_default();
        let url = match year {
            Some(y) => format!(
                "{}/api/data?year={y}&xIndex={}&yIndex={}{size_param}",
                self.base_url,
                enc(x_index),
                enc(y_index),
            ),
            None => format!(
                "{}/api/data?xIndex={}&yIndex={}{size_param}&allYears=true",
                self.base_url,
                enc(x_index),
                enc(y_index),
            ),
        };
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// Global min/max of one indicator across all years, optionally
    /// restricted to a continent.
    pub fn fetch_index_extent(
        &self,
        index: &str,
        continent: Option<&str>,
    ) -> FetchResult<ValueRange> {
        let continent_param = continent
            .filter(|c| !c.is_empty() && *c != "all")
            .map(|c| format!("&continent={}", enc(c)))
            .unwrap_or_default();
        let url = format!(
            "{}/api/index-range?index={}{continent_param}",
            self.base_url,
            enc(index),
        );
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// Time-series rows for the given countries and indicators.
    pub fn fetch_time_series(
        &self,
        countries: &[String],
        indexes: &[String],
    ) -> FetchResult<Vec<TimeSeriesRow>> {
        if countries.is_empty() || indexes.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}/api/country-data?countries={}&indexes={}",
            self.base_url,
            enc_join(countries.iter().map(|s| s.as_str())),
            enc_join(indexes.iter().map(|s| s.as_str())),
        );
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// Full table rows (all indicator columns) for one year.
    pub fn fetch_raw_rows(&self, year: i32) -> FetchResult<Vec<RawRow>> {
        let url = format!("{}/api/raw-data?year={year}", self.base_url);
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// All years with any data, newest first.
    pub fn fetch_raw_years(&self) -> FetchResult<Vec<i32>> {
        let url = format!("{}/api/raw-data/years", self.base_url);
        Ok(self.get_json(&url)?.unwrap_or_default())
    }

    /// Country outlines for the choropleth. Features without a resolvable
    /// ISO alpha-3 code or without polygon geometry are skipped.
    pub fn fetch_world_shapes(&self) -> FetchResult<Vec<WorldShape>> {
        let url = format!("{}/api/world-shapes", self.base_url);
        let collection: Option<FeatureCollection> = self.get_json(&url)?;
        let Some(collection) = collection else {
            return Ok(Vec::new());
        };
        Ok(collection
            .features
            .iter()
            .filter_map(|feature| {
                let code = feature.country_code()?;
                let rings = feature.rings();
                if rings.is_empty() {
                    return None;
                }
                Some(WorldShape { code, rings })
            })
            .collect())
    }
}
