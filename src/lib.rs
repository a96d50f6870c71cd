//! worldstats
//!
//! A library + desktop dashboard for exploring a cross-country
//! statistical dataset (GDP, corruption, demographics, …) served by a
//! read-only query API. Pairs with the `worldstats` CLI and the
//! `worldstats-gui` dashboard.
//!
//! ### Features
//! - Typed client for the dashboard's query API (indicators, countries,
//!   paired points, time series, table rows)
//! - Pure filtering and aggregation: country selection, per-country
//!   averaging across years, fixed-width histogram binning
//! - View-state store with locked axis ranges and per-chart zoom
//!   transforms that survive year scrubbing and die on axis changes
//! - Interactive egui chart renderers (scatter, histogram, line,
//!   choropleth) driven by a brush/pan gesture state machine
//! - CSV/JSON export and per-indicator summary statistics
//!
//! ### Example
//! ```no_run
//! use worldstats::Client;
//!
//! let client = Client::new("http://localhost:8004");
//! let points = client.fetch_points("gdp", "corruption", Some(2020), None)?;
//! let averaged = worldstats::filter::average_across_years(&points);
//! println!("{} countries", averaged.len());
//! # Ok::<(), worldstats::api::FetchError>(())
//! ```

pub mod api;
pub mod app;
pub mod charts;
pub mod filter;
pub mod format;
pub mod models;
pub mod scale;
pub mod state;
pub mod stats;
pub mod storage;
pub mod widgets;

pub use api::Client;
pub use models::{CountryMeta, DataPoint, IndicatorMeta, RawRow, TimeSeriesRow, Year};
pub use state::{ChartId, ViewState};
