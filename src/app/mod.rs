//! The dashboard application: tab routing, background fetch plumbing,
//! and the staleness defense that keeps out-of-order responses from
//! corrupting the view.
//!
//! All fetches run on background threads and report back over an mpsc
//! channel, polled once per frame. Every result carries the parameters
//! it was requested with; a result is applied only if those parameters
//! still match the current view state, otherwise it is discarded.

mod compare;
mod map;
pub mod table;
mod timeline;

use crate::api::Client;
use crate::charts::gesture::GestureState;
use crate::models::{
    CountryMeta, DataPoint, IndicatorMeta, RawRow, TimeSeriesRow, ValueRange, WorldShape,
    YearRange,
};
use crate::state::{AxisExtents, ChartId, RangeKey, ViewState, YearMode};
use crate::widgets::DropdownUi;
use log::{error, info};
use std::collections::{BTreeSet, HashMap};
use std::sync::mpsc;
use std::thread;

/// Resize debounce window in seconds: layout reacts once events go
/// quiet, not on every intermediate width.
const RESIZE_DEBOUNCE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Compare,
    Timeline,
    Map,
    RawData,
}

impl Tab {
    fn storage_key(self) -> &'static str {
        match self {
            Tab::Compare => "compare",
            Tab::Timeline => "timeline",
            Tab::Map => "map",
            Tab::RawData => "raw-data",
        }
    }

    fn from_storage(value: &str) -> Self {
        match value {
            "timeline" => Tab::Timeline,
            "map" => Tab::Map,
            "raw-data" => Tab::RawData,
            _ => Tab::Compare,
        }
    }
}

/// Parameters a compare-chart fetch was issued with; equality against
/// the current state decides whether the result is still wanted.
#[derive(Debug, Clone, PartialEq)]
pub struct PointParams {
    pub x: String,
    pub y: String,
    pub mode: YearMode,
    pub year: Option<i32>,
    pub size: Option<String>,
}

/// One background fetch result.
enum FetchMsg {
    Metadata {
        indicators: Vec<IndicatorMeta>,
        countries: Vec<CountryMeta>,
    },
    GlobalYears(YearRange),
    PairYears {
        chart: ChartId,
        x: String,
        y: String,
        range: YearRange,
    },
    Points {
        chart: ChartId,
        params: PointParams,
        points: Vec<DataPoint>,
    },
    LockedExtent {
        key: RangeKey,
        extents: Option<AxisExtents>,
    },
    SizeExtent {
        chart: ChartId,
        index: String,
        range: ValueRange,
    },
    RawYears(Vec<i32>),
    TableYearRange {
        indexes: Vec<String>,
        range: YearRange,
    },
    RawRows {
        year: i32,
        rows: Vec<RawRow>,
    },
    TimeSeries {
        countries: Vec<String>,
        indexes: Vec<String>,
        rows: Vec<TimeSeriesRow>,
    },
    MapYearRange {
        index: String,
        range: YearRange,
    },
    MapExtent {
        index: String,
        continent: String,
        range: ValueRange,
    },
    MapRows {
        year: i32,
        rows: Vec<RawRow>,
    },
    Shapes(Vec<WorldShape>),
    /// Transport failure: logged, last good data stays visible.
    Failed(String),
}

/// Per-chart fetched data; `params` tags which request produced it.
#[derive(Default)]
pub(crate) struct ChartData {
    pub points: Vec<DataPoint>,
    pub params: Option<PointParams>,
    pub size_domain: Option<(f64, f64)>,
    pub loading: bool,
}

/// Dropdown UI state for one chart's three axis pickers.
#[derive(Default)]
pub(crate) struct ChartPickerUi {
    pub x: DropdownUi,
    pub y: DropdownUi,
    pub size: DropdownUi,
}

pub struct WorldStatsApp {
    client: Client,
    pub(crate) view: ViewState,
    tab: Tab,
    tx: mpsc::Sender<FetchMsg>,
    rx: mpsc::Receiver<FetchMsg>,

    pub(crate) charts: HashMap<ChartId, ChartData>,
    pub(crate) raw_rows: Vec<RawRow>,
    pub(crate) raw_loading: bool,
    pub(crate) timeline_rows: Vec<TimeSeriesRow>,
    pub(crate) timeline_loading: bool,
    pub(crate) map_rows: Vec<RawRow>,
    pub(crate) shapes: Vec<WorldShape>,
    shapes_requested: bool,

    pub(crate) gestures: HashMap<ChartId, GestureState>,
    pub(crate) timeline_gestures: HashMap<String, GestureState>,
    pub(crate) pickers: HashMap<ChartId, ChartPickerUi>,
    pub(crate) table_continent_ui: DropdownUi,
    pub(crate) table_country_ui: DropdownUi,
    pub(crate) table_indexes_ui: DropdownUi,
    pub(crate) timeline_country_ui: DropdownUi,
    pub(crate) timeline_indexes_ui: DropdownUi,
    pub(crate) map_index_ui: DropdownUi,
    pub(crate) map_continent_ui: DropdownUi,

    dark_mode: bool,
    /// Charts still waiting for their first data; the loader overlay
    /// stays up until this joins to empty.
    initial_pending: BTreeSet<&'static str>,
    last_width: f32,
    width_settle_at: Option<f64>,
    pub(crate) status_line: Option<String>,
}

impl WorldStatsApp {
    pub fn new(cc: &eframe::CreationContext<'_>, base_url: String) -> Self {
        let (tx, rx) = mpsc::channel();
        let tab = cc
            .storage
            .and_then(|s| s.get_string("active_tab"))
            .map(|t| Tab::from_storage(&t))
            .unwrap_or(Tab::Compare);
        let dark_mode = cc
            .storage
            .and_then(|s| s.get_string("theme"))
            .map(|t| t != "light")
            .unwrap_or(true);

        let mut charts = HashMap::new();
        charts.insert(ChartId::Primary, ChartData::default());
        charts.insert(ChartId::Secondary, ChartData::default());
        let mut gestures = HashMap::new();
        gestures.insert(ChartId::Primary, GestureState::new());
        gestures.insert(ChartId::Secondary, GestureState::new());
        let mut pickers = HashMap::new();
        pickers.insert(ChartId::Primary, ChartPickerUi::default());
        pickers.insert(ChartId::Secondary, ChartPickerUi::default());

        let mut app = Self {
            client: Client::new(base_url),
            view: ViewState::new(),
            tab,
            tx,
            rx,
            charts,
            raw_rows: Vec::new(),
            raw_loading: false,
            timeline_rows: Vec::new(),
            timeline_loading: false,
            map_rows: Vec::new(),
            shapes: Vec::new(),
            shapes_requested: false,
            gestures,
            timeline_gestures: HashMap::new(),
            pickers,
            table_continent_ui: DropdownUi::default(),
            table_country_ui: DropdownUi::default(),
            table_indexes_ui: DropdownUi::default(),
            timeline_country_ui: DropdownUi::default(),
            timeline_indexes_ui: DropdownUi::default(),
            map_index_ui: DropdownUi::default(),
            map_continent_ui: DropdownUi::default(),
            dark_mode,
            initial_pending: BTreeSet::from(["metadata"]),
            last_width: 0.0,
            width_settle_at: None,
            status_line: None,
        };
        app.spawn_metadata_fetch();
        app
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&Client) -> Result<FetchMsg, crate::api::FetchError> + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let msg = match job(&client) {
                Ok(msg) => msg,
                Err(err) => {
                    error!("fetch failed: {err}");
                    FetchMsg::Failed(err.to_string())
                }
            };
            let _ = tx.send(msg);
        });
    }

    fn spawn_metadata_fetch(&mut self) {
        self.spawn(|client| {
            let indicators = client.fetch_indicators()?;
            let countries = client.fetch_countries()?;
            Ok(FetchMsg::Metadata {
                indicators,
                countries,
            })
        });
        self.spawn(|client| {
            Ok(FetchMsg::GlobalYears(
                client.fetch_year_range(&crate::api::YearQuery::Global)?,
            ))
        });
    }

    /// Current fetch parameters of a chart, for tagging requests and
    /// validating responses.
    pub(crate) fn point_params(&self, chart: ChartId) -> PointParams {
        let state = self.view.chart(chart);
        PointParams {
            x: state.x_index.clone(),
            y: state.y_index.clone(),
            mode: self.view.year_mode,
            year: match self.view.year_mode {
                YearMode::Exact => self.view.compare_year,
                _ => None,
            },
            size: state.size_index.clone(),
        }
    }

    /// Issue the data fetches a chart currently needs: its points, the
    /// locked full-history extent when missing, and the size-indicator
    /// extent when size modality is on.
    pub(crate) fn update_chart(&mut self, chart: ChartId) {
        if self.view.indicators.is_empty() {
            return;
        }
        if chart == ChartId::Secondary && !self.view.second_chart_active() {
            return;
        }
        let params = self.point_params(chart);
        // Exact mode without an established year: the year-range answer
        // clamps the slider and re-issues this update.
        if params.mode == YearMode::Exact && params.year.is_none() {
            return;
        }

        if params.mode == YearMode::Exact
            && self.view.locked_range(&self.view.range_key(chart)).is_none()
        {
            let key = self.view.range_key(chart);
            let (x, y) = (key.x.clone(), key.y.clone());
            self.spawn(move |client| {
                let all = client.fetch_points(&x, &y, None, None)?;
                let extents = axis_extents_of(&all);
                Ok(FetchMsg::LockedExtent { key, extents })
            });
        }

        if let Some(size) = params.size.clone() {
            let need = self
                .charts
                .get(&chart)
                .is_some_and(|d| d.size_domain.is_none());
            if need {
                let index = size.clone();
                self.spawn(move |client| {
                    let range = client.fetch_index_extent(&index, None)?;
                    Ok(FetchMsg::SizeExtent {
                        chart,
                        index,
                        range,
                    })
                });
            }
        }

        if let Some(data) = self.charts.get_mut(&chart) {
            data.loading = true;
        }
        let request = params.clone();
        self.spawn(move |client| {
            let fetched = match request.mode {
                YearMode::Exact => {
                    client.fetch_points(&request.x, &request.y, request.year, request.size.as_deref())?
                }
                _ => client.fetch_points(&request.x, &request.y, None, request.size.as_deref())?,
            };
            let points = if request.mode == YearMode::Averaged {
                crate::filter::average_across_years(&fetched)
            } else {
                fetched
            };
            Ok(FetchMsg::Points {
                chart,
                params: request,
                points,
            })
        });
    }

    /// Refresh the year span of a chart's axis pair, then both charts
    /// (a clamped year affects them both).
    pub(crate) fn update_pair_years(&mut self, chart: ChartId) {
        let state = self.view.chart(chart);
        let (x, y) = (state.x_index.clone(), state.y_index.clone());
        let (qx, qy) = (x.clone(), y.clone());
        self.spawn(move |client| {
            let range = client.fetch_year_range(&crate::api::YearQuery::Pair { x: qx, y: qy })?;
            Ok(FetchMsg::PairYears { chart, x, y, range })
        });
    }

    pub(crate) fn ensure_shapes(&mut self) {
        if self.shapes_requested {
            return;
        }
        self.shapes_requested = true;
        self.spawn(|client| Ok(FetchMsg::Shapes(client.fetch_world_shapes()?)));
    }

    /// Drain the channel and apply every result that is still current.
    fn poll_fetches(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                FetchMsg::Metadata {
                    indicators,
                    countries,
                } => {
                    info!(
                        "metadata loaded: {} indicators, {} countries",
                        indicators.len(),
                        countries.len()
                    );
                    self.view.set_metadata(indicators, countries);
                    self.initial_pending.remove("metadata");
                    self.initial_pending.insert("chart-primary");
                    table::init_table_state(self);
                    timeline::init_timeline_state(self);
                    self.update_pair_years(ChartId::Primary);
                    self.update_chart(ChartId::Primary);
                    if self.view.second_chart_enabled {
                        self.view.second_chart_initialized = true;
                        self.initial_pending.insert("chart-secondary");
                        self.update_pair_years(ChartId::Secondary);
                        self.update_chart(ChartId::Secondary);
                    }
                    self.spawn(|client| Ok(FetchMsg::RawYears(client.fetch_raw_years()?)));
                }
                FetchMsg::GlobalYears(range) => {
                    self.view.global_years = range;
                    if self.view.clamp_compare_year().is_some() {
                        self.update_chart(ChartId::Primary);
                        if self.view.second_chart_active() {
                            self.update_chart(ChartId::Secondary);
                        }
                    }
                }
                FetchMsg::PairYears { chart, x, y, range } => {
                    // stale if the chart moved on to other axes
                    let state = self.view.chart(chart);
                    if state.x_index != x || state.y_index != y {
                        continue;
                    }
                    if range.bounds().is_some() {
                        self.view.pair_years.insert(chart, range);
                        self.view.clamp_compare_year();
                        self.update_chart(ChartId::Primary);
                        if self.view.second_chart_active() {
                            self.update_chart(ChartId::Secondary);
                        }
                    }
                }
                FetchMsg::Points {
                    chart,
                    params,
                    points,
                } => {
                    // the staleness check: apply only if the request
                    // still describes what the chart wants
                    if params != self.point_params(chart) {
                        continue;
                    }
                    self.initial_pending.remove(match chart {
                        ChartId::Primary => "chart-primary",
                        ChartId::Secondary => "chart-secondary",
                    });
                    if let Some(data) = self.charts.get_mut(&chart) {
                        data.points = points;
                        data.params = Some(params);
                        data.loading = false;
                    }
                }
                FetchMsg::LockedExtent { key, extents } => {
                    if key != self.view.range_key(key.chart) {
                        continue;
                    }
                    if let Some(extents) = extents {
                        self.view.store_locked_range(key, extents);
                    }
                }
                FetchMsg::SizeExtent {
                    chart,
                    index,
                    range,
                } => {
                    if self.view.chart(chart).size_index.as_deref() != Some(index.as_str()) {
                        continue;
                    }
                    if let Some(data) = self.charts.get_mut(&chart) {
                        data.size_domain = range.bounds();
                    }
                }
                FetchMsg::RawYears(years) => {
                    self.view.table.available_years = years.clone();
                    self.view.map.available_years = years;
                    table::clamp_table_year(self);
                    map::clamp_map_year(self);
                }
                FetchMsg::TableYearRange { indexes, range } => {
                    let current: Vec<String> = self
                        .view
                        .table
                        .indexes
                        .selected
                        .iter()
                        .cloned()
                        .collect();
                    if current != indexes {
                        continue;
                    }
                    self.view.table.year_range = Some(range);
                    table::clamp_table_year(self);
                    table::reload_rows(self);
                }
                FetchMsg::RawRows { year, rows } => {
                    if self.view.table.year != Some(year) {
                        continue;
                    }
                    self.raw_rows = rows;
                    self.raw_loading = false;
                }
                FetchMsg::TimeSeries {
                    countries,
                    indexes,
                    rows,
                } => {
                    let want_countries: Vec<String> = self
                        .view
                        .timeline
                        .countries
                        .selected
                        .iter()
                        .cloned()
                        .collect();
                    let want_indexes: Vec<String> = self
                        .view
                        .timeline
                        .indexes
                        .selected
                        .iter()
                        .cloned()
                        .collect();
                    if countries != want_countries || indexes != want_indexes {
                        continue;
                    }
                    self.timeline_rows = rows;
                    self.timeline_loading = false;
                }
                FetchMsg::MapYearRange { index, range } => {
                    if self.view.map.index.as_deref() != Some(index.as_str()) {
                        continue;
                    }
                    self.view.map.year_range = Some(range);
                    map::clamp_map_year(self);
                    map::reload_map_rows(self);
                }
                FetchMsg::MapExtent {
                    index,
                    continent,
                    range,
                } => {
                    if self.view.map.index.as_deref() != Some(index.as_str())
                        || self.view.map.continent != continent
                    {
                        continue;
                    }
                    self.view.map.color_domain = range.bounds();
                }
                FetchMsg::MapRows { year, rows } => {
                    if self.view.map.year != Some(year) {
                        continue;
                    }
                    self.map_rows = rows;
                }
                FetchMsg::Shapes(shapes) => {
                    info!("world shapes loaded: {}", shapes.len());
                    self.shapes = shapes;
                }
                FetchMsg::Failed(message) => {
                    // keep last good data visible; just surface the line
                    self.status_line = Some(message);
                    self.raw_loading = false;
                    self.timeline_loading = false;
                    for data in self.charts.values_mut() {
                        data.loading = false;
                    }
                    self.initial_pending.clear();
                }
            }
        }
    }

    fn anything_loading(&self) -> bool {
        !self.initial_pending.is_empty()
            || self.raw_loading
            || self.timeline_loading
            || self.charts.values().any(|d| d.loading)
    }

    /// Debounced responsive-layout check; materializes the second chart
    /// the first time the viewport is wide enough.
    fn check_layout(&mut self, ctx: &egui::Context) {
        let width = ctx.screen_rect().width();
        let now = ctx.input(|i| i.time);
        if (width - self.last_width).abs() > 0.5 {
            self.last_width = width;
            self.width_settle_at = Some(now + RESIZE_DEBOUNCE);
        }
        if let Some(at) = self.width_settle_at
            && now >= at
        {
            self.width_settle_at = None;
            self.view.update_layout_width(width);
            if self.view.second_chart_enabled
                && !self.view.second_chart_initialized
                && !self.view.indicators.is_empty()
            {
                self.view.second_chart_initialized = true;
                self.update_pair_years(ChartId::Secondary);
                self.update_chart(ChartId::Secondary);
            }
        }
    }
}

/// Min/max of both point fields; `None` for an empty set.
fn axis_extents_of(points: &[DataPoint]) -> Option<AxisExtents> {
    if points.is_empty() {
        return None;
    }
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    for p in points {
        x[0] = x[0].min(p.x_value);
        x[1] = x[1].max(p.x_value);
        y[0] = y[0].min(p.y_value);
        y[1] = y[1].max(p.y_value);
    }
    Some(AxisExtents {
        x_extent: x,
        y_extent: y,
    })
}

impl eframe::App for WorldStatsApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("active_tab", self.tab.storage_key().to_string());
        storage.set_string(
            "theme",
            if self.dark_mode { "dark" } else { "light" }.to_string(),
        );
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        self.poll_fetches();
        self.check_layout(ctx);
        if self.anything_loading() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("World Statistics Dashboard");
                ui.separator();
                for (tab, label) in [
                    (Tab::Compare, "Compare"),
                    (Tab::Timeline, "Timeline"),
                    (Tab::Map, "Map"),
                    (Tab::RawData, "Raw Data"),
                ] {
                    if ui.selectable_label(self.tab == tab, label).clicked() {
                        self.tab = tab;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let icon = if self.dark_mode { "☀" } else { "🌙" };
                    if ui.button(icon).on_hover_text("Toggle theme").clicked() {
                        self.dark_mode = !self.dark_mode;
                    }
                    if ui
                        .button("⬇ CSV")
                        .on_hover_text("Download the filtered table")
                        .clicked()
                    {
                        table::download_csv(self);
                    }
                    if self.anything_loading() {
                        ui.spinner();
                    }
                });
            });
        });

        if let Some(status) = self.status_line.clone() {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::LIGHT_RED, &status);
                    if ui.small_button("✕").clicked() {
                        self.status_line = None;
                    }
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Compare => self.compare_tab(ui),
            Tab::Timeline => self.timeline_tab(ui),
            Tab::Map => self.map_tab(ui),
            Tab::RawData => self.table_tab(ui),
        });
    }
}
