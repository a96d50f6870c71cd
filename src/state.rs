//! Process-wide view state for the dashboard.
//!
//! One [`ViewState`] is owned by the application and passed by reference
//! into tabs, widgets, and renderers; there are no module-level
//! singletons. Mutations are explicit methods and are never followed by
//! an implicit re-render — the mutator decides when to recompute the
//! filtered view, which keeps update ordering deterministic and
//! testable.
//!
//! The invalidation invariants live here:
//! - a stored zoom transform is valid only while it is bound to the
//!   chart's current axis pair; changing an axis deletes it,
//! - the locked-range cache is keyed by (chart, x, y) and an axis change
//!   drops the entry for the resulting tuple; year changes never touch
//!   either.

use crate::models::{CountryMeta, IndicatorMeta, YearRange};
use std::collections::{BTreeSet, HashMap};

/// Viewport width (logical pixels) above which the second compare chart
/// materializes.
pub const SECOND_CHART_MIN_WIDTH: f32 = 1201.0;

/// Identity of a compare-tab chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    Primary,
    Secondary,
}

/// Which axis of a chart a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// The user's current brush/pan view of a chart, bound to the axis pair
/// it was created under.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomTransform {
    pub x_domain: [f64; 2],
    pub y_domain: [f64; 2],
    pub bound_x: String,
    pub bound_y: String,
}

/// A plain domain pair for charts whose zoom is keyed externally
/// (timeline charts are keyed by indicator id).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainPair {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

/// Per-chart interactive state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartViewState {
    pub x_index: String,
    pub y_index: String,
    pub size_index: Option<String>,
    pub zoom: Option<ZoomTransform>,
    pub hidden_continents: BTreeSet<String>,
}

impl ChartViewState {
    pub fn new(x_index: &str, y_index: &str, size_index: Option<&str>) -> Self {
        Self {
            x_index: x_index.to_string(),
            y_index: y_index.to_string(),
            size_index: size_index.map(str::to_string),
            zoom: None,
            hidden_continents: BTreeSet::new(),
        }
    }

    /// The stored zoom, but only while it is bound to the current axes.
    pub fn active_zoom(&self) -> Option<&ZoomTransform> {
        self.zoom
            .as_ref()
            .filter(|z| z.bound_x == self.x_index && z.bound_y == self.y_index)
    }

    pub fn is_zoomed(&self) -> bool {
        self.active_zoom().is_some()
    }

    /// Single-variable view: identical axes switch the renderer to a
    /// histogram over the shared indicator.
    pub fn is_histogram(&self) -> bool {
        self.x_index == self.y_index
    }
}

/// Structured key of the locked-range cache. One entry per
/// (chart, x-index, y-index) tuple — never a formatted string, so two
/// tuples cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeKey {
    pub chart: ChartId,
    pub x: String,
    pub y: String,
}

/// Full-history extents backing a locked axis range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisExtents {
    pub x_extent: [f64; 2],
    pub y_extent: [f64; 2],
}

/// Year selection mode of the compare tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearMode {
    #[default]
    Exact,
    AllYears,
    Averaged,
}

/// Ordered available ids plus the selected subset, for one filterable
/// dimension (continents, countries, indicators).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub available: Vec<String>,
    pub selected: BTreeSet<String>,
}

impl SelectionState {
    pub fn new(available: Vec<String>) -> Self {
        Self {
            available,
            selected: BTreeSet::new(),
        }
    }

    pub fn with_all_selected(available: Vec<String>) -> Self {
        let selected = available.iter().cloned().collect();
        Self {
            available,
            selected,
        }
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) && self.available.iter().any(|a| a == id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.available.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Select only ids that are actually available (selected ⊆ available).
    pub fn select_many<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            if self.available.iter().any(|a| a == id) {
                self.selected.insert(id.to_string());
            }
        }
    }

    pub fn deselect_many<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.selected.remove(id);
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// True when every available id is selected — rendered as the
    /// aggregate "All" tag. An untouched, default-all selection is not
    /// distinguished from a deselect-then-reselect-everything sequence.
    pub fn all_selected(&self) -> bool {
        !self.available.is_empty() && self.selected.len() == self.available.len()
    }
}

/// Sort direction of the raw-data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Raw-data tab state: filters, ordering, and the year slider.
#[derive(Debug, Clone, Default)]
pub struct TableState {
    pub continents: SelectionState,
    pub countries: SelectionState,
    pub indexes: SelectionState,
    /// Continent groups currently collapsed in the country picker.
    pub collapsed_groups: BTreeSet<String>,
    pub sort_column: String,
    pub sort_ascending: bool,
    /// Column ids in display order: rank, name, continent, then one per
    /// indicator. Only indicator columns are reorderable.
    pub column_order: Vec<String>,
    pub year: Option<i32>,
    pub available_years: Vec<i32>,
    /// Year span where at least one selected indicator has data.
    pub year_range: Option<YearRange>,
    pub initialized: bool,
}

pub const COL_RANK: &str = "rank";
pub const COL_NAME: &str = "country_name";
pub const COL_CONTINENT: &str = "continent";

/// Timeline tab state.
#[derive(Debug, Clone, Default)]
pub struct TimelineState {
    pub countries: SelectionState,
    pub indexes: SelectionState,
    pub collapsed_groups: BTreeSet<String>,
    /// Zoom per indicator chart; cleared whenever the selection changes.
    pub zoom: HashMap<String, DomainPair>,
    pub initialized: bool,
}

/// Map tab state.
#[derive(Debug, Clone, Default)]
pub struct MapState {
    pub index: Option<String>,
    /// `"all"` or a continent name.
    pub continent: String,
    pub year: Option<i32>,
    pub available_years: Vec<i32>,
    pub year_range: Option<YearRange>,
    /// Global color domain for the active (index, continent); recomputed
    /// only when either changes so colors stay stable across years.
    pub color_domain: Option<(f64, f64)>,
    pub initialized: bool,
}

/// The injectable, session-lifetime store behind every tab.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub indicators: Vec<IndicatorMeta>,
    pub countries: Vec<CountryMeta>,
    continent_by_country: HashMap<String, String>,
    label_by_country: HashMap<String, String>,

    charts: HashMap<ChartId, ChartViewState>,
    locked_ranges: HashMap<RangeKey, AxisExtents>,

    pub compare_year: Option<i32>,
    pub year_mode: YearMode,
    /// Full dataset span, the slider fallback.
    pub global_years: YearRange,
    /// Per-chart span of the selected axis pair.
    pub pair_years: HashMap<ChartId, YearRange>,

    pub second_chart_enabled: bool,
    pub second_chart_initialized: bool,

    pub table: TableState,
    pub timeline: TimelineState,
    pub map: MapState,
}

impl ViewState {
    pub fn new() -> Self {
        let mut charts = HashMap::new();
        charts.insert(
            ChartId::Primary,
            ChartViewState::new("democracy_index", "corruption", Some("population")),
        );
        charts.insert(
            ChartId::Secondary,
            ChartViewState::new("hdi", "fertility", None),
        );
        Self {
            charts,
            map: MapState {
                continent: "all".to_string(),
                ..MapState::default()
            },
            ..Self::default()
        }
    }

    /// Install the metadata loaded once at startup and derive the lookup
    /// maps and default selections.
    pub fn set_metadata(&mut self, indicators: Vec<IndicatorMeta>, countries: Vec<CountryMeta>) {
        self.continent_by_country = countries
            .iter()
            .filter(|c| !c.continent.is_empty())
            .map(|c| (c.code.clone(), c.continent.clone()))
            .collect();
        self.label_by_country = countries
            .iter()
            .map(|c| (c.code.clone(), c.label()))
            .collect();
        self.indicators = indicators;
        self.countries = countries;
        // keep default axes that don't exist in this dataset from
        // lingering in selectors
        for chart in self.charts.values_mut() {
            if !self.indicators.iter().any(|i| i.id == chart.x_index)
                && let Some(first) = self.indicators.first()
            {
                chart.x_index = first.id.clone();
            }
            if !self.indicators.iter().any(|i| i.id == chart.y_index)
                && let Some(second) = self.indicators.get(1).or(self.indicators.first())
            {
                chart.y_index = second.id.clone();
            }
            if let Some(size) = &chart.size_index
                && !self.indicators.iter().any(|i| i.id == *size)
            {
                chart.size_index = None;
            }
        }
    }

    pub fn indicator(&self, id: &str) -> Option<&IndicatorMeta> {
        self.indicators.iter().find(|i| i.id == id)
    }

    /// Selector label for an indicator id; falls back to the id itself.
    pub fn indicator_label(&self, id: &str) -> String {
        self.indicator(id)
            .map(|i| i.display_label())
            .unwrap_or_else(|| id.to_string())
    }

    /// Indicators grouped by category, categories in first-seen order.
    pub fn indicators_by_category(&self) -> Vec<(String, Vec<&IndicatorMeta>)> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&IndicatorMeta>> = HashMap::new();
        for indicator in &self.indicators {
            if !groups.contains_key(&indicator.category) {
                order.push(indicator.category.clone());
            }
            groups
                .entry(indicator.category.clone())
                .or_default()
                .push(indicator);
        }
        order
            .into_iter()
            .map(|category| {
                let members = groups.remove(&category).unwrap_or_default();
                (category, members)
            })
            .collect()
    }

    pub fn country_label(&self, code: &str) -> String {
        self.label_by_country
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn continent_of(&self, code: &str) -> Option<&str> {
        self.continent_by_country.get(code).map(String::as_str)
    }

    pub fn chart(&self, id: ChartId) -> &ChartViewState {
        &self.charts[&id]
    }

    fn chart_mut(&mut self, id: ChartId) -> &mut ChartViewState {
        self.charts.get_mut(&id).expect("chart state exists")
    }

    /// Change one axis of a chart. Invalidates the chart's zoom transform
    /// and the locked-range cache entry for the resulting axis pair, so
    /// the range is recomputed for the new combination.
    pub fn set_axis(&mut self, id: ChartId, axis: Axis, index_id: &str) {
        let chart = self.chart_mut(id);
        let target = match axis {
            Axis::X => &mut chart.x_index,
            Axis::Y => &mut chart.y_index,
        };
        if *target == index_id {
            return;
        }
        *target = index_id.to_string();
        chart.zoom = None;
        let key = RangeKey {
            chart: id,
            x: chart.x_index.clone(),
            y: chart.y_index.clone(),
        };
        self.locked_ranges.remove(&key);
    }

    /// Swap a chart's axes. Clears the zoom (it was bound to the old
    /// orientation); the locked-range cache is keyed by the new pair and
    /// fills lazily.
    pub fn swap_axes(&mut self, id: ChartId) {
        let chart = self.chart_mut(id);
        std::mem::swap(&mut chart.x_index, &mut chart.y_index);
        chart.zoom = None;
    }

    pub fn set_size_index(&mut self, id: ChartId, index_id: Option<&str>) {
        let normalized = index_id.filter(|s| !s.is_empty()).map(str::to_string);
        self.chart_mut(id).size_index = normalized;
    }

    /// Change the compare year. Preserves zoom transforms and the
    /// locked-range cache — keeping axes stable while scrubbing through
    /// years is the whole point of the locked range.
    pub fn set_compare_year(&mut self, year: i32) {
        self.compare_year = Some(year);
    }

    pub fn set_year_mode(&mut self, mode: YearMode) {
        self.year_mode = mode;
    }

    /// Store a brush or pan result, bound to the chart's current axes.
    pub fn commit_zoom(&mut self, id: ChartId, x_domain: [f64; 2], y_domain: [f64; 2]) {
        let chart = self.chart_mut(id);
        chart.zoom = Some(ZoomTransform {
            x_domain,
            y_domain,
            bound_x: chart.x_index.clone(),
            bound_y: chart.y_index.clone(),
        });
    }

    pub fn reset_zoom(&mut self, id: ChartId) {
        self.chart_mut(id).zoom = None;
    }

    pub fn toggle_continent(&mut self, id: ChartId, continent: &str) {
        let hidden = &mut self.chart_mut(id).hidden_continents;
        if !hidden.remove(continent) {
            hidden.insert(continent.to_string());
        }
    }

    pub fn clear_hidden_continents(&mut self, id: ChartId) {
        self.chart_mut(id).hidden_continents.clear();
    }

    /// Locked-range key for a chart's current axis pair.
    pub fn range_key(&self, id: ChartId) -> RangeKey {
        let chart = self.chart(id);
        RangeKey {
            chart: id,
            x: chart.x_index.clone(),
            y: chart.y_index.clone(),
        }
    }

    pub fn locked_range(&self, key: &RangeKey) -> Option<AxisExtents> {
        self.locked_ranges.get(key).copied()
    }

    pub fn store_locked_range(&mut self, key: RangeKey, extents: AxisExtents) {
        self.locked_ranges.insert(key, extents);
    }

    /// Slider bounds for the compare tab: union of both charts' pair
    /// ranges, falling back to the dataset span.
    pub fn compare_year_bounds(&self) -> Option<(i32, i32)> {
        let pair_bounds: Vec<(i32, i32)> = self
            .pair_years
            .values()
            .filter_map(YearRange::bounds)
            .collect();
        if pair_bounds.is_empty() {
            return self.global_years.bounds();
        }
        let lo = pair_bounds.iter().map(|b| b.0).min()?;
        let hi = pair_bounds.iter().map(|b| b.1).max()?;
        Some((lo, hi))
    }

    /// Clamp the current year into the slider bounds, defaulting to the
    /// newest year. Returns the effective year.
    pub fn clamp_compare_year(&mut self) -> Option<i32> {
        let (lo, hi) = self.compare_year_bounds()?;
        let year = match self.compare_year {
            Some(y) if (lo..=hi).contains(&y) => y,
            _ => hi,
        };
        self.compare_year = Some(year);
        Some(year)
    }

    /// Apply the responsive layout rule; the second chart only
    /// materializes above the width threshold. Once initialized it stays
    /// initialized — only its updates pause while the viewport is
    /// narrow.
    pub fn update_layout_width(&mut self, width: f32) {
        self.second_chart_enabled = width >= SECOND_CHART_MIN_WIDTH;
    }

    pub fn second_chart_active(&self) -> bool {
        self.second_chart_enabled && self.second_chart_initialized
    }
}
