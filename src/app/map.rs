//! Map tab: choropleth world map with index/continent selectors and a
//! year slider trimmed to the index's data availability.

use crate::app::{FetchMsg, WorldStatsApp};
use crate::charts::map as map_chart;
use crate::widgets::{self, OptionGroup, OptionItem, SelectChange};
use egui::{Rect, Vec2};
use std::collections::HashMap;

pub(super) fn clamp_map_year(app: &mut WorldStatsApp) {
    let years = &app.view.map.available_years;
    let Some((base_lo, base_hi)) = years
        .iter()
        .min()
        .copied()
        .zip(years.iter().max().copied())
    else {
        return;
    };
    let (lo, hi) = match app.view.map.year_range.and_then(|r| r.bounds()) {
        Some((lo, hi)) => (lo.max(base_lo), hi.min(base_hi)),
        None => (base_lo, base_hi),
    };
    let clamped = match app.view.map.year {
        Some(y) => y.clamp(lo, hi),
        None => hi,
    };
    if app.view.map.year != Some(clamped) {
        app.view.map.year = Some(clamped);
        reload_map_rows(app);
    }
}

pub(super) fn reload_map_rows(app: &mut WorldStatsApp) {
    let Some(year) = app.view.map.year else {
        return;
    };
    app.spawn(move |client| {
        Ok(FetchMsg::MapRows {
            year,
            rows: client.fetch_raw_rows(year)?,
        })
    });
}

/// Switch the displayed indicator: refreshes the year span and the
/// global color domain so coloring stays year-stable for the new index.
fn set_map_index(app: &mut WorldStatsApp, index_id: &str) {
    app.view.map.index = Some(index_id.to_string());
    app.view.map.color_domain = None;
    app.view.map.year_range = None;

    let index = index_id.to_string();
    app.spawn(move |client| {
        let range = client.fetch_year_range(&crate::api::YearQuery::Single(index.clone()))?;
        Ok(FetchMsg::MapYearRange { index, range })
    });
    request_color_domain(app);
    reload_map_rows(app);
}

fn set_map_continent(app: &mut WorldStatsApp, continent: &str) {
    app.view.map.continent = continent.to_string();
    app.view.map.color_domain = None;
    request_color_domain(app);
}

fn request_color_domain(app: &mut WorldStatsApp) {
    let Some(index) = app.view.map.index.clone() else {
        return;
    };
    let continent = app.view.map.continent.clone();
    app.spawn(move |client| {
        let filter = (continent != "all").then_some(continent.as_str());
        let range = client.fetch_index_extent(&index, filter)?;
        Ok(FetchMsg::MapExtent {
            index,
            continent,
            range,
        })
    });
}

impl WorldStatsApp {
    pub(super) fn map_tab(&mut self, ui: &mut egui::Ui) {
        if self.view.indicators.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.weak("Loading data…");
            });
            return;
        }
        if !self.view.map.initialized {
            self.view.map.initialized = true;
            self.ensure_shapes();
            let first = self.view.indicators[0].id.clone();
            set_map_index(self, &first);
        }

        let index_groups: Vec<OptionGroup> = self
            .view
            .indicators_by_category()
            .into_iter()
            .map(|(category, indicators)| OptionGroup {
                name: category,
                items: indicators
                    .iter()
                    .map(|i| OptionItem::new(&i.id, &i.display_label()))
                    .collect(),
            })
            .collect();

        let mut continents: Vec<String> = self
            .view
            .countries
            .iter()
            .filter(|c| !c.continent.is_empty())
            .map(|c| c.continent.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        continents.sort();
        let continent_groups = vec![OptionGroup {
            name: "Continents".to_string(),
            items: std::iter::once(OptionItem::new("all", "All continents"))
                .chain(continents.iter().map(|c| OptionItem::new(c, c)))
                .collect(),
        }];

        let current_index = self.view.map.index.clone();
        let index_label = current_index
            .as_deref()
            .map(|id| self.view.indicator_label(id))
            .unwrap_or_else(|| "Select indicator".to_string());
        let continent = self.view.map.continent.clone();
        let continent_label = if continent == "all" {
            "All continents".to_string()
        } else {
            continent.clone()
        };

        let mut index_change = None;
        let mut continent_change = None;
        let mut year_change = None;
        {
            let Self {
                view,
                map_index_ui,
                map_continent_ui,
                ..
            } = self;
            ui.horizontal(|ui| {
                ui.label("Indicator:");
                index_change = widgets::searchable_select(
                    ui,
                    "map-index",
                    map_index_ui,
                    current_index.as_deref(),
                    &index_label,
                    &index_groups,
                    None,
                );
                ui.separator();
                ui.label("Continent:");
                continent_change = widgets::searchable_select(
                    ui,
                    "map-continent",
                    map_continent_ui,
                    Some(&continent),
                    &continent_label,
                    &continent_groups,
                    None,
                );
                ui.separator();

                let years = &view.map.available_years;
                if let Some((base_lo, base_hi)) = years
                    .iter()
                    .min()
                    .copied()
                    .zip(years.iter().max().copied())
                {
                    let (lo, hi) = match view.map.year_range.and_then(|r| r.bounds()) {
                        Some((lo, hi)) => (lo.max(base_lo), hi.min(base_hi)),
                        None => (base_lo, base_hi),
                    };
                    let mut year = view.map.year.unwrap_or(hi).clamp(lo, hi);
                    ui.label("Year:");
                    let slider = ui.add(egui::Slider::new(&mut year, lo..=hi));
                    let drag = ui.add(egui::DragValue::new(&mut year).range(lo..=hi));
                    if slider.changed() || drag.changed() {
                        year_change = Some(year);
                    }
                }
            });
        }

        if let Some(SelectChange::Selected(id)) = index_change {
            set_map_index(self, &id);
        }
        if let Some(SelectChange::Selected(c)) = continent_change {
            set_map_continent(self, &c);
        }
        if let Some(year) = year_change {
            self.view.map.year = Some(year);
            reload_map_rows(self);
        }

        ui.separator();

        let Some(index_id) = self.view.map.index.clone() else {
            return;
        };
        if self.shapes.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.weak("No map data available");
            });
            return;
        }

        let values: HashMap<String, f64> = self
            .map_rows
            .iter()
            .filter_map(|row| row.value(&index_id).map(|v| (row.country_code.clone(), v)))
            .collect();

        let available = ui.available_size();
        let size = Vec2::new(available.x.max(300.0), (available.y - 8.0).max(240.0));
        let (outer, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let plot_rect = Rect::from_min_size(outer.min, size);

        // degrade to the loaded year's bounds while the global extent is
        // missing (narrower, but never a blank map)
        let color_domain = self.view.map.color_domain.or_else(|| {
            let lo = values.values().copied().fold(f64::INFINITY, f64::min);
            let hi = values.values().copied().fold(f64::NEG_INFINITY, f64::max);
            (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
        });

        let continent_filter = self.view.map.continent.clone();
        let input = map_chart::MapInput {
            size: (plot_rect.width(), plot_rect.height()),
            shapes: &self.shapes,
            values: &values,
            color_domain,
            continent: &continent_filter,
        };
        let view = &self.view;
        let continent_of = |code: &str| view.continent_of(code).map(str::to_string);
        let scene = map_chart::layout_map(&input, &continent_of);
        let country_label_of = |code: &str| view.country_label(code);
        let index_label = view.indicator_label(&index_id);
        let mview = map_chart::MapView {
            index_label: &index_label,
            country_label_of: &country_label_of,
        };
        map_chart::show(ui, plot_rect, &scene, &mview);
    }
}
