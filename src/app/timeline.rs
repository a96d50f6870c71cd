//! Timeline tab: one zoomable line chart per selected indicator,
//! multi-country.

use crate::app::{FetchMsg, WorldStatsApp};
use crate::charts::gesture::GestureState;
use crate::charts::{ChartEvent, country_color, line};
use crate::state::DomainPair;
use crate::widgets::{self, OptionGroup, OptionItem};
use egui::{Rect, Vec2};
use std::collections::BTreeSet;

const DEFAULT_COUNTRIES: [&str; 4] = ["POL", "DEU", "GBR", "JPN"];
const DEFAULT_INDEXES: [&str; 3] = ["gdp_ppp", "life_satisfaction_index", "press_freedom"];

/// Seed the timeline selections once metadata is in.
pub(super) fn init_timeline_state(app: &mut WorldStatsApp) {
    let timeline = &mut app.view.timeline;
    timeline.countries = crate::state::SelectionState::new(
        app.view
            .countries
            .iter()
            .map(|c| c.code.clone())
            .collect(),
    );
    timeline
        .countries
        .select_many(DEFAULT_COUNTRIES.iter().copied());
    timeline.indexes = crate::state::SelectionState::new(
        app.view.indicators.iter().map(|i| i.id.clone()).collect(),
    );
    timeline.indexes.select_many(DEFAULT_INDEXES.iter().copied());
    timeline.collapsed_groups = app
        .view
        .countries
        .iter()
        .map(|c| {
            if c.continent.is_empty() {
                "Other".to_string()
            } else {
                c.continent.clone()
            }
        })
        .collect();
    timeline.initialized = true;
    reload_timeline(app);
}

/// Selection changed: clear per-chart zooms and refetch the series.
pub(super) fn reload_timeline(app: &mut WorldStatsApp) {
    app.view.timeline.zoom.clear();
    app.timeline_gestures.clear();

    let countries: Vec<String> = app.view.timeline.countries.selected.iter().cloned().collect();
    let indexes: Vec<String> = app.view.timeline.indexes.selected.iter().cloned().collect();
    if countries.is_empty() || indexes.is_empty() {
        app.timeline_rows.clear();
        return;
    }
    app.timeline_loading = true;
    app.spawn(move |client| {
        let rows = client.fetch_time_series(&countries, &indexes)?;
        Ok(FetchMsg::TimeSeries {
            countries,
            indexes,
            rows,
        })
    });
}

fn country_groups(app: &WorldStatsApp) -> Vec<OptionGroup> {
    // countries grouped by continent, groups alphabetical, members
    // sorted by name
    let mut names: Vec<String> = app
        .view
        .countries
        .iter()
        .map(|c| {
            if c.continent.is_empty() {
                "Other".to_string()
            } else {
                c.continent.clone()
            }
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    names.sort();
    names
        .into_iter()
        .map(|continent| {
            let mut members: Vec<&crate::models::CountryMeta> = app
                .view
                .countries
                .iter()
                .filter(|c| {
                    let group = if c.continent.is_empty() {
                        "Other"
                    } else {
                        c.continent.as_str()
                    };
                    group == continent
                })
                .collect();
            members.sort_by(|a, b| a.name.cmp(&b.name));
            OptionGroup {
                name: continent,
                items: members
                    .iter()
                    .map(|c| OptionItem::with_code(&c.code, &c.label()))
                    .collect(),
            }
        })
        .collect()
}

fn indicator_groups(app: &WorldStatsApp) -> Vec<OptionGroup> {
    app.view
        .indicators_by_category()
        .into_iter()
        .map(|(category, indicators)| OptionGroup {
            name: category,
            items: indicators
                .iter()
                .map(|i| OptionItem::new(&i.id, &i.display_label()))
                .collect(),
        })
        .collect()
}

impl WorldStatsApp {
    pub(super) fn timeline_tab(&mut self, ui: &mut egui::Ui) {
        let countries_groups = country_groups(self);
        let indexes_groups = indicator_groups(self);

        let mut country_events = Vec::new();
        let mut index_events = Vec::new();
        {
            let Self {
                view,
                timeline_country_ui,
                timeline_indexes_ui,
                ..
            } = self;
            ui.horizontal(|ui| {
                ui.label("Countries:");
                let label_of = {
                    let view = &*view;
                    move |code: &str| view.country_label(code)
                };
                country_events = widgets::multiselect(
                    ui,
                    "timeline-countries",
                    timeline_country_ui,
                    &view.timeline.countries,
                    &countries_groups,
                    &view.timeline.collapsed_groups,
                    true,
                    "All countries",
                    &label_of,
                );
                ui.separator();
                ui.label("Indicators:");
                let index_label_of = {
                    let view = &*view;
                    move |id: &str| view.indicator_label(id)
                };
                index_events = widgets::multiselect(
                    ui,
                    "timeline-indexes",
                    timeline_indexes_ui,
                    &view.timeline.indexes,
                    &indexes_groups,
                    &BTreeSet::new(),
                    false,
                    "All indicators",
                    &index_label_of,
                );
            });
        }

        let timeline = &mut self.view.timeline;
        let countries_changed = widgets::apply_events(
            &mut timeline.countries,
            &mut timeline.collapsed_groups,
            &country_events,
        );
        let mut scratch = BTreeSet::new();
        let indexes_changed =
            widgets::apply_events(&mut timeline.indexes, &mut scratch, &index_events);
        if countries_changed || indexes_changed {
            reload_timeline(self);
        }

        ui.separator();

        if self.view.timeline.countries.selected.is_empty()
            || self.view.timeline.indexes.selected.is_empty()
        {
            ui.centered_and_justified(|ui| {
                ui.weak("Select countries and indicators to display");
            });
            return;
        }
        if self.timeline_rows.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.weak(if self.timeline_loading {
                    "Loading data…"
                } else {
                    "No data available"
                });
            });
            return;
        }

        // stable country ordering and colors follow the selection order
        let selected_countries: Vec<String> = self
            .view
            .timeline
            .countries
            .selected
            .iter()
            .cloned()
            .collect();
        let selected_indexes: Vec<String> = self
            .view
            .timeline
            .indexes
            .available
            .iter()
            .filter(|id| self.view.timeline.indexes.selected.contains(*id))
            .cloned()
            .collect();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for index_id in &selected_indexes {
                self.timeline_chart(ui, index_id, &selected_countries);
            }
        });
    }

    fn timeline_chart(&mut self, ui: &mut egui::Ui, index_id: &str, countries: &[String]) {
        let series: Vec<(String, egui::Color32, Vec<(i32, f64)>)> = countries
            .iter()
            .enumerate()
            .filter_map(|(position, code)| {
                let mut values: Vec<(i32, f64)> = self
                    .timeline_rows
                    .iter()
                    .filter(|row| row.country_code == *code)
                    .filter_map(|row| row.value(index_id).map(|v| (row.year, v)))
                    .collect();
                if values.is_empty() {
                    return None;
                }
                values.sort_by_key(|&(year, _)| year);
                Some((code.clone(), country_color(position), values))
            })
            .collect();
        if series.is_empty() {
            return;
        }

        ui.label(
            egui::RichText::new(self.view.indicator_label(index_id))
                .strong()
                .size(15.0),
        );

        let width = (ui.available_width() - 80.0).max(200.0);
        let height = 220.0f32;
        let (outer, _) = ui.allocate_exact_size(
            Vec2::new(width + 80.0, height + 45.0),
            egui::Sense::hover(),
        );
        let plot_rect = Rect::from_min_size(
            outer.min + Vec2::new(60.0, 8.0),
            Vec2::new(width, height),
        );

        let zoom = self.view.timeline.zoom.get(index_id).copied();
        let input = line::LineInput {
            size: (width, height),
            series: &series,
            zoom,
        };
        let scene = line::layout_line(&input);

        let mut events: Vec<ChartEvent>;
        {
            let Self {
                view,
                timeline_gestures,
                ..
            } = self;
            let gesture = timeline_gestures
                .entry(index_id.to_string())
                .or_insert_with(GestureState::new);
            let country_label_of = |code: &str| view.country_label(code);
            let lview = line::LineView {
                indicator: view.indicator(index_id),
                country_label_of: &country_label_of,
            };
            events = line::show(ui, plot_rect, &scene, &lview, gesture);
        }

        if zoom.is_some() {
            let button_rect = Rect::from_min_size(
                plot_rect.right_top() + Vec2::new(-88.0, 4.0),
                Vec2::new(84.0, 20.0),
            );
            if ui
                .put(button_rect, egui::Button::new("Reset Zoom").small())
                .clicked()
            {
                events.push(ChartEvent::ZoomReset);
            }
        }

        for event in events {
            match event {
                ChartEvent::ZoomCommitted { x_domain, y_domain }
                | ChartEvent::Panned { x_domain, y_domain } => {
                    self.view.timeline.zoom.insert(
                        index_id.to_string(),
                        DomainPair {
                            x: x_domain,
                            y: y_domain,
                        },
                    );
                }
                ChartEvent::ZoomReset => {
                    self.view.timeline.zoom.remove(index_id);
                }
                ChartEvent::ContinentToggled(_) => {}
            }
        }

        // legend below the chart when comparing countries
        if series.len() > 1 {
            ui.horizontal_wrapped(|ui| {
                for (code, color, _) in &series {
                    ui.colored_label(*color, "⏺");
                    ui.label(self.view.country_label(code));
                    ui.add_space(6.0);
                }
            });
        }
        ui.add_space(10.0);
    }
}
