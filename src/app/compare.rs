//! Compare tab: one or two square paired-indicator charts with axis
//! pickers, a shared year slider, and year-mode radios.

use crate::app::WorldStatsApp;
use crate::charts::gesture::GestureState;
use crate::charts::{ChartEvent, histogram, scatter};
use crate::state::{Axis, ChartId, ViewState, YearMode};
use crate::widgets::{self, OptionGroup, OptionItem, SelectChange};
use egui::{Rect, Vec2};

fn indicator_groups(view: &ViewState) -> Vec<OptionGroup> {
    view.indicators_by_category()
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
    pub(super) fn compare_tab(&mut self, ui: &mut egui::Ui) {
        self.year_controls(ui);
        ui.separator();

        let two_charts = self.view.second_chart_active();
        if two_charts {
            let available = ui.available_size();
            ui.columns(2, |columns| {
                let height = available.y;
                columns[0].set_min_height(height);
                columns[1].set_min_height(height);
                self.chart_panel(&mut columns[0], ChartId::Primary);
                self.chart_panel(&mut columns[1], ChartId::Secondary);
            });
        } else {
            self.chart_panel(ui, ChartId::Primary);
        }
    }

    fn year_controls(&mut self, ui: &mut egui::Ui) {
        let mut mode = self.view.year_mode;
        let mut mode_changed = false;
        let mut year_changed = false;

        ui.horizontal(|ui| {
            ui.label("Year:");
            mode_changed |= ui
                .radio_value(&mut mode, YearMode::Exact, "Select year")
                .changed();
            mode_changed |= ui
                .radio_value(&mut mode, YearMode::AllYears, "All years data")
                .changed();
            mode_changed |= ui
                .radio_value(&mut mode, YearMode::Averaged, "All years averaged")
                .changed();

            if let Some((lo, hi)) = self.view.compare_year_bounds() {
                let mut year = self.view.compare_year.unwrap_or(hi).clamp(lo, hi);
                let enabled = mode == YearMode::Exact;
                ui.add_enabled_ui(enabled, |ui| {
                    if ui
                        .add(egui::Slider::new(&mut year, lo..=hi).show_value(false))
                        .changed()
                    {
                        year_changed = true;
                    }
                    if ui
                        .add(egui::DragValue::new(&mut year).range(lo..=hi))
                        .changed()
                    {
                        year_changed = true;
                    }
                });
                if year_changed {
                    self.view.set_compare_year(year);
                }
            }
        });

        if mode_changed {
            self.view.set_year_mode(mode);
        }
        if mode_changed || year_changed {
            self.update_chart(ChartId::Primary);
            if self.view.second_chart_active() {
                self.update_chart(ChartId::Secondary);
            }
        }
    }

    fn chart_panel(&mut self, ui: &mut egui::Ui, chart: ChartId) {
        self.axis_pickers(ui, chart);

        // square plot with gutters for the axis labels and legend
        let available = ui.available_size();
        let margins = Vec2::new(70.0 + 20.0, 30.0 + 55.0);
        let side = (available.x - margins.x)
            .min(available.y - margins.y)
            .max(100.0);
        let (outer, _) = ui.allocate_exact_size(
            Vec2::new(side + margins.x, side + margins.y),
            egui::Sense::hover(),
        );
        let plot_rect = Rect::from_min_size(
            outer.min + Vec2::new(70.0, 30.0),
            Vec2::new(side, side),
        );

        let all_years = self.view.year_mode == YearMode::AllYears;
        let averaged = self.view.year_mode == YearMode::Averaged;
        let state = self.view.chart(chart).clone();
        let fixed = (self.view.year_mode == YearMode::Exact)
            .then(|| self.view.locked_range(&self.view.range_key(chart)))
            .flatten();

        let mut events: Vec<ChartEvent>;
        {
            let Self {
                view,
                charts,
                gestures,
                ..
            } = self;
            let data = charts.get(&chart).expect("chart data exists");
            let gesture = gestures.get_mut(&chart).expect("gesture state exists");

            if data.points.is_empty() {
                ui.painter().text(
                    plot_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No data available",
                    egui::FontId::proportional(14.0),
                    ui.visuals().weak_text_color(),
                );
                return;
            }

            let continent_of = |code: &str| view.continent_of(code).map(str::to_string);
            let country_label_of = |code: &str| view.country_label(code);
            let x_label = view.indicator_label(&state.x_index);
            let y_label = view.indicator_label(&state.y_index);

            if state.is_histogram() {
                let input = histogram::HistogramInput {
                    size: (plot_rect.width(), plot_rect.height()),
                    data: &data.points,
                    fixed_extent: fixed.map(|e| e.x_extent),
                    hidden_continents: &state.hidden_continents,
                };
                let scene = histogram::layout_histogram(&input, &continent_of);
                let hview = histogram::HistogramView {
                    label: &x_label,
                    all_years,
                    averaged,
                    country_label_of: &country_label_of,
                    continent_of: &continent_of,
                };
                events = histogram::show(
                    ui,
                    plot_rect,
                    &scene,
                    &hview,
                    &state.hidden_continents,
                );
            } else {
                let input = scatter::ScatterInput {
                    size: (plot_rect.width(), plot_rect.height()),
                    data: &data.points,
                    fixed_extents: fixed,
                    zoom: state.active_zoom(),
                    size_domain: state
                        .size_index
                        .as_ref()
                        .and_then(|_| data.size_domain),
                    hidden_continents: &state.hidden_continents,
                    all_years,
                    compact: plot_rect.width() < 420.0,
                };
                let scene = scatter::layout_scatter(&input, &continent_of);
                let size_label = state
                    .size_index
                    .as_ref()
                    .map(|id| view.indicator_label(id));
                let sview = scatter::ScatterView {
                    x_label: &x_label,
                    y_label: &y_label,
                    size_label: size_label.as_deref(),
                    all_years,
                    averaged,
                    country_label_of: &country_label_of,
                };
                events = scatter::show(
                    ui,
                    plot_rect,
                    &scene,
                    &sview,
                    &state.hidden_continents,
                    gesture,
                );
            }
        }

        // reset-zoom affordance over the top-right plot corner
        if self.view.chart(chart).is_zoomed() {
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
                    self.view.commit_zoom(chart, x_domain, y_domain);
                }
                ChartEvent::ZoomReset => self.view.reset_zoom(chart),
                ChartEvent::ContinentToggled(continent) => {
                    self.view.toggle_continent(chart, &continent);
                }
            }
        }
    }

    fn axis_pickers(&mut self, ui: &mut egui::Ui, chart: ChartId) {
        let groups = indicator_groups(&self.view);
        let state = self.view.chart(chart).clone();
        let x_label = self.view.indicator_label(&state.x_index);
        let y_label = self.view.indicator_label(&state.y_index);
        let size_label = state
            .size_index
            .as_ref()
            .map(|id| self.view.indicator_label(id))
            .unwrap_or_else(|| "Disable size modality".to_string());

        let mut x_change = None;
        let mut y_change = None;
        let mut size_change = None;
        let mut swap = false;

        {
            let Self { pickers, .. } = self;
            let picker = pickers.get_mut(&chart).expect("picker state exists");
            let x_salt = format!("x-axis-{chart:?}");
            let y_salt = format!("y-axis-{chart:?}");
            let size_salt = format!("size-axis-{chart:?}");
            ui.horizontal(|ui| {
                ui.label("X:");
                x_change = widgets::searchable_select(
                    ui,
                    &x_salt,
                    &mut picker.x,
                    Some(&state.x_index),
                    &x_label,
                    &groups,
                    None,
                );
                if ui
                    .button("⇄")
                    .on_hover_text("Swap axes")
                    .clicked()
                {
                    swap = true;
                }
                ui.label("Y:");
                y_change = widgets::searchable_select(
                    ui,
                    &y_salt,
                    &mut picker.y,
                    Some(&state.y_index),
                    &y_label,
                    &groups,
                    None,
                );
                ui.label("Size:");
                size_change = widgets::searchable_select(
                    ui,
                    &size_salt,
                    &mut picker.size,
                    state.size_index.as_deref(),
                    &size_label,
                    &groups,
                    Some("Disable size modality"),
                );
            });
        }

        if swap {
            self.view.swap_axes(chart);
            self.update_pair_years(chart);
        }
        if let Some(SelectChange::Selected(id)) = x_change {
            self.view.set_axis(chart, Axis::X, &id);
            self.gestures.insert(chart, GestureState::new());
            self.update_pair_years(chart);
        }
        if let Some(SelectChange::Selected(id)) = y_change {
            self.view.set_axis(chart, Axis::Y, &id);
            self.gestures.insert(chart, GestureState::new());
            self.update_pair_years(chart);
        }
        match size_change {
            Some(SelectChange::Selected(id)) => {
                self.view.set_size_index(chart, Some(&id));
                if let Some(data) = self.charts.get_mut(&chart) {
                    data.size_domain = None;
                }
                self.update_chart(chart);
            }
            Some(SelectChange::Cleared) => {
                self.view.set_size_index(chart, None);
                if let Some(data) = self.charts.get_mut(&chart) {
                    data.size_domain = None;
                }
                self.update_chart(chart);
            }
            None => {}
        }
    }
}
