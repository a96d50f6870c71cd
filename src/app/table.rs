//! Raw Data tab: the sortable, reorderable indicator table.

use crate::app::{FetchMsg, WorldStatsApp};
use crate::format::format_cell;
use crate::models::RawRow;
use crate::state::{COL_CONTINENT, COL_NAME, COL_RANK, SelectionState};
use crate::widgets::{self, OptionGroup, OptionItem};
use log::info;
use std::collections::BTreeSet;

/// Combined row filter. Empty country or continent selection shows
/// nothing — an explicit policy, not a missing-data case.
pub fn filter_rows(
    rows: &[RawRow],
    countries: &BTreeSet<String>,
    continents: &BTreeSet<String>,
) -> Vec<RawRow> {
    let by_country = crate::filter::filter_by_country_selection(rows, countries);
    if continents.is_empty() {
        return Vec::new();
    }
    by_country
        .into_iter()
        .filter(|row| {
            row.continent
                .as_deref()
                .is_some_and(|c| continents.contains(c))
        })
        .collect()
}

/// Sort rows by a column; null values go last in both directions.
pub fn sort_rows(rows: &mut [RawRow], column: &str, ascending: bool) {
    rows.sort_by(|a, b| {
        let ordering = match column {
            COL_NAME => a
                .country_name
                .to_lowercase()
                .cmp(&b.country_name.to_lowercase()),
            COL_CONTINENT => a
                .continent
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .cmp(&b.continent.as_deref().unwrap_or("").to_lowercase()),
            "country_code" => a.country_code.cmp(&b.country_code),
            _ => {
                // numeric indicator column; nulls always sink to the end
                let va = a.value(column);
                let vb = b.value(column);
                return match (va, vb) {
                    (None, None) => std::cmp::Ordering::Equal,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (Some(x), Some(y)) => {
                        let cmp = x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal);
                        if ascending { cmp } else { cmp.reverse() }
                    }
                };
            }
        };
        if ascending { ordering } else { ordering.reverse() }
    });
}

/// Seed the table selections once metadata is in: everything selected,
/// continent groups collapsed, fixed columns ahead of the indicators.
pub(super) fn init_table_state(app: &mut WorldStatsApp) {
    let mut continents: Vec<String> = app
        .view
        .countries
        .iter()
        .filter(|c| !c.continent.is_empty())
        .map(|c| c.continent.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    continents.sort();

    let mut countries: Vec<&crate::models::CountryMeta> = app.view.countries.iter().collect();
    countries.sort_by(|a, b| a.name.cmp(&b.name));
    let country_codes: Vec<String> = countries.iter().map(|c| c.code.clone()).collect();

    let index_ids: Vec<String> = app.view.indicators.iter().map(|i| i.id.clone()).collect();

    let table = &mut app.view.table;
    table.collapsed_groups = continents.iter().cloned().collect();
    table.continents = SelectionState::with_all_selected(continents);
    table.countries = SelectionState::with_all_selected(country_codes);
    table.indexes = SelectionState::with_all_selected(index_ids.clone());
    table.column_order = {
        let mut order = vec![
            COL_RANK.to_string(),
            COL_NAME.to_string(),
            COL_CONTINENT.to_string(),
        ];
        order.extend(index_ids);
        order
    };
    table.sort_column = COL_NAME.to_string();
    table.sort_ascending = true;
    table.initialized = true;

    update_table_year_range(app);
}

/// Ask for the year span where at least one selected indicator has data.
pub(super) fn update_table_year_range(app: &mut WorldStatsApp) {
    let indexes: Vec<String> = app.view.table.indexes.selected.iter().cloned().collect();
    if indexes.is_empty() {
        app.view.table.year_range = None;
        return;
    }
    let request = indexes.clone();
    app.spawn(move |client| {
        let range = client.fetch_year_range(&crate::api::YearQuery::Many(request.clone()))?;
        Ok(FetchMsg::TableYearRange {
            indexes: request,
            range,
        })
    });
}

/// Slider bounds: available years trimmed to the selected indicators'
/// span when known.
pub(super) fn table_year_bounds(app: &WorldStatsApp) -> Option<(i32, i32)> {
    let years = &app.view.table.available_years;
    let base_lo = *years.iter().min()?;
    let base_hi = *years.iter().max()?;
    match app.view.table.year_range.and_then(|r| r.bounds()) {
        Some((lo, hi)) => Some((lo.max(base_lo), hi.min(base_hi))),
        None => Some((base_lo, base_hi)),
    }
}

pub(super) fn clamp_table_year(app: &mut WorldStatsApp) {
    let Some((lo, hi)) = table_year_bounds(app) else {
        return;
    };
    let clamped = match app.view.table.year {
        Some(y) => y.clamp(lo, hi),
        None => hi,
    };
    if app.view.table.year != Some(clamped) {
        app.view.table.year = Some(clamped);
        reload_rows(app);
    }
}

pub(super) fn reload_rows(app: &mut WorldStatsApp) {
    let Some(year) = app.view.table.year else {
        return;
    };
    // old data stays visible while the new year loads
    app.raw_loading = true;
    app.spawn(move |client| {
        Ok(FetchMsg::RawRows {
            year,
            rows: client.fetch_raw_rows(year)?,
        })
    });
}

/// Export the filtered table, columns in their current order.
pub(super) fn download_csv(app: &mut WorldStatsApp) {
    let table = &app.view.table;
    let mut rows = filter_rows(
        &app.raw_rows,
        &table.countries.selected,
        &table.continents.selected,
    );
    sort_rows(&mut rows, &table.sort_column, table.sort_ascending);
    let columns: Vec<String> = table
        .column_order
        .iter()
        .filter(|c| table.indexes.selected.contains(*c))
        .cloned()
        .collect();

    let default_name = format!(
        "world_stats_{}.csv",
        table.year.map(|y| y.to_string()).unwrap_or_default()
    );
    let start_dir = dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let Some(path) = rfd::FileDialog::new()
        .set_directory(start_dir)
        .set_file_name(default_name)
        .save_file()
    else {
        return;
    };
    match crate::storage::save_csv(&rows, &columns, &path) {
        Ok(()) => info!("saved {} rows to {}", rows.len(), path.display()),
        Err(err) => app.status_line = Some(format!("CSV export failed: {err}")),
    }
}

fn country_groups(app: &WorldStatsApp) -> Vec<OptionGroup> {
    let mut continents: Vec<String> = app
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
    continents.sort();
    continents
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

impl WorldStatsApp {
    pub(super) fn table_tab(&mut self, ui: &mut egui::Ui) {
        // year slider
        if let Some((lo, hi)) = table_year_bounds(self) {
            let mut year = self.view.table.year.unwrap_or(hi).clamp(lo, hi);
            ui.horizontal(|ui| {
                ui.label("Year:");
                let slider = ui.add(egui::Slider::new(&mut year, lo..=hi));
                let drag = ui.add(egui::DragValue::new(&mut year).range(lo..=hi));
                if slider.changed() || drag.changed() {
                    self.view.table.year = Some(year);
                    reload_rows(self);
                }
            });
        }

        // filter row
        let continent_items: Vec<OptionItem> = self
            .view
            .table
            .continents
            .available
            .iter()
            .map(|c| OptionItem::new(c, c))
            .collect();
        let country_group_list = country_groups(self);
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

        let mut continent_events = Vec::new();
        let mut country_events = Vec::new();
        let mut index_events = Vec::new();
        {
            let Self {
                view,
                table_continent_ui,
                table_country_ui,
                table_indexes_ui,
                ..
            } = self;
            ui.horizontal(|ui| {
                ui.label("Continent:");
                let identity = |id: &str| id.to_string();
                continent_events = widgets::multiselect_flat(
                    ui,
                    "table-continents",
                    table_continent_ui,
                    &view.table.continents,
                    &continent_items,
                    "All continents",
                    &identity,
                );
                ui.separator();
                ui.label("Country:");
                let country_label = {
                    let view = &*view;
                    move |code: &str| view.country_label(code)
                };
                country_events = widgets::multiselect(
                    ui,
                    "table-countries",
                    table_country_ui,
                    &view.table.countries,
                    &country_group_list,
                    &view.table.collapsed_groups,
                    true,
                    "All countries",
                    &country_label,
                );
                ui.separator();
                ui.label("Indicators:");
                let index_label = {
                    let view = &*view;
                    move |id: &str| view.indicator_label(id)
                };
                index_events = widgets::multiselect(
                    ui,
                    "table-indexes",
                    table_indexes_ui,
                    &view.table.indexes,
                    &index_groups,
                    &BTreeSet::new(),
                    false,
                    "All indicators",
                    &index_label,
                );
            });
        }

        let mut scratch = BTreeSet::new();
        let table = &mut self.view.table;
        widgets::apply_events(&mut table.continents, &mut scratch, &continent_events);
        widgets::apply_events(
            &mut table.countries,
            &mut table.collapsed_groups,
            &country_events,
        );
        let indexes_changed =
            widgets::apply_events(&mut table.indexes, &mut scratch, &index_events);
        if indexes_changed {
            update_table_year_range(self);
        }

        ui.separator();

        let table = &self.view.table;
        let mut rows = filter_rows(
            &self.raw_rows,
            &table.countries.selected,
            &table.continents.selected,
        );
        if rows.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.weak("No data available for selected filters");
            });
            return;
        }
        sort_rows(&mut rows, &table.sort_column, table.sort_ascending);

        let columns: Vec<String> = table
            .column_order
            .iter()
            .filter(|c| {
                matches!(c.as_str(), COL_RANK | COL_NAME | COL_CONTINENT)
                    || table.indexes.selected.contains(*c)
            })
            .cloned()
            .collect();

        let mut sort_request: Option<String> = None;
        let mut reorder: Option<(String, String)> = None; // (dragged, dropped-on)

        egui::ScrollArea::both().show(ui, |ui| {
            egui::Grid::new("raw-data-table")
                .striped(true)
                .min_col_width(70.0)
                .show(ui, |ui| {
                    for column in &columns {
                        self.table_header_cell(ui, column, &mut sort_request, &mut reorder);
                    }
                    ui.end_row();

                    for (rank, row) in rows.iter().enumerate() {
                        for column in &columns {
                            match column.as_str() {
                                COL_RANK => {
                                    ui.weak(format!("{}", rank + 1));
                                }
                                COL_NAME => {
                                    ui.label(if row.country_display_name.is_empty() {
                                        row.country_name.clone()
                                    } else {
                                        row.country_display_name.clone()
                                    });
                                }
                                COL_CONTINENT => {
                                    ui.label(row.continent.clone().unwrap_or_default());
                                }
                                index_id => {
                                    let decimals = self
                                        .view
                                        .indicator(index_id)
                                        .map(|i| i.decimals)
                                        .unwrap_or(2);
                                    let text = format_cell(row.value(index_id), decimals);
                                    if row.value(index_id).is_none() {
                                        ui.weak(text);
                                    } else {
                                        ui.monospace(text);
                                    }
                                }
                            }
                        }
                        ui.end_row();
                    }
                });
        });

        if let Some(column) = sort_request {
            let table = &mut self.view.table;
            if table.sort_column == column {
                table.sort_ascending = !table.sort_ascending;
            } else {
                table.sort_column = column;
                table.sort_ascending = true;
            }
        }
        if let Some((dragged, target)) = reorder {
            reorder_column(&mut self.view.table.column_order, &dragged, &target);
        }
    }

    fn table_header_cell(
        &self,
        ui: &mut egui::Ui,
        column: &str,
        sort_request: &mut Option<String>,
        reorder: &mut Option<(String, String)>,
    ) {
        let table = &self.view.table;
        let label = match column {
            COL_RANK => "#".to_string(),
            COL_NAME => "Country".to_string(),
            COL_CONTINENT => "Continent".to_string(),
            index_id => self.view.indicator_label(index_id),
        };
        let sort_marker = if table.sort_column == column {
            if table.sort_ascending { " ▲" } else { " ▼" }
        } else {
            ""
        };

        let is_index_column = !matches!(column, COL_RANK | COL_NAME | COL_CONTINENT);
        if is_index_column {
            // indicator headers are drag sources and drop targets for
            // column reordering, and click-to-sort
            let id = egui::Id::new(("table-col", column));
            let payload = column.to_string();
            let response = ui
                .dnd_drag_source(id, payload, |ui| {
                    ui.add(
                        egui::Button::new(
                            egui::RichText::new(format!("{label}{sort_marker}")).strong(),
                        )
                        .small(),
                    )
                })
                .response;
            if let Some(dragged) = response.dnd_release_payload::<String>()
                && dragged.as_str() != column
            {
                *reorder = Some(((*dragged).clone(), column.to_string()));
            }
            if response.clicked() {
                *sort_request = Some(column.to_string());
            }
        } else if column == COL_RANK {
            ui.label(egui::RichText::new(label).strong());
        } else if ui
            .add(egui::Button::new(egui::RichText::new(format!("{label}{sort_marker}")).strong()).small())
            .clicked()
        {
            *sort_request = Some(column.to_string());
        }
    }
}

/// Move `dragged` so it sits just before `target`. Only indicator
/// columns move; the fixed columns keep their places.
pub fn reorder_column(order: &mut Vec<String>, dragged: &str, target: &str) {
    let fixed = [COL_RANK, COL_NAME, COL_CONTINENT];
    if fixed.contains(&dragged) || fixed.contains(&target) {
        return;
    }
    let Some(from) = order.iter().position(|c| c == dragged) else {
        return;
    };
    let moved = order.remove(from);
    let Some(to) = order.iter().position(|c| c == target) else {
        order.insert(from, moved);
        return;
    };
    order.insert(to, moved);
}
