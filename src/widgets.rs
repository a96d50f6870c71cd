//! Generic selection widgets: grouped multiselects with tag rows and
//! searchable single-choice selects.
//!
//! Widgets never fetch data and never mutate shared state; they render
//! from a [`SelectionState`] and report [`WidgetEvent`]s. The owning tab
//! applies the events and runs its apply-selection → recompute → render
//! pipeline, so update ordering stays deterministic.

use crate::state::SelectionState;
use egui::{Align, Color32, Layout, RichText, ScrollArea, TextEdit};
use std::collections::BTreeSet;

/// One selectable option. `search_text` is precomputed lowercase label
/// (plus the code for countries) for substring matching.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionItem {
    pub id: String,
    pub label: String,
    pub search_text: String,
}

impl OptionItem {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            search_text: label.to_lowercase(),
        }
    }

    /// Countries match on the code too ("DEU" finds Germany).
    pub fn with_code(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            search_text: format!("{} {}", label.to_lowercase(), id.to_lowercase()),
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        query.is_empty() || self.search_text.contains(query)
    }
}

/// Options under one group header (category or continent).
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    pub name: String,
    pub items: Vec<OptionItem>,
}

/// Widget-local UI state (open flag, search text). Everything that other
/// components care about lives in [`SelectionState`] instead.
#[derive(Debug, Clone, Default)]
pub struct DropdownUi {
    pub open: bool,
    pub search: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Toggle(String),
    /// Select these ids (select-all over the currently visible subset,
    /// or one group's members).
    SelectMany(Vec<String>),
    ClearMany(Vec<String>),
    ToggleCollapse(String),
}

/// Tag row summarizing a selection: the aggregate label when everything
/// is selected, otherwise up to `max_tags` labels plus a "+N" overflow.
fn tag_row(
    ui: &mut egui::Ui,
    selection: &SelectionState,
    all_label: &str,
    label_of: &dyn Fn(&str) -> String,
    events: &mut Vec<WidgetEvent>,
) {
    const MAX_TAGS: usize = 3;
    if selection.selected.is_empty() {
        ui.weak("None selected");
        return;
    }
    if selection.all_selected() {
        ui.label(RichText::new(all_label).small());
        return;
    }
    // keep the available ordering, not the set ordering
    let selected: Vec<&String> = selection
        .available
        .iter()
        .filter(|id| selection.selected.contains(*id))
        .collect();
    for id in selected.iter().take(MAX_TAGS) {
        let text = RichText::new(format!("{} ✕", label_of(id))).small();
        if ui.small_button(text).clicked() {
            events.push(WidgetEvent::Toggle((*id).clone()));
        }
    }
    if selected.len() > MAX_TAGS {
        ui.label(RichText::new(format!("+{}", selected.len() - MAX_TAGS)).small());
    }
}

/// Grouped multiselect dropdown with search, per-group select/clear,
/// collapsible groups, and a select/unselect-all pair that acts on the
/// search-filtered subset.
#[allow(clippy::too_many_arguments)]
pub fn multiselect(
    ui: &mut egui::Ui,
    id_salt: &str,
    ui_state: &mut DropdownUi,
    selection: &SelectionState,
    groups: &[OptionGroup],
    collapsed: &BTreeSet<String>,
    collapsible: bool,
    all_label: &str,
    label_of: &dyn Fn(&str) -> String,
) -> Vec<WidgetEvent> {
    let mut events = Vec::new();

    ui.horizontal(|ui| {
        let button = ui.button(if ui_state.open { "▴" } else { "▾" });
        if button.clicked() {
            ui_state.open = !ui_state.open;
            ui_state.search.clear();
        }
        tag_row(ui, selection, all_label, label_of, &mut events);
    });

    if !ui_state.open {
        return events;
    }

    let frame = egui::Frame::popup(ui.style());
    frame.show(ui, |ui| {
        ui.set_min_width(260.0);
        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut ui_state.search)
                    .hint_text("Search…")
                    .desired_width(140.0),
            );
            let query = ui_state.search.to_lowercase();
            let visible: Vec<String> = groups
                .iter()
                .flat_map(|g| g.items.iter())
                .filter(|item| item.matches(&query))
                .map(|item| item.id.clone())
                .collect();
            if ui.small_button("Select all").clicked() {
                events.push(WidgetEvent::SelectMany(visible.clone()));
            }
            if ui.small_button("Unselect all").clicked() {
                events.push(WidgetEvent::ClearMany(visible));
            }
        });
        ui.separator();

        let query = ui_state.search.to_lowercase();
        ScrollArea::vertical()
            .id_salt(id_salt)
            .max_height(320.0)
            .show(ui, |ui| {
                let mut any_visible = false;
                for group in groups {
                    let visible_items: Vec<&OptionItem> =
                        group.items.iter().filter(|i| i.matches(&query)).collect();
                    if visible_items.is_empty() {
                        continue;
                    }
                    any_visible = true;
                    let selected_count = group
                        .items
                        .iter()
                        .filter(|i| selection.is_selected(&i.id))
                        .count();
                    let is_collapsed = collapsed.contains(&group.name) && query.is_empty();

                    ui.horizontal(|ui| {
                        if collapsible {
                            let arrow = if is_collapsed { "▸" } else { "▾" };
                            if ui.small_button(arrow).clicked() {
                                events.push(WidgetEvent::ToggleCollapse(group.name.clone()));
                            }
                        }
                        ui.label(
                            RichText::new(format!(
                                "{} ({selected_count}/{})",
                                group.name,
                                group.items.len()
                            ))
                            .strong(),
                        );
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            let ids: Vec<String> =
                                group.items.iter().map(|i| i.id.clone()).collect();
                            if ui.small_button("✓").on_hover_text("Select group").clicked() {
                                events.push(WidgetEvent::SelectMany(ids.clone()));
                            }
                            if ui.small_button("✗").on_hover_text("Clear group").clicked() {
                                events.push(WidgetEvent::ClearMany(ids));
                            }
                        });
                    });

                    if !is_collapsed {
                        for item in visible_items {
                            let mut checked = selection.is_selected(&item.id);
                            if ui.checkbox(&mut checked, &item.label).changed() {
                                events.push(WidgetEvent::Toggle(item.id.clone()));
                            }
                        }
                    }
                    ui.add_space(4.0);
                }
                if !any_visible {
                    ui.weak("No matches");
                }
            });
    });

    events
}

/// Flat (ungrouped) multiselect, used for the continent filter.
pub fn multiselect_flat(
    ui: &mut egui::Ui,
    id_salt: &str,
    ui_state: &mut DropdownUi,
    selection: &SelectionState,
    items: &[OptionItem],
    all_label: &str,
    label_of: &dyn Fn(&str) -> String,
) -> Vec<WidgetEvent> {
    let groups = [OptionGroup {
        name: String::new(),
        items: items.to_vec(),
    }];
    let mut events = Vec::new();

    ui.horizontal(|ui| {
        let button = ui.button(if ui_state.open { "▴" } else { "▾" });
        if button.clicked() {
            ui_state.open = !ui_state.open;
        }
        tag_row(ui, selection, all_label, label_of, &mut events);
    });
    if !ui_state.open {
        return events;
    }

    egui::Frame::popup(ui.style()).show(ui, |ui| {
        ui.set_min_width(200.0);
        ScrollArea::vertical()
            .id_salt(id_salt)
            .max_height(260.0)
            .show(ui, |ui| {
                for item in &groups[0].items {
                    let mut checked = selection.is_selected(&item.id);
                    if ui.checkbox(&mut checked, &item.label).changed() {
                        events.push(WidgetEvent::Toggle(item.id.clone()));
                    }
                }
            });
    });
    events
}

/// Apply widget events to a selection and its collapse set. Returns
/// whether the selected set changed (collapse toggles don't count), so
/// the owning tab knows whether to re-run its filter pipeline.
pub fn apply_events(
    selection: &mut SelectionState,
    collapsed: &mut BTreeSet<String>,
    events: &[WidgetEvent],
) -> bool {
    let before = selection.selected.clone();
    for event in events {
        match event {
            WidgetEvent::Toggle(id) => selection.toggle(id),
            WidgetEvent::SelectMany(ids) => selection.select_many(ids.iter().map(String::as_str)),
            WidgetEvent::ClearMany(ids) => selection.deselect_many(ids.iter().map(String::as_str)),
            WidgetEvent::ToggleCollapse(group) => {
                if !collapsed.remove(group) {
                    collapsed.insert(group.clone());
                }
            }
        }
    }
    selection.selected != before
}

/// Outcome of a searchable single-choice select.
pub enum SelectChange {
    /// A concrete option was chosen.
    Selected(String),
    /// The "none" row was chosen (size selectors only).
    Cleared,
}

/// Searchable single-choice dropdown over category-grouped options.
/// Returns a change only when a different value is picked.
pub fn searchable_select(
    ui: &mut egui::Ui,
    id_salt: &str,
    ui_state: &mut DropdownUi,
    current: Option<&str>,
    current_label: &str,
    groups: &[OptionGroup],
    none_label: Option<&str>,
) -> Option<SelectChange> {
    let mut change = None;

    let button_text = if current.is_none() && none_label.is_some() {
        RichText::new(current_label).color(Color32::GRAY)
    } else {
        RichText::new(current_label)
    };
    if ui.button(button_text).clicked() {
        ui_state.open = !ui_state.open;
        ui_state.search.clear();
    }
    if !ui_state.open {
        return None;
    }

    egui::Frame::popup(ui.style()).show(ui, |ui| {
        ui.set_min_width(260.0);
        ui.add(
            TextEdit::singleline(&mut ui_state.search)
                .hint_text("Search…")
                .desired_width(f32::INFINITY),
        );
        ui.separator();
        let query = ui_state.search.to_lowercase();

        ScrollArea::vertical()
            .id_salt(id_salt)
            .max_height(320.0)
            .show(ui, |ui| {
                if let Some(none_text) = none_label
                    && query.is_empty()
                    && ui
                        .selectable_label(current.is_none(), RichText::new(none_text).weak())
                        .clicked()
                {
                    change = Some(SelectChange::Cleared);
                    ui_state.open = false;
                }
                let mut any_visible = false;
                for group in groups {
                    let visible: Vec<&OptionItem> =
                        group.items.iter().filter(|i| i.matches(&query)).collect();
                    if visible.is_empty() {
                        continue;
                    }
                    any_visible = true;
                    ui.label(RichText::new(&group.name).strong().small());
                    for item in visible {
                        let is_current = current == Some(item.id.as_str());
                        if ui.selectable_label(is_current, &item.label).clicked() {
                            if !is_current {
                                change = Some(SelectChange::Selected(item.id.clone()));
                            }
                            ui_state.open = false;
                        }
                    }
                    ui.add_space(4.0);
                }
                if !any_visible {
                    ui.weak("No indicators found");
                }
            });
    });

    change
}
