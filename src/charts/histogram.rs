//! Stacked histogram renderer for single-variable views
//! (selected when a chart's x and y indicators are identical).

use crate::charts::{ChartEvent, continent_color, nice_ceil, nice_ticks, tick_count_for_width};
use crate::filter::{Bin, BinMember, compute_histogram_bins, stack_by_category};
use crate::format::{format_axis_tick, format_tooltip_value};
use crate::models::DataPoint;
use crate::scale::LinearScale;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use std::collections::BTreeSet;

pub const BIN_COUNT: usize = 20;

pub struct HistogramInput<'a> {
    pub size: (f32, f32),
    pub data: &'a [DataPoint],
    /// Locked full-history x-extent, when single-year mode has one.
    pub fixed_extent: Option<[f64; 2]>,
    pub hidden_continents: &'a BTreeSet<String>,
}

/// One stacked bar segment, positioned relative to the plot origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMark {
    pub bin_index: usize,
    pub continent: String,
    pub min: (f32, f32),
    pub max: (f32, f32),
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramScene {
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub bins: Vec<Bin>,
    pub segments: Vec<SegmentMark>,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
    pub total_count: usize,
    pub continents: Vec<String>,
}

/// Build the histogram scene: 20 equal-width bins over the fixed or
/// data-derived extent, stacked by continent with the largest category
/// at the bottom. Hidden continents are dropped from the stack but keep
/// the y scale stable (the scale covers the unfiltered counts).
pub fn layout_histogram<F>(input: &HistogramInput<'_>, continent_of: F) -> HistogramScene
where
    F: Fn(&str) -> Option<String>,
{
    let (width, height) = input.size;

    let members: Vec<BinMember> = input
        .data
        .iter()
        .map(|d| BinMember {
            country_code: d.country_code.clone(),
            year: d.year,
            value: d.x_value,
        })
        .collect();

    let extent = input.fixed_extent.map(|e| (e[0], e[1])).unwrap_or_else(|| {
        let lo = members.iter().map(|m| m.value).fold(f64::INFINITY, f64::min);
        let hi = members
            .iter()
            .map(|m| m.value)
            .fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        }
    });

    let bins = compute_histogram_bins(&members, extent, BIN_COUNT);
    let x_domain = [bins[0].lo, bins[BIN_COUNT - 1].hi];
    let max_count = bins.iter().map(Bin::count).max().unwrap_or(0);
    let y_domain = [0.0, nice_ceil(max_count.max(1) as f64)];

    let x_scale = LinearScale::new(x_domain, [0.0, width as f64]);
    let y_scale = LinearScale::new(y_domain, [height as f64, 0.0]);

    let mut continents: BTreeSet<String> = BTreeSet::new();
    let mut segments = Vec::new();
    for (bin_index, bin) in bins.iter().enumerate() {
        let stacked = stack_by_category(&bin.members, &continent_of);
        for entry in &stacked {
            continents.insert(entry.category.clone());
        }
        let x0 = x_scale.scale(bin.lo) + 1.0;
        let x1 = (x_scale.scale(bin.hi) - 1.0).max(x0);
        let mut cumulative = 0.0f32;
        for entry in stacked {
            if input.hidden_continents.contains(&entry.category) {
                continue;
            }
            let segment_height = height - y_scale.scale(entry.count as f64);
            let y1 = height - cumulative;
            let y0 = y1 - segment_height;
            segments.push(SegmentMark {
                bin_index,
                continent: entry.category.clone(),
                min: (x0, y0),
                max: (x1, y1),
                color: continent_color(&entry.category),
            });
            cumulative += segment_height;
        }
    }

    let tick_count = tick_count_for_width(width);
    HistogramScene {
        x_ticks: nice_ticks(x_scale.domain(), tick_count),
        y_ticks: nice_ticks(y_scale.domain(), tick_count.min(5)),
        x_scale,
        y_scale,
        total_count: members.len(),
        bins,
        segments,
        continents: continents.into_iter().collect(),
    }
}

pub struct HistogramView<'a> {
    pub label: &'a str,
    pub all_years: bool,
    pub averaged: bool,
    pub country_label_of: &'a dyn Fn(&str) -> String,
    pub continent_of: &'a dyn Fn(&str) -> Option<String>,
}

/// Paint the histogram and report legend toggles. Histograms do not
/// brush or pan; hovering a bar shows its members ordered by value.
pub fn show(
    ui: &mut egui::Ui,
    plot_rect: Rect,
    scene: &HistogramScene,
    view: &HistogramView<'_>,
    hidden_continents: &BTreeSet<String>,
) -> Vec<ChartEvent> {
    let mut events = Vec::new();
    let painter = ui.painter_at(plot_rect);
    let origin = plot_rect.min;
    let text = ui.visuals().text_color();
    let grid = ui.visuals().widgets.noninteractive.bg_stroke.color;

    for &tick in &scene.y_ticks {
        let y = origin.y + scene.y_scale.scale(tick);
        painter.line_segment(
            [
                Pos2::new(plot_rect.left(), y),
                Pos2::new(plot_rect.right(), y),
            ],
            Stroke::new(
                1.0,
                Color32::from_rgba_unmultiplied(grid.r(), grid.g(), grid.b(), 60),
            ),
        );
        painter.text(
            Pos2::new(plot_rect.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            format_axis_tick(tick),
            FontId::proportional(11.0),
            text,
        );
    }
    for &tick in &scene.x_ticks {
        let x = origin.x + scene.x_scale.scale(tick);
        painter.text(
            Pos2::new(x, plot_rect.bottom() + 4.0),
            Align2::CENTER_TOP,
            format_axis_tick(tick),
            FontId::proportional(11.0),
            text,
        );
    }
    painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, grid));

    let response = ui.interact(
        plot_rect,
        ui.id().with("histogram-hover"),
        Sense::hover(),
    );
    let hovered_bin = response.hover_pos().and_then(|pos| {
        let rel_x = pos.x - origin.x;
        scene
            .bins
            .iter()
            .position(|bin| {
                let x0 = scene.x_scale.scale(bin.lo);
                let x1 = scene.x_scale.scale(bin.hi);
                (x0..=x1).contains(&rel_x)
            })
            .filter(|&i| scene.bins[i].count() > 0)
    });

    for segment in &scene.segments {
        let rect = Rect::from_min_max(
            origin + Vec2::new(segment.min.0, segment.min.1),
            origin + Vec2::new(segment.max.0, segment.max.1),
        );
        let alpha = if hovered_bin == Some(segment.bin_index) {
            255
        } else {
            178
        };
        painter.rect_filled(
            rect,
            0.0,
            Color32::from_rgba_unmultiplied(
                segment.color.r(),
                segment.color.g(),
                segment.color.b(),
                alpha,
            ),
        );
    }

    if let Some(bin_index) = hovered_bin {
        let bin = &scene.bins[bin_index];
        let visible: Vec<&BinMember> = bin
            .members
            .iter()
            .filter(|m| {
                (view.continent_of)(&m.country_code)
                    .is_none_or(|c| !hidden_continents.contains(&c))
            })
            .collect();
        response.clone().on_hover_ui_at_pointer(|ui| {
            ui.label(
                egui::RichText::new(format!(
                    "Range: {} – {}",
                    format_tooltip_value(bin.lo),
                    format_tooltip_value(bin.hi)
                ))
                .strong(),
            );
            ui.weak(format!("Count: {}", visible.len()));
            egui::ScrollArea::vertical()
                .max_height(200.0)
                .show(ui, |ui| {
                    for member in &visible {
                        let color = (view.continent_of)(&member.country_code)
                            .as_deref()
                            .map(continent_color)
                            .unwrap_or(crate::charts::DEFAULT_POINT_COLOR);
                        let year_tag = if view.all_years {
                            format!(" ({})", member.year)
                        } else if view.averaged {
                            " (avg)".to_string()
                        } else {
                            String::new()
                        };
                        ui.label(
                            egui::RichText::new(format!(
                                "{}: {}{year_tag}",
                                (view.country_label_of)(&member.country_code),
                                format_tooltip_value(member.value),
                            ))
                            .color(color),
                        );
                    }
                });
        });
    }

    painter.text(
        Pos2::new(plot_rect.center().x, plot_rect.bottom() + 22.0),
        Align2::CENTER_TOP,
        view.label,
        FontId::proportional(13.0),
        text,
    );
    let galley = painter.layout_no_wrap("Frequency".to_string(), FontId::proportional(13.0), text);
    let pos = Pos2::new(
        plot_rect.left() - 48.0,
        plot_rect.center().y + galley.size().x / 2.0,
    );
    painter.add(
        egui::epaint::TextShape::new(pos, galley, text).with_angle(-std::f32::consts::FRAC_PI_2),
    );

    painter.text(
        plot_rect.right_bottom() + Vec2::new(-6.0, -4.0),
        Align2::RIGHT_BOTTOM,
        format!("Points: {}", scene.total_count),
        FontId::proportional(10.0),
        ui.visuals().weak_text_color(),
    );

    events.extend(super::scatter::legend_row(
        ui,
        plot_rect,
        &scene.continents,
        hidden_continents,
    ));

    events
}
