//! Scatter renderer for paired-indicator views.

use crate::charts::gesture::{GestureInput, GestureOutput, GesturePhase, GestureState};
use crate::charts::{ChartEvent, continent_color, nice_ticks, tick_count_for_width};
use crate::format::{format_axis_tick, format_tooltip_value};
use crate::models::{DataPoint, Year};
use crate::scale::{LinearScale, SqrtScale, brush_domains, padded_domain, pan_domain};
use crate::state::{AxisExtents, ZoomTransform};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use std::collections::BTreeSet;

/// Inputs of the pure layout step. All view state is passed in; the
/// renderer holds nothing of its own.
pub struct ScatterInput<'a> {
    /// Inner plot size in pixels (axis gutters excluded).
    pub size: (f32, f32),
    pub data: &'a [DataPoint],
    /// Locked full-history extents, when single-year mode has them.
    pub fixed_extents: Option<AxisExtents>,
    pub zoom: Option<&'a ZoomTransform>,
    /// Global extent of the size indicator, when size modality is on.
    pub size_domain: Option<(f64, f64)>,
    pub hidden_continents: &'a BTreeSet<String>,
    pub all_years: bool,
    /// Narrow-container variant: smaller markers, fewer ticks.
    pub compact: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointMark {
    pub country_code: String,
    pub year: Year,
    pub x_value: f64,
    pub y_value: f64,
    pub s_value: Option<f64>,
    /// Position relative to the inner plot origin.
    pub pos: (f32, f32),
    pub radius: f32,
    pub hover_radius: f32,
    pub color: Color32,
    /// Display filter result: hidden continent or missing size value.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterScene {
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    /// Unzoomed domains, restored by reset.
    pub original_x_domain: [f64; 2],
    pub original_y_domain: [f64; 2],
    pub marks: Vec<PointMark>,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
    /// Count shown in the corner badge: points eligible for rendering
    /// before the continent display filter.
    pub point_count: usize,
    /// Continents present in the data, for the legend.
    pub continents: Vec<String>,
    pub zoomed: bool,
}

fn data_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

/// Build the scatter scene. Pure: same inputs, same scene.
pub fn layout_scatter<F>(input: &ScatterInput<'_>, continent_of: F) -> ScatterScene
where
    F: Fn(&str) -> Option<String>,
{
    let (width, height) = input.size;

    let x_extent = input
        .fixed_extents
        .map(|e| (e.x_extent[0], e.x_extent[1]))
        .or_else(|| data_extent(input.data.iter().map(|d| d.x_value)))
        .unwrap_or((0.0, 1.0));
    let y_extent = input
        .fixed_extents
        .map(|e| (e.y_extent[0], e.y_extent[1]))
        .or_else(|| data_extent(input.data.iter().map(|d| d.y_value)))
        .unwrap_or((0.0, 1.0));

    let original_x_domain = padded_domain(x_extent);
    let original_y_domain = padded_domain(y_extent);

    let (x_domain, y_domain, zoomed) = match input.zoom {
        Some(z) => (z.x_domain, z.y_domain, true),
        None => (original_x_domain, original_y_domain, false),
    };

    let x_scale = LinearScale::new(x_domain, [0.0, width as f64]);
    let y_scale = LinearScale::new(y_domain, [height as f64, 0.0]);

    let size_scale = input.size_domain.map(|(lo, hi)| {
        let (min_r, max_r) = if input.all_years {
            if input.compact { (1.5, 7.0) } else { (2.0, 9.0) }
        } else if input.compact {
            (2.0, 10.0)
        } else {
            (3.0, 14.0)
        };
        SqrtScale::new([lo, hi], [min_r, max_r])
    });

    let base_radius = if input.all_years {
        if input.compact { 2.5 } else { 3.0 }
    } else if input.compact {
        4.0
    } else {
        5.0
    };
    let hover_radius = if input.all_years {
        if input.compact { 5.0 } else { 6.0 }
    } else if input.compact {
        7.0
    } else {
        8.0
    };

    let mut continents: BTreeSet<String> = BTreeSet::new();
    let mut point_count = 0usize;

    let marks = input
        .data
        .iter()
        .map(|point| {
            let continent = continent_of(&point.country_code);
            if let Some(c) = &continent {
                continents.insert(c.clone());
            }
            let missing_size = size_scale.is_some() && point.s_value.is_none();
            if !missing_size {
                point_count += 1;
            }
            let hidden = continent
                .as_deref()
                .is_some_and(|c| input.hidden_continents.contains(c));
            let (radius, hover) = match (&size_scale, point.s_value) {
                (Some(scale), Some(s)) => {
                    let r = scale.radius(s);
                    (r, r * 1.5)
                }
                _ => (base_radius, hover_radius),
            };
            PointMark {
                country_code: point.country_code.clone(),
                year: point.year,
                x_value: point.x_value,
                y_value: point.y_value,
                s_value: point.s_value,
                pos: (x_scale.scale(point.x_value), y_scale.scale(point.y_value)),
                radius,
                hover_radius: hover,
                color: continent
                    .as_deref()
                    .map(continent_color)
                    .unwrap_or(crate::charts::DEFAULT_POINT_COLOR),
                visible: !missing_size && !hidden,
            }
        })
        .collect();

    let tick_count = tick_count_for_width(width);
    ScatterScene {
        x_ticks: nice_ticks(x_scale.domain(), tick_count),
        y_ticks: nice_ticks(y_scale.domain(), tick_count),
        x_scale,
        y_scale,
        original_x_domain,
        original_y_domain,
        marks,
        point_count,
        continents: continents.into_iter().collect(),
        zoomed,
    }
}

/// Labels and lookups the paint pass needs but the layout does not.
pub struct ScatterView<'a> {
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub size_label: Option<&'a str>,
    pub all_years: bool,
    pub averaged: bool,
    pub country_label_of: &'a dyn Fn(&str) -> String,
}

/// Paint the scene into `plot_rect` and translate pointer interaction
/// into [`ChartEvent`]s. The caller applies events to the store and
/// re-renders; nothing is mutated here beyond the gesture machine.
pub fn show(
    ui: &mut egui::Ui,
    plot_rect: Rect,
    scene: &ScatterScene,
    view: &ScatterView<'_>,
    hidden_continents: &BTreeSet<String>,
    gesture: &mut GestureState,
) -> Vec<ChartEvent> {
    let mut events = Vec::new();
    let painter = ui.painter_at(plot_rect);
    let origin = plot_rect.min;
    let to_screen = |p: (f32, f32)| Pos2::new(origin.x + p.0, origin.y + p.1);

    paint_frame(ui, plot_rect, scene, view.x_label, view.y_label);

    // points, clipped to the plot area
    for mark in scene.marks.iter().filter(|m| m.visible) {
        let center = to_screen(mark.pos);
        if !plot_rect.expand(16.0).contains(center) {
            continue;
        }
        let alpha = if view.all_years { 128 } else { 178 };
        let fill = Color32::from_rgba_unmultiplied(
            mark.color.r(),
            mark.color.g(),
            mark.color.b(),
            alpha,
        );
        painter.circle(
            center,
            mark.radius,
            fill,
            Stroke::new(0.5, Color32::from_rgba_unmultiplied(255, 255, 255, 128)),
        );
    }

    // pointer interaction: one capture region for both gestures
    let response = ui.interact(
        plot_rect,
        ui.id().with("scatter-gestures"),
        Sense::click_and_drag(),
    );
    let pointer = response
        .interact_pointer_pos()
        .or_else(|| response.hover_pos());
    let rel = |pos: Pos2| (pos.x - origin.x, pos.y - origin.y);

    if response.drag_started()
        && let Some(pos) = pointer
    {
        gesture.update(GestureInput::PointerDown(rel(pos)), scene.zoomed);
    }
    if response.dragged()
        && let Some(pos) = pointer
    {
        let out = gesture.update(GestureInput::PointerMove(rel(pos)), scene.zoomed);
        if matches!(out, GestureOutput::PanDelta { .. }) {
            // per-frame delta keeps the pan incremental against the
            // domains the scene was laid out with
            let delta = response.drag_delta();
            events.push(ChartEvent::Panned {
                x_domain: pan_domain(scene.x_scale.domain(), delta.x, &scene.x_scale),
                y_domain: pan_domain(scene.y_scale.domain(), delta.y, &scene.y_scale),
            });
        }
    }
    if response.drag_stopped()
        && let Some(pos) = pointer
    {
        match gesture.update(GestureInput::PointerUp(rel(pos)), scene.zoomed) {
            GestureOutput::BrushCommitted { from, to } => {
                let (x_domain, y_domain) = brush_domains(&scene.x_scale, &scene.y_scale, from, to);
                events.push(ChartEvent::ZoomCommitted { x_domain, y_domain });
            }
            GestureOutput::PanEnded => {
                events.push(ChartEvent::ZoomCommitted {
                    x_domain: scene.x_scale.domain(),
                    y_domain: scene.y_scale.domain(),
                });
            }
            _ => {}
        }
    }
    if response.double_clicked()
        && gesture.update(GestureInput::DoubleClick, scene.zoomed) == GestureOutput::Reset
    {
        events.push(ChartEvent::ZoomReset);
    }

    // brush selection overlay
    if let GesturePhase::Brushing { start, current } = gesture.phase() {
        let rect = Rect::from_two_pos(to_screen(start), to_screen(current));
        painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(100, 149, 237, 40));
        painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(100, 149, 237, 180)),
        );
    }

    // hover tooltip: nearest visible mark under the pointer
    if !response.dragged()
        && let Some(pos) = response.hover_pos()
    {
        let hovered = scene
            .marks
            .iter()
            .filter(|m| m.visible)
            .map(|m| {
                let center = to_screen(m.pos);
                (m, center.distance(pos))
            })
            .filter(|(m, d)| *d <= m.hover_radius.max(8.0))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        if let Some((mark, _)) = hovered {
            let center = to_screen(mark.pos);
            painter.circle(
                center,
                mark.hover_radius,
                Color32::from_rgba_unmultiplied(
                    mark.color.r(),
                    mark.color.g(),
                    mark.color.b(),
                    255,
                ),
                Stroke::new(1.0, Color32::WHITE),
            );
            let country = (view.country_label_of)(&mark.country_code);
            let mark = mark.clone();
            response.clone().on_hover_ui_at_pointer(|ui| {
                ui.label(
                    egui::RichText::new(format!("{country} ({})", mark.country_code))
                        .strong()
                        .color(mark.color),
                );
                if view.all_years {
                    ui.weak(format!("Year: {}", mark.year));
                } else if view.averaged {
                    ui.weak("Averaged across all years");
                }
                ui.label(format!(
                    "{}: {}",
                    view.x_label,
                    format_tooltip_value(mark.x_value)
                ));
                ui.label(format!(
                    "{}: {}",
                    view.y_label,
                    format_tooltip_value(mark.y_value)
                ));
                if let (Some(size_label), Some(s)) = (view.size_label, mark.s_value) {
                    ui.label(format!("{size_label}: {}", format_tooltip_value(s)));
                }
            });
        }
    }

    // point count badge, bottom right
    painter.text(
        plot_rect.right_bottom() + Vec2::new(-6.0, -4.0),
        Align2::RIGHT_BOTTOM,
        format!("Points: {}", scene.point_count),
        FontId::proportional(10.0),
        ui.visuals().weak_text_color(),
    );

    // continent legend chips above the plot
    events.extend(legend_row(ui, plot_rect, &scene.continents, hidden_continents));

    events
}

/// Grid, axes, tick labels, and axis titles around the plot area.
fn paint_frame(ui: &egui::Ui, plot_rect: Rect, scene: &ScatterScene, x_label: &str, y_label: &str) {
    let painter = ui.painter();
    let origin = plot_rect.min;
    let grid = ui.visuals().widgets.noninteractive.bg_stroke.color;
    let text = ui.visuals().text_color();
    let grid_stroke = Stroke::new(
        1.0,
        Color32::from_rgba_unmultiplied(grid.r(), grid.g(), grid.b(), 60),
    );

    for &tick in &scene.x_ticks {
        let x = origin.x + scene.x_scale.scale(tick);
        if x < plot_rect.left() - 0.5 || x > plot_rect.right() + 0.5 {
            continue;
        }
        painter.line_segment(
            [
                Pos2::new(x, plot_rect.top()),
                Pos2::new(x, plot_rect.bottom()),
            ],
            grid_stroke,
        );
        painter.text(
            Pos2::new(x, plot_rect.bottom() + 4.0),
            Align2::CENTER_TOP,
            format_axis_tick(tick),
            FontId::proportional(11.0),
            text,
        );
    }
    for &tick in &scene.y_ticks {
        let y = origin.y + scene.y_scale.scale(tick);
        if y < plot_rect.top() - 0.5 || y > plot_rect.bottom() + 0.5 {
            continue;
        }
        painter.line_segment(
            [
                Pos2::new(plot_rect.left(), y),
                Pos2::new(plot_rect.right(), y),
            ],
            grid_stroke,
        );
        painter.text(
            Pos2::new(plot_rect.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            format_axis_tick(tick),
            FontId::proportional(11.0),
            text,
        );
    }

    painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, grid));

    painter.text(
        Pos2::new(plot_rect.center().x, plot_rect.bottom() + 22.0),
        Align2::CENTER_TOP,
        x_label,
        FontId::proportional(13.0),
        text,
    );
    let galley = painter.layout_no_wrap(y_label.to_string(), FontId::proportional(13.0), text);
    let pos = Pos2::new(
        plot_rect.left() - 48.0,
        plot_rect.center().y + galley.size().x / 2.0,
    );
    painter.add(
        egui::epaint::TextShape::new(pos, galley, text).with_angle(-std::f32::consts::FRAC_PI_2),
    );
}

/// Clickable continent legend above the plot. Returns toggle events.
pub fn legend_row(
    ui: &mut egui::Ui,
    plot_rect: Rect,
    continents: &[String],
    hidden: &BTreeSet<String>,
) -> Vec<ChartEvent> {
    let mut events = Vec::new();
    let chip_font = FontId::proportional(11.0);
    let mut x = plot_rect.left();
    let y = plot_rect.top() - 18.0;
    for continent in continents {
        let is_hidden = hidden.contains(continent);
        let color = continent_color(continent);
        let galley = ui
            .painter()
            .layout_no_wrap(continent.clone(), chip_font.clone(), ui.visuals().text_color());
        let chip = Rect::from_min_size(
            Pos2::new(x, y),
            Vec2::new(galley.size().x + 16.0, galley.size().y + 2.0),
        );
        let response = ui.interact(
            chip,
            ui.id().with(("legend", continent)),
            Sense::click(),
        );
        let alpha = if is_hidden { 70 } else { 255 };
        ui.painter().circle_filled(
            Pos2::new(chip.left() + 5.0, chip.center().y),
            4.0,
            Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha),
        );
        let text_color = if is_hidden {
            ui.visuals().weak_text_color()
        } else {
            ui.visuals().text_color()
        };
        ui.painter().galley(
            Pos2::new(chip.left() + 12.0, chip.top() + 1.0),
            galley,
            text_color,
        );
        if response.clicked() {
            events.push(ChartEvent::ContinentToggled(continent.clone()));
        }
        x = chip.right() + 8.0;
    }
    events
}
