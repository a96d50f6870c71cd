//! Multi-country time-series line renderer (timeline tab).

use crate::charts::gesture::{GestureInput, GestureOutput, GesturePhase, GestureState};
use crate::charts::{ChartEvent, nice_ticks};
use crate::format::format_axis_tick;
use crate::models::IndicatorMeta;
use crate::scale::{LinearScale, brush_domains, pan_domain};
use crate::state::DomainPair;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};

pub struct LineInput<'a> {
    pub size: (f32, f32),
    /// Per-country series, already filtered to non-null values and
    /// sorted by year. The color is assigned by selection order.
    pub series: &'a [(String, Color32, Vec<(i32, f64)>)],
    pub zoom: Option<DomainPair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeriesMark {
    pub country_code: String,
    pub color: Color32,
    pub points: Vec<(f32, f32)>,
    pub values: Vec<(i32, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineScene {
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub original_x_domain: [f64; 2],
    pub original_y_domain: [f64; 2],
    pub series: Vec<LineSeriesMark>,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
    pub zoomed: bool,
}

/// Build the line scene. The y extent is padded by 10 % on both sides
/// (one unit when collapsed); the x extent spans the observed years.
pub fn layout_line(input: &LineInput<'_>) -> LineScene {
    let (width, height) = input.size;

    let mut x_lo = f64::INFINITY;
    let mut x_hi = f64::NEG_INFINITY;
    let mut y_lo = f64::INFINITY;
    let mut y_hi = f64::NEG_INFINITY;
    for (_, _, values) in input.series {
        for &(year, value) in values {
            x_lo = x_lo.min(year as f64);
            x_hi = x_hi.max(year as f64);
            y_lo = y_lo.min(value);
            y_hi = y_hi.max(value);
        }
    }
    if !x_lo.is_finite() {
        x_lo = 0.0;
        x_hi = 1.0;
        y_lo = 0.0;
        y_hi = 1.0;
    }
    let y_padding = {
        let pad = (y_hi - y_lo) * 0.1;
        if pad > 0.0 { pad } else { 1.0 }
    };
    let original_x_domain = [x_lo, x_hi.max(x_lo + 1.0)];
    let original_y_domain = [y_lo - y_padding, y_hi + y_padding];

    let (x_domain, y_domain, zoomed) = match input.zoom {
        Some(z) => (z.x, z.y, true),
        None => (original_x_domain, original_y_domain, false),
    };

    let x_scale = LinearScale::new(x_domain, [0.0, width as f64]);
    let y_scale = LinearScale::new(y_domain, [height as f64, 0.0]);

    let series = input
        .series
        .iter()
        .map(|(code, color, values)| LineSeriesMark {
            country_code: code.clone(),
            color: *color,
            points: values
                .iter()
                .map(|&(year, value)| (x_scale.scale(year as f64), y_scale.scale(value)))
                .collect(),
            values: values.clone(),
        })
        .collect();

    // integer year ticks only
    let x_ticks = nice_ticks(x_scale.domain(), 5)
        .into_iter()
        .filter(|t| (t - t.round()).abs() < 1e-9)
        .collect();

    LineScene {
        x_ticks,
        y_ticks: nice_ticks(y_scale.domain(), 5),
        x_scale,
        y_scale,
        original_x_domain,
        original_y_domain,
        series,
        zoomed,
    }
}

pub struct LineView<'a> {
    pub indicator: Option<&'a IndicatorMeta>,
    pub country_label_of: &'a dyn Fn(&str) -> String,
}

fn format_indicator_value(value: f64, indicator: Option<&IndicatorMeta>) -> String {
    match indicator {
        Some(meta) if meta.format == crate::models::ValueFormat::Percent => {
            format!("{}%", format_axis_tick(value))
        }
        _ => crate::format::format_tooltip_value(value),
    }
}

/// Paint one timeline chart and translate interaction into events; the
/// same brush/pan machine as the scatter chart.
pub fn show(
    ui: &mut egui::Ui,
    plot_rect: Rect,
    scene: &LineScene,
    view: &LineView<'_>,
    gesture: &mut GestureState,
) -> Vec<ChartEvent> {
    let mut events = Vec::new();
    let painter = ui.painter_at(plot_rect);
    let origin = plot_rect.min;
    let to_screen = |p: (f32, f32)| Pos2::new(origin.x + p.0, origin.y + p.1);
    let text = ui.visuals().text_color();
    let grid = ui.visuals().widgets.noninteractive.bg_stroke.color;
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
            format!("{}", tick.round() as i64),
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
            format_indicator_value(tick, view.indicator),
            FontId::proportional(11.0),
            text,
        );
    }
    painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, grid));

    for series in &scene.series {
        if series.points.len() > 1 {
            let points: Vec<Pos2> = series.points.iter().map(|&p| to_screen(p)).collect();
            painter.add(egui::Shape::line(points, Stroke::new(2.0, series.color)));
        }
        for &p in &series.points {
            painter.circle_filled(to_screen(p), 2.5, series.color);
        }
    }

    let response = ui.interact(
        plot_rect,
        ui.id().with("line-gestures"),
        Sense::click_and_drag(),
    );
    let rel = |pos: Pos2| (pos.x - origin.x, pos.y - origin.y);
    let pointer = response
        .interact_pointer_pos()
        .or_else(|| response.hover_pos());

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

    if let GesturePhase::Brushing { start, current } = gesture.phase() {
        let rect = Rect::from_two_pos(to_screen(start), to_screen(current));
        painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(100, 149, 237, 40));
        painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(100, 149, 237, 180)),
        );
    }

    // nearest-point hover
    if !response.dragged()
        && let Some(pos) = response.hover_pos()
    {
        let nearest = scene
            .series
            .iter()
            .flat_map(|s| {
                s.points
                    .iter()
                    .zip(&s.values)
                    .map(move |(&p, &(year, value))| (s, to_screen(p), year, value))
            })
            .map(|(s, center, year, value)| (s, center, year, value, center.distance(pos)))
            .filter(|(_, _, _, _, d)| *d <= 12.0)
            .min_by(|a, b| a.4.partial_cmp(&b.4).unwrap());
        if let Some((series, center, year, value, _)) = nearest {
            painter.circle(center, 5.0, series.color, Stroke::new(1.0, Color32::WHITE));
            let country = (view.country_label_of)(&series.country_code);
            let color = series.color;
            response.clone().on_hover_ui_at_pointer(|ui| {
                ui.label(egui::RichText::new(country).strong().color(color));
                ui.weak(format!("Year: {year}"));
                ui.label(format_indicator_value(value, view.indicator));
            });
        }
    }

    events
}
