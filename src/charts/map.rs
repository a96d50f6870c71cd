//! Choropleth world map renderer.

use crate::format::format_tooltip_value;
use crate::models::WorldShape;
use crate::scale::{color_for_value, viridis};
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use std::collections::HashMap;

/// Equirectangular projection fitted to the plot size. Latitudes are
/// clipped to the usual web-map band so Antarctica does not dominate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f32,
    offset: (f32, f32),
}

const LAT_TOP: f64 = 85.0;
const LAT_BOTTOM: f64 = -60.0;

impl Projection {
    pub fn fit(width: f32, height: f32) -> Self {
        let lon_span = 360.0f32;
        let lat_span = (LAT_TOP - LAT_BOTTOM) as f32;
        let scale = (width / lon_span).min(height / lat_span);
        let offset = (
            (width - lon_span * scale) / 2.0,
            (height - lat_span * scale) / 2.0,
        );
        Self { scale, offset }
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let x = (lon + 180.0) as f32 * self.scale + self.offset.0;
        let y = (LAT_TOP - lat.clamp(LAT_BOTTOM, LAT_TOP)) as f32 * self.scale + self.offset.1;
        (x, y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMark {
    pub code: String,
    pub polygons: Vec<Vec<(f32, f32)>>,
    pub value: Option<f64>,
    pub fill: Option<Color32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub shapes: Vec<ShapeMark>,
    pub color_domain: Option<(f64, f64)>,
}

pub struct MapInput<'a> {
    pub size: (f32, f32),
    pub shapes: &'a [WorldShape],
    /// Country code → indicator value for the displayed year.
    pub values: &'a HashMap<String, f64>,
    /// Global min/max of the indicator across all years, so colors do
    /// not shift while scrubbing through years.
    pub color_domain: Option<(f64, f64)>,
    /// `"all"` or one continent; countries outside it render as no-data.
    pub continent: &'a str,
}

/// Build the map scene: project every country outline and resolve its
/// fill against the fixed color domain.
pub fn layout_map<F>(input: &MapInput<'_>, continent_of: F) -> MapScene
where
    F: Fn(&str) -> Option<String>,
{
    let projection = Projection::fit(input.size.0, input.size.1);
    let filter_all = input.continent == "all" || input.continent.is_empty();

    let shapes = input
        .shapes
        .iter()
        .map(|shape| {
            let in_continent = filter_all
                || continent_of(&shape.code).is_some_and(|c| c == input.continent);
            let value = in_continent
                .then(|| input.values.get(&shape.code).copied())
                .flatten();
            let fill = input.color_domain.and_then(|(min, max)| {
                color_for_value(value, min, max)
                    .map(|[r, g, b]| Color32::from_rgb(r, g, b))
            });
            ShapeMark {
                code: shape.code.clone(),
                polygons: shape
                    .rings
                    .iter()
                    .map(|ring| {
                        ring.iter()
                            .map(|&[lon, lat]| projection.project(lon, lat))
                            .collect()
                    })
                    .collect(),
                value,
                fill,
            }
        })
        .collect();

    MapScene {
        shapes,
        color_domain: input.color_domain,
    }
}

fn point_in_polygon(p: (f32, f32), polygon: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub struct MapView<'a> {
    pub index_label: &'a str,
    pub country_label_of: &'a dyn Fn(&str) -> String,
}

/// Paint the choropleth with its gradient legend and hover tooltip.
pub fn show(ui: &mut egui::Ui, plot_rect: Rect, scene: &MapScene, view: &MapView<'_>) {
    let painter = ui.painter_at(plot_rect);
    let origin = plot_rect.min;
    let no_data = ui.visuals().faint_bg_color;
    let border = ui.visuals().widgets.noninteractive.bg_stroke.color;

    let response = ui.interact(plot_rect, ui.id().with("map-hover"), Sense::hover());
    let hover_rel = response
        .hover_pos()
        .map(|pos| (pos.x - origin.x, pos.y - origin.y));
    let mut hovered: Option<&ShapeMark> = None;

    for shape in &scene.shapes {
        let is_hovered = hover_rel.is_some_and(|p| {
            shape.polygons.iter().any(|poly| point_in_polygon(p, poly))
        });
        if is_hovered {
            hovered = Some(shape);
        }
        let fill = shape.fill.unwrap_or(no_data);
        for polygon in &shape.polygons {
            if polygon.len() < 3 {
                continue;
            }
            let points: Vec<Pos2> = polygon
                .iter()
                .map(|&(x, y)| Pos2::new(origin.x + x, origin.y + y))
                .collect();
            let stroke = if is_hovered {
                Stroke::new(1.5, ui.visuals().strong_text_color())
            } else {
                Stroke::new(0.5, border)
            };
            painter.add(egui::Shape::convex_polygon(points, fill, stroke));
        }
    }

    if let Some(shape) = hovered {
        let label = (view.country_label_of)(&shape.code);
        let value_text = shape
            .value
            .map(format_tooltip_value)
            .unwrap_or_else(|| "No data".to_string());
        let index_label = view.index_label.to_string();
        response.on_hover_ui_at_pointer(|ui| {
            ui.label(egui::RichText::new(label).strong());
            ui.label(format!("{index_label}: {value_text}"));
        });
    }

    // gradient legend, bottom left
    if let Some((min, max)) = scene.color_domain {
        let legend_rect = Rect::from_min_size(
            plot_rect.left_bottom() + Vec2::new(8.0, -26.0),
            Vec2::new(140.0, 10.0),
        );
        const STEPS: usize = 24;
        let step_w = legend_rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let [r, g, b] = viridis(i as f64 / (STEPS - 1) as f64);
            let rect = Rect::from_min_size(
                legend_rect.min + Vec2::new(i as f32 * step_w, 0.0),
                Vec2::new(step_w + 0.5, legend_rect.height()),
            );
            painter.rect_filled(rect, 0.0, Color32::from_rgb(r, g, b));
        }
        painter.text(
            legend_rect.left_bottom() + Vec2::new(0.0, 2.0),
            Align2::LEFT_TOP,
            format_tooltip_value(min),
            FontId::proportional(10.0),
            ui.visuals().text_color(),
        );
        painter.text(
            legend_rect.right_bottom() + Vec2::new(0.0, 2.0),
            Align2::RIGHT_TOP,
            format_tooltip_value(max),
            FontId::proportional(10.0),
            ui.visuals().text_color(),
        );
    }
}
