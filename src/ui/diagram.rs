use eframe::egui::{Align2, Color32, Stroke, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, PlotUi, Polygon, Text};

use crate::diagram::layout::{layout, DiagramLayout, LayoutParams};
use crate::state::AppState;
use crate::ui::panels::format_tonnes;

// Diagram coordinate space; the plot scales it to the panel.
const DIAGRAM_WIDTH: f64 = 800.0;
const DIAGRAM_HEIGHT: f64 = 500.0;
const RIBBON_SEGMENTS: usize = 24;

// ---------------------------------------------------------------------------
// Alluvial diagram (central panel)
// ---------------------------------------------------------------------------

/// Render the alluvial diagram in the central panel.
pub fn alluvial_diagram(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an emissions file to view flows  (File → Open…)");
        });
        return;
    }

    if state.graph.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(format!(
                "No flows for {} with the current filters",
                state.year
            ));
        });
        return;
    }

    let geometry = layout(
        &state.graph,
        &LayoutParams {
            width: DIAGRAM_WIDTH,
            height: DIAGRAM_HEIGHT,
            ..LayoutParams::default()
        },
    );

    let response = Plot::new("alluvial")
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| draw(plot_ui, &geometry, state));

    if let Some(tooltip) = response.inner {
        response.response.on_hover_text(tooltip);
    }
}

/// Paint ribbons below nodes, then labels; returns the hover tooltip, if any.
fn draw(plot_ui: &mut PlotUi, geometry: &DiagramLayout, state: &AppState) -> Option<String> {
    for link in &geometry.links {
        let source = &geometry.nodes[link.source];
        let target = &geometry.nodes[link.target];
        let band = ribbon_points(source.x1, link.y0, target.x0, link.y1, link.width);

        let c = state.colors.color_for(&source.name);
        let fill = Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), 110);
        plot_ui.polygon(
            Polygon::new(PlotPoints::from(band))
                .fill_color(fill)
                .stroke(Stroke::NONE),
        );
    }

    let last_column_x = geometry
        .nodes
        .iter()
        .map(|n| n.x0)
        .fold(f64::NEG_INFINITY, f64::max);

    for node in &geometry.nodes {
        if node.y1 <= node.y0 {
            continue; // zero-flow node, nothing to draw
        }
        let color = state.colors.color_for(&node.name);
        let rect = vec![
            [node.x0, flip(node.y0)],
            [node.x1, flip(node.y0)],
            [node.x1, flip(node.y1)],
            [node.x0, flip(node.y1)],
        ];
        plot_ui.polygon(
            Polygon::new(PlotPoints::from(rect))
                .fill_color(color)
                .stroke(Stroke::new(1.0, color.gamma_multiply(0.6))),
        );

        let mid_y = flip((node.y0 + node.y1) / 2.0);
        let (x, anchor) = if node.x0 >= last_column_x {
            (node.x0 - 6.0, Align2::RIGHT_CENTER)
        } else {
            (node.x1 + 6.0, Align2::LEFT_CENTER)
        };
        plot_ui.text(
            Text::new(PlotPoint::new(x, mid_y), node.name.clone()).anchor(anchor),
        );
    }

    hovered_tooltip(plot_ui, geometry)
}

/// Sample the cubic ribbon band between two node faces.
///
/// Control points sit at the horizontal midpoint, matching the usual
/// horizontal flow-link curve; the band keeps a constant vertical width.
fn ribbon_points(x0: f64, y0: f64, x1: f64, y1: f64, width: f64) -> Vec<[f64; 2]> {
    let half = width / 2.0;
    let mut points = Vec::with_capacity((RIBBON_SEGMENTS + 1) * 2);
    for i in 0..=RIBBON_SEGMENTS {
        let t = i as f64 / RIBBON_SEGMENTS as f64;
        let (x, y) = ribbon_center(x0, y0, x1, y1, t);
        points.push([x, flip(y - half)]);
    }
    for i in (0..=RIBBON_SEGMENTS).rev() {
        let t = i as f64 / RIBBON_SEGMENTS as f64;
        let (x, y) = ribbon_center(x0, y0, x1, y1, t);
        points.push([x, flip(y + half)]);
    }
    points
}

/// Point on the ribbon centerline at parameter `t`.
fn ribbon_center(x0: f64, y0: f64, x1: f64, y1: f64, t: f64) -> (f64, f64) {
    let xm = (x0 + x1) / 2.0;
    let u = 1.0 - t;
    let x = u * u * u * x0 + 3.0 * u * u * t * xm + 3.0 * u * t * t * xm + t * t * t * x1;
    let y = u * u * u * y0 + 3.0 * u * u * t * y0 + 3.0 * u * t * t * y1 + t * t * t * y1;
    (x, y)
}

/// Diagram y grows downwards, plot y grows upwards.
fn flip(y: f64) -> f64 {
    DIAGRAM_HEIGHT - y
}

/// Find what the pointer is over: nodes win over ribbons.
fn hovered_tooltip(plot_ui: &PlotUi, geometry: &DiagramLayout) -> Option<String> {
    let pointer = plot_ui.pointer_coordinate()?;
    let x = pointer.x;
    let y = flip(pointer.y);

    for node in &geometry.nodes {
        if x >= node.x0 && x <= node.x1 && y >= node.y0 && y <= node.y1 {
            return Some(format!("{}: {}", node.name, format_tonnes(node.value)));
        }
    }

    for link in &geometry.links {
        let source = &geometry.nodes[link.source];
        let target = &geometry.nodes[link.target];
        let (x0, x1) = (source.x1, target.x0);
        if x1 <= x0 || x < x0 || x > x1 {
            continue;
        }
        // The centerline's x is monotonic in t; walk the samples until the
        // pointer's x is bracketed, then compare against the band.
        let mut prev = ribbon_center(x0, link.y0, x1, link.y1, 0.0);
        for i in 1..=RIBBON_SEGMENTS {
            let t = i as f64 / RIBBON_SEGMENTS as f64;
            let cur = ribbon_center(x0, link.y0, x1, link.y1, t);
            if x <= cur.0 {
                let span = (cur.0 - prev.0).max(f64::EPSILON);
                let cy = prev.1 + (cur.1 - prev.1) * (x - prev.0) / span;
                if (y - cy).abs() <= link.width / 2.0 {
                    let kind = link
                        .kind
                        .map(|k| format!(" ({k})"))
                        .unwrap_or_default();
                    return Some(format!(
                        "{} → {}: {}{}",
                        source.name,
                        target.name,
                        format_tonnes(link.value),
                        kind
                    ));
                }
                break;
            }
            prev = cur;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ribbon_center_endpoints_match_node_faces() {
        let (x, y) = ribbon_center(100.0, 40.0, 300.0, 200.0, 0.0);
        assert_eq!((x, y), (100.0, 40.0));
        let (x, y) = ribbon_center(100.0, 40.0, 300.0, 200.0, 1.0);
        assert_eq!((x, y), (300.0, 200.0));
    }

    #[test]
    fn ribbon_band_is_closed_and_constant_width() {
        let band = ribbon_points(100.0, 40.0, 300.0, 200.0, 10.0);
        assert_eq!(band.len(), (RIBBON_SEGMENTS + 1) * 2);
        // Top and bottom edges sit 10 apart at both ends.
        let top_start = band[0];
        let bottom_end = band[band.len() - 1];
        assert_eq!(top_start[0], bottom_end[0]);
        assert!((top_start[1] - bottom_end[1] - 10.0).abs() < 1e-9);
    }
}
