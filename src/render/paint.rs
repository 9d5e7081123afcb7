//! Painting of the reconciled layers onto the egui canvas.
//!
//! Layers hold screen positions relative to the viewport origin; `offset`
//! is the top-left of the canvas rect. Paint order is basemap, rings,
//! markers, tooltip.

use super::basemap::{BasemapLayer, FillMesh};
use super::markers::MarkerLayer;
use super::rings::{RingKey, RingLayer};
use super::tooltip::Tooltip;
use crate::ui::colors;
use eframe::egui::{self, Align2, Color32, FontId, Mesh, Painter, Shape, Stroke, StrokeKind, Vec2};

/// Renders the basemap polygons.
pub fn paint_basemap(painter: &Painter, offset: Vec2, layer: &BasemapLayer) {
    let fill = colors::basemap::fill();
    let stroke = Stroke::new(0.6, colors::basemap::BORDER);

    for entry in layer.shapes().iter() {
        for polygon in &entry.element.polygons {
            if let Some(mesh) = &polygon.fill {
                painter.add(Shape::mesh(fill_mesh(mesh, offset, fill)));
            }
            for outline in &polygon.outlines {
                let points = outline.points.iter().map(|p| *p + offset).collect();
                if outline.closed {
                    painter.add(Shape::closed_line(points, stroke));
                } else {
                    painter.add(Shape::line(points, stroke));
                }
            }
        }
    }
}

fn fill_mesh(fill: &FillMesh, offset: Vec2, color: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    for vertex in &fill.vertices {
        mesh.colored_vertex(*vertex + offset, color);
    }
    for tri in fill.indices.chunks_exact(3) {
        mesh.add_triangle(tri[0], tri[1], tri[2]);
    }
    mesh
}

/// Renders reference rings and the projection boundary.
pub fn paint_rings(painter: &Painter, offset: Vec2, layer: &RingLayer) {
    let font_id = FontId::proportional(10.0);

    for entry in layer.circles().iter() {
        let circle = &entry.element;
        let center = circle.center + offset;
        match entry.key {
            RingKey::Boundary => {
                painter.circle_stroke(center, circle.radius_px, Stroke::new(1.5, colors::rings::BOUNDARY));
            }
            RingKey::Reference(index) => {
                let hovered = layer.tooltip().ring_index() == Some(index);
                let width = if hovered { 2.0 } else { 1.0 };
                painter.circle_stroke(
                    center,
                    circle.radius_px,
                    Stroke::new(width, colors::rings::reference()),
                );
                painter.text(
                    center + Vec2::new(0.0, -circle.radius_px - 2.0),
                    Align2::CENTER_BOTTOM,
                    &circle.label,
                    font_id.clone(),
                    colors::rings::LABEL,
                );
            }
        }
    }
}

/// Renders marker dots and any visible labels.
pub fn paint_markers(painter: &Painter, offset: Vec2, layer: &MarkerLayer) {
    for entry in layer.dots().iter() {
        let dot = &entry.element;
        let Some(pos) = dot.position else {
            continue;
        };
        let fill = if dot.hovered {
            colors::markers::HOVER
        } else {
            colors::markers::DOT
        };
        painter.circle_filled(pos + offset, dot.radius_px, fill);
        painter.circle_stroke(
            pos + offset,
            dot.radius_px,
            Stroke::new(1.0, colors::markers::DOT_STROKE),
        );
    }

    for entry in layer.labels().iter() {
        let label = &entry.element;
        if !label.visible {
            continue;
        }
        if let Some(pos) = label.position {
            painter.text(
                pos + offset,
                Align2::LEFT_BOTTOM,
                &label.text,
                FontId::proportional(12.0),
                colors::markers::LABEL,
            );
        }
    }
}

/// Renders the ring tooltip next to the pointer.
pub fn paint_tooltip(painter: &Painter, offset: Vec2, tooltip: &Tooltip) {
    let Some(content) = tooltip.content() else {
        return;
    };

    let text = format!("{}\n{}", content.title, content.detail);
    let galley = painter.layout_no_wrap(
        text,
        FontId::proportional(12.0),
        colors::rings::TOOLTIP_TEXT,
    );

    let padding = Vec2::splat(6.0);
    let top_left = content.anchor + offset + Vec2::new(14.0, 14.0);
    let rect = egui::Rect::from_min_size(top_left, galley.size() + padding * 2.0);

    painter.rect_filled(rect, 4.0, colors::rings::tooltip_fill());
    painter.rect_stroke(
        rect,
        4.0,
        Stroke::new(1.0, colors::rings::TOOLTIP_BORDER),
        StrokeKind::Outside,
    );
    painter.galley(top_left + padding, galley, colors::rings::TOOLTIP_TEXT);
}
