//! Labeled point markers (cities).
//!
//! Markers and their labels are two independently reconciled element sets,
//! both keyed by marker id. Geographic coordinates never change; only the
//! screen positions are recomputed on each render.

use super::reconcile::{KeyedGroup, ReconcileStats};
use crate::geo::{GeoPoint, MapProjection};
use eframe::egui::{vec2, Pos2, Vec2};

/// Marker dot radius at rest.
pub const MARKER_RADIUS_PX: f32 = 4.0;
/// Marker dot radius while hovered.
pub const MARKER_HOVER_RADIUS_PX: f32 = 7.0;
/// Pointer distance (px) from a marker center that counts as hovering it.
pub const MARKER_HIT_RADIUS_PX: f32 = 8.0;
/// Label position relative to its marker.
const LABEL_OFFSET: Vec2 = vec2(8.0, -8.0);

/// A static labeled point.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerFeature {
    pub id: String,
    pub label: String,
    pub coordinate: GeoPoint,
}

impl MarkerFeature {
    pub fn new(id: impl Into<String>, label: impl Into<String>, coordinate: GeoPoint) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            coordinate,
        }
    }
}

const CITIES: &[(&str, &str, f64, f64)] = &[
    ("tokyo", "Tokyo", 139.6917, 35.6895),
    ("new-york", "New York", -74.0060, 40.7128),
    ("london", "London", -0.1276, 51.5072),
    ("sao-paulo", "São Paulo", -46.6333, -23.5505),
    ("cairo", "Cairo", 31.2357, 30.0444),
    ("mumbai", "Mumbai", 72.8777, 19.0760),
    ("sydney", "Sydney", 151.2093, -33.8688),
    ("los-angeles", "Los Angeles", -118.2437, 34.0522),
    ("moscow", "Moscow", 37.6173, 55.7558),
    ("lagos", "Lagos", 3.3792, 6.5244),
    ("singapore", "Singapore", 103.8198, 1.3521),
    ("mexico-city", "Mexico City", -99.1332, 19.4326),
    ("reykjavik", "Reykjavík", -21.9426, 64.1466),
    ("honolulu", "Honolulu", -157.8583, 21.3069),
];

/// The built-in marker list, created once at load time.
pub fn default_markers() -> Vec<MarkerFeature> {
    CITIES
        .iter()
        .map(|(id, label, lon, lat)| {
            MarkerFeature::new(*id, *label, GeoPoint::from_static(*lon, *lat))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDot {
    /// `None` when the marker sits at the projection's antipode this frame.
    pub position: Option<Pos2>,
    pub radius_px: f32,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLabel {
    pub position: Option<Pos2>,
    pub text: String,
    pub visible: bool,
}

/// Marker layer with hover highlighting.
#[derive(Default)]
pub struct MarkerLayer {
    dots: KeyedGroup<String, MarkerDot>,
    labels: KeyedGroup<String, MarkerLabel>,
    hovered: Option<String>,
    revision: u64,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reprojects every marker and reconciles dots and labels.
    ///
    /// Hover state is reset: after a reprojection the pointer is no longer
    /// known to be over the same marker.
    pub fn render(
        &mut self,
        markers: &[MarkerFeature],
        projection: &MapProjection,
        revision: u64,
    ) -> ReconcileStats {
        self.hovered = None;

        let projected: Vec<(&MarkerFeature, Option<Pos2>)> = markers
            .iter()
            .map(|m| (m, projection.project(m.coordinate)))
            .collect();

        let dots = self.dots.reconcile(
            projected.iter(),
            |(m, _)| m.id.clone(),
            |_| MarkerDot {
                position: None,
                radius_px: MARKER_RADIUS_PX,
                hovered: false,
            },
            |(_, pos), dot| {
                dot.position = *pos;
                dot.radius_px = MARKER_RADIUS_PX;
                dot.hovered = false;
            },
        );

        let labels = self.labels.reconcile(
            projected.iter(),
            |(m, _)| m.id.clone(),
            |(m, _)| MarkerLabel {
                position: None,
                text: m.label.clone(),
                visible: false,
            },
            |(_, pos), label| {
                label.position = pos.map(|p| p + LABEL_OFFSET);
                label.visible = false;
            },
        );

        let unplaced = projected.iter().filter(|(_, pos)| pos.is_none()).count();
        if unplaced > 0 {
            log::debug!("{} marker(s) at the antipode, not drawn this frame", unplaced);
        }

        self.revision = revision;
        ReconcileStats {
            entered: dots.entered + labels.entered,
            updated: dots.updated + labels.updated,
            exited: dots.exited + labels.exited,
        }
    }

    /// Finds the marker closest to `pos` within the hit radius.
    pub fn hit_test(&self, pos: Pos2) -> Option<&str> {
        self.dots
            .iter()
            .filter_map(|entry| {
                let dist = (entry.element.position? - pos).length();
                (dist <= MARKER_HIT_RADIUS_PX).then_some((entry.key.as_str(), dist))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Updates hover highlighting from a pointer position.
    ///
    /// Returns true if the pointer is over a marker.
    pub fn pointer_moved(&mut self, pos: Option<Pos2>) -> bool {
        let hit = pos.and_then(|p| self.hit_test(p)).map(str::to_string);
        if hit == self.hovered {
            return hit.is_some();
        }

        if let Some(previous) = self.hovered.take() {
            self.set_hover(&previous, false);
        }
        if let Some(id) = &hit {
            self.set_hover(id, true);
        }
        self.hovered = hit;
        self.hovered.is_some()
    }

    fn set_hover(&mut self, id: &str, hovered: bool) {
        if let Some(dot) = self.dots.get_mut(id) {
            dot.element.hovered = hovered;
            dot.element.radius_px = if hovered {
                MARKER_HOVER_RADIUS_PX
            } else {
                MARKER_RADIUS_PX
            };
        }
        if let Some(label) = self.labels.get_mut(id) {
            label.element.visible = hovered;
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn dots(&self) -> &KeyedGroup<String, MarkerDot> {
        &self.dots
    }

    pub fn labels(&self) -> &KeyedGroup<String, MarkerLabel> {
        &self.labels
    }

    /// Projection revision the markers were last drawn with.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        self.dots.clear();
        self.labels.clear();
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Viewport;
    use std::collections::HashSet;

    fn projection_at(lon: f64, lat: f64) -> MapProjection {
        MapProjection::new(
            GeoPoint::new(lon, lat).unwrap(),
            120.0,
            Viewport::new(1000.0, 800.0),
        )
    }

    #[test]
    fn test_default_markers_are_valid_and_unique() {
        let markers = default_markers();
        let ids: HashSet<_> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), markers.len());
        for marker in &markers {
            assert!(marker.coordinate.validate().is_ok(), "{}", marker.id);
        }
    }

    #[test]
    fn test_dots_and_labels_are_paired() {
        let markers = default_markers();
        let mut layer = MarkerLayer::new();
        layer.render(&markers, &projection_at(0.0, 0.0), 1);
        assert_eq!(layer.dots().len(), markers.len());
        assert_eq!(layer.labels().len(), markers.len());
        assert!(layer.labels().iter().all(|l| !l.element.visible));
    }

    #[test]
    fn test_rerender_moves_markers_in_place() {
        let markers = default_markers();
        let mut layer = MarkerLayer::new();
        layer.render(&markers, &projection_at(0.0, 0.0), 1);
        let tokyo = layer.dots().get("tokyo").unwrap().clone();

        let stats = layer.render(&markers, &projection_at(139.6917, 35.6895), 2);
        assert_eq!(stats.entered, 0);
        assert_eq!(stats.exited, 0);

        let moved = layer.dots().get("tokyo").unwrap();
        assert_eq!(moved.id, tokyo.id);
        let pos = moved.element.position.unwrap();
        assert!((pos.x - 500.0).abs() < 1.0 && (pos.y - 400.0).abs() < 1.0);
    }

    #[test]
    fn test_hover_enlarges_and_shows_label() {
        let markers = default_markers();
        let mut layer = MarkerLayer::new();
        layer.render(&markers, &projection_at(-0.1276, 51.5072), 1);
        let london = Pos2::new(500.0, 400.0);

        assert!(layer.pointer_moved(Some(london + vec2(2.0, 2.0))));
        assert_eq!(layer.hovered(), Some("london"));
        let key = "london";
        assert_eq!(layer.dots().get(key).unwrap().element.radius_px, MARKER_HOVER_RADIUS_PX);
        assert!(layer.labels().get(key).unwrap().element.visible);

        assert!(!layer.pointer_moved(Some(london + vec2(100.0, 100.0))));
        assert_eq!(layer.dots().get(key).unwrap().element.radius_px, MARKER_RADIUS_PX);
        assert!(!layer.labels().get(key).unwrap().element.visible);
    }

    #[test]
    fn test_antipodal_marker_is_unplaced() {
        // Antipode of Tokyo
        let markers = vec![MarkerFeature::new(
            "tokyo",
            "Tokyo",
            GeoPoint::new(139.6917, 35.6895).unwrap(),
        )];
        let mut layer = MarkerLayer::new();
        layer.render(&markers, &projection_at(-40.3083, -35.6895), 1);

        let key = "tokyo";
        assert_eq!(layer.dots().get(key).unwrap().element.position, None);
        assert_eq!(layer.labels().get(key).unwrap().element.position, None);
        assert_eq!(layer.hit_test(Pos2::new(500.0, 400.0)), None);
    }
}
