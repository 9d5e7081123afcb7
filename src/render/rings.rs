//! Concentric reference rings around the projection center.
//!
//! Two built-in ring tables exist, one per [`RingMode`]. Because the map is
//! azimuthal equidistant, a ring of great-circle radius `d` is an exact
//! screen circle of radius `d / R * scale` around the projected center. The
//! projection edge (angular radius pi) is always drawn as an extra boundary
//! ring.

use super::reconcile::{KeyedGroup, ReconcileStats};
use super::tooltip::{Tooltip, TooltipContent};
use crate::error::EngineError;
use crate::geo::MapProjection;
use eframe::egui::Pos2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Mean Earth radius used to turn kilometres into angles.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius-mode values are divided by this before conversion to pixels, so
/// planetary radii sit in the same pixel range as the distance rings.
pub const RADIUS_MODE_DIVISOR: f64 = 10.0;

/// Pointer distance (px) from a ring's stroke that still counts as hovering it.
pub const RING_HOVER_TOLERANCE_PX: f32 = 4.0;

/// The active ring metric. Exactly one is displayed at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingMode {
    #[default]
    Distance,
    Radius,
}

impl RingMode {
    pub fn label(&self) -> &'static str {
        match self {
            RingMode::Distance => "Distance",
            RingMode::Radius => "Radius",
        }
    }

    pub fn all() -> &'static [RingMode] {
        &[RingMode::Distance, RingMode::Radius]
    }

    /// Fraction of the padded viewport extent used as pixels-per-radian.
    ///
    /// Distance mode keeps the whole globe (radius pi * scale) on-canvas;
    /// radius mode zooms in since its largest ring is about 1.1 rad.
    pub fn scale_factor(&self) -> f64 {
        match self {
            RingMode::Distance => 0.15,
            RingMode::Radius => 0.45,
        }
    }

    /// Built-in ring table for this mode.
    pub fn specs(&self) -> &'static [RingSpec] {
        match self {
            RingMode::Distance => DISTANCE_RINGS,
            RingMode::Radius => RADIUS_RINGS,
        }
    }
}

impl FromStr for RingMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(RingMode::Distance),
            "radius" => Ok(RingMode::Radius),
            other => Err(EngineError::InvalidInput(format!(
                "unknown ring mode '{}'",
                other
            ))),
        }
    }
}

/// One entry of a ring table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub metric_value: f64,
    pub unit: &'static str,
    pub display_metric: RingMode,
}

impl RingSpec {
    /// Great-circle distance (km) the ring is drawn at.
    pub fn display_km(&self) -> f64 {
        match self.display_metric {
            RingMode::Distance => self.metric_value,
            RingMode::Radius => self.metric_value / RADIUS_MODE_DIVISOR,
        }
    }

    /// Pixel radius of the ring for a projection scale (px per radian).
    pub fn radius_px(&self, scale_px: f64) -> f64 {
        self.display_km() / EARTH_RADIUS_KM * scale_px
    }

    /// Human-readable value for the tooltip.
    pub fn formatted_value(&self) -> String {
        match self.display_metric {
            RingMode::Distance => format!("{} {}", format_thousands(self.metric_value), self.unit),
            RingMode::Radius => format!(
                "{} {} radius",
                format_thousands(self.metric_value),
                self.unit
            ),
        }
    }
}

const DISTANCE_RINGS: &[RingSpec] = &[
    RingSpec {
        id: "short-haul",
        label: "Short-haul flight",
        metric_value: 1_500.0,
        unit: "km",
        display_metric: RingMode::Distance,
    },
    RingSpec {
        id: "medium-haul",
        label: "Medium-haul flight",
        metric_value: 4_000.0,
        unit: "km",
        display_metric: RingMode::Distance,
    },
    RingSpec {
        id: "long-haul",
        label: "Long-haul flight",
        metric_value: 8_000.0,
        unit: "km",
        display_metric: RingMode::Distance,
    },
    RingSpec {
        id: "ultra-long-haul",
        label: "Ultra long-haul flight",
        metric_value: 15_000.0,
        unit: "km",
        display_metric: RingMode::Distance,
    },
];

const RADIUS_RINGS: &[RingSpec] = &[
    RingSpec {
        id: "moon",
        label: "Moon",
        metric_value: 1_737.4,
        unit: "km",
        display_metric: RingMode::Radius,
    },
    RingSpec {
        id: "mars",
        label: "Mars",
        metric_value: 3_389.5,
        unit: "km",
        display_metric: RingMode::Radius,
    },
    RingSpec {
        id: "earth",
        label: "Earth",
        metric_value: 6_371.0,
        unit: "km",
        display_metric: RingMode::Radius,
    },
    RingSpec {
        id: "neptune",
        label: "Neptune",
        metric_value: 24_622.0,
        unit: "km",
        display_metric: RingMode::Radius,
    },
    RingSpec {
        id: "saturn",
        label: "Saturn",
        metric_value: 58_232.0,
        unit: "km",
        display_metric: RingMode::Radius,
    },
    RingSpec {
        id: "jupiter",
        label: "Jupiter",
        metric_value: 69_911.0,
        unit: "km",
        display_metric: RingMode::Radius,
    },
];

/// Key of a ring element: table index, or the permanent boundary ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingKey {
    Reference(usize),
    Boundary,
}

/// A drawn ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RingCircle {
    pub center: Pos2,
    pub radius_px: f32,
    pub label: String,
    pub value_text: String,
}

struct RingDatum {
    key: RingKey,
    radius_px: f64,
    spec: Option<&'static RingSpec>,
}

/// Reference ring layer with hover tooltip.
#[derive(Default)]
pub struct RingLayer {
    circles: KeyedGroup<RingKey, RingCircle>,
    tooltip: Tooltip,
    mode: Option<RingMode>,
    revision: u64,
}

impl RingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the rings for `mode` against the current projection.
    ///
    /// Any visible tooltip is hidden first. On a mode switch every ring of
    /// the previous mode exits before the new set enters.
    pub fn render(
        &mut self,
        mode: RingMode,
        projection: &MapProjection,
        revision: u64,
    ) -> ReconcileStats {
        self.tooltip.leave();

        let mut stats = ReconcileStats::default();
        if self.mode.is_some_and(|previous| previous != mode) {
            stats.exited += self.circles.retain(|key| *key == RingKey::Boundary);
        }

        let center = projection.origin();
        let scale = projection.scale_px();
        let data = mode
            .specs()
            .iter()
            .enumerate()
            .map(|(i, spec)| RingDatum {
                key: RingKey::Reference(i),
                radius_px: spec.radius_px(scale),
                spec: Some(spec),
            })
            .chain(std::iter::once(RingDatum {
                key: RingKey::Boundary,
                radius_px: PI * scale,
                spec: None,
            }));

        let pass = self.circles.reconcile(
            data,
            |d| d.key,
            |d| {
                if let Some(spec) = d.spec {
                    log::trace!("Ring {} entered", spec.id);
                }
                RingCircle {
                    center,
                    radius_px: 0.0,
                    label: d.spec.map(|s| s.label.to_string()).unwrap_or_default(),
                    value_text: d.spec.map(|s| s.formatted_value()).unwrap_or_default(),
                }
            },
            |d, circle| {
                circle.center = center;
                circle.radius_px = d.radius_px as f32;
                if let Some(spec) = d.spec {
                    circle.label = spec.label.to_string();
                    circle.value_text = spec.formatted_value();
                }
            },
        );

        stats.entered += pass.entered;
        stats.updated += pass.updated;
        stats.exited += pass.exited;

        self.mode = Some(mode);
        self.revision = revision;
        stats
    }

    /// Finds the reference ring under `pos`; the boundary ring never matches.
    pub fn hit_test(&self, pos: Pos2) -> Option<usize> {
        self.circles
            .iter()
            .filter_map(|entry| match entry.key {
                RingKey::Reference(i) => {
                    let off = ((pos - entry.element.center).length() - entry.element.radius_px).abs();
                    (off <= RING_HOVER_TOLERANCE_PX).then_some((i, off))
                }
                RingKey::Boundary => None,
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Drives the tooltip from a pointer position (`None` = pointer left the canvas).
    pub fn pointer_moved(&mut self, pos: Option<Pos2>) {
        let hit = pos.and_then(|p| self.hit_test(p).map(|i| (i, p)));

        match (self.tooltip.ring_index(), hit) {
            (Some(current), Some((index, p))) if current == index => self.tooltip.move_to(p),
            (_, Some((index, p))) => {
                let Some(entry) = self.circles.get(&RingKey::Reference(index)) else {
                    return;
                };
                self.tooltip.enter(TooltipContent {
                    ring_index: index,
                    title: entry.element.label.clone(),
                    detail: entry.element.value_text.clone(),
                    anchor: p,
                });
            }
            (Some(_), None) => self.tooltip.leave(),
            (None, None) => {}
        }
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn circles(&self) -> &KeyedGroup<RingKey, RingCircle> {
        &self.circles
    }

    pub fn mode(&self) -> Option<RingMode> {
        self.mode
    }

    /// Projection revision the rings were last drawn with.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        self.circles.clear();
        self.tooltip.leave();
        self.mode = None;
    }
}

/// Formats a value rounded to an integer with comma thousands separators.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{compute_scale, GeoPoint, Viewport};

    fn projection(mode: RingMode) -> MapProjection {
        let viewport = Viewport::new(1000.0, 800.0);
        MapProjection::new(
            GeoPoint::new(0.0, 0.0).unwrap(),
            compute_scale(viewport, mode, 20.0),
            viewport,
        )
    }

    fn radii(layer: &RingLayer) -> Vec<(RingKey, f32)> {
        layer
            .circles()
            .iter()
            .map(|e| (e.key, e.element.radius_px))
            .collect()
    }

    #[test]
    fn test_ring_count_includes_boundary() {
        for mode in RingMode::all() {
            let mut layer = RingLayer::new();
            layer.render(*mode, &projection(*mode), 1);
            assert_eq!(layer.circles().len(), mode.specs().len() + 1);
            assert!(layer.circles().get(&RingKey::Boundary).is_some());
        }
    }

    #[test]
    fn test_mode_switch_leaves_no_orphans() {
        let mut layer = RingLayer::new();
        layer.render(RingMode::Radius, &projection(RingMode::Radius), 1);
        assert_eq!(layer.circles().len(), RADIUS_RINGS.len() + 1);

        let stats = layer.render(RingMode::Distance, &projection(RingMode::Distance), 2);
        assert_eq!(layer.circles().len(), DISTANCE_RINGS.len() + 1);
        assert_eq!(stats.exited, RADIUS_RINGS.len());
        assert_eq!(stats.entered, DISTANCE_RINGS.len());
        assert!(layer
            .circles()
            .get(&RingKey::Reference(RADIUS_RINGS.len() - 1))
            .is_none());
    }

    #[test]
    fn test_boundary_ring_is_at_pi() {
        let projection = projection(RingMode::Distance);
        let mut layer = RingLayer::new();
        layer.render(RingMode::Distance, &projection, 1);
        let boundary = &layer.circles().get(&RingKey::Boundary).unwrap().element;
        assert!((boundary.radius_px as f64 - PI * projection.scale_px()).abs() < 1e-3);
        assert_eq!(boundary.center, Pos2::new(500.0, 400.0));
    }

    #[test]
    fn test_radius_mode_divides_values_by_ten() {
        let jupiter = RADIUS_RINGS[5];
        assert!((jupiter.display_km() - 6_991.1).abs() < 1e-9);
        let scale = 300.0;
        assert!((jupiter.radius_px(scale) - 6_991.1 / EARTH_RADIUS_KM * scale).abs() < 1e-9);
    }

    #[test]
    fn test_distance_ring_matches_projected_point() {
        let projection = projection(RingMode::Distance);
        let mut layer = RingLayer::new();
        layer.render(RingMode::Distance, &projection, 1);

        // 4000 km due north of (0, 0)
        let lat = (4_000.0 / EARTH_RADIUS_KM).to_degrees();
        let pos = projection.project(GeoPoint::new(0.0, lat).unwrap()).unwrap();
        let ring = &layer.circles().get(&RingKey::Reference(1)).unwrap().element;
        assert!(((pos - ring.center).length() - ring.radius_px).abs() < 0.01);
    }

    #[test]
    fn test_mode_round_trip_restores_radii() {
        let mut layer = RingLayer::new();
        layer.render(RingMode::Distance, &projection(RingMode::Distance), 1);
        let before = radii(&layer);

        layer.render(RingMode::Radius, &projection(RingMode::Radius), 2);
        layer.render(RingMode::Distance, &projection(RingMode::Distance), 3);
        assert_eq!(radii(&layer), before);
    }

    #[test]
    fn test_hover_shows_and_hides_tooltip() {
        let mut layer = RingLayer::new();
        layer.render(RingMode::Distance, &projection(RingMode::Distance), 1);
        let ring = layer.circles().get(&RingKey::Reference(2)).unwrap().element.clone();
        let on_ring = ring.center + eframe::egui::vec2(ring.radius_px, 0.0);

        layer.pointer_moved(Some(on_ring));
        let content = layer.tooltip().content().unwrap();
        assert_eq!(content.ring_index, 2);
        assert_eq!(content.title, "Long-haul flight");
        assert_eq!(content.detail, "8,000 km");

        layer.pointer_moved(Some(on_ring + eframe::egui::vec2(0.0, 1.0)));
        assert_eq!(layer.tooltip().ring_index(), Some(2));

        layer.pointer_moved(None);
        assert!(!layer.tooltip().is_visible());
    }

    #[test]
    fn test_boundary_ring_has_no_hover() {
        let projection = projection(RingMode::Distance);
        let mut layer = RingLayer::new();
        layer.render(RingMode::Distance, &projection, 1);
        let edge = projection.origin() + eframe::egui::vec2(projection.boundary_radius_px() as f32, 0.0);
        assert_eq!(layer.hit_test(edge), None);
        layer.pointer_moved(Some(edge));
        assert!(!layer.tooltip().is_visible());
    }

    #[test]
    fn test_rerender_hides_tooltip() {
        let mut layer = RingLayer::new();
        let projection = projection(RingMode::Distance);
        layer.render(RingMode::Distance, &projection, 1);
        let ring = layer.circles().get(&RingKey::Reference(0)).unwrap().element.clone();
        layer.pointer_moved(Some(ring.center + eframe::egui::vec2(0.0, ring.radius_px)));
        assert!(layer.tooltip().is_visible());

        layer.render(RingMode::Distance, &projection, 2);
        assert!(!layer.tooltip().is_visible());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("distance".parse::<RingMode>().unwrap(), RingMode::Distance);
        assert_eq!(" Radius ".parse::<RingMode>().unwrap(), RingMode::Radius);
        assert!(matches!(
            "area".parse::<RingMode>(),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1_737.4), "1,737");
        assert_eq!(format_thousands(69_911.0), "69,911");
        assert_eq!(format_thousands(1_234_567.0), "1,234,567");
        assert_eq!(format_thousands(-4_000.0), "-4,000");
    }
}
