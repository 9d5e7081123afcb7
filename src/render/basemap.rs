//! Country polygon basemap.
//!
//! Each boundary feature becomes one shape, keyed by its identity key. A
//! redraw re-evaluates the projected geometry of existing shapes in place;
//! keys that disappear from the data have their shape removed.

use super::reconcile::{KeyedGroup, ReconcileStats};
use crate::geo::{BoundaryFeature, MapProjection, PolygonRings};
use earcutr::earcut;
use eframe::egui::Pos2;
use geo_types::Coord;

/// A screen jump longer than this fraction of the boundary-ring radius
/// between consecutive vertices is a wrap across the projection edge.
const SEAM_FRACTION: f32 = 0.5;

/// A stroked run of screen points.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub points: Vec<Pos2>,
    pub closed: bool,
}

/// Triangulated interior of a polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillMesh {
    pub vertices: Vec<Pos2>,
    pub indices: Vec<u32>,
}

impl FillMesh {
    /// Whether `pos` falls inside any triangle of the mesh.
    pub fn contains(&self, pos: Pos2) -> bool {
        self.indices.chunks_exact(3).any(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| self.vertices[i as usize]);
            point_in_triangle(pos, a, b, c)
        })
    }
}

/// Barycentric point-in-triangle test.
fn point_in_triangle(p: Pos2, a: Pos2, b: Pos2, c: Pos2) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot02 = v0.dot(v2);
    let dot11 = v1.dot(v1);
    let dot12 = v1.dot(v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < 1e-8 {
        return false;
    }
    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;
    u >= 0.0 && v >= 0.0 && (u + v) <= 1.0
}

/// One projected polygon of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPolygon {
    pub outlines: Vec<Outline>,
    /// `None` when the polygon wraps across the projection edge.
    pub fill: Option<FillMesh>,
}

/// A drawn country shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryShape {
    pub name: Option<String>,
    pub polygons: Vec<ProjectedPolygon>,
}

/// Polygon basemap layer.
#[derive(Default)]
pub struct BasemapLayer {
    shapes: KeyedGroup<String, BoundaryShape>,
    revision: u64,
}

impl BasemapLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles shapes against `features` and reprojects their geometry.
    pub fn render(
        &mut self,
        features: &[BoundaryFeature],
        projection: &MapProjection,
        revision: u64,
    ) -> ReconcileStats {
        let seam_px = projection.boundary_radius_px() as f32 * SEAM_FRACTION;

        let stats = self.shapes.reconcile(
            features.iter(),
            |f| f.key.clone(),
            |f| BoundaryShape {
                name: f.name.clone(),
                polygons: Vec::new(),
            },
            |f, shape| {
                shape.name.clone_from(&f.name);
                shape.polygons = f
                    .polygons
                    .iter()
                    .map(|p| project_polygon(p, projection, seam_px))
                    .collect();
            },
        );

        self.revision = revision;
        stats
    }

    /// Finds the filled shape under `pos`, returning its key and shape.
    ///
    /// Shapes that wrap across the projection edge have no fill and are
    /// never picked.
    pub fn shape_at(&self, pos: Pos2) -> Option<(&str, &BoundaryShape)> {
        self.shapes
            .iter()
            .rev()
            .find(|entry| {
                entry
                    .element
                    .polygons
                    .iter()
                    .filter_map(|p| p.fill.as_ref())
                    .any(|fill| fill.contains(pos))
            })
            .map(|entry| (entry.key.as_str(), &entry.element))
    }

    pub fn shapes(&self) -> &KeyedGroup<String, BoundaryShape> {
        &self.shapes
    }

    /// Projection revision the basemap was last drawn with.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

/// Result of projecting one ring.
struct ProjectedRing {
    outlines: Vec<Outline>,
    /// Full closed ring, when no vertex was dropped and no seam was crossed.
    intact: Option<Vec<Pos2>>,
}

fn project_polygon(polygon: &PolygonRings, projection: &MapProjection, seam_px: f32) -> ProjectedPolygon {
    let exterior = project_ring(&polygon.exterior, projection, seam_px);
    let holes: Vec<ProjectedRing> = polygon
        .holes
        .iter()
        .map(|ring| project_ring(ring, projection, seam_px))
        .collect();

    // A ring around the antipode projects to a loop hugging the edge, and
    // its interior on screen is the outside of the polygon.
    let center = projection.center();
    let antipode = Coord {
        x: center.longitude() + 180.0,
        y: -center.latitude(),
    };
    let wraps_antipode = exterior.intact.is_some() && ring_encloses(&polygon.exterior, antipode);

    let fill = match &exterior.intact {
        Some(ext) if !wraps_antipode && holes.iter().all(|h| h.intact.is_some()) => {
            let hole_points: Vec<&[Pos2]> = holes
                .iter()
                .filter_map(|h| h.intact.as_deref())
                .collect();
            triangulate(ext, &hole_points)
        }
        _ => None,
    };

    let mut outlines = exterior.outlines;
    outlines.extend(holes.into_iter().flat_map(|h| h.outlines));

    ProjectedPolygon { outlines, fill }
}

/// Projects a ring, splitting it wherever a vertex is undefined or the
/// path jumps across the projection edge.
fn project_ring(ring: &[Coord<f64>], projection: &MapProjection, seam_px: f32) -> ProjectedRing {
    let mut runs: Vec<Vec<Pos2>> = Vec::new();
    let mut current: Vec<Pos2> = Vec::with_capacity(ring.len());
    let mut broken = false;

    for coord in ring {
        match projection.project_coord(*coord) {
            Some(pos) => {
                if let Some(last) = current.last() {
                    if (pos - *last).length() > seam_px {
                        broken = true;
                        runs.push(std::mem::take(&mut current));
                    }
                }
                current.push(pos);
            }
            None => {
                broken = true;
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    if !broken && runs.len() == 1 {
        let mut points = runs.pop().unwrap_or_default();
        drop_closing_duplicate(&mut points);
        if points.len() < 3 {
            return ProjectedRing {
                outlines: Vec::new(),
                intact: None,
            };
        }
        return ProjectedRing {
            outlines: vec![Outline {
                points: points.clone(),
                closed: true,
            }],
            intact: Some(points),
        };
    }

    ProjectedRing {
        outlines: runs
            .into_iter()
            .filter(|run| run.len() >= 2)
            .map(|points| Outline {
                points,
                closed: false,
            })
            .collect(),
        intact: None,
    }
}

/// Even-odd test of a lon/lat ring against `point`. Longitudes are
/// unwrapped along the ring, so rings crossing the antimeridian work.
fn ring_encloses(ring: &[Coord<f64>], point: Coord<f64>) -> bool {
    let Some(first) = ring.first() else {
        return false;
    };

    let mut unwrapped = Vec::with_capacity(ring.len());
    let mut lon = first.x;
    let mut prev = first.x;
    for coord in ring {
        let mut delta = coord.x - prev;
        if delta > 180.0 {
            delta -= 360.0;
        } else if delta < -180.0 {
            delta += 360.0;
        }
        lon += delta;
        prev = coord.x;
        unwrapped.push(Coord { x: lon, y: coord.y });
    }

    // Bring the point into the 360 degree window around the first vertex
    let px = first.x - 180.0 + (point.x - first.x + 180.0).rem_euclid(360.0);
    let py = point.y;

    let mut inside = false;
    let mut j = unwrapped.len() - 1;
    for i in 0..unwrapped.len() {
        let (a, b) = (unwrapped[i], unwrapped[j]);
        if (a.y > py) != (b.y > py) && px < (b.x - a.x) * (py - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn triangulate(exterior: &[Pos2], holes: &[&[Pos2]]) -> Option<FillMesh> {
    let mut vertices: Vec<Pos2> = exterior.to_vec();
    let mut hole_indices: Vec<usize> = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len());
        vertices.extend_from_slice(hole);
    }

    let coords: Vec<f64> = vertices
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();

    let indices = match earcut(&coords, &hole_indices, 2) {
        Ok(ix) => ix,
        Err(e) => {
            log::debug!("Polygon triangulation failed: {:?}", e);
            return None;
        }
    };
    if indices.is_empty() {
        return None;
    }

    Some(FillMesh {
        vertices,
        indices: indices.into_iter().map(|i| i as u32).collect(),
    })
}

fn drop_closing_duplicate(points: &mut Vec<Pos2>) {
    if points.len() >= 2 && points.first() == points.last() {
        points.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::boundary::tests::square;
    use crate::geo::{GeoPoint, Viewport};
    use pretty_assertions::assert_eq;

    fn projection_at(lon: f64, lat: f64) -> MapProjection {
        MapProjection::new(
            GeoPoint::new(lon, lat).unwrap(),
            114.0,
            Viewport::new(1000.0, 800.0),
        )
    }

    fn keys(layer: &BasemapLayer) -> Vec<String> {
        layer.shapes().iter().map(|e| e.key.clone()).collect()
    }

    #[test]
    fn test_removed_feature_exits() {
        let projection = projection_at(0.0, 0.0);
        let mut layer = BasemapLayer::new();

        let features = vec![
            square("AAA", 0.0, 0.0),
            square("BBB", 20.0, 10.0),
            square("CCC", -30.0, -10.0),
        ];
        let stats = layer.render(&features, &projection, 1);
        assert_eq!(stats.entered, 3);

        let remaining = vec![features[0].clone(), features[2].clone()];
        let stats = layer.render(&remaining, &projection, 2);
        assert_eq!(stats.exited, 1);
        assert_eq!(stats.updated, 2);
        assert_eq!(keys(&layer), vec!["AAA".to_string(), "CCC".to_string()]);
        assert!(layer.shapes().get("BBB").is_none());
    }

    #[test]
    fn test_navigation_updates_shapes_in_place() {
        let features = vec![square("AAA", 10.0, 10.0)];
        let mut layer = BasemapLayer::new();
        layer.render(&features, &projection_at(0.0, 0.0), 1);
        let before = layer.shapes().get("AAA").unwrap().clone();

        let stats = layer.render(&features, &projection_at(10.0, 10.0), 2);
        assert_eq!(stats.entered, 0);
        let after = layer.shapes().get("AAA").unwrap();
        assert_eq!(after.id, before.id);
        assert_ne!(after.element.polygons, before.element.polygons);
        assert_eq!(layer.revision(), 2);
    }

    #[test]
    fn test_simple_polygon_is_closed_and_filled() {
        let features = vec![square("AAA", 0.0, 0.0)];
        let mut layer = BasemapLayer::new();
        layer.render(&features, &projection_at(0.0, 0.0), 1);

        let polygon = &layer.shapes().get("AAA").unwrap().element.polygons[0];
        assert_eq!(polygon.outlines.len(), 1);
        assert!(polygon.outlines[0].closed);
        assert_eq!(polygon.outlines[0].points.len(), 4);
        let fill = polygon.fill.as_ref().unwrap();
        assert_eq!(fill.indices.len(), 6); // two triangles
    }

    #[test]
    fn test_polygon_across_projection_edge_is_not_filled() {
        // Square around (180, 0) viewed from (0, 0) straddles the antipode
        let features = vec![square("EDGE", 180.0, 0.0)];
        let mut layer = BasemapLayer::new();
        layer.render(&features, &projection_at(0.0, 0.0), 1);

        let polygon = &layer.shapes().get("EDGE").unwrap().element.polygons[0];
        assert!(polygon.fill.is_none());
        assert!(polygon.outlines.iter().all(|o| !o.closed));
    }

    #[test]
    fn test_polygon_around_antipode_is_not_filled() {
        // Dense circle of radius 5 degrees around (180, 0), viewed from (0, 0)
        let exterior: Vec<Coord<f64>> = (0..=72)
            .map(|i| {
                let theta = (i as f64 * 5.0).to_radians();
                Coord {
                    x: 180.0 + 5.0 * theta.cos(),
                    y: 5.0 * theta.sin(),
                }
            })
            .collect();
        let features = vec![BoundaryFeature::new(
            "ANTI",
            None,
            vec![PolygonRings {
                exterior,
                holes: Vec::new(),
            }],
        )];
        let projection = projection_at(0.0, 0.0);
        let mut layer = BasemapLayer::new();
        layer.render(&features, &projection, 1);

        let polygon = &layer.shapes().get("ANTI").unwrap().element.polygons[0];
        assert!(polygon.fill.is_none());
        assert_eq!(polygon.outlines.len(), 1);
        assert!(polygon.outlines[0].closed);
        assert!(layer.shape_at(projection.origin()).is_none());
    }

    #[test]
    fn test_ring_encloses_across_antimeridian() {
        let ring = [
            Coord { x: 175.0, y: -5.0 },
            Coord { x: -175.0, y: -5.0 },
            Coord { x: -175.0, y: 5.0 },
            Coord { x: 175.0, y: 5.0 },
            Coord { x: 175.0, y: -5.0 },
        ];
        assert!(ring_encloses(&ring, Coord { x: 180.0, y: 0.0 }));
        assert!(ring_encloses(&ring, Coord { x: -179.0, y: 1.0 }));
        assert!(!ring_encloses(&ring, Coord { x: 0.0, y: 0.0 }));
        assert!(!ring_encloses(&ring, Coord { x: 180.0, y: 6.0 }));
    }

    #[test]
    fn test_shape_at_picks_filled_polygon() {
        let projection = projection_at(0.0, 0.0);
        let features = vec![square("AAA", 0.0, 0.0), square("BBB", 20.0, 10.0)];
        let mut layer = BasemapLayer::new();
        layer.render(&features, &projection, 1);

        let inside = projection
            .project(GeoPoint::new(20.5, 10.5).unwrap())
            .unwrap();
        let (key, shape) = layer.shape_at(inside).unwrap();
        assert_eq!(key, "BBB");
        assert_eq!(shape.name.as_deref(), Some("bbb"));

        let outside = projection
            .project(GeoPoint::new(10.0, -30.0).unwrap())
            .unwrap();
        assert!(layer.shape_at(outside).is_none());
    }

    #[test]
    fn test_holes_are_triangulated() {
        let outer = square("HOLE", 0.0, 0.0).polygons[0].exterior.clone();
        let inner: Vec<Coord<f64>> = outer
            .iter()
            .map(|c| Coord {
                x: c.x * 0.5,
                y: c.y * 0.5,
            })
            .collect();
        let feature = BoundaryFeature::new(
            "HOLE",
            None,
            vec![PolygonRings {
                exterior: outer,
                holes: vec![inner],
            }],
        );
        let mut layer = BasemapLayer::new();
        layer.render(&[feature], &projection_at(0.0, 0.0), 1);

        let polygon = &layer.shapes().get("HOLE").unwrap().element.polygons[0];
        assert_eq!(polygon.outlines.len(), 2);
        let fill = polygon.fill.as_ref().unwrap();
        assert_eq!(fill.vertices.len(), 8);
        // A square ring with a square hole needs eight triangles
        assert_eq!(fill.indices.len(), 24);
    }
}
