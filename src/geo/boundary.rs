//! Boundary (country polygon) features and GeoJSON parsing.

use crate::error::EngineError;
use geo_types::Coord;
use geojson::{feature::Id, Feature, GeoJson, Geometry, JsonObject, Value};
use std::collections::HashSet;

/// Property names tried, in order, for a feature's identity key.
const KEY_PROPERTIES: &[&str] = &["ISO_A3", "iso_a3", "ADM0_A3", "ISO3166-1-Alpha-3"];

/// Property names tried for a display name.
const NAME_PROPERTIES: &[&str] = &["name", "NAME", "ADMIN", "admin"];

/// Natural Earth writes this in place of a missing ISO code.
const MISSING_CODE: &str = "-99";

/// A ring of (lon, lat) coordinates.
pub type Ring = Vec<Coord<f64>>;

/// One polygon: exterior ring followed by its holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRings {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// A country-like polygon feature with a stable identity key.
///
/// The key (typically an ISO 3166 alpha-3 code) matches rendered shapes to
/// incoming data across redraws.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub key: String,
    pub name: Option<String>,
    pub polygons: Vec<PolygonRings>,
}

impl BoundaryFeature {
    pub fn new(key: impl Into<String>, name: Option<String>, polygons: Vec<PolygonRings>) -> Self {
        Self {
            key: key.into(),
            name,
            polygons,
        }
    }

    /// Number of coordinates across all rings.
    pub fn vertex_count(&self) -> usize {
        self.polygons
            .iter()
            .map(|p| p.exterior.len() + p.holes.iter().map(Vec::len).sum::<usize>())
            .sum()
    }
}

/// Parses a GeoJSON document into boundary features.
///
/// Only polygonal geometry is kept. Features without a usable identity key
/// are skipped with a warning, as are later features repeating a key.
pub fn parse_feature_collection(geojson_str: &str) -> Result<Vec<BoundaryFeature>, EngineError> {
    let geojson: GeoJson = geojson_str
        .parse()
        .map_err(|e| EngineError::DataLoadFailure(format!("Failed to parse GeoJSON: {}", e)))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(EngineError::DataLoadFailure(
                "expected a feature collection, found a bare geometry".to_string(),
            ))
        }
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(features.len());
    let mut skipped = 0usize;

    for (idx, feature) in features.iter().enumerate() {
        let Some(boundary) = convert_feature(feature) else {
            skipped += 1;
            continue;
        };
        if !seen.insert(boundary.key.clone()) {
            log::warn!(
                "Duplicate boundary key {} at feature {}, keeping the first",
                boundary.key,
                idx
            );
            skipped += 1;
            continue;
        }
        out.push(boundary);
    }

    if skipped > 0 {
        log::warn!("Skipped {} of {} boundary features", skipped, features.len());
    }

    Ok(out)
}

fn convert_feature(feature: &Feature) -> Option<BoundaryFeature> {
    let properties = feature.properties.as_ref();

    let Some(key) = identity_key(feature.id.as_ref(), properties) else {
        log::warn!("Boundary feature without an identity key, skipping");
        return None;
    };

    let name = properties.and_then(|p| string_property(p, NAME_PROPERTIES));

    let polygons = feature
        .geometry
        .as_ref()
        .map(convert_geometry)
        .unwrap_or_default();

    if polygons.is_empty() {
        log::debug!("Boundary feature {} has no polygonal geometry", key);
        return None;
    }

    Some(BoundaryFeature {
        key,
        name,
        polygons,
    })
}

/// Resolves the identity key: ISO-style properties first, then the feature
/// id, then the name.
fn identity_key(id: Option<&Id>, properties: Option<&JsonObject>) -> Option<String> {
    if let Some(key) = properties.and_then(|p| string_property(p, KEY_PROPERTIES)) {
        return Some(key);
    }

    match id {
        Some(Id::String(s)) if is_usable_key(s) => return Some(s.trim().to_string()),
        Some(Id::Number(n)) => return Some(n.to_string()),
        _ => {}
    }

    properties.and_then(|p| string_property(p, NAME_PROPERTIES))
}

fn string_property(properties: &JsonObject, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| properties.get(*name))
        .filter_map(|value| value.as_str())
        .find(|s| is_usable_key(s))
        .map(|s| s.trim().to_string())
}

fn is_usable_key(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != MISSING_CODE
}

fn convert_geometry(geometry: &Geometry) -> Vec<PolygonRings> {
    match &geometry.value {
        Value::Polygon(rings) => convert_polygon(rings).into_iter().collect(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| convert_polygon(rings))
            .collect(),
        Value::GeometryCollection(geometries) => {
            geometries.iter().flat_map(convert_geometry).collect()
        }
        _ => Vec::new(),
    }
}

fn convert_polygon(rings: &[Vec<Vec<f64>>]) -> Option<PolygonRings> {
    let (exterior, holes) = rings.split_first()?;
    let exterior = convert_ring(exterior);
    if exterior.len() < 3 {
        return None;
    }
    let holes = holes
        .iter()
        .map(|ring| convert_ring(ring))
        .filter(|ring| ring.len() >= 3)
        .collect();
    Some(PolygonRings { exterior, holes })
}

fn convert_ring(ring: &[Vec<f64>]) -> Ring {
    ring.iter()
        .filter(|c| c.len() >= 2)
        .map(|c| Coord { x: c[0], y: c[1] })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Square polygon feature around (lon, lat) used across render tests.
    pub(crate) fn square(key: &str, lon: f64, lat: f64) -> BoundaryFeature {
        let d = 2.0;
        BoundaryFeature::new(
            key,
            Some(key.to_lowercase()),
            vec![PolygonRings {
                exterior: vec![
                    Coord { x: lon - d, y: lat - d },
                    Coord { x: lon + d, y: lat - d },
                    Coord { x: lon + d, y: lat + d },
                    Coord { x: lon - d, y: lat + d },
                    Coord { x: lon - d, y: lat - d },
                ],
                holes: Vec::new(),
            }],
        )
    }

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "ISO_A3": "FRA", "NAME": "France" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,40],[5,40],[5,45],[0,45],[0,40]]] }
            },
            {
                "type": "Feature",
                "properties": { "ISO_A3": "-99", "ADM0_A3": "NOR", "name": "Norway" },
                "geometry": { "type": "MultiPolygon", "coordinates": [
                    [[[5,58],[10,58],[10,62],[5,62],[5,58]]],
                    [[[15,68],[20,68],[20,70],[15,70],[15,68]]]
                ] }
            },
            {
                "type": "Feature",
                "id": "ATA",
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": [
                    [[-10,-80],[10,-80],[10,-70],[-10,-70],[-10,-80]],
                    [[-1,-76],[1,-76],[1,-74],[-1,-74],[-1,-76]]
                ] }
            },
            {
                "type": "Feature",
                "properties": { "kind": "unnamed" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] }
            },
            {
                "type": "Feature",
                "properties": { "ISO_A3": "XLN" },
                "geometry": { "type": "LineString", "coordinates": [[0,0],[1,1]] }
            },
            {
                "type": "Feature",
                "properties": { "ISO_A3": "FRA" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_keeps_keyed_polygons() {
        let features = parse_feature_collection(COLLECTION).unwrap();
        let keys: Vec<&str> = features.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["FRA", "NOR", "ATA"]);
    }

    #[test]
    fn test_missing_iso_code_falls_back() {
        let features = parse_feature_collection(COLLECTION).unwrap();
        let norway = &features[1];
        assert_eq!(norway.key, "NOR");
        assert_eq!(norway.name.as_deref(), Some("Norway"));
        assert_eq!(norway.polygons.len(), 2);
    }

    #[test]
    fn test_holes_are_preserved() {
        let features = parse_feature_collection(COLLECTION).unwrap();
        let antarctica = &features[2];
        assert_eq!(antarctica.polygons[0].holes.len(), 1);
        assert_eq!(antarctica.vertex_count(), 10);
    }

    #[test]
    fn test_invalid_document_is_a_load_failure() {
        let err = parse_feature_collection("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::DataLoadFailure(_)));
    }

    #[test]
    fn test_bare_geometry_is_rejected() {
        let doc = r#"{ "type": "Point", "coordinates": [0, 0] }"#;
        assert!(parse_feature_collection(doc).is_err());
    }
}
