//! Geographic and screen-space value types.

use crate::error::EngineError;
use eframe::egui::{Pos2, Vec2};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// A validated geographic coordinate in degrees.
///
/// Longitude is within [-180, 180] and latitude within [-90, 90]; both are
/// finite. Construct through [`GeoPoint::new`] so the bounds hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range values.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, EngineError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "non-finite coordinate ({longitude}, {latitude})"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(EngineError::InvalidInput(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(EngineError::InvalidInput(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Const constructor for built-in tables whose values are known to be in range.
    pub(crate) const fn from_static(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Re-checks the bounds, for values that arrived through deserialization.
    pub fn validate(self) -> Result<Self, EngineError> {
        Self::new(self.longitude, self.latitude)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Coord {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{} {:.4}°{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// Pixel size of the drawing container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True once the host has laid the container out with a nonzero area.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Geometric center in container-local coordinates.
    pub fn center(&self) -> Pos2 {
        Pos2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl From<Vec2> for Viewport {
    fn from(size: Vec2) -> Self {
        Self::new(size.x, size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_accepts_bounds() {
        assert!(GeoPoint::new(180.0, 90.0).is_ok());
        assert!(GeoPoint::new(-180.0, -90.0).is_ok());
        assert!(GeoPoint::new(139.6917, 35.6895).is_ok());
    }

    #[test]
    fn test_geo_point_rejects_out_of_domain() {
        assert!(matches!(
            GeoPoint::new(180.5, 0.0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -91.0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_viewport_validity() {
        assert!(Viewport::new(1000.0, 800.0).is_valid());
        assert!(!Viewport::new(0.0, 800.0).is_valid());
        assert!(!Viewport::new(1000.0, 0.0).is_valid());
        assert_eq!(Viewport::new(1000.0, 800.0).center(), Pos2::new(500.0, 400.0));
    }

    #[test]
    fn test_display_uses_hemispheres() {
        let point = GeoPoint::new(-74.006, 40.7128).unwrap();
        assert_eq!(point.to_string(), "40.7128°N 74.0060°W");
    }
}
