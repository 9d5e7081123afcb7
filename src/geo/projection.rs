//! Map projection and coordinate transformation.
//!
//! Implements a center-preserving azimuthal equidistant projection: the
//! sphere is rotated so the active center sits at the projection pole, and
//! great-circle distance from that pole maps linearly to pixels. The whole
//! globe fits inside a disk of radius `pi * scale`; only the antipode of the
//! center has no screen position.

use super::point::{GeoPoint, Viewport};
use crate::render::RingMode;
use eframe::egui::Pos2;
use geo_types::Coord;
use std::f64::consts::PI;

/// Angular distance (radians) from the antipode below which projection is undefined.
///
/// `acos` loses precision near -1, so an exact antipode typically comes back
/// a few 1e-8 rad short of pi.
const ANTIPODE_EPSILON: f64 = 1e-6;

/// Snapshot of the parameters a projection was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionState {
    pub center: GeoPoint,
    /// Pixels per radian of great-circle distance.
    pub scale_px: f64,
    pub viewport: Viewport,
}

/// Map projection for converting geographic to screen coordinates.
///
/// Screen coordinates are local to the container: (0, 0) is its top-left
/// corner and the projected center lands on the viewport's geometric center.
#[derive(Debug, Clone)]
pub struct MapProjection {
    center: GeoPoint,
    scale_px: f64,
    viewport: Viewport,
    // Cached rotation terms for the current center.
    lon0: f64,
    sin_lat0: f64,
    cos_lat0: f64,
}

impl MapProjection {
    /// Creates a projection centered on `center`.
    pub fn new(center: GeoPoint, scale_px: f64, viewport: Viewport) -> Self {
        let mut projection = Self {
            center,
            scale_px,
            viewport,
            lon0: 0.0,
            sin_lat0: 0.0,
            cos_lat0: 1.0,
        };
        projection.set_center(center);
        projection
    }

    /// Rotates the sphere so `center` becomes the projection pole.
    ///
    /// Scale and viewport are left as they are.
    pub fn set_center(&mut self, center: GeoPoint) {
        let lat0 = center.latitude().to_radians();
        self.center = center;
        self.lon0 = center.longitude().to_radians();
        self.sin_lat0 = lat0.sin();
        self.cos_lat0 = lat0.cos();
    }

    pub fn set_scale(&mut self, scale_px: f64) {
        self.scale_px = scale_px;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn scale_px(&self) -> f64 {
        self.scale_px
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> ProjectionState {
        ProjectionState {
            center: self.center,
            scale_px: self.scale_px,
            viewport: self.viewport,
        }
    }

    /// Screen position of the projection pole (the viewport center).
    pub fn origin(&self) -> Pos2 {
        self.viewport.center()
    }

    /// Pixel radius of the projection edge, the antipode circle at angular radius pi.
    pub fn boundary_radius_px(&self) -> f64 {
        PI * self.scale_px
    }

    /// Projects a geographic point to the screen.
    ///
    /// Returns `None` at the antipode of the center, where the projection is
    /// undefined; callers skip the point for this frame.
    pub fn project(&self, point: GeoPoint) -> Option<Pos2> {
        self.project_coord(point.into())
    }

    /// Projects a raw (lon, lat) coordinate, as found in feature geometry.
    ///
    /// Non-finite coordinates are treated like the antipode.
    pub fn project_coord(&self, coord: Coord<f64>) -> Option<Pos2> {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return None;
        }

        let lat = coord.y.to_radians();
        let d_lon = coord.x.to_radians() - self.lon0;
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_d_lon, cos_d_lon) = d_lon.sin_cos();

        let cos_c = (self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * cos_d_lon).clamp(-1.0, 1.0);
        let c = cos_c.acos();
        if c > PI - ANTIPODE_EPSILON {
            return None;
        }

        // k = c / sin(c), with the removable singularity at the pole
        let k = if c < 1e-12 { 1.0 } else { c / c.sin() };
        let x = k * cos_lat * sin_d_lon;
        let y = k * (self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * cos_d_lon);

        let origin = self.origin();
        Some(Pos2::new(
            origin.x + (x * self.scale_px) as f32,
            origin.y - (y * self.scale_px) as f32, // screen Y grows downward
        ))
    }

    /// Converts a screen position back to geographic coordinates.
    ///
    /// Returns `None` outside the projection disk.
    pub fn screen_to_geo(&self, pos: Pos2) -> Option<GeoPoint> {
        if self.scale_px <= 0.0 {
            return None;
        }
        let origin = self.origin();
        let dx = (pos.x - origin.x) as f64 / self.scale_px;
        let dy = (origin.y - pos.y) as f64 / self.scale_px;
        let rho = dx.hypot(dy);

        if rho > PI {
            return None;
        }
        if rho < 1e-12 {
            return Some(self.center);
        }

        let (sin_c, cos_c) = rho.sin_cos();
        let lat = (cos_c * self.sin_lat0 + dy * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0
            + (dx * sin_c).atan2(rho * self.cos_lat0 * cos_c - dy * self.sin_lat0 * sin_c);

        GeoPoint::new(normalize_longitude(lon.to_degrees()), lat.to_degrees()).ok()
    }
}

/// Derives the projection scale from the container size and ring mode.
///
/// `scale = min(inner_width, inner_height) * mode_factor`, where the inner
/// extent subtracts `padding_px` on every side. The result is always positive.
pub fn compute_scale(viewport: Viewport, mode: RingMode, padding_px: f32) -> f64 {
    let inner_width = (viewport.width - 2.0 * padding_px).max(1.0);
    let inner_height = (viewport.height - 2.0 * padding_px).max(1.0);
    inner_width.min(inner_height) as f64 * mode.scale_factor()
}

fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps +180 to -180; keep the sign the caller expects
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}
