//! Geographic primitives for the world map.
//!
//! This module provides coordinate types, the re-centering projection, and
//! loading of the country boundary dataset.

pub mod boundary;
mod loader;
mod point;
mod projection;

pub use boundary::{BoundaryFeature, PolygonRings};
pub use loader::{DatasetChannel, DatasetSource};
pub use point::{GeoPoint, Viewport};
pub use projection::{compute_scale, MapProjection};
