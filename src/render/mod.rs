//! Layered map rendering.
//!
//! Each layer keeps a keyed set of drawable elements that is reconciled
//! against its data on every redraw, then painted with an egui painter.

mod basemap;
mod markers;
mod paint;
pub mod reconcile;
pub mod rings;
mod tooltip;

pub use basemap::BasemapLayer;
pub use markers::{default_markers, MarkerFeature, MarkerLayer};
pub use paint::{paint_basemap, paint_markers, paint_rings, paint_tooltip};
pub use reconcile::ReconcileStats;
pub use rings::{RingLayer, RingMode};
