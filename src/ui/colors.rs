//! Centralized color constants for the UI.
//!
//! This module provides consistent colors across the top bar and the map.

use eframe::egui::Color32;

/// General UI colors for status text.
pub mod ui {
    use super::Color32;

    /// Success/positive indicator.
    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    /// Failure indicator.
    pub const ERROR: Color32 = Color32::from_rgb(255, 80, 80);
}

/// Colors for the map canvas.
pub mod canvas {
    use super::Color32;

    /// Background color.
    pub const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
    /// Coordinate readout text.
    pub const READOUT: Color32 = Color32::from_rgb(140, 140, 160);
}

/// Colors for the country basemap.
pub mod basemap {
    use super::Color32;

    /// Land fill - requires alpha, use function.
    pub fn fill() -> Color32 {
        Color32::from_rgba_unmultiplied(60, 70, 90, 200)
    }

    /// Country border stroke.
    pub const BORDER: Color32 = Color32::from_rgb(110, 120, 140);
}

/// Colors for the reference rings.
pub mod rings {
    use super::Color32;

    /// Reference ring stroke - requires alpha, use function.
    pub fn reference() -> Color32 {
        Color32::from_rgba_unmultiplied(100, 180, 255, 170)
    }

    /// Reference ring label.
    pub const LABEL: Color32 = Color32::from_rgb(150, 200, 255);
    /// Outer edge of the projection (the antipode).
    pub const BOUNDARY: Color32 = Color32::from_rgb(80, 80, 110);

    /// Tooltip background - requires alpha, use function.
    pub fn tooltip_fill() -> Color32 {
        Color32::from_rgba_unmultiplied(20, 20, 30, 230)
    }

    /// Tooltip border.
    pub const TOOLTIP_BORDER: Color32 = Color32::from_rgb(100, 180, 255);
    /// Tooltip text.
    pub const TOOLTIP_TEXT: Color32 = Color32::from_rgb(220, 220, 240);
}

/// Colors for city markers.
pub mod markers {
    use super::Color32;

    /// Marker fill.
    pub const DOT: Color32 = Color32::from_rgb(255, 180, 80);
    /// Marker stroke.
    pub const DOT_STROKE: Color32 = Color32::from_rgb(180, 120, 40);
    /// Hovered marker fill.
    pub const HOVER: Color32 = Color32::from_rgb(50, 200, 255);
    /// Label color.
    pub const LABEL: Color32 = Color32::from_rgb(220, 220, 240);
}
