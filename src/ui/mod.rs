//! UI modules for the world rings map.
//!
//! The UI is split into two panels:
//! - Top bar: title, ring mode selector, "go to" list and status
//! - Central canvas: the map itself

mod canvas;
pub mod colors;
mod top_bar;

pub use canvas::render_canvas;
pub use top_bar::render_top_bar;
