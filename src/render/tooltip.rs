//! Hover tooltip state.
//!
//! The tooltip is a plain show/hide toggle driven by three transitions:
//! pointer enter, pointer move and pointer leave. A reprojection or ring
//! mode change forces a leave so a tooltip never outlives the ring it
//! describes.

use eframe::egui::Pos2;

/// Visible tooltip content anchored at the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    /// Index of the ring the pointer is over.
    pub ring_index: usize,
    pub title: String,
    pub detail: String,
    pub anchor: Pos2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Tooltip {
    #[default]
    Hidden,
    Shown(TooltipContent),
}

impl Tooltip {
    /// Pointer entered a ring: show (or retarget) the tooltip.
    pub fn enter(&mut self, content: TooltipContent) {
        *self = Tooltip::Shown(content);
    }

    /// Pointer moved within the same ring. No-op while hidden.
    pub fn move_to(&mut self, anchor: Pos2) {
        if let Tooltip::Shown(content) = self {
            content.anchor = anchor;
        }
    }

    /// Pointer left the ring, or the ring it described went stale.
    pub fn leave(&mut self) {
        *self = Tooltip::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Tooltip::Shown(_))
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        match self {
            Tooltip::Shown(content) => Some(content),
            Tooltip::Hidden => None,
        }
    }

    /// Ring the tooltip is currently describing, if any.
    pub fn ring_index(&self) -> Option<usize> {
        self.content().map(|c| c.ring_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(ring_index: usize) -> TooltipContent {
        TooltipContent {
            ring_index,
            title: "Mars".to_string(),
            detail: "3,390 km radius".to_string(),
            anchor: Pos2::new(10.0, 10.0),
        }
    }

    #[test]
    fn test_hidden_by_default() {
        let tooltip = Tooltip::default();
        assert!(!tooltip.is_visible());
        assert_eq!(tooltip.ring_index(), None);
    }

    #[test]
    fn test_enter_move_leave() {
        let mut tooltip = Tooltip::default();
        tooltip.enter(content(2));
        assert_eq!(tooltip.ring_index(), Some(2));

        tooltip.move_to(Pos2::new(50.0, 60.0));
        assert_eq!(tooltip.content().unwrap().anchor, Pos2::new(50.0, 60.0));

        tooltip.leave();
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn test_move_while_hidden_does_not_show() {
        let mut tooltip = Tooltip::default();
        tooltip.move_to(Pos2::new(50.0, 60.0));
        assert!(!tooltip.is_visible());
    }
}
