//! Rendering capability used by the state core.
//!
//! The core never draws. It only needs to know where an element was last drawn (for pointer
//! dismissal) and to ask for an element to be brought into view (keyboard navigation). Elements
//! are addressed by stable ids rather than by their position in a list, so an option keeps its
//! identity across searches.

use ratatui::layout::Rect;

use crate::item::ItemId;

/// A drawable element of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    /// The option row for this item in the popover
    Option(ItemId),
    /// The chip for this selected item
    Value(ItemId),
    /// The remove mark of a chip
    ValueRemove(ItemId),
    /// The chips and the text field
    Trigger,
    /// The popover content
    Popover,
}

/// What the widget needs from whatever draws it
pub trait Renderer {
    /// Screen area where `id` was last drawn, `None` when it is not on screen
    fn bounding_region(&self, id: ElementId) -> Option<Rect>;

    /// Scrolls the smallest distance that makes `id` fully visible
    fn scroll_into_view(&mut self, id: ElementId);
}
