use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use std::ops::BitOrAssign;
use std::sync::Arc;

use crate::options::AutofillOptions;
use crate::render::ElementId;
use crate::theme::ColorTheme;

/// Result of rendering an AutofillWidget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutofillRender {
    /// Screen areas of the elements that were drawn
    pub regions: Vec<(ElementId, Rect)>,
    /// Where the terminal cursor should be shown
    pub cursor: Option<Position>,
}

impl BitOrAssign for AutofillRender {
    fn bitor_assign(&mut self, rhs: Self) {
        self.regions.extend(rhs.regions);
        self.cursor = rhs.cursor.or(self.cursor);
    }
}

/// Trait for autofill's TUI widgets
pub trait AutofillWidget: Sized {
    /// Create a widget from options and theme
    fn from_options(options: &AutofillOptions, theme: Arc<ColorTheme>) -> Self;

    /// Render the widget to the buffer
    fn render(&mut self, area: Rect, buf: &mut Buffer) -> AutofillRender;
}
