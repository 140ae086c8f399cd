use std::sync::Arc;

use ratatui::prelude::*;
use unicode_display_width::width as display_width;

use crate::options::AutofillOptions;
use crate::render::ElementId;
use crate::selection::SelectionList;
use crate::theme::ColorTheme;
use crate::tui::widget::{AutofillRender, AutofillWidget};

const REMOVE_MARK: &str = "×";
/// Padding around the name plus the remove mark
const CHIP_DECORATION: u16 = 4;

/// The selected values, drawn as chips wrapping over as many rows as needed
pub struct Chips {
    /// What is drawn
    pub values: SelectionList,
    /// Index of the highlighted chip
    pub current: Option<usize>,
    theme: Arc<ColorTheme>,
}

impl Chips {
    fn chip_width(name: &str) -> u16 {
        u16::try_from(display_width(name))
            .unwrap_or(u16::MAX)
            .saturating_add(CHIP_DECORATION)
    }

    /// Position of every chip relative to the top left corner, in selection order
    pub fn layout(&self, width: u16) -> Vec<Rect> {
        let mut res = Vec::with_capacity(self.values.len());
        let (mut x, mut y) = (0u16, 0u16);
        for item in self.values.iter() {
            let w = Self::chip_width(&item.name()).min(width);
            if x > 0 && x.saturating_add(w) > width {
                x = 0;
                y += 1;
            }
            res.push(Rect::new(x, y, w, 1));
            x = x.saturating_add(w).saturating_add(1);
        }
        res
    }

    /// Rows needed to draw every chip
    pub fn height(&self, width: u16) -> u16 {
        self.layout(width).last().map_or(0, |last| last.y + 1)
    }
}

impl AutofillWidget for Chips {
    fn from_options(_options: &AutofillOptions, theme: Arc<ColorTheme>) -> Self {
        Self {
            values: SelectionList::new(),
            current: None,
            theme,
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) -> AutofillRender {
        let mut res = AutofillRender::default();
        for (idx, (item, rel)) in self.values.iter().zip(self.layout(area.width)).enumerate() {
            let rect = Rect::new(area.x + rel.x, area.y + rel.y, rel.width, 1).intersection(area);
            if rect.is_empty() {
                continue;
            }
            let style = if self.current == Some(idx) {
                self.theme.chip_current
            } else {
                self.theme.chip
            };
            Line::from(vec![
                Span::styled(format!(" {} ", item.name()), style),
                Span::styled(REMOVE_MARK, style.patch(self.theme.chip_remove)),
                Span::styled(" ", style),
            ])
            .render(rect, buf);

            res.regions.push((ElementId::Value(item.id()), rect));
            let mark = Rect::new(rect.right().saturating_sub(2), rect.y, 1, 1);
            if rect.width >= CHIP_DECORATION && rel.width == Self::chip_width(&item.name()) {
                res.regions.push((ElementId::ValueRemove(item.id()), mark));
            }
        }
        res
    }
}
