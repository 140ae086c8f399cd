use std::sync::Arc;

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

use crate::item::{AutofillItem, DisplayContext, Highlighter, ItemId};
use crate::options::AutofillOptions;
use crate::render::ElementId;
use crate::selection::SelectionList;
use crate::theme::ColorTheme;
use crate::tui::widget::{AutofillRender, AutofillWidget};

const CHECKED: &str = "[x] ";
const UNCHECKED: &str = "[ ] ";
const DETAILS_INDENT: &str = "    ";

/// The options of the latest search, drawn inside the popover
pub struct OptionList {
    /// Options in display order
    pub options: Vec<Arc<dyn AutofillItem>>,
    /// Index of the highlighted option
    pub current: Option<usize>,
    /// Used to check the boxes of selected options
    pub selected: SelectionList,
    /// Highlights the settled query in option names
    pub highlighter: Highlighter,
    /// Shown instead of the options (loading, empty, error)
    pub message: Option<Line<'static>>,
    /// First visible row
    pub scroll: u16,
    theme: Arc<ColorTheme>,
}

impl OptionList {
    fn row_height(item: &dyn AutofillItem) -> u16 {
        if item.details().is_empty() { 1 } else { 2 }
    }

    /// Id and height of every option
    pub fn rows(&self) -> Vec<(ItemId, u16)> {
        self.options
            .iter()
            .map(|item| (item.id(), Self::row_height(item.as_ref())))
            .collect()
    }

    /// Rows needed to show everything without scrolling
    pub fn desired_height(&self) -> u16 {
        if self.message.is_some() || self.options.is_empty() {
            return 1;
        }
        self.rows().iter().fold(0u16, |acc, (_, h)| acc.saturating_add(*h))
    }

    fn lines<'a>(&self, idx: usize, item: &'a dyn AutofillItem) -> (Vec<Line<'a>>, Style) {
        let current = self.current == Some(idx);
        let (base_style, matched_style) = if current {
            (self.theme.current, self.theme.current_match)
        } else {
            (self.theme.normal, self.theme.matched)
        };
        let checkbox = if self.selected.contains(item.id()) {
            Span::styled(CHECKED, base_style.patch(self.theme.selected))
        } else {
            Span::styled(UNCHECKED, base_style)
        };
        let name = item.name();
        let context = DisplayContext {
            matches: self.highlighter.matches(&name),
            base_style,
            matched_style,
        };
        let mut first = item.display(context);
        first.spans.insert(0, checkbox);

        let mut lines = vec![first];
        let details = item.details();
        if !details.is_empty() {
            lines.push(Line::styled(
                format!("{DETAILS_INDENT}{}", details.join(", ")),
                base_style.patch(self.theme.details),
            ));
        }
        (lines, base_style)
    }
}

impl AutofillWidget for OptionList {
    fn from_options(_options: &AutofillOptions, theme: Arc<ColorTheme>) -> Self {
        Self {
            options: Vec::new(),
            current: None,
            selected: SelectionList::new(),
            highlighter: Highlighter::default(),
            message: None,
            scroll: 0,
            theme,
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) -> AutofillRender {
        let mut res = AutofillRender::default();
        if let Some(message) = &self.message {
            Paragraph::new(message.clone())
                .wrap(Wrap { trim: true })
                .style(self.theme.normal)
                .render(area, buf);
            return res;
        }

        let mut top = 0u16;
        let bottom_row = self.scroll.saturating_add(area.height);
        for (idx, item) in self.options.iter().enumerate() {
            if top >= bottom_row {
                break;
            }
            let height = Self::row_height(item.as_ref());
            let (lines, style) = self.lines(idx, item.as_ref());
            let mut drawn: Option<Rect> = None;
            for (k, line) in lines.into_iter().enumerate() {
                let row = top + k as u16;
                if row < self.scroll || row >= bottom_row {
                    continue;
                }
                let rect = Rect::new(area.x, area.y + row - self.scroll, area.width, 1);
                buf.set_style(rect, style);
                line.render(rect, buf);
                drawn = Some(drawn.map_or(rect, |r| r.union(rect)));
            }
            if let Some(rect) = drawn {
                res.regions.push((ElementId::Option(item.id()), rect));
            }
            top = top.saturating_add(height);
        }
        res
    }
}
