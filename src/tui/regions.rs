use std::collections::HashMap;

use indexmap::IndexMap;
use ratatui::layout::{Position, Rect};

use crate::item::ItemId;
use crate::render::{ElementId, Renderer};
use crate::tui::AutofillRender;

/// Terminal implementation of [`Renderer`].
///
/// Holds the areas recorded during the last frame, plus the row layout of the option list so
/// that an option can be scrolled into view before it was ever drawn.
#[derive(Debug, Clone, Default)]
pub struct Regions {
    rects: HashMap<ElementId, Rect>,
    /// (first row, height) of every option, in list coordinates
    rows: IndexMap<ItemId, (u16, u16)>,
    scroll: u16,
    visible: u16,
}

impl Regions {
    /// Forgets the areas of the previous frame
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Stores the areas reported by a widget
    pub fn record(&mut self, render: &AutofillRender) {
        for (id, rect) in &render.regions {
            self.rects.insert(*id, *rect);
        }
    }

    /// Replaces the option rows; scrolling starts over at the top
    pub fn set_rows<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = (ItemId, u16)>,
    {
        self.rows.clear();
        let mut top = 0u16;
        for (id, height) in rows {
            self.rows.insert(id, (top, height));
            top = top.saturating_add(height);
        }
        self.scroll = 0;
    }

    /// Number of option rows that fit in the popover
    pub fn set_visible(&mut self, visible: u16) {
        self.visible = visible;
    }

    /// First visible row of the option list
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// The most specific element under `pos`
    pub fn hit(&self, pos: Position) -> Option<ElementId> {
        let specificity = |id: &ElementId| match id {
            ElementId::ValueRemove(_) => 0,
            ElementId::Value(_) => 1,
            ElementId::Option(_) => 2,
            ElementId::Popover => 3,
            ElementId::Trigger => 4,
        };
        self.rects
            .iter()
            .filter(|(_, rect)| rect.contains(pos))
            .map(|(id, _)| *id)
            .min_by_key(specificity)
    }
}

impl Renderer for Regions {
    fn bounding_region(&self, id: ElementId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    fn scroll_into_view(&mut self, id: ElementId) {
        let ElementId::Option(item) = id else {
            trace!("regions: {id:?} is never scrolled");
            return;
        };
        let Some(&(top, height)) = self.rows.get(&item) else {
            return;
        };
        let bottom = top.saturating_add(height);
        if top < self.scroll || height >= self.visible {
            self.scroll = top;
        } else if bottom > self.scroll.saturating_add(self.visible) {
            self.scroll = bottom - self.visible;
        }
        trace!("regions: scrolled to {} for option {item}", self.scroll);
    }
}
