use std::ops::Deref;
use std::sync::Arc;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_display_width::width as display_width;

use crate::options::AutofillOptions;
use crate::theme::ColorTheme;
use crate::tui::widget::{AutofillRender, AutofillWidget};

const CARET_OPEN: &str = "▲";
const CARET_CLOSED: &str = "▼";

/// The text field of the trigger
pub struct Input {
    pub prompt: String,
    pub placeholder: String,
    pub value: String,
    /// Byte offset of the cursor in `value`, always on a char boundary
    pub cursor_pos: usize,
    /// Whether the popover is open, drives the caret
    pub open: bool,
    pub theme: Arc<ColorTheme>,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            prompt: String::from("> "),
            placeholder: String::new(),
            value: String::new(),
            cursor_pos: 0,
            open: false,
            theme: Arc::new(ColorTheme::default()),
        }
    }
}

impl Input {
    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }
    pub fn insert_str(&mut self, s: &str) {
        self.value.insert_str(self.cursor_pos, s);
        self.cursor_pos += s.len();
    }
    fn prev_boundary(&self) -> Option<usize> {
        self.value[..self.cursor_pos].char_indices().next_back().map(|(i, _)| i)
    }
    fn next_boundary(&self) -> Option<usize> {
        self.value[self.cursor_pos..]
            .chars()
            .next()
            .map(|c| self.cursor_pos + c.len_utf8())
    }
    /// Deletes the char before the cursor
    pub fn delete_backward(&mut self) -> Option<char> {
        let pos = self.prev_boundary()?;
        self.cursor_pos = pos;
        Some(self.value.remove(pos))
    }
    /// Deletes the char under the cursor
    pub fn delete_forward(&mut self) -> Option<char> {
        if self.cursor_pos >= self.value.len() {
            return None;
        }
        Some(self.value.remove(self.cursor_pos))
    }
    pub fn move_backward(&mut self) {
        if let Some(pos) = self.prev_boundary() {
            self.cursor_pos = pos;
        }
    }
    pub fn move_forward(&mut self) {
        if let Some(pos) = self.next_boundary() {
            self.cursor_pos = pos;
        }
    }
    pub fn move_to_start(&mut self) {
        self.cursor_pos = 0;
    }
    pub fn move_to_end(&mut self) {
        self.cursor_pos = self.value.len();
    }

    /// Start of the run of chars before the cursor for which `keep` holds, after skipping the
    /// chars for which it does not
    fn backward_run_start(&self, keep: impl Fn(char) -> bool) -> usize {
        let mut chars = self.value[..self.cursor_pos].char_indices().rev().peekable();
        let mut pos = self.cursor_pos;
        while let Some((i, _)) = chars.next_if(|(_, c)| !keep(*c)) {
            pos = i;
        }
        while let Some((i, _)) = chars.next_if(|(_, c)| keep(*c)) {
            pos = i;
        }
        pos
    }

    fn delete_back_to(&mut self, start: usize) -> String {
        let deleted: String = self.value.drain(start..self.cursor_pos).collect();
        self.cursor_pos = start;
        deleted
    }

    /// Deletes back to the start of the previous alphanumeric word (alt-backspace)
    pub fn delete_backward_word(&mut self) -> String {
        let start = self.backward_run_start(char::is_alphanumeric);
        self.delete_back_to(start)
    }

    /// Deletes back to the previous whitespace (unix word rubout)
    pub fn delete_backward_to_whitespace(&mut self) -> String {
        let start = self.backward_run_start(|c| !c.is_whitespace());
        self.delete_back_to(start)
    }

    pub fn delete_to_beginning(&mut self) -> String {
        self.delete_back_to(0)
    }

    /// Column of the cursor, prompt included
    pub fn cursor_col(&self) -> u16 {
        let width = display_width(&self.prompt) + display_width(&self.value[..self.cursor_pos]);
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

impl AutofillWidget for Input {
    fn from_options(options: &AutofillOptions, theme: Arc<ColorTheme>) -> Self {
        Self {
            prompt: options.prompt.clone(),
            placeholder: options.placeholder.clone(),
            theme,
            ..Default::default()
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) -> AutofillRender {
        if area.is_empty() {
            return AutofillRender::default();
        }
        let text = if self.value.is_empty() {
            Span::styled(&self.placeholder, self.theme.placeholder)
        } else {
            Span::styled(&self.value, self.theme.query)
        };
        Paragraph::new(Line::from(vec![Span::styled(&self.prompt, self.theme.prompt), text]))
            .style(self.theme.normal)
            .render(area, buf);

        let caret = if self.open { CARET_OPEN } else { CARET_CLOSED };
        let caret_area = Rect::new(area.right().saturating_sub(1), area.y, 1, 1);
        Span::styled(caret, self.theme.caret).render(caret_area, buf);

        let col = self.cursor_col().min(area.width.saturating_sub(1));
        AutofillRender {
            regions: Vec::new(),
            cursor: Some(Position::new(area.x + col, area.y)),
        }
    }
}

impl Deref for Input {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(value: &str) -> Input {
        let mut input = Input::default();
        input.insert_str(value);
        input
    }

    #[test]
    fn edits_around_multibyte_chars() {
        let mut input = input("mé");
        input.move_backward();
        input.insert('x');
        assert_eq!(input.value, "mxé");
        assert_eq!(input.delete_forward(), Some('é'));
        assert_eq!(input.delete_forward(), None);
        assert_eq!(input.delete_backward(), Some('x'));
        assert_eq!(input.cursor_pos, 1);
        input.move_to_start();
        assert_eq!(input.delete_backward(), None);
    }

    #[test]
    fn word_deletion() {
        let mut input = input("rick c-137 ");
        assert_eq!(input.delete_backward_word(), "137 ");
        assert_eq!(input.value, "rick c-");
        assert_eq!(input.delete_backward_to_whitespace(), "c-");
        assert_eq!(input.value, "rick ");
        assert_eq!(input.delete_to_beginning(), "rick ");
        assert!(input.is_empty());
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let mut input = input("日本");
        assert_eq!(input.cursor_col(), 2 + 4);
        input.move_backward();
        assert_eq!(input.cursor_col(), 2 + 2);
    }

    #[test]
    fn renders_placeholder_and_caret() {
        let mut input = Input {
            placeholder: "Search".into(),
            ..Default::default()
        };
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        let render = input.render(area, &mut buf);
        assert_eq!(buf, Buffer::with_lines(["> Search   ▼"]));
        assert_eq!(render.cursor, Some(Position::new(2, 0)));
    }
}
