//! Items offered in the option list and held in the selection.
//!
//! Items are supplied by a [`SearchProvider`](crate::provider::SearchProvider) and are never
//! mutated by the widget. They travel as `Arc<dyn AutofillItem>` so the same item can sit in
//! the option list and in the selection at the same time.

use std::borrow::Cow;
use std::fmt::{Debug, Display};

use indexmap::IndexMap;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::AsAny;

/// Stable identifier of an item, unique among all items a provider can return
pub type ItemId = u64;

/// An `AutofillItem` is what gets searched, offered, selected and returned by autofill.
///
/// # Downcast Example
/// Autofill hands items back as `Arc<dyn AutofillItem>`. The concrete type can be
/// recovered through [`AsAny`]:
///
/// ```rust
/// use autofill::prelude::*;
///
/// let item: Arc<dyn AutofillItem> = Arc::new(DefaultItem::new(1, "Rick Sanchez"));
/// let concrete: &DefaultItem = (*item).as_any()
///     .downcast_ref::<DefaultItem>()
///     .expect("something wrong with downcast");
/// assert_eq!(concrete.name, "Rick Sanchez");
/// ```
pub trait AutofillItem: AsAny + Send + Sync + 'static {
    /// Identity used for deduplication in the selection and for element registration
    fn id(&self) -> ItemId;

    /// Main label, used for chips and for match highlighting
    fn name(&self) -> Cow<'_, str>;

    /// Secondary lines shown under the name in the option list
    fn details(&self) -> Vec<Cow<'_, str>> {
        Vec::new()
    }

    /// The content displayed as the option's first line
    fn display<'a>(&'a self, context: DisplayContext) -> Line<'a> {
        context.to_line(self.name())
    }

    /// Text printed for the item once the input is accepted, defaults to `name()`
    fn output(&self) -> Cow<'_, str> {
        self.name()
    }
}

impl Display for dyn AutofillItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl Debug for dyn AutofillItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("AutofillItem {{ id: {}, name: {} }}", self.id(), self.name()))
    }
}

//------------------------------------------------------------------------------
/// Stock item: an id, a name and ordered display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultItem {
    /// Identifier
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Extra fields rendered as `key: value` detail lines
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl DefaultItem {
    /// Creates an item without display fields
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a display field, keeping insertion order
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl AutofillItem for DefaultItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn details(&self) -> Vec<Cow<'_, str>> {
        self.fields
            .iter()
            .map(|(key, value)| Cow::Owned(format!("{key}: {value}")))
            .collect()
    }
}

//------------------------------------------------------------------------------
// Display Context
#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// Where the settled query occurs in an item's name
pub enum Matches {
    /// No matches
    #[default]
    None,
    /// Non-overlapping byte ranges (start, end), in order
    ByteRanges(Vec<(usize, usize)>),
}

#[derive(Default, Debug)]
/// Context information for displaying an item
pub struct DisplayContext {
    /// Where the query matched in the item
    pub matches: Matches,
    /// The base style to apply to non-matched portions
    pub base_style: Style,
    /// The style to apply to matched portions
    pub matched_style: Style,
}

impl DisplayContext {
    /// Converts the context and text into a styled `Line` with highlighted matches
    pub fn to_line<'a>(self, cow: Cow<'a, str>) -> Line<'a> {
        let Matches::ByteRanges(ranges) = &self.matches else {
            return Line::from(vec![Span::styled(cow, self.base_style)]);
        };
        let text = cow.as_ref();
        let highlight = self.base_style.patch(self.matched_style);
        let mut res = Line::default();
        let mut prev = 0;
        for &(start, end) in ranges {
            if start < prev || end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
                warn!("ignoring invalid match range {start}..{end} for {text:?}");
                continue;
            }
            if start > prev {
                res.push_span(Span::styled(text[prev..start].to_string(), self.base_style));
            }
            res.push_span(Span::styled(text[start..end].to_string(), highlight));
            prev = end;
        }
        if prev < text.len() {
            res.push_span(Span::styled(text[prev..].to_string(), self.base_style));
        }
        res
    }
}

/// Finds case-insensitive occurrences of the settled query in item names
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Builds a highlighter for `query`; an empty query highlights nothing
    pub fn new(query: &str) -> Self {
        if query.is_empty() {
            return Self::default();
        }
        let pattern = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|e| warn!("could not build highlighter for {query:?}: {e}"))
            .ok();
        Self { pattern }
    }

    /// Returns the matched ranges of `text`
    pub fn matches(&self, text: &str) -> Matches {
        let Some(pattern) = &self.pattern else {
            return Matches::None;
        };
        let ranges: Vec<(usize, usize)> = pattern.find_iter(text).map(|m| (m.start(), m.end())).collect();
        if ranges.is_empty() {
            Matches::None
        } else {
            Matches::ByteRanges(ranges)
        }
    }
}
