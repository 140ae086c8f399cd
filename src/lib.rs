//! Autofill is a multi-value autocomplete input for the terminal.
//!
//! The user types a query; after a debounce delay a [`SearchProvider`] is asked for matching
//! options, shown in a popover anchored to the input. Options are toggled in and out of the
//! selection, which is drawn as chips above the input. The selection is controlled: the widget
//! proposes changes and its owner decides what the selection is.
//!
//! # Examples
//!
//! ```no_run
//! use autofill::prelude::*;
//! use std::io::Cursor;
//!
//! let options = AutofillOptionsBuilder::default()
//!     .height("50%")
//!     .placeholder("Pick characters")
//!     .build()
//!     .unwrap();
//!
//! let input = "Rick Sanchez\nMorty Smith\nSummer Smith\nBeth Smith";
//! let provider = StaticProvider::from_reader(Cursor::new(input)).unwrap();
//!
//! let output = Autofill::run_with(options, Arc::new(provider)).unwrap();
//! for item in output.selected {
//!     println!("{}", item.name());
//! }
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;

use std::any::Any;

pub use crate::autofill::Autofill;
pub use crate::item::{AutofillItem, DefaultItem, ItemId};
pub use crate::options::AutofillOptions;
pub use crate::output::AutofillOutput;
pub use crate::provider::{SearchError, SearchProvider, SearchResult};
pub use crate::selection::SelectionList;

mod autofill;
pub mod binds;
pub mod item;
pub mod navigation;
pub mod options;
mod output;
pub mod popover;
pub mod prelude;
pub mod provider;
pub mod render;
pub mod search;
pub mod selection;
pub mod theme;
pub mod tui;

//------------------------------------------------------------------------------
/// Trait for downcasting to concrete types from trait objects
pub trait AsAny {
    /// Returns a reference to the value as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Returns a mutable reference to the value as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
