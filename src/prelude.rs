//! Convenience re-exports of commonly used types.
//!
//! This module provides a convenient way to import all the commonly used
//! autofill types and traits with a single `use autofill::prelude::*;` statement.

pub use crate::options::{AutofillOptions, AutofillOptionsBuilder};
pub use crate::popover::{PopoverCallback, PopoverMode};
pub use crate::provider::{NOTHING_HERE, StaticProvider};
pub use crate::tui::{Event, event::Action};
pub use crate::*;
pub use std::sync::Arc;
