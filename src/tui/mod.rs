//! Terminal UI components and rendering.
//!
//! This module provides the terminal platform of autofill: the application state wiring the
//! headless controllers to key and mouse events, the widgets drawing the trigger and the
//! popover, and the region registry implementing [`Renderer`](crate::render::Renderer).

use std::num::ParseIntError;

pub use app::App;
pub use event::Event;
use thiserror::Error;
pub use widget::{AutofillRender, AutofillWidget};
mod app;
mod backend;
pub use backend::Tui;
/// Chips of the selected values
pub mod chips;
/// Event handling and action definitions
pub mod event;
mod input;
/// Option list drawn inside the popover
pub mod option_list;
/// Hit regions of the last frame
pub mod regions;
pub use regions::Regions;
/// Widget rendering utilities
pub mod widget;

/// Represents a size value, either as a percentage or fixed value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    /// Size as a percentage (0-100)
    Percent(u16),
    /// Fixed size in terminal cells
    Fixed(u16),
}

/// Error type for parsing size values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SizeParseError {
    /// Error parsing the size string
    #[error("Error parsing {0}: {1:?}")]
    ParseError(String, ParseIntError),
    /// Percentage value exceeds 100
    #[error("Invalid percentage {0}")]
    InvalidPercent(u16),
}

impl TryFrom<&str> for Size {
    type Error = SizeParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if let Some(raw) = value.strip_suffix('%') {
            let percent = raw
                .parse::<u16>()
                .map_err(|e| SizeParseError::ParseError(value.to_string(), e))?;
            if percent > 100 {
                return Err(SizeParseError::InvalidPercent(percent));
            }
            Ok(Self::Percent(percent))
        } else {
            Ok(Self::Fixed(
                value
                    .parse::<u16>()
                    .map_err(|e| SizeParseError::ParseError(value.to_string(), e))?,
            ))
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::Fixed(12)
    }
}
