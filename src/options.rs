//! Configuration options for autofill.
//!
//! [`AutofillOptions`] is both the library configuration (through [`AutofillOptionsBuilder`])
//! and, with the `cli` feature, the command line of the `autofill` binary.

use std::time::Duration;

use derive_builder::Builder;

use crate::binds::KeyMap;
use crate::popover::{PopoverCallback, PopoverMode};
use crate::tui::Size;

/// autofill - pick several items from a searchable list
///
/// Type to search, use the arrow keys to move through the results and the selected values,
/// Enter to toggle an option, Delete to remove the highlighted value and Tab to accept.
#[derive(Builder, Clone)]
#[builder(build_fn(name = "final_build"))]
#[builder(default, setter(into))]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(
    feature = "cli",
    command(name = "autofill", args_override_self = true, verbatim_doc_comment, version, about)
)]
pub struct AutofillOptions {
    //  --- Search ---
    /// Quiet period after the last keystroke before searching, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value = "350", help_heading = "Search"))]
    pub debounce_ms: u64,

    /// Maximum number of options shown for a search
    #[cfg_attr(feature = "cli", arg(long, default_value = "10", help_heading = "Search"))]
    pub max_results: usize,

    /// Do not search for the empty query on start
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Search"))]
    pub no_initial_search: bool,

    //  --- Interface ---
    /// Comma separated list of bindings
    ///
    /// Each binding follows the format `<key>:<action>`, several actions can be chained with `+`.
    ///
    /// **Example**: `autofill --bind 'ctrl-j:option-down,ctrl-k:option-up,enter:toggle-option+close-popover'`
    ///
    /// Actions: abort, accept, add-char:<c>, backward-char, backward-delete-char,
    /// backward-kill-word, beginning-of-line, clear-selection, close-popover, delete,
    /// delete-char, end-of-line, forward-char, ignore, option-down, option-up, redraw,
    /// toggle-option, unix-line-discard, unix-word-rubout, value-next, value-prev
    #[cfg_attr(
        feature = "cli",
        arg(short, long, help_heading = "Interface", verbatim_doc_comment, num_args=0..)
    )]
    pub bind: Vec<String>,

    /// Disable mouse
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Interface"))]
    pub no_mouse: bool,

    //  --- Layout ---
    /// Height of autofill's window
    ///
    /// Can either be a row count or a percentage, 100% switches to full screen
    #[cfg_attr(feature = "cli", arg(long, default_value = "12", help_heading = "Layout"))]
    pub height: String,

    /// Set prompt
    #[cfg_attr(feature = "cli", arg(long, short, default_value = "> ", help_heading = "Layout"))]
    pub prompt: String,

    /// Text shown in the empty input
    #[cfg_attr(feature = "cli", arg(long, default_value = "", help_heading = "Layout"))]
    pub placeholder: String,

    /// Rows between the input and the popover
    #[cfg_attr(feature = "cli", arg(long, default_value = "0", help_heading = "Layout"))]
    pub popover_offset: u16,

    //  --- Display ---
    /// Color configuration
    ///
    /// Either a base theme (dark, light, 16, bw, none) or comma separated `component:color`
    /// pairs, e.g. `--color light,chip_bg:25,error:160:bold`
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Display", verbatim_doc_comment))]
    pub color: Option<String>,

    /// Message shown while a search is running
    #[cfg_attr(feature = "cli", arg(long, default_value = "Loading...", help_heading = "Display"))]
    pub loading_message: String,

    /// Message shown when a search has no results
    #[cfg_attr(feature = "cli", arg(long, default_value = "No results", help_heading = "Display"))]
    pub empty_message: String,

    /// Prefix of the message shown when a search fails
    #[cfg_attr(feature = "cli", arg(long, default_value = "Search failed:", help_heading = "Display"))]
    pub error_prefix: String,

    //  --- Input ---
    /// Read items from this file instead of stdin
    ///
    /// One item per line, either plain text or JSON: `{"id": 1, "name": "Rick", "fields": {"status": "Alive"}}`
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Input", verbatim_doc_comment))]
    pub items: Option<String>,

    /// Delay every search answer, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value = "0", help_heading = "Input"))]
    pub latency_ms: u64,

    //  --- Scripting ---
    /// Pipe log output to a file
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Scripting"))]
    pub log_file: Option<String>,

    /// Whether the popover flag is owned by the caller
    #[cfg_attr(feature = "cli", clap(skip))]
    pub popover_mode: PopoverMode,
    /// Called whenever the popover is asked to open
    #[cfg_attr(feature = "cli", clap(skip))]
    pub on_open: Option<PopoverCallback>,
    /// Called whenever the popover is asked to close
    #[cfg_attr(feature = "cli", clap(skip))]
    pub on_close: Option<PopoverCallback>,

    /// The internal (parsed) keymap
    #[cfg_attr(feature = "cli", clap(skip))]
    pub keymap: KeyMap,
}

impl Default for AutofillOptions {
    fn default() -> Self {
        Self {
            debounce_ms: 350,
            max_results: 10,
            no_initial_search: false,
            bind: Vec::new(),
            no_mouse: false,
            height: String::from("12"),
            prompt: String::from("> "),
            placeholder: String::new(),
            popover_offset: 0,
            color: None,
            loading_message: String::from("Loading..."),
            empty_message: String::from("No results"),
            error_prefix: String::from("Search failed:"),
            items: None,
            latency_ms: 0,
            log_file: None,
            popover_mode: PopoverMode::default(),
            on_open: None,
            on_close: None,
            keymap: KeyMap::default(),
        }
    }
}

impl AutofillOptionsBuilder {
    /// Builds the AutofillOptions from the builder
    pub fn build(&mut self) -> Result<AutofillOptions, AutofillOptionsBuilderError> {
        self.final_build().map(|opts| opts.build())
    }
}

impl AutofillOptions {
    /// Finalizes the options by parsing the key bindings
    pub fn build(mut self) -> Self {
        self.keymap = self.bind.iter().fold(KeyMap::default(), |mut res, part| {
            res.add_keymaps(part.split(','));
            res
        });
        self
    }

    /// The debounce delay
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The parsed window height, falling back to the default on invalid input
    pub fn height(&self) -> Size {
        Size::try_from(self.height.as_str()).unwrap_or_else(|e| {
            warn!("invalid height {:?}: {e}", self.height);
            Size::Fixed(12)
        })
    }
}
