use crossterm::event::{KeyEvent, MouseEvent};
use derive_more::Debug;

use crate::provider::SearchResult;
use crate::selection::SelectionList;

/// Events flowing through autofill's event loop
#[derive(Clone, Debug)]
pub enum Event {
    /// Quit the application
    Quit,
    /// An error occurred
    Error(String),
    /// Timer tick event
    Heartbeat,
    /// Render the UI
    Render,
    /// Clear and redraw the screen
    Redraw,
    /// A key was pressed
    Key(KeyEvent),
    /// Text was pasted (bracketed paste)
    Paste(String),
    /// A mouse event occurred
    Mouse(MouseEvent),
    /// The terminal gained input focus
    FocusGained,
    /// The terminal lost input focus
    FocusLost,
    /// An action was triggered
    Action(Action),
    /// The debounce delay elapsed for the input of this generation
    SearchDue {
        /// Input generation the timer was armed for
        generation: u64,
        /// The text to search for
        query: String,
    },
    /// A provider call finished
    SearchResolved {
        /// Sequence id of the call
        seq: u64,
        /// The text that was searched for
        query: String,
        /// What the provider answered
        #[debug(skip)]
        result: SearchResult,
    },
    /// The widget proposes this selection; the owner answers with `App::set_value`
    Change(SelectionList),
    /// The widget asks for the popover to open or close; the owner of a controlled popover
    /// answers with `App::set_popover_open`
    PopoverRequest(bool),
}

/// Actions that can be bound to keys
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Action {
    /// Abort and exit with error
    Abort,
    /// Accept the selection and exit
    Accept,
    /// Add a character to the query
    AddChar(char),
    /// Move cursor backward one character
    BackwardChar,
    /// Delete character before cursor
    BackwardDeleteChar,
    /// Delete word before cursor
    BackwardKillWord,
    /// Move cursor to beginning of line
    BeginningOfLine,
    /// Drop every selected value
    ClearSelection,
    /// Close the popover
    ClosePopover,
    /// Remove the highlighted value, or the character under the cursor when no value is highlighted
    Delete,
    /// Delete character under cursor
    DeleteChar,
    /// Move cursor to end of line
    EndOfLine,
    /// Move cursor forward one character
    ForwardChar,
    /// Ignore the key
    Ignore,
    /// Open the popover, or move to the next option when it is open
    OptionDown,
    /// Move to the previous option
    OptionUp,
    /// Redraw the screen
    Redraw,
    /// Toggle the highlighted option in the selection
    ToggleOption,
    /// Discard line (unix-style)
    UnixLineDiscard,
    /// Delete word backward (unix-style)
    UnixWordRubout,
    /// Highlight the next selected value
    ValueNext,
    /// Highlight the previous selected value
    ValuePrev,
}

/// Parses an action string into an Action enum
pub fn parse_action(raw_action: &str) -> Option<Action> {
    let (action, arg) = match raw_action.split_once([':', '(']) {
        None => (raw_action, None),
        Some((act, "")) => (act, None),
        Some((act, a)) => (act, Some(a.trim_end_matches(')'))),
    };
    debug!("parse_action: action={action}, arg={arg:?}");

    use Action::*;
    match action {
        "abort" => Some(Abort),
        "accept" => Some(Accept),
        "add-char" => arg.and_then(|a| a.chars().next()).map(AddChar),
        "backward-char" => Some(BackwardChar),
        "backward-delete-char" => Some(BackwardDeleteChar),
        "backward-kill-word" => Some(BackwardKillWord),
        "beginning-of-line" => Some(BeginningOfLine),
        "clear-selection" => Some(ClearSelection),
        "close-popover" => Some(ClosePopover),
        "delete" => Some(Delete),
        "delete-char" => Some(DeleteChar),
        "end-of-line" => Some(EndOfLine),
        "forward-char" => Some(ForwardChar),
        "ignore" => Some(Ignore),
        "option-down" => Some(OptionDown),
        "option-up" => Some(OptionUp),
        "redraw" => Some(Redraw),
        "toggle-option" => Some(ToggleOption),
        "unix-line-discard" => Some(UnixLineDiscard),
        "unix-word-rubout" => Some(UnixWordRubout),
        "value-next" => Some(ValueNext),
        "value-prev" => Some(ValuePrev),
        _ => None,
    }
}
