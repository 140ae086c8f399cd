//! Keyboard navigation state machine.
//!
//! Two independent cursors: one over the option list (the popover content) and one over the
//! selected values (the chips). `None` means nothing is highlighted. The navigation state
//! never touches the selection or the popover itself, it returns a [`NavEffect`] describing
//! what the widget should ask for.
//!
//! Cursors are reset to `None` whenever the popover closes; the widget calls [`reset`] from
//! its close transition, whatever caused the close.
//!
//! [`reset`]: NavigationState::reset

/// What the widget has to do after a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    /// Nothing beyond the cursor update
    None,
    /// Ask the popover to open
    OpenPopover,
    /// Ask the popover to close
    ClosePopover,
    /// The option cursor moved to this index, it has to be scrolled into view
    OptionFocused(usize),
    /// Toggle the option at this index in the selection
    ToggleOption(usize),
    /// Remove the selected value at this index
    RemoveValue(usize),
    /// The key does not apply to navigation, let the text field have it
    Unhandled,
}

/// Option and value cursors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    option: Option<usize>,
    value: Option<usize>,
}

impl NavigationState {
    /// Highlighted option index
    pub fn option_cursor(&self) -> Option<usize> {
        self.option
    }

    /// Highlighted selected-value index
    pub fn value_cursor(&self) -> Option<usize> {
        self.value
    }

    /// Clears both cursors
    pub fn reset(&mut self) {
        if self.option.is_some() || self.value.is_some() {
            trace!("navigation: reset from {:?}/{:?}", self.option, self.value);
        }
        self.option = None;
        self.value = None;
    }

    /// ArrowDown: opens a closed popover, otherwise moves to the next option
    pub fn option_down(&mut self, popover_open: bool, options: usize) -> NavEffect {
        if !popover_open {
            return NavEffect::OpenPopover;
        }
        let next = match self.option {
            _ if options == 0 => None,
            None => Some(0),
            Some(i) => Some((i + 1).min(options - 1)),
        };
        self.move_option(next)
    }

    /// ArrowUp: moves to the previous option, stopping on the first one
    pub fn option_up(&mut self, popover_open: bool, options: usize) -> NavEffect {
        if !popover_open {
            return NavEffect::None;
        }
        let next = match self.option {
            _ if options == 0 => None,
            None | Some(0) => Some(0),
            Some(i) => Some((i - 1).min(options - 1)),
        };
        self.move_option(next)
    }

    /// ArrowLeft: moves to the previous selected value, stopping on the first one
    pub fn value_prev(&mut self, values: usize) -> NavEffect {
        self.value = match self.value {
            _ if values == 0 => None,
            None | Some(0) => Some(0),
            Some(j) => Some((j - 1).min(values - 1)),
        };
        NavEffect::None
    }

    /// ArrowRight: moves to the next selected value, stopping on the last one
    pub fn value_next(&mut self, values: usize) -> NavEffect {
        self.value = match self.value {
            _ if values == 0 => None,
            None => Some(0),
            Some(j) => Some((j + 1).min(values - 1)),
        };
        NavEffect::None
    }

    /// Enter: toggles the highlighted option
    pub fn enter(&self) -> NavEffect {
        match self.option {
            Some(i) => NavEffect::ToggleOption(i),
            None => NavEffect::None,
        }
    }

    /// Escape: closes an open popover
    pub fn escape(&self, popover_open: bool) -> NavEffect {
        if popover_open {
            NavEffect::ClosePopover
        } else {
            NavEffect::None
        }
    }

    /// Delete: removes the highlighted selected value.
    ///
    /// The cursor steps back when the last value is removed and clears when the list is left
    /// empty; removing from the middle keeps the index, which then points at the next value.
    pub fn delete(&mut self, values: usize) -> NavEffect {
        let Some(j) = self.value else {
            return NavEffect::Unhandled;
        };
        if j >= values {
            self.value = None;
            return NavEffect::Unhandled;
        }
        self.value = if values == 1 {
            None
        } else if j == values - 1 {
            Some(j.saturating_sub(1))
        } else {
            Some(j)
        };
        NavEffect::RemoveValue(j)
    }

    /// Puts the value cursor back where it was in `before`
    pub fn restore_value_cursor(&mut self, before: NavigationState) {
        self.value = before.value;
    }

    /// Keeps the option cursor within a list that was just replaced
    pub fn clamp_options(&mut self, options: usize) {
        self.option = clamp(self.option, options);
    }

    /// Keeps the value cursor within a selection that was just replaced
    pub fn clamp_values(&mut self, values: usize) {
        self.value = clamp(self.value, values);
    }

    fn move_option(&mut self, next: Option<usize>) -> NavEffect {
        let changed = next != self.option;
        self.option = next;
        match next {
            Some(i) if changed => NavEffect::OptionFocused(i),
            _ => NavEffect::None,
        }
    }
}

fn clamp(cursor: Option<usize>, len: usize) -> Option<usize> {
    match cursor {
        Some(_) if len == 0 => None,
        Some(i) => Some(i.min(len - 1)),
        None => None,
    }
}
