//! Popover visibility and placement.
//!
//! The popover is the floating option list attached to the trigger (chips and text field).
//! Its open flag is either self-managed ([`PopoverMode::Uncontrolled`]) or owned by the
//! embedding code ([`PopoverMode::Controlled`]), in which case the controller only reports
//! requests and waits for the owner to call [`PopoverController::set_open`].

use std::fmt;
use std::sync::Arc;

use ratatui::layout::{Position, Rect};

use crate::render::{ElementId, Renderer};

/// Callback fired when the popover is asked to open or close
pub type PopoverCallback = Arc<dyn Fn() + Send + Sync>;

/// Who owns the open flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PopoverMode {
    /// The controller applies its own requests
    #[default]
    Uncontrolled,
    /// The owner receives requests and supplies the flag back
    Controlled,
}

/// Result of an open/close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverEffect {
    /// Nothing to do, the popover is already in the requested state
    Unchanged,
    /// The flag was changed to this value
    Applied(bool),
    /// The owner has to be asked to set the flag to this value
    Requested(bool),
}

/// Which side of the anchor the popover ended up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Under the anchor
    Below,
    /// Over the anchor
    Above,
}

/// Where to draw the popover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The popover area, inside the viewport
    pub area: Rect,
    /// Side of the anchor
    pub side: Side,
}

/// Computes the popover area from the anchor geometry
pub trait Positioner: Send + Sync {
    /// Places a popover of `desired_height` rows next to `anchor`, inside `viewport`
    fn place(&self, anchor: Rect, viewport: Rect, desired_height: u16) -> Placement;
}

/// Places the popover under the anchor, flipping above it when it does not fit
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredPositioner {
    /// Rows between the anchor and the popover
    pub offset: u16,
}

impl AnchoredPositioner {
    /// A positioner leaving `offset` rows between anchor and popover
    pub fn new(offset: u16) -> Self {
        Self { offset }
    }
}

impl Positioner for AnchoredPositioner {
    fn place(&self, anchor: Rect, viewport: Rect, desired_height: u16) -> Placement {
        let x = anchor.x.max(viewport.x);
        let width = anchor.width.min(viewport.right().saturating_sub(x));

        let below_top = anchor.bottom().saturating_add(self.offset);
        let below = viewport.bottom().saturating_sub(below_top);
        let above = anchor.y.saturating_sub(viewport.y).saturating_sub(self.offset);

        if below >= desired_height || below >= above {
            let height = desired_height.min(below);
            Placement {
                area: Rect::new(x, below_top.min(viewport.bottom()), width, height),
                side: Side::Below,
            }
        } else {
            let height = desired_height.min(above);
            let y = anchor.y.saturating_sub(self.offset).saturating_sub(height);
            Placement {
                area: Rect::new(x, y, width, height),
                side: Side::Above,
            }
        }
    }
}

/// Open flag, callbacks and outside-click dismissal
pub struct PopoverController {
    mode: PopoverMode,
    open: bool,
    on_open: Option<PopoverCallback>,
    on_close: Option<PopoverCallback>,
    listening: bool,
    positioner: Box<dyn Positioner>,
}

impl fmt::Debug for PopoverController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopoverController")
            .field("mode", &self.mode)
            .field("open", &self.open)
            .field("listening", &self.listening)
            .finish_non_exhaustive()
    }
}

impl Default for PopoverController {
    fn default() -> Self {
        Self::new(PopoverMode::default())
    }
}

impl PopoverController {
    /// A closed popover, listening for pointer events
    pub fn new(mode: PopoverMode) -> Self {
        Self {
            mode,
            open: false,
            on_open: None,
            on_close: None,
            listening: true,
            positioner: Box::new(AnchoredPositioner::default()),
        }
    }

    /// Sets the callback fired on every open request
    #[must_use]
    pub fn on_open(mut self, callback: Option<PopoverCallback>) -> Self {
        self.on_open = callback;
        self
    }

    /// Sets the callback fired on every close request
    #[must_use]
    pub fn on_close(mut self, callback: Option<PopoverCallback>) -> Self {
        self.on_close = callback;
        self
    }

    /// Replaces the positioner
    #[must_use]
    pub fn positioner(mut self, positioner: Box<dyn Positioner>) -> Self {
        self.positioner = positioner;
        self
    }

    /// Whether the popover is shown
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether outside clicks are still watched
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Asks for the popover to be opened or closed
    pub fn request(&mut self, open: bool) -> PopoverEffect {
        if open == self.open {
            return PopoverEffect::Unchanged;
        }
        let callback = if open { &self.on_open } else { &self.on_close };
        if let Some(cb) = callback {
            cb();
        }
        match self.mode {
            PopoverMode::Uncontrolled => {
                debug!("popover: {}", if open { "open" } else { "close" });
                self.open = open;
                PopoverEffect::Applied(open)
            }
            PopoverMode::Controlled => {
                debug!("popover: requesting {}", if open { "open" } else { "close" });
                PopoverEffect::Requested(open)
            }
        }
    }

    /// Sets the flag supplied by the owner; returns whether it changed
    pub fn set_open(&mut self, open: bool) -> bool {
        let changed = open != self.open;
        if changed {
            debug!("popover: set to {open}");
        }
        self.open = open;
        changed
    }

    /// Outside-click dismissal.
    ///
    /// A press outside both the trigger and the popover closes an open popover, a press on the
    /// trigger opens a closed one. Presses inside the popover content never close it.
    pub fn on_pointer_down(&mut self, pos: Position, renderer: &dyn Renderer) -> PopoverEffect {
        if !self.listening {
            return PopoverEffect::Unchanged;
        }
        let inside = |id: ElementId| renderer.bounding_region(id).is_some_and(|r: Rect| r.contains(pos));
        let in_trigger = inside(ElementId::Trigger);
        let in_popover = self.open && inside(ElementId::Popover);
        trace!("popover: pointer down at {pos:?}, trigger: {in_trigger}, popover: {in_popover}");
        match (self.open, in_trigger, in_popover) {
            (true, false, false) => self.request(false),
            (false, true, _) => self.request(true),
            _ => PopoverEffect::Unchanged,
        }
    }

    /// Places the popover content for the current anchor
    pub fn place(&self, anchor: Rect, viewport: Rect, desired_height: u16) -> Placement {
        self.positioner.place(anchor, viewport, desired_height)
    }

    /// Stops watching pointer events
    pub fn dispose(&mut self) {
        if self.listening {
            debug!("popover: disposing");
        }
        self.listening = false;
    }
}
