use std::sync::Arc;

use color_eyre::eyre::{Result, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::prelude::Backend;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Widget};
use tokio::sync::mpsc::UnboundedSender;

use crate::item::{AutofillItem, Highlighter};
use crate::navigation::{NavEffect, NavigationState};
use crate::options::AutofillOptions;
use crate::popover::{AnchoredPositioner, PopoverController, PopoverEffect};
use crate::provider::SearchProvider;
use crate::render::{ElementId, Renderer};
use crate::search::SearchController;
use crate::selection::SelectionList;
use crate::theme::ColorTheme;
use crate::tui::chips::Chips;
use crate::tui::option_list::OptionList;
use crate::tui::widget::{AutofillRender, AutofillWidget};

use super::Event;
use super::Regions;
use super::Tui;
use super::event::Action;
use super::input::Input;

/// Application state of the autofill widget
///
/// The selection is owned by the caller: the app only proposes the next selection through
/// [`Event::Change`] and shows whatever is given back through [`App::set_value`]. The same goes
/// for the popover flag in controlled mode, with [`Event::PopoverRequest`] and
/// [`App::set_popover_open`].
pub struct App {
    /// Autofill configuration options
    pub options: AutofillOptions,
    /// Color theme
    pub theme: Arc<ColorTheme>,
    /// Whether the application should quit
    pub should_quit: bool,
    /// Whether the user accepted the selection (as opposed to aborting)
    pub accepted: bool,
    /// Whether keys reach the widget
    pub focused: bool,
    /// Current cursor position (x, y)
    pub cursor_pos: (u16, u16),

    /// Text field
    pub input: Input,
    /// Debounced search
    pub search: SearchController,
    /// Popover visibility and placement
    pub popover: PopoverController,
    /// Where things were drawn
    pub regions: Regions,

    value: SelectionList,
    nav: NavigationState,
    /// Cursors from before a proposed removal, until the owner answers
    before_removal: Option<NavigationState>,
    chips: Chips,
    option_list: OptionList,
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut res = AutofillRender::default();
        self.regions.clear();

        self.chips.values = self.value.clone();
        self.chips.current = self.nav.value_cursor();
        let chips_height = self.chips.height(area.width).min(area.height.saturating_sub(1));
        let trigger = Rect::new(area.x, area.y, area.width, chips_height + 1).intersection(area);
        let chips_area = Rect::new(trigger.x, trigger.y, trigger.width, chips_height);
        let input_area = Rect::new(trigger.x, trigger.y + chips_height, trigger.width, 1).intersection(area);

        res |= self.chips.render(chips_area, buf);
        self.input.open = self.popover.is_open();
        res |= self.input.render(input_area, buf);
        res.regions.push((ElementId::Trigger, trigger));

        if self.popover.is_open() {
            res |= self.render_popover(trigger, area, buf);
        }

        self.regions.record(&res);
        if let Some(cursor) = res.cursor {
            self.cursor_pos = (cursor.x, cursor.y);
        }
    }
}

impl App {
    /// Creates the app; nothing is searched until the input changes or
    /// [`initial_search`](App::initial_search) is called
    pub fn from_options(
        options: AutofillOptions,
        theme: Arc<ColorTheme>,
        provider: Arc<dyn SearchProvider>,
        event_tx: UnboundedSender<Event>,
    ) -> Self {
        let search = SearchController::new(provider, event_tx)
            .delay(options.debounce())
            .max_results(options.max_results);
        let popover = PopoverController::new(options.popover_mode)
            .on_open(options.on_open.clone())
            .on_close(options.on_close.clone())
            .positioner(Box::new(AnchoredPositioner::new(options.popover_offset)));
        Self {
            input: Input::from_options(&options, theme.clone()),
            chips: Chips::from_options(&options, theme.clone()),
            option_list: OptionList::from_options(&options, theme.clone()),
            theme,
            should_quit: false,
            accepted: false,
            focused: true,
            cursor_pos: (0, 0),
            search,
            popover,
            regions: Regions::default(),
            value: SelectionList::new(),
            nav: NavigationState::default(),
            before_removal: None,
            options,
        }
    }

    /// The selection as last supplied by the owner
    pub fn value(&self) -> &SelectionList {
        &self.value
    }

    /// Both cursors
    pub fn navigation(&self) -> NavigationState {
        self.nav
    }

    /// The options of the latest applied search
    pub fn options_list(&self) -> &[Arc<dyn AutofillItem>] {
        self.search.options()
    }

    /// The selected items, in selection order
    pub fn results(&self) -> Vec<Arc<dyn AutofillItem>> {
        self.value.iter().cloned().collect()
    }

    /// Supplies the selection, typically in answer to an [`Event::Change`]
    pub fn set_value(&mut self, value: SelectionList) {
        trace!("value set to {:?}", value.ids());
        if let Some(before) = self.before_removal.take()
            && value.ids() == self.value.ids()
        {
            debug!("removal refused, value cursor back to {:?}", before.value_cursor());
            self.nav.restore_value_cursor(before);
        }
        self.value = value;
        self.nav.clamp_values(self.value.len());
    }

    /// Supplies the popover flag, typically in answer to an [`Event::PopoverRequest`]
    pub fn set_popover_open(&mut self, open: bool) {
        if self.popover.set_open(open) && !open {
            self.nav.reset();
            self.before_removal = None;
        }
    }

    /// Searches the empty query right away, bypassing the debounce
    pub fn initial_search(&mut self) {
        self.search.issue("");
    }

    /// Gives input focus to the widget, which opens the popover
    pub fn focus(&mut self) -> Vec<Event> {
        debug!("focus gained");
        self.focused = true;
        let effect = self.popover.request(true);
        self.apply_popover(effect)
    }

    /// Takes input focus away, which closes the popover; keys are ignored until
    /// [`focus`](App::focus)
    pub fn blur(&mut self) -> Vec<Event> {
        debug!("focus lost");
        self.focused = false;
        let effect = self.popover.request(false);
        self.apply_popover(effect)
    }

    /// Stops the pending searches and the pointer listener
    pub fn dispose(&mut self) {
        self.search.dispose();
        self.popover.dispose();
    }

    /// Handles a TUI event and updates application state
    pub fn handle_event<B: Backend>(&mut self, tui: &mut Tui<B>, event: &Event) -> Result<()>
    where
        B::Error: Send + Sync + 'static,
    {
        match event {
            Event::Render => {
                tui.draw(|f| {
                    f.render_widget(&mut *self, f.area());
                    f.set_cursor_position(self.cursor_pos);
                })?;
            }
            Event::Heartbeat => (),
            Event::Quit => {
                tui.exit()?;
                self.should_quit = true;
            }
            Event::Error(msg) => {
                tui.exit()?;
                bail!(msg.to_owned());
            }
            Event::Redraw => {
                tui.clear()?;
            }
            Event::Action(act) => {
                for evt in self.handle_action(act)? {
                    tui.event_tx.send(evt)?;
                }
            }
            Event::Key(key) => {
                for evt in self.handle_key(key) {
                    tui.event_tx.send(evt)?;
                }
            }
            Event::Paste(text) => {
                if self.focused {
                    let text: String = text.chars().filter(|c| !c.is_control()).collect();
                    self.input.insert_str(&text);
                    self.on_query_changed();
                }
            }
            Event::Mouse(mouse_event) => {
                for evt in self.handle_mouse(mouse_event) {
                    tui.event_tx.send(evt)?;
                }
            }
            Event::FocusGained => {
                for evt in self.focus() {
                    tui.event_tx.send(evt)?;
                }
            }
            Event::FocusLost => {
                for evt in self.blur() {
                    tui.event_tx.send(evt)?;
                }
            }
            Event::SearchDue { .. } | Event::SearchResolved { .. } => {
                if self.search.handle(event) {
                    self.on_options_replaced();
                }
            }
            Event::Change(_) | Event::PopoverRequest(_) => {
                trace!("{event:?} is for the owner");
            }
        };

        Ok(())
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Vec<Event> {
        if !self.focused {
            trace!("ignoring key {key:?} without focus");
            return vec![];
        }
        debug!("key event: {:?}", key);

        if let Some(act) = &self.options.keymap.get(key) {
            debug!("{act:?}");
            return act.iter().map(|a| Event::Action(a.clone())).collect();
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char(c)) => vec![Event::Action(Action::AddChar(c))],
            (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                vec![Event::Action(Action::AddChar(c.to_uppercase().next().unwrap_or(c)))]
            }
            _ => vec![],
        }
    }

    fn handle_action(&mut self, act: &Action) -> Result<Vec<Event>> {
        use Action::*;
        let open = self.popover.is_open();
        match act {
            Abort => {
                self.should_quit = true;
                self.accepted = false;
            }
            Accept => {
                self.should_quit = true;
                self.accepted = true;
            }
            AddChar(c) => {
                self.input.insert(*c);
                self.on_query_changed();
            }
            BackwardChar => self.input.move_backward(),
            ForwardChar => self.input.move_forward(),
            BeginningOfLine => self.input.move_to_start(),
            EndOfLine => self.input.move_to_end(),
            BackwardDeleteChar => {
                if self.input.delete_backward().is_some() {
                    self.on_query_changed();
                }
            }
            BackwardKillWord => {
                if !self.input.delete_backward_word().is_empty() {
                    self.on_query_changed();
                }
            }
            UnixWordRubout => {
                if !self.input.delete_backward_to_whitespace().is_empty() {
                    self.on_query_changed();
                }
            }
            UnixLineDiscard => {
                if !self.input.delete_to_beginning().is_empty() {
                    self.on_query_changed();
                }
            }
            DeleteChar => {
                if self.input.delete_forward().is_some() {
                    self.on_query_changed();
                }
            }
            Delete => {
                let before = self.nav;
                let effect = self.nav.delete(self.value.len());
                if effect == NavEffect::Unhandled {
                    // no highlighted value, edit the text instead
                    if self.input.delete_forward().is_some() {
                        self.on_query_changed();
                    }
                    return Ok(vec![]);
                }
                self.before_removal = Some(before);
                return Ok(self.apply_nav(effect));
            }
            ClearSelection => {
                if !self.value.is_empty() {
                    return Ok(self.propose(SelectionList::new()));
                }
            }
            ClosePopover => {
                let effect = self.nav.escape(open);
                return Ok(self.apply_nav(effect));
            }
            OptionDown => {
                let effect = self.nav.option_down(open, self.search.options().len());
                return Ok(self.apply_nav(effect));
            }
            OptionUp => {
                let effect = self.nav.option_up(open, self.search.options().len());
                return Ok(self.apply_nav(effect));
            }
            ToggleOption => {
                let effect = self.nav.enter();
                return Ok(self.apply_nav(effect));
            }
            ValuePrev => {
                self.nav.value_prev(self.value.len());
            }
            ValueNext => {
                self.nav.value_next(self.value.len());
            }
            Redraw => return Ok(vec![Event::Redraw]),
            Ignore => (),
        }
        Ok(vec![])
    }

    fn handle_mouse(&mut self, mouse_event: &MouseEvent) -> Vec<Event> {
        let pos = Position {
            x: mouse_event.column,
            y: mouse_event.row,
        };
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let effect = self.popover.on_pointer_down(pos, &self.regions);
                let mut res = self.apply_popover(effect);
                match self.regions.hit(pos) {
                    Some(ElementId::Option(id)) => {
                        self.focused = true;
                        if let Some(item) = self.search.options().iter().find(|item| item.id() == id) {
                            debug!("option {id} clicked");
                            res.extend(self.propose(self.value.toggled(item)));
                            self.nav.reset();
                        }
                    }
                    Some(ElementId::ValueRemove(id)) => {
                        if let Some(next) = self.value.without(id) {
                            debug!("remove mark of {id} clicked");
                            res.extend(self.propose(next));
                        }
                    }
                    Some(ElementId::Value(_) | ElementId::Trigger) => self.focused = true,
                    Some(ElementId::Popover) | None => (),
                }
                res
            }
            MouseEventKind::ScrollDown if self.popover.is_open() => vec![Event::Action(Action::OptionDown)],
            MouseEventKind::ScrollUp if self.popover.is_open() => vec![Event::Action(Action::OptionUp)],
            _ => vec![],
        }
    }

    fn apply_nav(&mut self, effect: NavEffect) -> Vec<Event> {
        trace!("navigation effect: {effect:?}");
        match effect {
            NavEffect::None | NavEffect::Unhandled => vec![],
            NavEffect::OpenPopover => {
                let effect = self.popover.request(true);
                self.apply_popover(effect)
            }
            NavEffect::ClosePopover => {
                let effect = self.popover.request(false);
                self.apply_popover(effect)
            }
            NavEffect::OptionFocused(i) => {
                if let Some(item) = self.search.options().get(i) {
                    self.regions.scroll_into_view(ElementId::Option(item.id()));
                }
                vec![]
            }
            NavEffect::ToggleOption(i) => match self.search.options().get(i) {
                Some(item) => self.propose(self.value.toggled(item)),
                None => vec![],
            },
            NavEffect::RemoveValue(j) => match self.value.removed_at(j) {
                Some(next) => self.propose(next),
                None => vec![],
            },
        }
    }

    fn apply_popover(&mut self, effect: PopoverEffect) -> Vec<Event> {
        match effect {
            PopoverEffect::Unchanged | PopoverEffect::Applied(true) => vec![],
            PopoverEffect::Applied(false) => {
                self.nav.reset();
                self.before_removal = None;
                vec![]
            }
            PopoverEffect::Requested(open) => vec![Event::PopoverRequest(open)],
        }
    }

    fn propose(&self, next: SelectionList) -> Vec<Event> {
        debug!("proposing value {:?}", next.ids());
        vec![Event::Change(next)]
    }

    fn on_query_changed(&mut self) {
        self.search.input_changed(&self.input.value);
    }

    fn on_options_replaced(&mut self) {
        self.option_list.options = self.search.options().to_vec();
        self.option_list.highlighter = Highlighter::new(&self.search.state().query);
        self.regions.set_rows(self.option_list.rows());
        self.nav.clamp_options(self.option_list.options.len());
    }

    fn message(&self) -> Option<Line<'static>> {
        let state = self.search.state();
        if let Some(error) = &state.error {
            Some(Line::styled(
                format!("{} {error}", self.options.error_prefix),
                self.theme.error,
            ))
        } else if state.pending {
            Some(Line::styled(self.options.loading_message.clone(), self.theme.info))
        } else if self.search.options().is_empty() {
            Some(Line::styled(self.options.empty_message.clone(), self.theme.info))
        } else {
            None
        }
    }

    fn render_popover(&mut self, trigger: Rect, viewport: Rect, buf: &mut Buffer) -> AutofillRender {
        self.option_list.message = self.message();
        self.option_list.current = self.nav.option_cursor();
        self.option_list.selected = self.value.clone();

        let desired = self.option_list.desired_height().saturating_add(2);
        let placement = self.popover.place(trigger, viewport, desired);
        if placement.area.is_empty() {
            return AutofillRender::default();
        }
        let block = Block::default().borders(Borders::ALL).border_style(self.theme.border);
        let inner = block.inner(placement.area);
        Clear.render(placement.area, buf);
        block.render(placement.area, buf);

        self.regions.set_visible(inner.height);
        if let Some(item) = self.nav.option_cursor().and_then(|i| self.search.options().get(i)) {
            self.regions.scroll_into_view(ElementId::Option(item.id()));
        }
        self.option_list.scroll = self.regions.scroll();

        let mut res = self.option_list.render(inner, buf);
        res.regions.push((ElementId::Popover, placement.area));
        res
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.dispose();
    }
}
