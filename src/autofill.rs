//! Module containing autofill's entry point
use std::io::Stderr;
use std::sync::Arc;

use color_eyre::eyre::{self, OptionExt, Result};
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::UnboundedSender;
use tokio::{runtime::Handle, task::block_in_place};

use crate::options::AutofillOptions;
use crate::output::AutofillOutput;
use crate::provider::SearchProvider;
use crate::theme::ColorTheme;
use crate::tui::{App, Event, Tui};

/// Owner of an [`App`] and of the terminal it draws into.
///
/// The widget never changes its own selection: it proposes one with [`Event::Change`] and
/// waits for the owner to hand it back. `Autofill` is the owner that accepts every proposal,
/// and answers every [`Event::PopoverRequest`] of a controlled popover. Embedders that want to
/// veto changes drive the [`App`] themselves through [`app_and_tui`](Autofill::app_and_tui).
pub struct Autofill<Backend = CrosstermBackend<Stderr>>
where
    Backend: ratatui::backend::Backend,
    Backend::Error: Send + Sync + 'static,
{
    app: App,
    tui: Tui<Backend>,
}

impl Autofill {
    /// Runs the widget in the terminal until the user accepts or aborts
    ///
    /// # Params
    ///
    /// - options: how the widget looks and behaves
    /// - provider: answers the searches
    ///
    /// # Returns
    ///
    /// The selection and query at the time the user left, see [`AutofillOutput`]
    pub fn run_with(options: AutofillOptions, provider: Arc<dyn SearchProvider>) -> Result<AutofillOutput> {
        trace!("running autofill");
        let backend = CrosstermBackend::new(std::io::stderr());
        let mut tui = Tui::new_with_height(backend, options.height())?;
        tui.mouse = !options.no_mouse;
        let mut autofill = Self::init(options, provider, tui);

        let task = async {
            autofill.enter()?;
            autofill.run().await?;
            eyre::Ok(())
        };
        if let Ok(handle) = Handle::try_current() {
            block_in_place(|| handle.block_on(task))?;
        } else {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(task)?;
        }

        let output = autofill.output();
        debug!("output: {output:?}");
        Ok(output)
    }
}

impl<Backend: ratatui::backend::Backend + 'static> Autofill<Backend>
where
    Backend::Error: Send + Sync + 'static,
{
    /// Builds the app on top of `tui`, without starting anything yet
    pub fn init(options: AutofillOptions, provider: Arc<dyn SearchProvider>, tui: Tui<Backend>) -> Self {
        let theme = Arc::new(ColorTheme::init_from_options(&options));
        let app = App::from_options(options, theme, provider, tui.event_tx.clone());
        Self { app, tui }
    }

    /// Returns a shared reference to the application state.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Returns a mutable reference to the application state.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Returns a shared reference to the TUI.
    pub fn tui_ref(&self) -> &Tui<Backend> {
        &self.tui
    }

    /// Returns mutable references to both the app and the TUI simultaneously.
    pub fn app_and_tui(&mut self) -> (&mut App, &mut Tui<Backend>) {
        (&mut self.app, &mut self.tui)
    }

    /// Returns a clone of the TUI event sender, to inject events from outside the loop
    pub fn event_sender(&self) -> UnboundedSender<Event> {
        self.tui.event_tx.clone()
    }

    /// Loads the first options and focuses the widget.
    ///
    /// Must be called from within a tokio runtime, since the search runs on it.
    pub fn start(&mut self) -> Result<()> {
        if !self.app.options.no_initial_search {
            self.app.initial_search();
        }
        for evt in self.app.focus() {
            self.tui.event_tx.send(evt)?;
        }
        self.tui.event_tx.send(Event::Render)?;
        Ok(())
    }

    /// Enters the terminal, then [`start`](Autofill::start)s
    pub fn enter(&mut self) -> Result<()> {
        debug!("Entering TUI");
        self.tui.enter()?;
        self.start()
    }

    /// Processes one event, answering the requests addressed to the owner
    pub fn handle_event(&mut self, evt: Event) -> Result<()> {
        match &evt {
            Event::Change(next) => {
                debug!("accepting value {:?}", next.ids());
                self.app.set_value(next.clone());
            }
            Event::PopoverRequest(open) => {
                debug!("answering popover request: {open}");
                self.app.set_popover_open(*open);
            }
            _ => self.app.handle_event(&mut self.tui, &evt)?,
        }
        if !self.app.should_quit && !matches!(evt, Event::Render | Event::Heartbeat) {
            self.tui.event_tx.send(Event::Render)?;
        }
        Ok(())
    }

    /// Returns true if the user accepted or aborted
    pub fn should_quit(&self) -> bool {
        self.app.should_quit
    }

    /// Process a single event loop iteration.
    ///
    /// Returns `Ok(true)` if autofill should quit, `Ok(false)` to continue.
    pub async fn tick(&mut self) -> Result<bool> {
        let evt = self.tui.next().await.ok_or_eyre("Could not acquire next event")?;
        self.handle_event(evt)?;
        Ok(self.app.should_quit)
    }

    /// Run the event loop on the current task until the user accepts or aborts, then leave the
    /// terminal as it was
    pub async fn run(&mut self) -> Result<()> {
        trace!("Starting event loop");
        while !self.tick().await? {}
        self.app.dispose();
        self.tui.exit()
    }

    /// Capture `self` and extract the output
    pub fn output(self) -> AutofillOutput {
        AutofillOutput {
            is_abort: !self.app.accepted,
            query: self.app.input.value.clone(),
            selected: self.app.results(),
        }
    }
}
