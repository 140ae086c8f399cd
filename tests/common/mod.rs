use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use autofill::prelude::*;
use autofill::render::{ElementId, Renderer as _};
use autofill::tui::{App, Tui};
use color_eyre::Result;
use color_eyre::eyre::OptionExt;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use futures::FutureExt as _;
use futures::future::BoxFuture;
use ratatui::Viewport;
use ratatui::backend::TestBackend;
use ratatui::layout::Position;
use ratatui::style::Modifier;

pub const CHARACTERS: [&str; 6] = [
    "Rick Sanchez",
    "Morty Smith",
    "Summer Smith",
    "Beth Smith",
    "Jerry Smith",
    "Mr. Meeseeks",
];

/// Items named after `names`, with 1-based ids
pub fn items(names: &[&str]) -> Vec<Arc<dyn AutofillItem>> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Arc::new(DefaultItem::new(i as u64 + 1, *name)) as Arc<dyn AutofillItem>)
        .collect()
}

pub fn characters() -> StaticProvider {
    StaticProvider::new(items(&CHARACTERS))
}

/// Wraps a provider to count the searches and record their queries
#[derive(Clone)]
pub struct Recording<P> {
    inner: P,
    calls: Arc<AtomicUsize>,
    queries: Arc<std::sync::Mutex<Vec<String>>>,
}

impl<P: SearchProvider> Recording<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Arc::default(),
            queries: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl<P: SearchProvider> SearchProvider for Recording<P> {
    fn search(&self, query: &str) -> BoxFuture<'static, SearchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        self.inner.search(query)
    }
}

/// Provider answering every query with the same error
pub fn failing(message: &'static str) -> impl SearchProvider {
    move |_: &str| -> BoxFuture<'static, SearchResult> {
        async move { Err(SearchError::Provider(message.to_string())) }.boxed()
    }
}

/// A test harness driving an [`Autofill<TestBackend>`] without a terminal.
///
/// Time is paused: timers only fire when the harness waits, so debounce and provider latency
/// are deterministic. Events are drained from the event channel and processed the way the
/// real loop does, with the harness standing in for the owner of the selection.
pub struct TestHarness {
    pub autofill: Autofill<TestBackend>,
    pub runtime: tokio::runtime::Runtime,
    /// Every selection proposed through `Event::Change`
    pub changes: Vec<SelectionList>,
    /// Every `Event::PopoverRequest`
    pub popover_requests: Vec<bool>,
    /// Whether proposed selections are handed back to the widget
    pub accept_changes: bool,
    /// Whether popover requests are answered
    pub answer_popover: bool,
}

impl TestHarness {
    pub fn new(options: AutofillOptions, provider: impl SearchProvider) -> Result<Self> {
        Self::with_size(options, provider, 30, 8)
    }

    pub fn with_size(options: AutofillOptions, provider: impl SearchProvider, width: u16, height: u16) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()?;
        let tui = Tui::with_viewport(TestBackend::new(width, height), Viewport::Fullscreen)?;
        let autofill = Autofill::init(options, Arc::new(provider), tui);
        Ok(Self {
            autofill,
            runtime,
            changes: Vec::new(),
            popover_requests: Vec::new(),
            accept_changes: true,
            answer_popover: true,
        })
    }

    /// Starts the widget with default options and lets the initial search settle
    pub fn started(provider: impl SearchProvider) -> Result<Self> {
        let mut h = Self::new(AutofillOptions::default(), provider)?;
        h.start()?;
        Ok(h)
    }

    pub fn start(&mut self) -> Result<()> {
        {
            let _guard = self.runtime.enter();
            self.autofill.start()?;
        }
        self.settle()
    }

    /// Processes every queued event, including the ones queued while processing
    pub fn tick(&mut self) -> Result<usize> {
        let mut processed = 0;
        loop {
            let mut events = Vec::new();
            let (_, tui) = self.autofill.app_and_tui();
            while let Ok(event) = tui.event_rx.try_recv() {
                events.push(event);
            }
            if events.is_empty() {
                break;
            }
            for event in events {
                self.process_event(event)?;
                processed += 1;
            }
        }
        Ok(processed)
    }

    fn process_event(&mut self, event: Event) -> Result<()> {
        let forward = match &event {
            Event::Change(next) => {
                self.changes.push(next.clone());
                self.accept_changes
            }
            Event::PopoverRequest(open) => {
                self.popover_requests.push(*open);
                self.answer_popover
            }
            _ => true,
        };
        if forward {
            let _guard = self.runtime.enter();
            self.autofill.handle_event(event)?;
        }
        Ok(())
    }

    /// Lets spawned tasks that are ready run, and processes what they sent, until quiet
    pub fn settle(&mut self) -> Result<()> {
        loop {
            self.runtime
                .block_on(async { tokio::time::sleep(Duration::from_millis(1)).await });
            if self.tick()? == 0 {
                return Ok(());
            }
        }
    }

    /// Advances the paused clock by `duration`, then settles
    pub fn wait(&mut self, duration: Duration) -> Result<()> {
        self.runtime.block_on(async move { tokio::time::sleep(duration).await });
        self.settle()
    }

    /// Waits for the default debounce delay
    pub fn wait_debounce(&mut self) -> Result<()> {
        self.wait(Duration::from_millis(350))
    }

    pub fn send(&mut self, event: Event) -> Result<()> {
        self.autofill.event_sender().send(event)?;
        self.tick()?;
        Ok(())
    }

    pub fn key(&mut self, code: KeyCode) -> Result<()> {
        self.send(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    pub fn ctrl(&mut self, c: char) -> Result<()> {
        self.send(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)))
    }

    pub fn char(&mut self, c: char) -> Result<()> {
        self.key(KeyCode::Char(c))
    }

    pub fn type_str(&mut self, s: &str) -> Result<()> {
        for c in s.chars() {
            self.char(c)?;
        }
        Ok(())
    }

    pub fn action(&mut self, action: Action) -> Result<()> {
        self.send(Event::Action(action))
    }

    pub fn click(&mut self, x: u16, y: u16) -> Result<()> {
        self.send(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }))
    }

    /// Clicks the top left cell of the last drawn region of `id`
    pub fn click_on(&mut self, id: ElementId) -> Result<()> {
        let rect = self
            .autofill
            .app()
            .regions
            .bounding_region(id)
            .ok_or_eyre("element was not drawn")?;
        self.click(rect.x, rect.y)
    }

    /// Consumes the harness, like the binary does once the loop is over
    pub fn output(self) -> AutofillOutput {
        self.autofill.output()
    }

    pub fn app(&self) -> &App {
        self.autofill.app()
    }

    pub fn query(&self) -> String {
        self.app().input.value.clone()
    }

    pub fn value_names(&self) -> Vec<String> {
        self.app().value().iter().map(|i| i.name().into_owned()).collect()
    }

    pub fn option_names(&self) -> Vec<String> {
        self.app().options_list().iter().map(|i| i.name().into_owned()).collect()
    }

    pub fn is_open(&self) -> bool {
        self.app().popover.is_open()
    }

    /// The text of the screen, one string per row with trailing blanks removed
    /// Text modifiers of one cell, as last drawn
    pub fn modifier_at(&self, x: u16, y: u16) -> Modifier {
        self.autofill.tui_ref().backend().buffer()[Position::new(x, y)].modifier
    }

    pub fn screen(&mut self) -> Result<Vec<String>> {
        self.send(Event::Render)?;
        let buffer = self.autofill.tui_ref().backend().buffer();
        let area = buffer.area;
        Ok((area.top()..area.bottom())
            .map(|y| {
                let row: String = (area.left()..area.right())
                    .map(|x| buffer[Position::new(x, y)].symbol())
                    .collect();
                row.trim_end().to_string()
            })
            .collect())
    }
}
