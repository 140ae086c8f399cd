use std::ops::{Deref, DerefMut};
use std::sync::Once;

use color_eyre::eyre::Result;
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste, EnableFocusChange,
    EnableMouseCapture, KeyEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{self, cursor};
use futures::{FutureExt as _, StreamExt as _};
use ratatui::layout::Rect;
use ratatui::prelude::Backend;
use ratatui::{TerminalOptions, Viewport};
use tokio::sync::mpsc::unbounded_channel;
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::{Event, Size};

const TICK_RATE: f64 = 12.;
const FRAME_RATE: f64 = 1.;
static PANIC_HOOK_SET: Once = Once::new();

/// Terminal user interface handler for autofill
pub struct Tui<B: Backend = ratatui::backend::CrosstermBackend<std::io::Stderr>> {
    /// The ratatui terminal instance
    pub terminal: ratatui::Terminal<B>,
    /// Background task handle for event polling
    pub task: Option<JoinHandle<()>>,
    /// Receiver for TUI events
    pub event_rx: UnboundedReceiver<Event>,
    /// Sender for TUI events
    pub event_tx: UnboundedSender<Event>,
    /// Frame rate for rendering (frames per second)
    pub frame_rate: f64,
    /// Tick rate for updates (ticks per second)
    pub tick_rate: f64,
    /// Token for cancelling background tasks
    pub cancellation_token: CancellationToken,
    /// Whether running in fullscreen mode
    pub is_fullscreen: bool,
    /// Whether mouse events are captured
    pub mouse: bool,
}

impl<B: Backend> Tui<B>
where
    B::Error: Send + Sync + 'static,
{
    /// Creates a new TUI with the specified backend and height, drawn inline under the cursor
    /// unless the height is 100%
    pub fn new_with_height(backend: B, height: Size) -> Result<Self> {
        let term = backend.size()?;
        let lines = match height {
            Size::Percent(100) => None,
            Size::Fixed(lines) => Some(lines),
            Size::Percent(p) => Some(term.height * p / 100),
        };

        let viewport = if let Some(height) = lines {
            // 0-based, read from /dev/tty so that a redirected stdout does not get in the way
            let (_, row) = cursor::position()?;
            let height = height.min(term.height);
            let below = term.height.saturating_sub(row);
            let mut y = row;
            if below < height {
                let to_scroll = height - below;
                crossterm::execute!(std::io::stderr(), crossterm::terminal::ScrollUp(to_scroll))?;
                y = y.saturating_sub(to_scroll);
            }
            Viewport::Fixed(Rect::new(0, y, term.width, height))
        } else {
            Viewport::Fullscreen
        };

        set_panic_hook();
        Self::with_viewport(backend, viewport)
    }

    /// Creates a new TUI drawing into `viewport`, without touching the real terminal
    pub fn with_viewport(backend: B, viewport: Viewport) -> Result<Self> {
        let event_channel = unbounded_channel();
        let is_fullscreen = matches!(viewport, Viewport::Fullscreen);
        Ok(Self {
            terminal: ratatui::Terminal::with_options(backend, TerminalOptions { viewport })?,
            task: None,
            event_rx: event_channel.1,
            event_tx: event_channel.0,
            frame_rate: FRAME_RATE,
            tick_rate: TICK_RATE,
            cancellation_token: CancellationToken::default(),
            is_fullscreen,
            mouse: true,
        })
    }

    /// Enters the TUI by enabling raw mode and starting event handling
    pub fn enter(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(std::io::stderr(), EnableFocusChange, EnableBracketedPaste)?;
        if self.mouse {
            crossterm::execute!(std::io::stderr(), EnableMouseCapture)?;
        }
        if self.is_fullscreen {
            crossterm::execute!(std::io::stderr(), EnterAlternateScreen)?;
        }
        self.start();
        Ok(())
    }

    /// Exits the TUI by stopping event handling and disabling raw mode
    pub fn exit(&mut self) -> Result<()> {
        self.stop();
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            crossterm::execute!(
                std::io::stderr(),
                DisableMouseCapture,
                DisableFocusChange,
                DisableBracketedPaste,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            crossterm::terminal::disable_raw_mode()?;
        }
        // Inline: wipe the drawing area and leave the cursor at its top
        if !self.is_fullscreen {
            self.clear()?;
            let area = self.get_frame().area();
            self.set_cursor_position(ratatui::layout::Position { x: area.x, y: area.y })?;
        };
        Ok(())
    }
}

impl<B: Backend> Tui<B> {
    /// Stops the TUI event loop
    /// Equivalent to self.cancel()
    pub fn stop(&self) {
        self.cancel();
    }
    /// Cancels all background tasks
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }
    /// Starts the event loop for handling terminal and timer events
    pub fn start(&mut self) {
        let tick_delay = std::time::Duration::from_secs_f64(1.0 / self.tick_rate);
        let render_delay = std::time::Duration::from_secs_f64(1.0 / self.frame_rate);
        if self.task.is_some() {
            self.cancel();
            self.cancellation_token = CancellationToken::default();
        }
        let event_tx_clone = self.event_tx.clone();
        let cancellation_token_clone = self.cancellation_token.clone();
        self.task = Some(tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_delay);
            let mut render_interval = tokio::time::interval(render_delay);
            loop {
                let tick_delay = tick_interval.tick();
                let render_delay = render_interval.tick();
                let crossterm_event = reader.next().fuse();
                tokio::select! {
                    _ = cancellation_token_clone.cancelled() => {
                        break;
                    }
                    maybe_event = crossterm_event => {
                      use crossterm::event::Event as CtEvent;
                      let event = match maybe_event {
                        Some(Ok(CtEvent::Key(key))) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
                        Some(Ok(CtEvent::Mouse(mouse))) => Some(Event::Mouse(mouse)),
                        Some(Ok(CtEvent::Paste(text))) => Some(Event::Paste(text)),
                        Some(Ok(CtEvent::FocusGained)) => Some(Event::FocusGained),
                        Some(Ok(CtEvent::FocusLost)) => Some(Event::FocusLost),
                        Some(Ok(CtEvent::Resize(_, _))) => Some(Event::Render),
                        Some(Err(e)) => Some(Event::Error(e.to_string())),
                        None | Some(Ok(_)) => None,
                      };
                      if let Some(event) = event {
                        _ = event_tx_clone.send(event);
                      }
                    },
                    _ = tick_delay => {
                        _ = event_tx_clone.send(Event::Heartbeat);
                    },
                    _ = render_delay => {
                        _ = event_tx_clone.send(Event::Render);
                    },
                }
            }
        }));
    }

    /// Gets the next event from the event queue
    pub async fn next(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }
}

impl<B: Backend> Deref for Tui<B> {
    type Target = ratatui::Terminal<B>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl<B: Backend> DerefMut for Tui<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl<B: Backend> Drop for Tui<B> {
    fn drop(&mut self) {
        if let Some(t) = self.task.take() {
            t.abort();
        }
        self.cancel();
        if crossterm::terminal::is_raw_mode_enabled().unwrap_or(false) {
            _ = crossterm::execute!(
                std::io::stderr(),
                DisableMouseCapture,
                DisableFocusChange,
                DisableBracketedPaste,
                LeaveAlternateScreen,
                cursor::Show
            );
            _ = crossterm::terminal::disable_raw_mode();
        }
    }
}

fn set_panic_hook() {
    PANIC_HOOK_SET.call_once(|| {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            ratatui::restore(); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    });
}
