//! Debounced search orchestration.
//!
//! Every edit of the text field goes through [`SearchController::input_changed`], which
//! (re)arms a single timer task. When the input stays quiet for the debounce delay, the timer
//! sends [`Event::SearchDue`] back to the event loop and the controller issues one provider
//! call for the latest text. Provider calls run as tokio tasks and report through
//! [`Event::SearchResolved`]; only the response of the latest issued call is applied.
//!
//! All state changes happen in [`SearchController::handle`], on the event loop. The tasks only
//! send events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::item::AutofillItem;
use crate::provider::{SearchProvider, SearchResult};
use crate::tui::Event;

/// Default quiet period before a search is issued
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);
/// Default cap on the number of options kept from a response
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Outcome of the searches so far, as rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Text of the last successfully applied search
    pub query: String,
    /// Whether a search has been issued and not answered yet
    pub pending: bool,
    /// Message of the last failed search
    pub error: Option<String>,
}

/// Owns the debounce timer and the in-flight searches
pub struct SearchController {
    provider: Arc<dyn SearchProvider>,
    event_tx: UnboundedSender<Event>,
    delay: Duration,
    max_results: usize,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every input change, a due timer with an older generation is stale
    generation: u64,
    /// Sequence id of the latest issued call
    issued: u64,
    cancel: CancellationToken,
    disposed: bool,
    state: SearchState,
    options: Vec<Arc<dyn AutofillItem>>,
}

impl SearchController {
    /// Creates an idle controller; nothing is scheduled until the input changes
    pub fn new(provider: Arc<dyn SearchProvider>, event_tx: UnboundedSender<Event>) -> Self {
        Self {
            provider,
            event_tx,
            delay: DEFAULT_DEBOUNCE,
            max_results: DEFAULT_MAX_RESULTS,
            timer: None,
            generation: 0,
            issued: 0,
            cancel: CancellationToken::new(),
            disposed: false,
            state: SearchState::default(),
            options: Vec::new(),
        }
    }

    /// Sets the debounce delay
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the maximum number of options kept from a response
    #[must_use]
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Current search state
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Options from the latest applied search
    pub fn options(&self) -> &[Arc<dyn AutofillItem>] {
        &self.options
    }

    /// (Re)schedules the search for `text`, replacing any search still waiting for its delay
    pub fn input_changed(&mut self, text: &str) {
        if self.disposed {
            return;
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
        let generation = self.generation;
        let query = text.to_string();
        let delay = self.delay;
        let tx = self.event_tx.clone();
        trace!("search: scheduling {query:?} (generation {generation}) in {delay:?}");
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            _ = tx.send(Event::SearchDue { generation, query });
        }));
    }

    /// Issues a provider call for `query` right away.
    ///
    /// Used for the debounced path once the timer fires, and by the owner for the initial load.
    pub fn issue(&mut self, query: &str) {
        if self.disposed {
            return;
        }
        self.issued += 1;
        let seq = self.issued;
        self.state.pending = true;
        self.state.error = None;
        debug!("search: issuing #{seq} for {query:?}");

        let fut = self.provider.search(query);
        let query = query.to_string();
        let tx = self.event_tx.clone();
        let token = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("search: #{seq} cancelled");
                }
                result = fut => {
                    _ = tx.send(Event::SearchResolved { seq, query, result });
                }
            }
        });
    }

    /// Processes the search events; returns whether the options were replaced
    pub fn handle(&mut self, event: &Event) -> bool {
        match event {
            Event::SearchDue { generation, query } => {
                self.due(*generation, query);
                false
            }
            Event::SearchResolved { seq, query, result } => self.apply(*seq, query, result),
            _ => false,
        }
    }

    fn due(&mut self, generation: u64, query: &str) {
        if self.disposed || generation != self.generation {
            trace!("search: ignoring stale timer {generation} (current {})", self.generation);
            return;
        }
        self.timer = None;
        self.issue(query);
    }

    fn apply(&mut self, seq: u64, query: &str, result: &SearchResult) -> bool {
        if self.disposed {
            return false;
        }
        if seq != self.issued {
            debug!("search: dropping response #{seq} for {query:?}, latest is #{}", self.issued);
            return false;
        }
        self.state.pending = false;
        match result {
            Ok(items) => {
                self.options = items.iter().take(self.max_results).cloned().collect();
                self.state.query = query.to_string();
                self.state.error = None;
                debug!("search: #{seq} got {} items ({} kept)", items.len(), self.options.len());
            }
            Err(e) if e.is_empty_result() => {
                self.options.clear();
                self.state.query = query.to_string();
                self.state.error = None;
                debug!("search: #{seq} has no results");
            }
            Err(e) => {
                self.options.clear();
                self.state.error = Some(e.message().to_string());
                warn!("search: #{seq} for {query:?} failed: {e}");
            }
        }
        true
    }

    /// Stops the timer and the in-flight calls; nothing changes the state afterwards
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!("search: disposing");
        self.disposed = true;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.cancel.cancel();
        self.state.pending = false;
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.dispose();
    }
}
