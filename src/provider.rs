//! Search providers: where the candidate items come from.
//!
//! The widget only knows the [`SearchProvider`] trait. A provider is asked for the items
//! matching a settled query and resolves to either a list of items or a [`SearchError`].
//! [`StaticProvider`] serves an in-memory list and behaves like a paginated lookup service,
//! including its "nothing here" answer when no item matches.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use futures::FutureExt as _;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::item::{AutofillItem, DefaultItem, ItemId};

/// Error message a provider uses to say "no results"; this is not a failure
pub const NOTHING_HERE: &str = "There is nothing here";

/// Failure reported by a [`SearchProvider`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The provider answered with an error message
    #[error("{0}")]
    Provider(String),
    /// The provider could not be reached or its answer could not be read
    #[error("{0}")]
    Transport(String),
}

impl SearchError {
    /// The human readable message carried by the error
    pub fn message(&self) -> &str {
        match self {
            Self::Provider(msg) | Self::Transport(msg) => msg,
        }
    }

    /// Whether this is the provider's "empty result" answer rather than a fault
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::Provider(msg) if msg == NOTHING_HERE)
    }
}

/// What a search resolves to
pub type SearchResult = Result<Vec<Arc<dyn AutofillItem>>, SearchError>;

/// Source of candidate items for a query
pub trait SearchProvider: Send + Sync + 'static {
    /// Starts a search for `query`; the returned future must not borrow the provider
    fn search(&self, query: &str) -> BoxFuture<'static, SearchResult>;
}

impl<F> SearchProvider for F
where
    F: Fn(&str) -> BoxFuture<'static, SearchResult> + Send + Sync + 'static,
{
    fn search(&self, query: &str) -> BoxFuture<'static, SearchResult> {
        self(query)
    }
}

//------------------------------------------------------------------------------
/// In-memory provider filtering names by case-insensitive substring
#[derive(Clone, Default)]
pub struct StaticProvider {
    items: Arc<Vec<Arc<dyn AutofillItem>>>,
    latency: Duration,
}

impl StaticProvider {
    /// Serves `items`, answering immediately
    pub fn new(items: Vec<Arc<dyn AutofillItem>>) -> Self {
        Self {
            items: Arc::new(items),
            latency: Duration::ZERO,
        }
    }

    /// Delays every answer by `latency`, to behave like a remote service
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Reads items from `reader`, one per line.
    ///
    /// Lines starting with `{` are parsed as JSON [`DefaultItem`]s, any other non-blank line
    /// becomes an item named after the line, with its 1-based line number as id.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut items: Vec<Arc<dyn AutofillItem>> = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.wrap_err("failed to read items")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let item = if line.starts_with('{') {
                serde_json::from_str::<DefaultItem>(line)
                    .wrap_err_with(|| format!("invalid item on line {}", idx + 1))?
            } else {
                DefaultItem::new((idx + 1) as ItemId, line)
            };
            items.push(Arc::new(item));
        }
        debug!("static provider: read {} items", items.len());
        Ok(Self::new(items))
    }

    /// Number of items served
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item is served at all
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn filter(items: &[Arc<dyn AutofillItem>], query: &str) -> SearchResult {
        let needle = query.to_lowercase();
        let found: Vec<Arc<dyn AutofillItem>> = items
            .iter()
            .filter(|item| item.name().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        if found.is_empty() {
            Err(SearchError::Provider(NOTHING_HERE.to_string()))
        } else {
            Ok(found)
        }
    }
}

impl SearchProvider for StaticProvider {
    fn search(&self, query: &str) -> BoxFuture<'static, SearchResult> {
        let items = self.items.clone();
        let latency = self.latency;
        let query = query.to_string();
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Self::filter(&items, &query)
        }
        .boxed()
    }
}
