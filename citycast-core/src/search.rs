//! Location search as the user types.
//!
//! Every keystroke supersedes the previous attempt. A request only goes out
//! once the query has been quiet for the debounce window, and a result that
//! arrives for a superseded query is thrown away.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::{
    ErrorCategory, Location, SearchSettings, WeatherProvider,
    pipeline::{TaskSlot, bounded},
    state::{StateCell, Ticket},
};

const SEARCH_FALLBACK: &str = "Failed to search locations";

/// Published state of one search session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Last text entered, updated on every keystroke.
    pub query: String,
    /// Matches in provider order.
    pub results: Vec<Location>,
    /// True only while a request for the current query is outstanding.
    pub is_loading: bool,
    /// Failure of the most recent completed attempt for the current query.
    pub error: Option<ErrorCategory>,
    /// Bumped each time an attempt publishes its outcome. Lets a reader
    /// tell a fresh outcome from the previous one without watching
    /// `is_loading` flip.
    pub completed: u64,
}

impl SearchState {
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

#[derive(Debug)]
pub struct SearchCoordinator {
    provider: Arc<dyn WeatherProvider>,
    settings: SearchSettings,
    state: Arc<StateCell<SearchState>>,
    task: TaskSlot,
}

impl SearchCoordinator {
    pub fn new(provider: Arc<dyn WeatherProvider>, settings: SearchSettings) -> Self {
        Self {
            provider,
            settings,
            state: Arc::new(StateCell::default()),
            task: TaskSlot::default(),
        }
    }

    pub fn state(&self) -> SearchState {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Feed a new query, e.g. on every keystroke.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime with a non-blank query.
    pub fn on_query_changed(&self, query: &str) {
        tracing::debug!(query, "search query changed");
        self.task.cancel();

        let blank = query.trim().is_empty();
        let ticket = self.state.begin(|state| {
            state.query = query.to_string();
            state.error = None;
            state.is_loading = false;
            if blank {
                state.results.clear();
            }
        });

        if blank {
            tracing::debug!("query is blank, clearing results");
            return;
        }

        self.spawn(ticket, query.to_string(), Some(self.settings.debounce()));
    }

    /// Re-run the search for the current query right away, skipping the
    /// debounce. Does nothing while the query is blank.
    pub fn refresh(&self) {
        let query = self.state.current().query;
        if query.trim().is_empty() {
            tracing::warn!("cannot refresh: search query is blank");
            return;
        }

        tracing::debug!(query = %query, "refreshing location search");
        self.task.cancel();
        let ticket = self.state.begin(|state| {
            state.is_loading = true;
            state.error = None;
        });
        self.spawn(ticket, query, None);
    }

    fn spawn(&self, ticket: Ticket, query: String, debounce: Option<Duration>) {
        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let timeout = self.settings.timeout();

        let handle = tokio::spawn(async move {
            if let Some(delay) = debounce {
                tokio::time::sleep(delay).await;
            }
            run_search(provider.as_ref(), &state, ticket, &query, timeout).await;
        });
        self.task.replace(handle);
    }
}

async fn run_search(
    provider: &dyn WeatherProvider,
    state: &StateCell<SearchState>,
    ticket: Ticket,
    query: &str,
    timeout: Duration,
) {
    let started = state.publish(ticket, |state| {
        state.is_loading = true;
        state.error = None;
    });
    if !started {
        return;
    }

    tracing::debug!(query, "performing location search");
    let outcome = bounded(timeout, SEARCH_FALLBACK, provider.search_locations(query)).await;

    match &outcome {
        Ok(found) => tracing::info!(query, count = found.len(), "location search succeeded"),
        Err(category) => tracing::warn!(query, error = %category, "location search failed"),
    }

    let applied = state.publish(ticket, |state| {
        state.is_loading = false;
        state.completed += 1;
        match outcome {
            Ok(found) => {
                state.results = found;
                state.error = None;
            }
            Err(category) => {
                state.results.clear();
                state.error = Some(category);
            }
        }
    });
    if !applied {
        tracing::debug!(query, "discarding result of superseded search");
    }
}
