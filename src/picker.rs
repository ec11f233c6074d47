//! Search-as-you-type location dropdown.
//!
//! Keystrokes go through [`LocationPicker::set_query`]. A query that is long
//! enough is sent after the debounce interval, unless another keystroke
//! arrives first. Every keystroke, selection or teardown bumps a generation
//! counter; timers and responses belonging to an older generation are dropped,
//! so a slow response for `"Pa"` can never overwrite the results for `"Par"`.

use crate::client::LocationSource;
use crate::config::FinderConfig;
use crate::location::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const LOCATION_ERROR_MESSAGE: &str = "Failed to fetch locations.";

/// Snapshot of the dropdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickerState {
    pub query: String,
    pub results: Vec<Location>,
    pub open: bool,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct LocationPicker {
    source: Arc<dyn LocationSource>,
    debounce: Duration,
    min_query_len: usize,
    state: Arc<watch::Sender<PickerState>>,
    generation: Arc<AtomicU64>,
}

impl LocationPicker {
    pub fn new(source: Arc<dyn LocationSource>, config: &FinderConfig) -> Self {
        let (state, _) = watch::channel(PickerState::default());
        Self {
            source,
            debounce: config.debounce,
            min_query_len: config.min_query_len,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> PickerState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PickerState> {
        self.state.subscribe()
    }

    /// Handle a change of the input text. Must be called inside a tokio runtime.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let keyword = query.trim().to_string();

        if keyword.chars().count() < self.min_query_len {
            self.state.send_modify(|state| {
                state.query = query;
                state.results.clear();
                state.open = false;
                state.loading = false;
                state.error = None;
            });
            return;
        }

        self.state.send_modify(|state| state.query = query);

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!(keyword = %keyword, "Debounced query superseded");
                return;
            }

            state.send_modify(|s| s.loading = true);
            let result = source.search_locations(&keyword).await;

            if current.load(Ordering::SeqCst) != generation {
                debug!(keyword = %keyword, "Discarding stale location results");
                return;
            }

            state.send_modify(|s| {
                s.loading = false;
                match result {
                    Ok(locations) => {
                        info!(
                            keyword = %keyword,
                            results = locations.len(),
                            "Location results ready"
                        );
                        s.results = locations;
                        s.error = None;
                        s.open = true;
                    }
                    Err(e) => {
                        warn!(keyword = %keyword, error = %e, "Location search failed");
                        s.results.clear();
                        s.error = Some(LOCATION_ERROR_MESSAGE.to_string());
                    }
                }
            });
        });
    }

    /// Pick the result at `index`, closing the dropdown and clearing the query.
    pub fn select(&self, index: usize) -> Option<Location> {
        let picked = self.state.borrow().results.get(index).cloned()?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|state| {
            state.query.clear();
            state.results.clear();
            state.open = false;
            state.loading = false;
            state.error = None;
        });
        debug!(location = %picked, "Location selected");
        Some(picked)
    }

    /// Reopen the dropdown when the input regains focus and results exist.
    pub fn focus(&self) {
        self.state.send_if_modified(|state| {
            let reopen = !state.open && !state.results.is_empty();
            state.open |= reopen;
            reopen
        });
    }

    /// A pointer-down anywhere on the page; presses outside the dropdown close it.
    pub fn pointer_down(&self, inside_dropdown: bool) {
        if inside_dropdown {
            return;
        }
        self.state.send_if_modified(|state| std::mem::replace(&mut state.open, false));
    }
}

impl Drop for LocationPicker {
    fn drop(&mut self) {
        // Orphan any pending timer or in-flight request.
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for LocationPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationPicker")
            .field("source", &self.source)
            .field("debounce", &self.debounce)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
