//! Request lifecycle coordination: cancellation, debouncing, and the
//! feed state machines consumed by the view layer.
//!
//! For the records list there is at most one request in flight: issuing
//! a new one cancels the previous through its [`CancelSource`], so a
//! superseded request can never write state. Departments and stats run
//! in their own independent cancel scopes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use crate::api::RecordsApi;
use crate::models::{PageInfo, Record, RecordStats};
use crate::query::FilterState;

/// Owning side of a cancellation scope. Cancelling (or dropping) it
/// resolves every associated [`CancelHandle`].
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

/// Waitable side of a cancellation scope, raced against requests.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    rx: watch::Receiver<bool>,
    // Keeps a detached channel open for handles built with `never()`.
    _keepalive: Option<Arc<watch::Sender<bool>>>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn handle(&self) -> CancelHandle {
        CancelHandle {
            rx: self.tx.subscribe(),
            _keepalive: None,
        }
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelSource {
    fn drop(&mut self) {
        let _ = self.tx.send(true);
    }
}

impl CancelHandle {
    /// A handle that never fires, for callers without a cancel scope.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            rx,
            _keepalive: Some(Arc::new(tx)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the scope is cancelled or its source is dropped.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

/// Delays applying a changing value until it has been quiet for the
/// configured delay; a newer value supersedes the pending one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<CancelSource>,
}

/// One pending debounce tick; await [`settle`](DebouncedTick::settle)
/// to learn whether the value survived the quiet period.
#[derive(Debug)]
pub struct DebouncedTick {
    value: String,
    delay: Duration,
    handle: CancelHandle,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending value with a newer one.
    pub fn push(&mut self, value: impl Into<String>) -> DebouncedTick {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }
        let source = CancelSource::new();
        let handle = source.handle();
        self.pending = Some(source);
        DebouncedTick {
            value: value.into(),
            delay: self.delay,
            handle,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DebouncedTick {
    /// `Some(value)` when the quiet period elapsed, `None` when a newer
    /// push superseded this tick.
    pub async fn settle(self) -> Option<String> {
        tokio::select! {
            _ = self.handle.cancelled() => None,
            _ = tokio::time::sleep(self.delay) => Some(self.value),
        }
    }
}

/// A point-in-time copy of the records feed for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub records: Vec<Record>,
    pub page_info: Option<PageInfo>,
    pub departments: Vec<String>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct FeedState {
    records: Vec<Record>,
    page_info: Option<PageInfo>,
    departments: Vec<String>,
    is_loading: bool,
    is_refreshing: bool,
    error: Option<String>,
    has_loaded: bool,
    departments_requested: bool,
    seq: u64,
    in_flight: Option<CancelSource>,
    departments_scope: Option<CancelSource>,
}

/// State machine for the records-list query.
///
/// `idle → loading → (success | error)`, with `refreshing` marking
/// "have data, fetching newer data". Failures keep the previously
/// loaded records; cancellations touch nothing.
#[derive(Debug, Clone)]
pub struct RecordsFeed {
    api: Arc<RecordsApi>,
    state: Arc<Mutex<FeedState>>,
}

impl RecordsFeed {
    pub fn new(api: Arc<RecordsApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(FeedState {
                is_loading: true,
                ..FeedState::default()
            })),
        }
    }

    /// Fetch records for the given filters, superseding any request
    /// still in flight.
    pub async fn load(&self, filters: &FilterState) {
        let (handle, seq) = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.in_flight.take() {
                tracing::debug!("superseding in-flight records request");
                previous.cancel();
            }
            state.seq += 1;
            let source = CancelSource::new();
            let handle = source.handle();
            state.in_flight = Some(source);
            if state.has_loaded {
                state.is_refreshing = true;
            } else {
                state.is_loading = true;
            }
            state.error = None;
            (handle, state.seq)
        };

        let outcome = self.api.list_records(filters, &handle).await;

        let mut state = self.state.lock().await;
        if state.seq != seq {
            // A newer request owns the flags now.
            return;
        }
        state.in_flight = None;
        match outcome {
            Ok(Some(list)) => {
                state.records = list.records;
                state.page_info = list.page_info;
                state.has_loaded = true;
                state.is_loading = false;
                state.is_refreshing = false;
            }
            Ok(None) => {
                // Cancelled without a successor (view torn down): no-op.
            }
            Err(err) => {
                tracing::warn!(error = %err, "records fetch failed");
                state.error = Some(err.to_string());
                state.is_loading = false;
                state.is_refreshing = false;
            }
        }
    }

    /// Fetch the department list. Runs at most once per feed lifetime,
    /// on its own cancel scope; filter changes never retrigger it.
    pub async fn load_departments(&self) {
        let handle = {
            let mut state = self.state.lock().await;
            if state.departments_requested {
                return;
            }
            state.departments_requested = true;
            let source = CancelSource::new();
            let handle = source.handle();
            state.departments_scope = Some(source);
            handle
        };

        match self.api.list_departments(&handle).await {
            Ok(Some(departments)) => {
                self.state.lock().await.departments = departments;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "departments fetch failed");
                self.state.lock().await.error = Some(err.to_string());
            }
        }
    }

    /// Tear the feed down (view unmount): cancels everything in flight.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if let Some(source) = state.in_flight.take() {
            source.cancel();
        }
        if let Some(source) = state.departments_scope.take() {
            source.cancel();
        }
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.lock().await;
        FeedSnapshot {
            records: state.records.clone(),
            page_info: state.page_info.clone(),
            departments: state.departments.clone(),
            is_loading: state.is_loading,
            is_refreshing: state.is_refreshing,
            error: state.error.clone(),
        }
    }
}

/// A point-in-time copy of the stats feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    pub stats: Option<RecordStats>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct StatsState {
    stats: Option<RecordStats>,
    is_loading: bool,
    error: Option<String>,
    seq: u64,
    in_flight: Option<CancelSource>,
}

/// Independent feed for the aggregate stats panel, keyed only on the
/// controller's retry seed, never on filters.
#[derive(Debug, Clone)]
pub struct StatsFeed {
    api: Arc<RecordsApi>,
    state: Arc<Mutex<StatsState>>,
}

impl StatsFeed {
    pub fn new(api: Arc<RecordsApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(StatsState {
                is_loading: true,
                ..StatsState::default()
            })),
        }
    }

    pub async fn refresh(&self) {
        let (handle, seq) = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.in_flight.take() {
                previous.cancel();
            }
            state.seq += 1;
            let source = CancelSource::new();
            let handle = source.handle();
            state.in_flight = Some(source);
            state.is_loading = true;
            state.error = None;
            (handle, state.seq)
        };

        let outcome = self.api.get_stats(&handle).await;

        let mut state = self.state.lock().await;
        if state.seq != seq {
            return;
        }
        state.in_flight = None;
        match outcome {
            Ok(Some(stats)) => {
                state.stats = Some(stats);
                state.is_loading = false;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "stats fetch failed");
                state.error = Some(err.to_string());
                state.is_loading = false;
            }
        }
    }

    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if let Some(source) = state.in_flight.take() {
            source.cancel();
        }
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let state = self.state.lock().await;
        StatsSnapshot {
            stats: state.stats.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }
}
