//! Search coordinator: owns the single active folder scan, drains its events on
//! the caller's polling cadence, and serves cached matches while the user types.

mod status;

pub use status::{SearchState, SearchStatus, UiUpdate};

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use foldcore_cache::{normalize_keyword, CacheError, CacheStore};
use foldcore_config::Settings;
use foldcore_scan::{
    result_channel, scan_subdirectories, CancelFlag, EventReceiver, EventSender, ScanEvent,
    ScanOptions, ScanRequest,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("enter a folder name to search for")]
    EmptyKeyword,
}

struct ActiveScan {
    generation: u64,
    keyword: String,
    cancel: CancelFlag,
}

pub struct SearchCoordinator {
    root: PathBuf,
    cache: Arc<dyn CacheStore>,
    options: ScanOptions,
    events_tx: EventSender,
    events_rx: EventReceiver,
    generation: u64,
    active: Option<ActiveScan>,
    status: SearchStatus,
    results: Vec<String>,
}

impl SearchCoordinator {
    pub fn new(root: impl Into<PathBuf>, cache: Arc<dyn CacheStore>) -> Self {
        let (events_tx, events_rx) = result_channel();
        Self {
            root: root.into(),
            cache,
            options: ScanOptions::default(),
            events_tx,
            events_rx,
            generation: 0,
            active: None,
            status: SearchStatus::Blank,
            results: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings, cache: Arc<dyn CacheStore>) -> Self {
        Self::new(settings.root_dir.clone(), cache)
    }

    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> SearchState {
        if self.active.is_some() {
            SearchState::Searching
        } else {
            SearchState::Idle
        }
    }

    pub fn is_searching(&self) -> bool {
        self.active.is_some()
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    /// Paths currently on display, in the order they were shown.
    pub fn results(&self) -> &[String] {
        &self.results
    }

    /// Starts a background scan for `raw_keyword`. Calling it while a scan is
    /// running cancels that scan instead.
    pub fn start_search(&mut self, raw_keyword: &str) -> Result<UiUpdate, SearchError> {
        let keyword = raw_keyword.trim();
        if keyword.is_empty() {
            return Err(SearchError::EmptyKeyword);
        }

        if self.active.is_some() {
            return Ok(self.toggle_search());
        }

        self.generation += 1;
        let cancel = CancelFlag::new();
        let cache_key = normalize_keyword(keyword);
        let request = ScanRequest {
            root: self.root.clone(),
            keyword: keyword.to_string(),
        };

        self.spawn_worker(request, cache_key.clone(), cancel.clone());

        tracing::info!(generation = self.generation, keyword = %cache_key, "search started");
        self.active = Some(ActiveScan {
            generation: self.generation,
            keyword: cache_key,
            cancel,
        });
        self.results.clear();
        self.status = SearchStatus::Searching;

        Ok(self.snapshot(true, Vec::new(), Vec::new()))
    }

    /// Cancels the running scan. The view switches to "stopped" right away;
    /// whatever the worker still sends for this search is ignored.
    pub fn toggle_search(&mut self) -> UiUpdate {
        if let Some(active) = self.active.take() {
            active.cancel.raise();
            tracing::info!(
                generation = active.generation,
                keyword = %active.keyword,
                "search cancelled"
            );
            self.status = SearchStatus::Stopped;
        }
        self.snapshot(false, Vec::new(), Vec::new())
    }

    /// Applies every event queued since the last call.
    pub fn poll(&mut self) -> UiUpdate {
        let mut appended = Vec::new();
        let mut notices = Vec::new();

        for message in self.events_rx.try_drain_all() {
            let Some(active) = self
                .active
                .as_ref()
                .filter(|active| active.generation == message.generation)
            else {
                tracing::debug!(
                    generation = message.generation,
                    event = ?message.event,
                    "dropping event from inactive search"
                );
                continue;
            };

            match message.event {
                ScanEvent::Found(path) => {
                    // The scanner only reports UTF-8 paths, so this is lossless.
                    let path = path.to_string_lossy().into_owned();
                    self.results.push(path.clone());
                    appended.push(path);
                }
                ScanEvent::CommitFailed(message) => {
                    notices.push(format!(
                        "results for \"{}\" were not cached: {message}",
                        active.keyword
                    ));
                }
                ScanEvent::Completed(count) => {
                    self.status = SearchStatus::Finished(count);
                    self.active = None;
                }
                ScanEvent::Stopped => {
                    self.status = SearchStatus::Stopped;
                    self.active = None;
                }
                ScanEvent::Failed(message) => {
                    notices.push(message);
                    self.status = SearchStatus::Error;
                    self.active = None;
                }
            }
        }

        self.snapshot(false, appended, notices)
    }

    /// Cached folder paths for every stored keyword starting with `raw_keyword`.
    /// Storage failures read as "nothing cached".
    pub fn lookup_cache(&self, raw_keyword: &str) -> Vec<String> {
        let keyword = normalize_keyword(raw_keyword);
        if keyword.is_empty() {
            return Vec::new();
        }

        match self.cache.prefix_lookup(&keyword) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!(%keyword, "cache lookup failed: {err}");
                Vec::new()
            }
        }
    }

    /// Keystroke fast path: replaces the displayed list with cached matches.
    /// Leaves everything untouched while a scan owns the display.
    pub fn refresh_from_cache(&mut self, raw_text: &str) -> UiUpdate {
        if self.active.is_some() {
            return self.snapshot(false, Vec::new(), Vec::new());
        }

        if raw_text.trim().is_empty() {
            self.results.clear();
            self.status = SearchStatus::Blank;
            return self.snapshot(true, Vec::new(), Vec::new());
        }

        self.results = self.lookup_cache(raw_text);
        self.status = if self.results.is_empty() {
            SearchStatus::NotCached
        } else {
            SearchStatus::FromCache(self.results.len())
        };
        self.snapshot(true, self.results.clone(), Vec::new())
    }

    fn spawn_worker(&self, request: ScanRequest, cache_key: String, cancel: CancelFlag) {
        let cache = Arc::clone(&self.cache);
        let events = self.events_tx.with_generation(self.generation);
        let options = self.options;

        thread::spawn(move || {
            let outcome =
                scan_subdirectories(&request, options, &cancel, &events, |paths: &[PathBuf]| {
                    store_results(cache.as_ref(), &cache_key, paths)
                });
            tracing::debug!(keyword = %cache_key, ?outcome, "scan worker finished");
        });
    }

    fn snapshot(&self, reset: bool, appended_paths: Vec<String>, notices: Vec<String>) -> UiUpdate {
        UiUpdate {
            reset,
            appended_paths,
            status_text: self.status.to_string(),
            is_searching: self.active.is_some(),
            notices,
        }
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.raise();
        }
    }
}

fn store_results(
    cache: &dyn CacheStore,
    keyword: &str,
    paths: &[PathBuf],
) -> Result<(), CacheError> {
    let paths: Vec<String> = paths
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    cache.replace_entries(keyword, &paths)
}
