use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Searching,
}

/// What the status line currently says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Blank,
    Searching,
    Finished(usize),
    Stopped,
    Error,
    FromCache(usize),
    NotCached,
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Blank => Ok(()),
            SearchStatus::Searching => f.write_str("searching..."),
            SearchStatus::Finished(n) => write!(f, "{n} found"),
            SearchStatus::Stopped => f.write_str("stopped"),
            SearchStatus::Error => f.write_str("error"),
            SearchStatus::FromCache(n) => write!(f, "{n} folders from cache"),
            SearchStatus::NotCached => f.write_str("no cached results, run a search"),
        }
    }
}

/// Everything the view layer needs to apply after one coordinator call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiUpdate {
    /// Clear the displayed list before appending.
    pub reset: bool,
    pub appended_paths: Vec<String>,
    pub status_text: String,
    pub is_searching: bool,
    /// Messages to surface outside the status line (scan errors, cache write failures).
    pub notices: Vec<String>,
}

impl UiUpdate {
    pub fn is_empty(&self) -> bool {
        !self.reset && self.appended_paths.is_empty() && self.notices.is_empty()
    }
}
