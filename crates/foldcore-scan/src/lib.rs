//! One-shot, cancellable enumeration of the immediate subdirectories of a root
//! folder, reported as a stream of [`ScanEvent`]s over an unbounded channel.

mod channel;
mod matcher;
mod scanner;

pub use channel::{result_channel, EventReceiver, EventSender, EventSink, ScanMessage};
pub use matcher::name_matches;
pub use scanner::{scan_subdirectories, ScanOptions, ScanOutcome, ScanRequest};

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanEvent {
    Found(PathBuf),
    /// Results were found but could not be written to the cache. Always followed by `Completed`.
    CommitFailed(String),
    Completed(usize),
    Stopped,
    Failed(String),
}

/// Cooperative stop signal shared between a scan and whoever started it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
