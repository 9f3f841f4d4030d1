use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::{name_matches, CancelFlag, EventSink, ScanEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub root: PathBuf,
    /// Trimmed, non-empty search text. Case is irrelevant.
    pub keyword: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Visit entries sorted by file name instead of directory-listing order.
    pub sorted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed { found: usize, committed: bool },
    Stopped,
    Failed(String),
}

/// Lists the immediate children of `request.root` and reports every directory
/// whose name contains the keyword.
///
/// Each match is pushed as `Found` as soon as it is seen. Cancellation is
/// checked once per entry. When the listing finishes uncancelled, `commit` is
/// handed the full match set before `Completed` is pushed, so a stopped or
/// failed scan never reaches it.
pub fn scan_subdirectories<S, C, E>(
    request: &ScanRequest,
    options: ScanOptions,
    cancel: &CancelFlag,
    events: &S,
    commit: C,
) -> ScanOutcome
where
    S: EventSink + ?Sized,
    C: FnOnce(&[PathBuf]) -> Result<(), E>,
    E: Display,
{
    let root = request.root.as_path();
    tracing::info!(
        root = %root.display(),
        keyword = %request.keyword,
        generation = events.generation(),
        "scan started"
    );

    if cancel.is_raised() {
        return stop(events);
    }

    if let Err(message) = ensure_directory(root) {
        return fail(events, message);
    }

    let mut walker = WalkDir::new(root).min_depth(1).max_depth(1);
    if options.sorted {
        walker = walker.sort_by_file_name();
    }

    let mut found = Vec::new();
    for item in walker {
        if cancel.is_raised() {
            return stop(events);
        }

        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                return fail(events, format!("cannot list {}: {}", root.display(), err));
            }
        };

        if !is_directory(&entry) {
            continue;
        }

        if !name_matches(&entry.file_name().to_string_lossy(), &request.keyword) {
            continue;
        }

        if entry.path().to_str().is_none() {
            tracing::warn!(
                path = %entry.path().display(),
                "skipping matching folder whose path is not valid UTF-8"
            );
            continue;
        }

        let path = entry.into_path();
        tracing::debug!(path = %path.display(), "match");
        events.push(ScanEvent::Found(path.clone()));
        found.push(path);
    }

    if cancel.is_raised() {
        return stop(events);
    }

    let committed = match commit(&found) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(keyword = %request.keyword, "failed to store scan results: {err}");
            events.push(ScanEvent::CommitFailed(err.to_string()));
            false
        }
    };

    tracing::info!(keyword = %request.keyword, found = found.len(), "scan completed");
    events.push(ScanEvent::Completed(found.len()));
    ScanOutcome::Completed {
        found: found.len(),
        committed,
    }
}

fn ensure_directory(root: &Path) -> Result<(), String> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(format!("{} is not a directory", root.display())),
        Err(err) => Err(format!("cannot open {}: {}", root.display(), err)),
    }
}

fn is_directory(entry: &DirEntry) -> bool {
    // Symlinked folders count; walkdir only reports the link itself.
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

fn stop<S: EventSink + ?Sized>(events: &S) -> ScanOutcome {
    tracing::info!(generation = events.generation(), "scan stopped");
    events.push(ScanEvent::Stopped);
    ScanOutcome::Stopped
}

fn fail<S: EventSink + ?Sized>(events: &S, message: String) -> ScanOutcome {
    tracing::warn!(generation = events.generation(), "scan failed: {message}");
    events.push(ScanEvent::Failed(message.clone()));
    ScanOutcome::Failed(message)
}
