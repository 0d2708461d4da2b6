//! File system watcher with debouncing for development mode.
//!
//! Watches the source and public roots and filters changes to relevant
//! files, ignoring the output directory, hidden files and editor leftovers.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

/// Patterns ignored in every watched root.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &["node_modules", "*.swp", "*~", "*.tmp"];

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// Filter applied to raw notify events.
#[derive(Debug, Clone)]
struct WatchFilter {
    roots: Vec<PathBuf>,
    excluded: Vec<PathBuf>,
    ignore_patterns: Vec<String>,
}

impl WatchFilter {
    fn should_ignore(&self, path: &Path) -> bool {
        if self.excluded.iter().any(|dir| path.starts_with(dir)) {
            return true;
        }

        let Some(rel_path) = self
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
        else {
            return true;
        };

        let path_str = rel_path.to_string_lossy();

        for pattern in &self.ignore_patterns {
            if let Some(suffix) = pattern.strip_prefix('*') {
                if path_str.ends_with(suffix) {
                    return true;
                }
            } else if path_str.starts_with(pattern.as_str())
                || path_str.contains(&format!("/{}", pattern))
            {
                return true;
            }
        }

        rel_path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
        })
    }
}

/// File watcher with debouncing and filtering.
///
/// Debouncing drops repeated events for the same path inside the window, so
/// an editor's write-then-rename produces one change.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl FileWatcher {
    /// Watch every existing directory in `roots` recursively.
    ///
    /// Paths under `excluded` (the output directory) never produce changes.
    /// Returns an error when none of the roots exist.
    pub fn new(
        roots: Vec<PathBuf>,
        excluded: Vec<PathBuf>,
        debounce: Duration,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let roots: Vec<PathBuf> = roots.into_iter().filter(|r| r.is_dir()).collect();
        if roots.is_empty() {
            return Err(CliError::InvalidArgument(
                "no source directory to watch".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(100);
        let filter = WatchFilter {
            roots: roots.clone(),
            excluded,
            ignore_patterns: DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        };
        let mut last_event: Option<(PathBuf, Instant)> = None;

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("watch error: {}", e);
                    return;
                }
            };

            for path in &event.paths {
                if filter.should_ignore(path) {
                    continue;
                }

                let now = Instant::now();
                if let Some((last_path, last_time)) = &last_event {
                    if last_path == path && now.duration_since(*last_time) < debounce {
                        continue;
                    }
                }
                last_event = Some((path.clone(), now));

                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                let _ = tx.blocking_send(change);
            }
        })
        .map_err(CliError::Watch)?;

        for root in &roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(CliError::Watch)?;
        }

        Ok((
            Self {
                _watcher: watcher,
                roots,
            },
            rx,
        ))
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Wait for the first change, then keep draining until the tree has been
/// quiet for `quiet`. Returns `None` once the watcher is gone.
pub async fn next_batch(
    rx: &mut mpsc::Receiver<FileChange>,
    quiet: Duration,
) -> Option<Vec<FileChange>> {
    let first = rx.recv().await?;
    let mut batch = vec![first];

    loop {
        match tokio::time::timeout(quiet, rx.recv()).await {
            Ok(Some(change)) => {
                if !batch.contains(&change) {
                    batch.push(change);
                }
            }
            Ok(None) | Err(_) => return Some(batch),
        }
    }
}
