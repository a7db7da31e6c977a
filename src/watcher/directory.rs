//! Recursive directory subscription and the watch run loop.

use std::path::{Path, PathBuf};

use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::indexer::Indexer;

use super::dispatcher::BagDispatcher;
use super::error::WatchError;

/// Watches one directory tree and dispatches its events until interrupted.
///
/// The notify subscription is established at build time, so a missing or
/// unreadable root fails construction rather than surfacing later.
pub struct DirectoryWatcher {
    root: PathBuf,
    dispatcher: BagDispatcher,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    /// Keeps the OS subscription alive for the watcher's lifetime.
    _watcher: notify::RecommendedWatcher,
}

impl std::fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl DirectoryWatcher {
    /// Create a builder for configuring the watcher.
    pub fn builder() -> DirectoryWatcherBuilder {
        DirectoryWatcherBuilder::new()
    }

    /// The directory tree being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run until a Ctrl-C interrupt.
    ///
    /// Each event is dispatched to completion before the next one is taken
    /// from the channel, and the interrupt is only observed between
    /// dispatches: an in-flight indexing call always finishes before
    /// shutdown. Dropping the watcher on return tears down the subscription.
    pub async fn watch(mut self) -> Result<(), WatchError> {
        crate::log_event!("watcher", "watching", "{}", self.root.display());

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                Some(res) = self.event_rx.recv() => match res {
                    Ok(event) => self.dispatcher.dispatch(&event).await,
                    Err(e) => tracing::error!("[watcher] event stream error: {e}"),
                },
                _ = &mut ctrl_c => {
                    crate::log_event!("watcher", "interrupt received, stopping");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Builder for constructing a [`DirectoryWatcher`].
pub struct DirectoryWatcherBuilder {
    root: Option<PathBuf>,
    indexer: Option<Box<dyn Indexer>>,
}

impl DirectoryWatcherBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            indexer: None,
        }
    }

    /// Set the directory to watch. Defaults to the current directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the indexer invoked for each new Bag. Required.
    pub fn indexer(mut self, indexer: Box<dyn Indexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    /// Build the watcher and register the recursive subscription.
    pub fn build(self) -> Result<DirectoryWatcher, WatchError> {
        let indexer = self.indexer.ok_or_else(|| WatchError::InitFailed {
            reason: "an indexer is required".to_string(),
        })?;

        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| WatchError::InitFailed {
                reason: e.to_string(),
            })?,
        };

        let (tx, rx) = mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        Ok(DirectoryWatcher {
            root,
            dispatcher: BagDispatcher::new(indexer),
            event_rx: rx,
            _watcher: watcher,
        })
    }
}

impl Default for DirectoryWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
