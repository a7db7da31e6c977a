//! Event filtering and dispatch for newly arrived Bags.

use std::path::Path;

use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind};

use crate::indexer::Indexer;

use super::patterns::BagPatterns;

/// Filters filesystem events and reacts to qualifying creations.
///
/// Filtering policy: the entry's base name must match a Bag pattern and
/// the entry must not be a directory. Reaction policy: a created Bag is
/// handed to the indexer with its absolute path; modifications, deletions
/// and renames are never acted on.
pub struct BagDispatcher {
    indexer: Box<dyn Indexer>,
    patterns: BagPatterns,
}

impl BagDispatcher {
    pub fn new(indexer: Box<dyn Indexer>) -> Self {
        Self {
            indexer,
            patterns: BagPatterns::new(),
        }
    }

    /// Route one filesystem event through the filtering and reaction policy.
    ///
    /// Invocations run to completion before this returns, so events behind
    /// a slow indexing call queue up rather than overlapping it.
    pub async fn dispatch(&self, event: &Event) {
        for path in &event.paths {
            if !self.patterns.matches(path) {
                crate::debug_event!("dispatch", "unmatched", "{:?} {}", event.kind, path.display());
                continue;
            }

            match event.kind {
                EventKind::Create(kind) => {
                    if matches!(kind, CreateKind::Folder) || path.is_dir() {
                        crate::debug_event!("dispatch", "directory, ignored", "{}", path.display());
                        continue;
                    }
                    self.index_bag(path).await;
                }
                // A renamed Bag cannot be told apart from a new one without
                // comparing its on-disk checksum against the one recorded in
                // the index. Until that lookup exists, renames are left alone.
                EventKind::Modify(ModifyKind::Name(_)) => {
                    crate::debug_event!("dispatch", "rename, ignored", "{}", path.display());
                }
                EventKind::Modify(_) | EventKind::Remove(_) => {
                    crate::debug_event!("dispatch", "no action", "{:?} {}", event.kind, path.display());
                }
                _ => {}
            }
        }
    }

    async fn index_bag(&self, path: &Path) {
        // The event may carry a path relative to the process working
        // directory; the indexer contract wants it absolute.
        let bag = match std::path::absolute(path) {
            Ok(bag) => bag,
            Err(e) => {
                tracing::error!("[dispatch] cannot resolve {}: {e}", path.display());
                return;
            }
        };

        crate::log_event!("dispatch", "bag created", "{}", bag.display());

        if let Err(e) = self.indexer.index(&bag).await {
            tracing::error!("[{}] {e}", self.indexer.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::WatchError;
    use async_trait::async_trait;
    use notify::event::{DataChange, MetadataKind, RemoveKind, RenameMode};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingIndexer {
        calls: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl RecordingIndexer {
        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Indexer for RecordingIndexer {
        fn name(&self) -> &str {
            "recording"
        }

        async fn index(&self, bag: &Path) -> Result<(), WatchError> {
            self.calls.lock().unwrap().push(bag.to_path_buf());
            Ok(())
        }
    }

    fn dispatcher() -> (BagDispatcher, RecordingIndexer) {
        let recorder = RecordingIndexer::default();
        (BagDispatcher::new(Box::new(recorder.clone())), recorder)
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    fn file_created(path: &str) -> Event {
        event(EventKind::Create(CreateKind::File), path)
    }

    #[tokio::test]
    async fn created_bag_is_indexed_once() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher.dispatch(&file_created("/data/in/bag1.zip")).await;

        assert_eq!(recorder.calls(), [PathBuf::from("/data/in/bag1.zip")]);
    }

    #[tokio::test]
    async fn every_bag_extension_is_accepted() {
        let (dispatcher, recorder) = dispatcher();

        for name in ["a.zip", "b.tgz", "c.tar.gz", "d.7z"] {
            let path = format!("/data/in/{name}");
            dispatcher.dispatch(&file_created(&path)).await;
        }

        assert_eq!(recorder.calls().len(), 4);
    }

    #[tokio::test]
    async fn non_matching_creation_is_ignored() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher.dispatch(&file_created("/data/in/readme.txt")).await;
        dispatcher.dispatch(&file_created("/data/in/BAG1.ZIP")).await;

        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn directory_with_matching_name_is_ignored() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher
            .dispatch(&event(
                EventKind::Create(CreateKind::Folder),
                "/data/in/sub.zip",
            ))
            .await;

        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn modifications_and_deletions_are_ignored() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher
            .dispatch(&event(
                EventKind::Modify(ModifyKind::Data(DataChange::Any)),
                "/data/in/bag1.zip",
            ))
            .await;
        dispatcher
            .dispatch(&event(
                EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
                "/data/in/bag1.zip",
            ))
            .await;
        dispatcher
            .dispatch(&event(
                EventKind::Remove(RemoveKind::File),
                "/data/in/bag1.zip",
            ))
            .await;

        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn rename_after_creation_triggers_nothing_extra() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher.dispatch(&file_created("/data/in/bag1.zip")).await;

        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/data/in/bag1.zip"))
            .add_path(PathBuf::from("/data/in/bag1_final.zip"));
        dispatcher.dispatch(&rename).await;

        assert_eq!(recorder.calls(), [PathBuf::from("/data/in/bag1.zip")]);
    }

    #[tokio::test]
    async fn creations_dispatch_in_arrival_order() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher.dispatch(&file_created("/data/in/a.tar.gz")).await;
        dispatcher.dispatch(&file_created("/data/in/b.7z")).await;

        assert_eq!(
            recorder.calls(),
            [
                PathBuf::from("/data/in/a.tar.gz"),
                PathBuf::from("/data/in/b.7z"),
            ]
        );
    }

    #[tokio::test]
    async fn relative_event_paths_are_absolutized() {
        let (dispatcher, recorder) = dispatcher();

        dispatcher.dispatch(&file_created("incoming/bag1.zip")).await;

        let expected = std::path::absolute("incoming/bag1.zip").unwrap();
        assert_eq!(recorder.calls(), [expected]);
        assert!(recorder.calls()[0].is_absolute());
    }
}
