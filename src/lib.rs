pub mod config;
pub mod indexer;
pub mod logging;
pub mod watcher;

pub use config::{IndexerConfig, LoggingConfig, Settings};
pub use indexer::{Indexer, SubprocessIndexer};
pub use watcher::{BAG_PATTERNS, BagDispatcher, BagPatterns, DirectoryWatcher, WatchError};
