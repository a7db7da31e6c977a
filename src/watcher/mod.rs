//! Directory watching for newly arrived Bags.
//!
//! One recursive notify subscription feeds a single dispatcher, which
//! filters events against the fixed Bag filename patterns and hands each
//! newly created Bag to the configured indexer.
//!
//! # Architecture
//!
//! ```text
//! DirectoryWatcher
//!   - notify::RecommendedWatcher, recursive, rooted at the watch target
//!   - mpsc channel of raw events
//!         |
//!   BagDispatcher
//!   - filtering policy: files only, base name matches a Bag pattern
//!   - reaction policy: created -> index; everything else -> no action
//!         |
//!   dyn Indexer
//!   - external subprocess in production
//! ```

mod directory;
mod dispatcher;
mod error;
mod patterns;

pub use directory::{DirectoryWatcher, DirectoryWatcherBuilder};
pub use dispatcher::BagDispatcher;
pub use error::WatchError;
pub use patterns::{BAG_PATTERNS, BagPatterns};
