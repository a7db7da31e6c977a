//! The boundary between the watch loop and the external indexing program.
//!
//! The dispatcher talks to a [`Indexer`] trait object so the invocation
//! mechanics stay swappable; production uses [`SubprocessIndexer`], tests
//! substitute a recording fake.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::watcher::WatchError;

/// Flag token the external indexer expects in front of the Bag path.
const INPUT_FLAG: &str = "-i";

/// Something that can index a serialized Bag.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Index the Bag at `bag` (an absolute path) and wait for completion.
    async fn index(&self, bag: &Path) -> Result<(), WatchError>;
}

/// Runs the configured indexing program once per Bag.
///
/// Invocation is `[interpreter] <command> -i <bag>`, with stdio inherited
/// and no timeout. The exit status is logged but carries no meaning here;
/// the indexer owns its own failure reporting. `Err` is returned only when
/// the process cannot be launched at all.
pub struct SubprocessIndexer {
    command: PathBuf,
    interpreter: Option<PathBuf>,
}

impl SubprocessIndexer {
    pub fn new(command: PathBuf, interpreter: Option<PathBuf>) -> Self {
        Self {
            command,
            interpreter,
        }
    }

    fn build_command(&self, bag: &Path) -> Command {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(&self.command);
                cmd
            }
            None => Command::new(&self.command),
        };
        cmd.arg(INPUT_FLAG).arg(bag);
        cmd
    }
}

#[async_trait]
impl Indexer for SubprocessIndexer {
    fn name(&self) -> &str {
        "indexer"
    }

    async fn index(&self, bag: &Path) -> Result<(), WatchError> {
        crate::log_event!(
            "indexer",
            "invoking",
            "{} {INPUT_FLAG} {}",
            self.command.display(),
            bag.display()
        );

        let status = self
            .build_command(bag)
            .status()
            .await
            .map_err(|e| WatchError::SpawnFailed {
                command: self.command.display().to_string(),
                reason: e.to_string(),
            })?;

        crate::log_event!("indexer", "finished", "{} ({status})", bag.display());
        Ok(())
    }
}
