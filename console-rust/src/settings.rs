use crate::ConsoleCommand;
use clap::Parser;
use dps_client::{
    storage::{FileStore, KeyValueStore, MemoryStore},
    DEFAULT_API_BASE,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Debug, Parser)]
#[command(name = "dps-console")]
#[command(about = "Interactive console for the document/chat API", long_about = None)]
pub struct Cli {
    /// Base URL used when none has been saved yet
    #[arg(long, env = "DPS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub default_base: String,

    /// Set and save the API base URL before running
    #[arg(long)]
    pub base: Option<String>,

    /// State file holding the base URL and tokens
    #[arg(long, env = "DPS_STATE_PATH")]
    pub state: Option<PathBuf>,

    /// Keep everything in memory for this run only
    #[arg(long, conflicts_with = "state")]
    pub ephemeral: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Run a single command instead of reading from stdin
    #[command(subcommand)]
    pub command: Option<ConsoleCommand>,
}

impl Cli {
    /// Open the state store these options point at.
    #[must_use]
    pub fn open_store(&self) -> Arc<dyn KeyValueStore> {
        if self.ephemeral {
            return Arc::new(MemoryStore::new());
        }
        let store = FileStore::open(self.state.clone().unwrap_or_else(FileStore::default_path));
        tracing::debug!(path = %store.path().display(), "using state file");
        Arc::new(store)
    }

    /// `warn` by default, `debug` for our crates with `-v`. `RUST_LOG` wins
    /// over both.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "dps_client=debug,dps_console=debug"
        } else {
            "warn"
        }
    }
}
