//! CLI commands
//!
//! Command implementations for the `indexflow` binary.

mod event;
mod health;
mod progress;
mod report;
mod site;
mod style;
mod submit;

pub use event::{run_event, EventKind};
pub use health::run_health;
pub use report::{run_list, run_show, run_stats};
pub use site::{run_site_add, run_site_list};
pub use submit::{run_resubmit, run_submit};

use anstream::println;
use indexflow::channel::{create_channels, Channels};
use indexflow::config::Config;
use indexflow::error::Result;
use indexflow::store::Store;
use indexflow::submit::{EventHandler, Orchestrator};
use serde::Serialize;
use std::path::PathBuf;

/// Everything a command needs: configuration, the open store, output mode
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// Open database
    pub store: Store,
    /// Print machine-readable JSON instead of styled text
    pub json: bool,
}

impl Context {
    /// Load configuration from the environment and open the database
    ///
    /// `db` overrides `DATABASE_PATH`.
    pub fn open(db: Option<PathBuf>, json: bool) -> Result<Self> {
        let mut config = Config::from_env();
        if let Some(path) = db {
            config = config.with_database_path(path);
        }
        let store = Store::open(&config.database_path)?;
        Ok(Self {
            config,
            store,
            json,
        })
    }

    /// Orchestrator over the configured channels
    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.store.clone(), create_channels(&self.config))
    }

    /// Orchestrator for read-only commands; notifies nothing
    pub fn reporting(&self) -> Orchestrator {
        Orchestrator::new(self.store.clone(), Channels::none())
    }

    /// Event handler over the configured channels
    pub fn event_handler(&self) -> EventHandler {
        EventHandler::new(self.store.clone(), create_channels(&self.config))
    }
}

/// Print `value` as pretty JSON on stdout
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
