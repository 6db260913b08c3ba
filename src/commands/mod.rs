//! Command handlers for the networth CLI.
//!
//! This module contains implementations for all CLI subcommands. The MCP tools call the same
//! functions.

mod add;
mod auth;
mod backup;
mod init;
mod mcp;
mod report;

use crate::api::{self, Ledger, Mode};
use crate::cache::LedgerCache;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add_entry;
pub use auth::{auth, auth_verify};
pub use backup::backup;
pub use init::init;
pub use mcp::mcp;
pub use report::{allocation, categories, dashboard, mom, trend};

/// What every ledger command needs: the configuration, the run mode and the cache that is shared
/// by every request of this process.
#[derive(Debug, Clone)]
pub struct Backend {
    config: Config,
    mode: Mode,
    cache: LedgerCache,
}

impl Backend {
    pub fn new(config: Config, mode: Mode) -> Self {
        let cache = LedgerCache::new(config.cache_ttl());
        Self {
            config,
            mode,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Opens the sheet and puts a `Ledger` in front of it.
    pub(crate) async fn ledger(&self) -> Result<Box<dyn Ledger + Send>> {
        let sheet = api::sheet(&self.config, self.mode)
            .await
            .pub_result(ErrorType::Auth)?;
        Ok(api::ledger(sheet, self.config.schema(), self.cache.clone()))
    }
}

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout, so
    /// that it can be piped into other programs.
    pub fn print_json(&self) -> Result<()> {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            let json = serde_json::to_string_pretty(structure).pub_result(ErrorType::Internal)?;
            println!("{json}");
        }
        Ok(())
    }
}
