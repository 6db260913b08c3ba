//! Access to the ledger spreadsheet.
//!
//! The `Sheet` trait is the raw transport: get all values of a tab, append one row. It has a Google
//! implementation and an in-memory one for testing. The `Ledger` trait sits on top of a `Sheet`
//! and speaks in collections, header-mapped rows and sessions.

mod files;
mod ledger;
mod oauth;
mod sheet;
mod sheet_test_client;

use crate::cache::LedgerCache;
use crate::error::Res;
use crate::model::{Collection, LedgerData, RawRow, Schema};
use crate::session::Session;
use crate::Config;
use ledger::LedgerStore;
use sheet::GoogleSheet;
use tracing::debug;

pub(crate) use oauth::TokenProvider;
pub(crate) use sheet_test_client::TestSheet;

#[cfg(test)]
pub(crate) use sheet_test_client::TestSheetState;

/// OAuth scopes required for Sheets API access.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// The environment variable that, when set to anything but an empty string, switches the app to
/// the in-memory test sheet.
pub const TEST_MODE_ENV: &str = "NETWORTH_IN_TEST_MODE";

/// Whether to talk to Google or to the in-memory test sheet.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Google,
    Testing,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Google,
        }
    }
}

/// The raw spreadsheet transport.
#[async_trait::async_trait]
pub(crate) trait Sheet {
    /// Get all values from the named tab, header row first. An empty tab gives no rows.
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>>;

    /// Append one row below the last non-empty row of the named tab.
    async fn append(&mut self, sheet_name: &str, row: Vec<String>) -> Res<()>;
}

/// The four ledger collections as header-mapped rows.
#[async_trait::async_trait]
pub(crate) trait Ledger {
    /// All data rows of `collection`. When the session has an owner, rows of an entry collection
    /// are limited to that owner's.
    async fn read(&mut self, collection: Collection, session: &Session) -> Res<Vec<RawRow>>;

    /// Appends `row`, whose values must be in the schema's column order, on behalf of `session`.
    async fn append(
        &mut self,
        collection: Collection,
        session: &Session,
        row: Vec<String>,
    ) -> Res<()>;

    /// Reads every collection for `session`.
    async fn get_data(&mut self, session: &Session) -> Res<LedgerData> {
        let mut data = LedgerData::default();
        for collection in Collection::ALL {
            let rows = self.read(collection, session).await?;
            data.set_rows(collection, rows);
        }
        Ok(data)
    }
}

/// Creates the `Sheet` for `mode`.
pub(crate) async fn sheet(config: &Config, mode: Mode) -> Res<Box<dyn Sheet + Send>> {
    match mode {
        Mode::Google => {
            debug!("Creating a Google sheet client");
            let token_provider =
                TokenProvider::load(&config.client_secret_path(), &config.token_path()).await?;
            Ok(Box::new(
                GoogleSheet::new(config.clone(), token_provider).await?,
            ))
        }
        Mode::Testing => {
            debug!("Using the in-memory test sheet");
            Ok(Box::new(TestSheet::new(config.spreadsheet_id())))
        }
    }
}

/// Creates a `Ledger` over `sheet` that reads through `cache`.
pub(crate) fn ledger(
    sheet: Box<dyn Sheet + Send>,
    schema: Schema,
    cache: LedgerCache,
) -> Box<dyn Ledger + Send> {
    Box::new(LedgerStore::new(sheet, schema, cache))
}
