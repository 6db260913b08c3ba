//! These structs provide the CLI interface for the networth CLI.

use crate::model::{Amount, EntryKind};
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// networth: record assets and liabilities in a Google sheet and see where your net worth is
/// going.
///
/// Entries are month-end snapshots: each asset or liability row has a date, a category, a name
/// and a value. The dashboard sums them per month into net worth totals, trends, month-over-month
/// growth and category allocations.
///
/// You will need to set up a Google Sheets API OAuth client for this. Run `networth init` and then
/// `networth auth` to get started.
///
/// There is also a mode in which an AI agent can use this program through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need two things ready beforehand:
    ///
    /// - The URL of the Google Sheet that holds your ledger, passed as --sheet-url. The sheet
    ///   needs the tabs asset_categories, liability_categories, assets and liabilities, each with
    ///   a header row.
    ///
    /// - An OAuth 2.0 client secret for a Desktop app, downloaded from the Google Cloud Console,
    ///   passed as --client-secret.
    Init(InitArgs),
    /// Authenticate with Google Sheets via OAuth.
    Auth(AuthArgs),
    /// Show net worth, totals, monthly breakdown, growth and allocation.
    Dashboard,
    /// Show the month-by-month net worth trend.
    Trend,
    /// Show month-over-month changes of total assets or of one asset category.
    Mom(MomArgs),
    /// Show how assets or liabilities are split across categories.
    Allocation(KindArgs),
    /// List the categories that entries may use.
    Categories(KindArgs),
    /// Record an asset or liability value.
    Add(AddArgs),
    /// Download all four tabs into a JSON file in the backups directory.
    Backup,
    /// Run as an MCP server over stdin and stdout.
    Mcp,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where networth configuration and backups are held. Defaults to ~/networth
    #[arg(long, env = "NETWORTH_HOME", default_value_t = default_networth_home())]
    home: DisplayPath,

    /// Whose entries to read and write when the ledger is shared by several people.
    #[arg(long, env = "NETWORTH_OWNER")]
    owner: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf, owner: Option<String>) -> Self {
        Self {
            log_level,
            home: home.into(),
            owner,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

/// (Not shown): Args for the `networth init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your ledger Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The path to your downloaded OAuth client secret. This file will be moved to the default
    /// secrets location in the data directory.
    #[arg(long)]
    client_secret: PathBuf,

    /// The asset and liability tabs have an `owner` column and are shared by several people.
    #[arg(long)]
    multi_user: bool,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        client_secret: impl Into<PathBuf>,
        multi_user: bool,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            client_secret: client_secret.into(),
            multi_user,
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn client_secret(&self) -> &Path {
        &self.client_secret
    }

    pub fn multi_user(&self) -> bool {
        self.multi_user
    }
}

/// (Not shown): Args for the `networth auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh authentication.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// Args for the `networth mom` command and the `mom_history` tool.
#[derive(Debug, Default, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MomArgs {
    /// Limit the history to one asset category. Leave out, or pass "All", for total assets.
    #[arg(long)]
    #[serde(default)]
    category: Option<String>,
}

impl MomArgs {
    pub fn new(category: Option<String>) -> Self {
        Self { category }
    }

    /// The category filter, `None` when the history is for all assets.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }
}

/// Args for commands that work on either assets or liabilities.
#[derive(Debug, Default, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KindArgs {
    /// Either "asset" or "liability".
    #[arg(long, value_enum, default_value_t = EntryKind::Asset)]
    #[serde(default)]
    kind: EntryKind,
}

impl KindArgs {
    pub fn new(kind: EntryKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }
}

/// (Not shown): Args for the `networth add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[command(subcommand)]
    entry: AddSubcommand,
}

impl AddArgs {
    pub fn new(entry: AddSubcommand) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &AddSubcommand {
        &self.entry
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Record the value of something you own.
    Asset(EntryArgs),
    /// Record the balance of something you owe.
    Liability(EntryArgs),
}

impl AddSubcommand {
    pub fn kind(&self) -> EntryKind {
        match self {
            AddSubcommand::Asset(_) => EntryKind::Asset,
            AddSubcommand::Liability(_) => EntryKind::Liability,
        }
    }

    pub fn args(&self) -> &EntryArgs {
        match self {
            AddSubcommand::Asset(args) | AddSubcommand::Liability(args) => args,
        }
    }
}

/// The fields of a new asset or liability entry.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntryArgs {
    /// The date of the snapshot, e.g. 2025-01-31. Any day in the month may be given, the month-end
    /// date is stored. Defaults to today.
    #[arg(long)]
    #[serde(default)]
    date: Option<String>,

    /// One of the categories listed by `networth categories`.
    #[arg(long)]
    category: String,

    /// What the entry is, e.g. "HDFC Savings" or "Home Loan".
    #[arg(long)]
    name: String,

    /// The value as a non-negative number. A currency symbol and thousands separators are
    /// allowed, e.g. "₹1,50,000".
    #[arg(long, allow_hyphen_values = true)]
    #[schemars(with = "String")]
    value: Amount,

    /// Optional free text.
    #[arg(long, default_value = "")]
    #[serde(default)]
    notes: String,
}

impl EntryArgs {
    pub fn new(
        date: Option<String>,
        category: impl Into<String>,
        name: impl Into<String>,
        value: Amount,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            name: name.into(),
            value,
            notes: notes.into(),
        }
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

fn default_networth_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("networth"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or NETWORTH_HOME instead of relying on the default \
                networth home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("networth")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
