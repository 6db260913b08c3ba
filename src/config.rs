//! Configuration file handling for networth.
//!
//! The configuration file is stored at `$NETWORTH_HOME/config.json` and contains settings for
//! the application including the Google Sheet URL, backup settings, the cache lifetime, whether
//! the ledger is shared by several owners and the authentication file paths.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::Schema;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "networth";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const CACHE_TTL_SECONDS: u64 = 300;
const CURRENCY: &str = "₹";
const SECRETS: &str = ".secrets";
const BACKUPS: &str = ".backups";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$NETWORTH_HOME` and from there it loads `$NETWORTH_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: String,
}

impl Config {
    /// Creates the data directory, its subdirectories and:
    /// - Creates an initial `config.json` file using `sheet_url` along with default settings
    /// - Moves `secret_file` into its default location in the data dir.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/networth`
    /// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed to start the Google
    ///   OAuth workflow. This will be moved from the `secret_file` path to its default location and
    ///   name in the data directory.
    /// - `sheet_url` - The URL of the Google Sheet that holds the ledger.
    ///   e.g.https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    /// - `multi_user` - Whether the ledger tabs carry an `owner` column.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        secret_file: &Path,
        sheet_url: &str,
        multi_user: bool,
    ) -> Result<Self> {
        create(dir.into(), secret_file, sheet_url, multi_user)
            .await
            .pub_result(ErrorType::Config)
    }

    /// This will
    /// - validate that the `networth_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and secrets directories exist
    /// - return the loaded configuration object
    pub async fn load(networth_home: impl Into<PathBuf>) -> Result<Self> {
        load(networth_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// How long rows read from the sheet are served from memory.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_file.cache_ttl_seconds)
    }

    pub fn multi_user(&self) -> bool {
        self.config_file.multi_user
    }

    /// The column layout of the ledger tabs.
    pub fn schema(&self) -> Schema {
        Schema::new(self.config_file.multi_user)
    }

    /// The symbol printed in front of amounts.
    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// Returns the stored `client_secret_path` if it is absolute, otherwise resolves the relative path.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.client_secret_path())
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves the relative path.
    pub fn token_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.token_path())
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it unchanged if it is absolute.
    fn resolve_secrets_file_path(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

async fn create(
    maybe_relative: PathBuf,
    secret_file: &Path,
    sheet_url: &str,
    multi_user: bool,
) -> Res<Config> {
    utils::make_dir(&maybe_relative)
        .await
        .context("Unable to create the networth home directory")?;
    let root = utils::canonicalize(&maybe_relative).await?;

    let backups = root.join(BACKUPS);
    utils::make_dir(&backups).await?;
    let secrets = root.join(SECRETS);
    utils::make_dir(&secrets).await?;

    let spreadsheet_id = extract_spreadsheet_id(sheet_url)
        .context("Failed to extract spreadsheet ID from sheet URL")?
        .to_string();

    // Move the Google OAuth client credentials file to its default location in the data dir
    utils::rename(secret_file, secrets.join(CLIENT_SECRET_JSON)).await?;

    let config_path = root.join(CONFIG_JSON);
    let config_file = ConfigFile {
        sheet_url: sheet_url.to_string(),
        multi_user,
        ..ConfigFile::default()
    };
    config_file.save(&config_path).await?;

    Ok(Config {
        root,
        backups,
        secrets,
        config_path,
        config_file,
        spreadsheet_id,
    })
}

async fn load(maybe_relative: PathBuf) -> Res<Config> {
    let root = utils::canonicalize(&maybe_relative)
        .await
        .context("The networth home directory is missing, run 'networth init' first")?;

    let config_path = root.join(CONFIG_JSON);
    if !config_path.is_file() {
        bail!("The config file is missing '{}'", config_path.display())
    }
    let config_file = ConfigFile::load(&config_path).await?;

    let spreadsheet_id = extract_spreadsheet_id(&config_file.sheet_url)
        .context("Failed to extract spreadsheet ID from sheet URL")?
        .to_string();

    let config = Config {
        root: root.clone(),
        backups: root.join(BACKUPS),
        secrets: root.join(SECRETS),
        config_path,
        config_file,
        spreadsheet_id,
    };
    if !config.backups.is_dir() {
        bail!(
            "The backups directory is missing '{}'",
            config.backups.display()
        )
    }
    if !config.secrets.is_dir() {
        bail!(
            "The secrets directory is missing '{}'",
            config.secrets.display()
        )
    }
    Ok(config)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "networth",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "backup_copies": 5,
///   "cache_ttl_seconds": 300,
///   "multi_user": false,
///   "currency": "₹",
///   "client_secret_path": ".secrets/client_secret.json",
///   "token_path": ".secrets/token.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "networth"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL to the ledger Google Sheet
    sheet_url: String,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// How long, in seconds, rows read from the sheet are reused
    #[serde(default = "default_cache_ttl_seconds")]
    cache_ttl_seconds: u64,

    /// Whether the asset and liability tabs have an `owner` column
    #[serde(default)]
    multi_user: bool,

    /// The currency symbol used when printing amounts
    #[serde(default = "default_currency")]
    currency: String,

    /// Path to the OAuth 2.0 client credentials file (optional, relative to config.json or absolute)
    /// Defaults to $NETWORTH_HOME/.secrets/client_secret.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Path to the OAuth token file (optional, relative to config.json or absolute)
    /// Defaults to $NETWORTH_HOME/.secrets/token.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_cache_ttl_seconds() -> u64 {
    CACHE_TTL_SECONDS
}

fn default_currency() -> String {
    CURRENCY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            backup_copies: BACKUP_COPIES,
            cache_ttl_seconds: CACHE_TTL_SECONDS,
            multi_user: false,
            currency: default_currency(),
            client_secret_path: None,
            token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            !config.currency.trim().is_empty(),
            "The currency in the config file must not be empty"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// If the path is relative, it is interpreted as relative to the home directory.
    fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL
///
/// # Arguments
/// * `url` - The Google Sheets URL (e.g., "https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...")
///
/// # Returns
/// The spreadsheet ID or an error if the URL format is invalid. Returns an empty string if the URL is empty.
fn extract_spreadsheet_id(url: &str) -> Res<&str> {
    if url.is_empty() {
        return Ok(url);
    }

    // URL format: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...
    // or: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID?foo=bar
    let mut parts = url.split('/');
    while let Some(part) = parts.next() {
        if part == "d" {
            if let Some(id_part) = parts.next() {
                let id = id_part
                    .split(['?', '#'])
                    .next()
                    .unwrap_or(id_part);
                return Ok(id);
            }
        }
    }
    bail!(
        "Invalid Google Sheets URL format. Expected: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("networth_home");
        let secret_source_file = dir.path().join("x.txt");
        let secret_content = "12345";
        let sheet_url = "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";
        utils::write(&secret_source_file, secret_content)
            .await
            .unwrap();

        let config = Config::create(&home_dir, &secret_source_file, sheet_url, true)
            .await
            .unwrap();
        assert_eq!(sheet_url, config.sheet_url());
        assert_eq!(
            "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
            config.spreadsheet_id()
        );
        let found_secret_content = utils::read(&config.client_secret_path()).await.unwrap();
        assert_eq!(secret_content, found_secret_content);
        assert!(config.backups().is_dir());
        assert!(config.secrets().is_dir());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert!(loaded.multi_user());
        assert!(loaded.schema().multi_user());
        assert_eq!(loaded.currency(), "₹");
        assert_eq!(loaded.cache_ttl(), Duration::from_secs(300));
        assert_eq!(loaded.backup_copies(), 5);
        assert_eq!(loaded.token_path(), loaded.secrets().join(TOKEN_JSON));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let e = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Config);
        assert!(e.to_string().contains("networth init"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "networth",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/minimal",
            "backup_copies": 3
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.backup_copies, 3);
        assert_eq!(config.cache_ttl_seconds, 300);
        assert!(!config.multi_user);
        assert_eq!(config.currency, "₹");
        assert_eq!(
            config.client_secret_path(),
            PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON)
        );
        assert_eq!(config.token_path(), PathBuf::from(SECRETS).join(TOKEN_JSON));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let original = ConfigFile {
            sheet_url: "https://docs.google.com/spreadsheets/d/test123".to_string(),
            backup_copies: 7,
            cache_ttl_seconds: 60,
            multi_user: true,
            currency: "$".to_string(),
            client_secret_path: Some(PathBuf::from(".secrets/my_key.json")),
            token_path: Some(PathBuf::from("/abs/token.json")),
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budget",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/test",
            "backup_copies": 5
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("client_secret_path"));
        assert!(!json.contains("token_path"));
        assert!(json.contains("cache_ttl_seconds"));
    }

    #[test]
    fn test_extract_spreadsheet_id() {
        let url = "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";
        let id = extract_spreadsheet_id(url).unwrap();
        assert_eq!(id, "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL");

        let url = "https://docs.google.com/spreadsheets/d/ABC123?foo=bar";
        assert_eq!(extract_spreadsheet_id(url).unwrap(), "ABC123");

        let url = "https://docs.google.com/spreadsheets/d/ABC123#gid=0";
        assert_eq!(extract_spreadsheet_id(url).unwrap(), "ABC123");

        assert!(extract_spreadsheet_id("https://example.com/invalid").is_err());
        assert_eq!(extract_spreadsheet_id("").unwrap(), "");
    }
}
