use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file using `sheet_url` along with default settings
/// - Moves `secret_file` into its default location in the data dir.
///
/// # Arguments
/// - `networth_home` - The directory that will be the root of data directory, e.g. `$HOME/networth`
/// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed to start the Google
///   OAuth workflow.
/// - `url` - The URL of the Google Sheet that holds the ledger.
/// - `multi_user` - Whether the asset and liability tabs have an `owner` column.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(
    networth_home: &Path,
    secret_file: &Path,
    url: &str,
    multi_user: bool,
) -> Result<Out<()>> {
    let config = Config::create(networth_home, secret_file, url, multi_user).await?;
    Ok(format!(
        "Created the networth directory and config at {}. Run 'networth auth' next.",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("secret.json");
        utils::write(&secret, "{}").await.unwrap();
        let home = dir.path().join("home");
        let out = init(
            &home,
            &secret,
            "https://docs.google.com/spreadsheets/d/abc/edit",
            false,
        )
        .await
        .unwrap();
        assert!(out.message().contains("networth auth"));
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.spreadsheet_id(), "abc");
        assert!(!secret.exists());
    }
}
