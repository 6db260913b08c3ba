//! Backup management for JSON snapshots of the ledger.

use crate::error::Res;
use crate::model::LedgerData;
use crate::{utils, Config};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Prefix for ledger snapshot files.
pub const LEDGER: &str = "ledger";

const JSON: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `LedgerData` as a pretty-printed JSON backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file.
    pub(crate) async fn save_json(&self, prefix: &str, data: &LedgerData) -> Res<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.{JSON}");
        let path = self.backups_dir.join(&filename);

        let json =
            serde_json::to_string_pretty(data).context("Failed to serialize the ledger to JSON")?;
        utils::write(&path, json).await?;

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Res<u32> {
        let mut max_seq: u32 = 0;
        for name in self.file_names().await? {
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Res<()> {
        let mut files: Vec<String> = self
            .file_names()
            .await?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix))
            .collect();

        // The name format sorts by date and then by sequence number.
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(&self.backups_dir.join(name)).await?;
        }

        Ok(())
    }

    async fn file_names(&self) -> Res<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename of the form `{prefix}.{date}-{NNN}.json`.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{JSON}"))?
        .parse()
        .ok()
}

fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{JSON}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collection, RawRow};
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("ledger.2025-12-14-001.json", "ledger", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("ledger.2025-12-14-042.json", "ledger", "2025-12-14"),
            Some(42)
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("ledger.2025-12-13-001.json", "ledger", "2025-12-14"),
            None
        );
        // Not json
        assert_eq!(
            parse_sequence_number("ledger.2025-12-14-001.txt", "ledger", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("ledger.2025-12-14-001.json", "ledger"));
        assert!(!is_backup_file("other.2025-12-14-001.json", "ledger"));
        assert!(!is_backup_file("ledger.2025-12-14-001", "ledger"));
    }

    #[tokio::test]
    async fn test_save_json_rotates() {
        let dir = TempDir::new().unwrap();
        let backup = Backup {
            backups_dir: dir.path().to_path_buf(),
            backup_copies: 2,
        };
        let mut data = LedgerData::default();
        let row: RawRow = [("asset_category", "Bank")].into_iter().collect();
        data.set_rows(Collection::AssetCategories, vec![row]);

        let mut paths = Vec::new();
        for _ in 0..3 {
            paths.push(backup.save_json(LEDGER, &data).await.unwrap());
        }
        let date = today();
        assert!(paths[2].ends_with(format!("ledger.{date}-003.json")));
        assert!(!paths[0].exists());
        assert!(paths[1].exists());

        let saved: LedgerData = utils::deserialize(&paths[2]).await.unwrap();
        assert_eq!(saved, data);
    }
}
