//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{Mode, TestSheet, TestSheetState};
use crate::commands::Backend;
use crate::Config;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up a networth home directory with a Config whose spreadsheet id is
/// unique, so that each test gets its own `TestSheet` data.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a single-user test environment over the seed data.
    pub async fn new() -> Self {
        Self::create(false).await
    }

    /// Creates a multi-user test environment. Its `assets` tab has an `Owner` column: alice holds
    /// ₹1,000 of Cash in January 2026 and bob holds two Bank rows.
    pub async fn new_multi_user() -> Self {
        let env = Self::create(true).await;
        let mut state = env.get_state();
        state.insert(
            "assets".to_string(),
            rows(&[
                &["Date", "Owner", "Asset Category", "Name", "Value", "Notes"],
                &["2026-01-31", "alice", "Cash", "Wallet", "1000", ""],
                &["2025-12-31", "bob", "Bank", "Savings", "₹50,000", ""],
                &["2026-01-31", "bob", "Bank", "Savings", "₹52,000", "bonus"],
            ]),
        );
        state.insert(
            "liabilities".to_string(),
            rows(&[
                &["Date", "Owner", "Liability Category", "Name", "Value", "Notes"],
                &["2026-01-31", "bob", "Credit Card", "Visa", "4000", ""],
            ]),
        );
        env.set_state(state);
        env
    }

    async fn create(multi_user: bool) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("networth");
        let secret_path = temp_dir.path().join("client_secret.json");

        // Create minimal client_secret.json
        let secret_content = r#"{
            "installed": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;
        std::fs::write(&secret_path, secret_content).unwrap();

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{rand}/edit");
        let config = Config::create(&root, &secret_path, &sheet_url, multi_user)
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// A fresh `Backend`, with an empty cache, over this environment's test sheet.
    pub fn backend(&self) -> Backend {
        Backend::new(self.config(), Mode::Testing)
    }

    /// Gets the current state of the TestSheet associated with this environment.
    pub fn get_state(&self) -> TestSheetState {
        TestSheet::new(self.config.spreadsheet_id())
            .get_state()
            .unwrap()
    }

    /// Sets the state of the TestSheet associated with this environment.
    pub fn set_state(&self, state: TestSheetState) {
        TestSheet::new(self.config.spreadsheet_id())
            .set_state(state)
            .unwrap()
    }
}

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
