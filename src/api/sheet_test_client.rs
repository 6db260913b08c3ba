//! Implements the very simple `Sheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.
//!
//! State lives in a process-wide map keyed by spreadsheet id, so every `TestSheet` created for the
//! same spreadsheet sees the rows appended by the others, just like the real thing.

use crate::api::Sheet;
use crate::error::Res;
use crate::model::Collection;
use anyhow::{anyhow, Context};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{LazyLock, Mutex, MutexGuard};

/// The rows of each tab, keyed by tab name.
pub(crate) type TestSheetState = HashMap<String, Vec<Vec<String>>>;

static STATES: LazyLock<Mutex<HashMap<String, TestSheetState>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// An implementation of the `Sheet` trait that does not use Google sheets. A spreadsheet id that
/// has not been seen before is seeded with demo data.
pub(crate) struct TestSheet {
    spreadsheet_id: String,
}

impl TestSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// A copy of the current rows of every tab.
    #[cfg(test)]
    pub(crate) fn get_state(&self) -> Res<TestSheetState> {
        let mut states = lock()?;
        Ok(state(&mut states, &self.spreadsheet_id)?.clone())
    }

    /// Replaces the rows of every tab.
    #[cfg(test)]
    pub(crate) fn set_state(&self, state: TestSheetState) -> Res<()> {
        lock()?.insert(self.spreadsheet_id.clone(), state);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn get(&mut self, sheet_name: &str) -> Res<Vec<Vec<String>>> {
        let mut states = lock()?;
        state(&mut states, &self.spreadsheet_id)?
            .get(sheet_name)
            .with_context(|| format!("Sheet '{sheet_name}' not found"))
            .cloned()
    }

    async fn append(&mut self, sheet_name: &str, row: Vec<String>) -> Res<()> {
        let mut states = lock()?;
        state(&mut states, &self.spreadsheet_id)?
            .get_mut(sheet_name)
            .with_context(|| format!("Sheet '{sheet_name}' not found"))?
            .push(row);
        Ok(())
    }
}

fn lock() -> Res<MutexGuard<'static, HashMap<String, TestSheetState>>> {
    STATES
        .lock()
        .map_err(|_| anyhow!("The test sheet state lock is poisoned"))
}

fn state<'a>(
    states: &'a mut HashMap<String, TestSheetState>,
    spreadsheet_id: &str,
) -> Res<&'a mut TestSheetState> {
    if !states.contains_key(spreadsheet_id) {
        states.insert(spreadsheet_id.to_string(), default_data()?);
    }
    states
        .get_mut(spreadsheet_id)
        .context("The test sheet state is missing")
}

/// Provides the seed data from this module.
fn default_data() -> Res<TestSheetState> {
    let mut map = HashMap::new();
    for (collection, csv_data) in [
        (Collection::AssetCategories, ASSET_CATEGORY_DATA),
        (Collection::LiabilityCategories, LIABILITY_CATEGORY_DATA),
        (Collection::Assets, ASSET_DATA),
        (Collection::Liabilities, LIABILITY_DATA),
    ] {
        map.insert(collection.tab_name().to_string(), load_csv(csv_data)?);
    }
    Ok(map)
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false) // Ensure headers are treated as part of the data
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Seed asset category data.
const ASSET_CATEGORY_DATA: &str = r##"asset_category
Cash
Bank
Investments
Retirement
Real Estate
Vehicle
Other
"##;

/// Seed liability category data.
const LIABILITY_CATEGORY_DATA: &str = r##"liability_category
Credit Card
Mortgage
Student Loan
Personal Loan
Auto Loan
Other
"##;

/// Seed asset data: four month-end snapshots.
const ASSET_DATA: &str = r##"date,asset_category,name,value,notes
2025-10-31,Bank,Checking,"₹10,000",
2025-10-31,Retirement,Provident Fund,"₹67,000",
2025-10-31,Real Estate,Apartment,"₹424,000",
2025-11-30,Bank,Checking,"₹11,400",
2025-11-30,Retirement,Provident Fund,"₹67,800",
2025-11-30,Real Estate,Apartment,"₹428,300",
2025-12-31,Bank,Checking,"₹12,000",
2025-12-31,Retirement,Provident Fund,"₹68,200",
2025-12-31,Real Estate,Apartment,"₹434,000",
2026-01-31,Bank,Checking,"₹12,400",
2026-01-31,Retirement,Provident Fund,"₹68,400",
2026-01-31,Real Estate,Apartment,"₹438,700",valuation from broker
"##;

/// Seed liability data: four month-end snapshots.
const LIABILITY_DATA: &str = r##"date,liability_category,name,value,notes
2025-10-31,Mortgage,Home Loan,"₹308,000",
2025-10-31,Credit Card,Visa,"₹2,000",
2025-11-30,Mortgage,Home Loan,"₹302,600",
2025-11-30,Credit Card,Visa,"₹1,900",
2025-12-31,Mortgage,Home Loan,"₹299,000",
2025-12-31,Credit Card,Visa,"₹2,000",
2026-01-31,Mortgage,Home Loan,"₹296,200",
2026-01-31,Credit Card,Visa,"₹2,100",
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_tabs() {
        let mut sheet = TestSheet::new("test_seeded_tabs");
        let assets = sheet.get("assets").await.unwrap();
        assert_eq!(assets[0], vec!["date", "asset_category", "name", "value", "notes"]);
        assert_eq!(assets.len(), 13);
        assert_eq!(assets[1][3], "₹10,000");
        let categories = sheet.get("liability_categories").await.unwrap();
        assert_eq!(categories.len(), 7);
        assert!(sheet.get("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_append_is_shared_by_spreadsheet_id() {
        let mut a = TestSheet::new("test_append_is_shared");
        let mut b = TestSheet::new("test_append_is_shared");
        let mut other = TestSheet::new("test_append_is_shared_other");
        let row = vec!["2026-02-28".to_string(), "Cash".to_string()];
        a.append("assets", row.clone()).await.unwrap();
        assert_eq!(b.get("assets").await.unwrap().last(), Some(&row));
        assert_ne!(other.get("assets").await.unwrap().last(), Some(&row));
    }

    #[tokio::test]
    async fn test_set_state() {
        let sheet = TestSheet::new("test_set_state");
        let mut state = sheet.get_state().unwrap();
        state.insert("assets".to_string(), Vec::new());
        sheet.set_state(state).unwrap();
        assert!(sheet.get_state().unwrap()["assets"].is_empty());
    }
}
