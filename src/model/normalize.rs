//! Cleans raw sheet rows into `Entry` values.
//!
//! A row whose date cannot be parsed is dropped. A row whose value cannot be parsed is kept with a
//! value of zero. A negative value is also recorded as zero so that every `Entry` is non-negative.

use crate::model::{Amount, Entry, EntryKind, Month, RawRow, DATE, NAME, NOTES, OWNER, VALUE};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%b %d, %Y", "%d-%b-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Converts the rows of an assets or liabilities tab into entries, preserving row order.
pub fn normalize(kind: EntryKind, rows: &[RawRow]) -> Vec<Entry> {
    let category_column = kind.category_column();
    let mut dropped = 0usize;
    let entries: Vec<Entry> = rows
        .iter()
        .enumerate()
        .filter_map(|(ix, row)| {
            let raw_date = row.text(DATE);
            let Some(date) = parse_date(raw_date) else {
                debug!("Dropping {kind} row {ix}: unparsable date '{raw_date}'");
                dropped += 1;
                return None;
            };
            let owner = row.text(OWNER);
            Some(Entry {
                date,
                month: Month::from_date(date),
                owner: (!owner.is_empty()).then(|| owner.to_string()),
                category: row.text(category_column).to_string(),
                name: row.text(NAME).to_string(),
                value: parse_value(row.text(VALUE)),
                notes: row.text(NOTES).to_string(),
            })
        })
        .collect();
    debug!(
        "Normalized {} {kind} rows into {} entries ({dropped} dropped)",
        rows.len(),
        entries.len()
    );
    entries
}

/// Parses a date cell in any of the formats a sheet is likely to hold.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(date);
    }
    let Some((first, _)) = s.split_once('/') else {
        return None;
    };
    // Slashed dates are year first or US order. A two digit year must not be read as 25 AD.
    let format = match s.rsplit_once('/') {
        _ if first.len() == 4 => "%Y/%m/%d",
        Some((_, year)) if year.len() == 2 => "%m/%d/%y",
        _ => "%m/%d/%Y",
    };
    NaiveDate::parse_from_str(s, format).ok()
}

/// Parses a value cell. Unparsable and negative values become zero.
pub fn parse_value(s: &str) -> Decimal {
    match Amount::from_str(s) {
        Ok(amount) if amount.is_negative() => {
            warn!("Negative value '{s}' recorded as zero");
            Decimal::ZERO
        }
        Ok(amount) => amount.value(),
        Err(e) => {
            debug!("Unparsable value '{s}' recorded as zero: {e}");
            Decimal::ZERO
        }
    }
}
