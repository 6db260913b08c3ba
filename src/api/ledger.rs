//! Implements the `Ledger` trait over any `Sheet`, reading through the shared `LedgerCache`.

use crate::api::{Ledger, Sheet};
use crate::cache::LedgerCache;
use crate::error::Res;
use crate::model::{Collection, Mapping, RawRow, Schema, OWNER};
use crate::session::Session;
use anyhow::{ensure, Context};
use tracing::{debug, warn};

pub(super) struct LedgerStore {
    sheet: Box<dyn Sheet + Send>,
    schema: Schema,
    cache: LedgerCache,
}

impl LedgerStore {
    pub(super) fn new(sheet: Box<dyn Sheet + Send>, schema: Schema, cache: LedgerCache) -> Self {
        Self {
            sheet,
            schema,
            cache,
        }
    }
}

#[async_trait::async_trait]
impl Ledger for LedgerStore {
    async fn read(&mut self, collection: Collection, session: &Session) -> Res<Vec<RawRow>> {
        let schema = self.schema;
        let rows = self
            .cache
            .get_or_load(
                collection,
                fetch_rows(self.sheet.as_mut(), schema, collection),
            )
            .await?;

        let owner = match (collection.entry_kind(), session.owner()) {
            (Some(_), Some(owner)) => owner,
            _ => return Ok(rows),
        };
        if !schema.multi_user() {
            warn!("Ignoring the owner '{owner}', the ledger is not configured for multiple users");
            return Ok(rows);
        }
        Ok(rows
            .into_iter()
            .filter(|row| row.text(OWNER) == owner.as_str())
            .collect())
    }

    async fn append(
        &mut self,
        collection: Collection,
        session: &Session,
        row: Vec<String>,
    ) -> Res<()> {
        if collection.entry_kind().is_some() {
            session.check_writable(self.schema.multi_user())?;
        }
        let columns = self.schema.columns(collection);
        ensure!(
            row.len() == columns.len(),
            "A row for '{collection}' needs {} values ({}), got {}",
            columns.len(),
            columns.join(", "),
            row.len()
        );
        self.sheet.append(collection.tab_name(), row).await?;
        self.cache.invalidate_all();
        Ok(())
    }
}

/// Reads a tab and maps each non-blank data row by the header row.
async fn fetch_rows(
    sheet: &mut (dyn Sheet + Send),
    schema: Schema,
    collection: Collection,
) -> Res<Vec<RawRow>> {
    let tab = collection.tab_name();
    let values = sheet.get(tab).await?;
    let mut values = values.into_iter();
    let header = match values.next() {
        Some(header) => header,
        None => {
            debug!("The '{tab}' tab is empty");
            return Ok(Vec::new());
        }
    };

    let mapping =
        Mapping::new(header).with_context(|| format!("Malformed header row in the '{tab}' tab"))?;
    for column in schema.columns(collection) {
        ensure!(
            mapping.column_index(column).is_some(),
            "The '{tab}' tab is missing the '{column}' column"
        );
    }

    let mut rows = Vec::new();
    for (ix, values) in values.enumerate() {
        let extra = values
            .iter()
            .skip(mapping.len())
            .filter(|v| !v.trim().is_empty())
            .count();
        if extra > 0 {
            debug!(
                "Ignoring {extra} cell(s) past the last header in row {} of the '{tab}' tab",
                ix + 2
            );
        }
        let row = mapping.row(values);
        if !row.is_blank() {
            rows.push(row);
        }
    }
    debug!("Read {} rows from the '{tab}' tab", rows.len());
    Ok(rows)
}
