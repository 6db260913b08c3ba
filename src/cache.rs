//! A process-wide, time-limited cache of the rows read from each ledger tab.

use crate::error::Res;
use crate::model::{Collection, RawRow};
use anyhow::anyhow;
use moka::future::Cache as MokaCache;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How long rows are served from memory unless `config.json` says otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Holds the rows of each tab for a fixed time. Clones share the same storage, so one cache can
/// serve every session in the process.
#[derive(Clone)]
pub struct LedgerCache {
    rows: MokaCache<Collection, Arc<Vec<RawRow>>>,
    ttl: Duration,
}

impl LedgerCache {
    pub fn new(ttl: Duration) -> Self {
        let rows = MokaCache::builder().time_to_live(ttl).build();
        Self { rows, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached rows for `collection`, or awaits `load` and caches what it returns. A
    /// failed load is not cached. Concurrent callers for the same collection share one load.
    pub async fn get_or_load<F>(&self, collection: Collection, load: F) -> Res<Vec<RawRow>>
    where
        F: Future<Output = Res<Vec<RawRow>>>,
    {
        if let Some(rows) = self.rows.get(&collection).await {
            debug!("Cache hit for {collection}");
            return Ok(rows.as_ref().clone());
        }
        debug!("Cache miss for {collection}");
        let rows = self
            .rows
            .try_get_with(collection, async { load.await.map(Arc::new) })
            .await
            .map_err(|e| anyhow!("{e:#}"))?;
        Ok(rows.as_ref().clone())
    }

    /// Drops every cached tab. Called after each successful write.
    pub fn invalidate_all(&self) {
        debug!("Invalidating the ledger cache");
        self.rows.invalidate_all();
    }
}

impl Default for LedgerCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Debug for LedgerCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.rows.entry_count())
            .finish()
    }
}
