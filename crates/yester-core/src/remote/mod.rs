//! Remote shared cache.
//!
//! Result sets generated on one device are shared with every other device
//! through a single table keyed on `(year, region, topic)`. All callers treat
//! failures here as a cache miss.

#[cfg(feature = "db")]
mod sqlite;

#[cfg(feature = "db")]
pub use sqlite::SqliteRemoteCache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{GenerationParams, HistoricalEvent};

/// A stored result set with its bookkeeping columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRow {
    pub id: String,
    pub year: i32,
    pub region: String,
    pub topic: String,
    pub events: Vec<HistoricalEvent>,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
    pub usage_count: i64,
}

impl RemoteRow {
    pub fn params(&self) -> GenerationParams {
        GenerationParams::new(self.year, self.region.clone(), self.topic.clone())
    }
}

/// Aggregate figures across the shared table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_content: u64,
    pub total_usage: u64,
}

#[async_trait]
pub trait RemoteCache: Send + Sync {
    /// Look up the row for an exact `(year, region, topic)` triple.
    async fn get(&self, params: &GenerationParams) -> Result<Option<RemoteRow>>;

    /// Upsert a result set on the triple. Resets the usage count to 1.
    async fn put(&self, params: &GenerationParams, events: &[HistoricalEvent]) -> Result<()>;

    /// Bump the usage counter of a row.
    async fn increment_usage(&self, row_id: &str) -> Result<()>;

    async fn usage_stats(&self) -> Result<UsageStats>;

    /// Cheap connectivity check.
    async fn ping(&self) -> bool;

    /// Delete rows untouched for `days_old` days that were never used. Returns the count.
    async fn prune(&self, days_old: u32) -> Result<usize>;

    /// Rows sharing the region or the topic from other years, most used first.
    async fn find_similar(&self, params: &GenerationParams, limit: usize) -> Result<Vec<RemoteRow>>;
}

/// Offline stand-in: every lookup misses and writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRemoteCache;

#[async_trait]
impl RemoteCache for NoopRemoteCache {
    async fn get(&self, _params: &GenerationParams) -> Result<Option<RemoteRow>> {
        Ok(None)
    }

    async fn put(&self, _params: &GenerationParams, _events: &[HistoricalEvent]) -> Result<()> {
        Ok(())
    }

    async fn increment_usage(&self, _row_id: &str) -> Result<()> {
        Ok(())
    }

    async fn usage_stats(&self) -> Result<UsageStats> {
        Ok(UsageStats::default())
    }

    async fn ping(&self) -> bool {
        true
    }

    async fn prune(&self, _days_old: u32) -> Result<usize> {
        Ok(0)
    }

    async fn find_similar(
        &self,
        _params: &GenerationParams,
        _limit: usize,
    ) -> Result<Vec<RemoteRow>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_remote_always_misses() {
        let remote = NoopRemoteCache;
        let params = GenerationParams::new(1990, "Europe", "History");

        remote.put(&params, &[]).await.unwrap();
        assert!(remote.get(&params).await.unwrap().is_none());
        assert_eq!(remote.usage_stats().await.unwrap(), UsageStats::default());
        assert!(remote.ping().await);
        assert_eq!(remote.prune(30).await.unwrap(), 0);
    }
}
