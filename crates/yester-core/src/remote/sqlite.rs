//! SQLite-backed shared cache.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{RemoteCache, RemoteRow, UsageStats};
use crate::error::Result;
use crate::types::{GenerationParams, HistoricalEvent};

const SCHEMA_SQL: &str = include_str!("migrations/001_historical_content.sql");

const ROW_COLUMNS: &str =
    "id, year, region, topic, events_json, created_at, updated_at, usage_count";

pub struct SqliteRemoteCache {
    db: Arc<Mutex<Connection>>,
}

/// Row as stored, before the events blob is decoded
struct StoredRow {
    id: String,
    year: i32,
    region: String,
    topic: String,
    events_json: String,
    created_at: i64,
    updated_at: i64,
    usage_count: i64,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            year: row.get(1)?,
            region: row.get(2)?,
            topic: row.get(3)?,
            events_json: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            usage_count: row.get(7)?,
        })
    }

    fn decode(self) -> Result<RemoteRow> {
        Ok(RemoteRow {
            events: serde_json::from_str(&self.events_json)?,
            id: self.id,
            year: self.year,
            region: self.region,
            topic: self.topic,
            created_at: self.created_at,
            updated_at: self.updated_at,
            usage_count: self.usage_count,
        })
    }
}

impl SqliteRemoteCache {
    /// Open (or create) the shared cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl RemoteCache for SqliteRemoteCache {
    async fn get(&self, params: &GenerationParams) -> Result<Option<RemoteRow>> {
        let db = self.db.lock().await;

        let stored = db
            .query_row(
                &format!(
                    "SELECT {} FROM historical_content
                     WHERE year = ?1 AND region = ?2 AND topic = ?3",
                    ROW_COLUMNS
                ),
                params![params.year, &params.region, &params.topic],
                StoredRow::from_row,
            )
            .optional()?;

        stored.map(StoredRow::decode).transpose()
    }

    async fn put(&self, params: &GenerationParams, events: &[HistoricalEvent]) -> Result<()> {
        let events_json = serde_json::to_string(events)?;
        let now = Utc::now().timestamp_millis();
        let db = self.db.lock().await;

        db.execute(
            "INSERT INTO historical_content (id, year, region, topic, events_json, created_at, updated_at, usage_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 1)
             ON CONFLICT(year, region, topic) DO UPDATE SET
                events_json = excluded.events_json,
                updated_at = excluded.updated_at,
                usage_count = 1",
            params![
                Uuid::new_v4().to_string(),
                params.year,
                &params.region,
                &params.topic,
                &events_json,
                now,
            ],
        )?;

        tracing::debug!(
            key = %params.cache_key(),
            events = events.len(),
            "Stored shared content"
        );
        Ok(())
    }

    async fn increment_usage(&self, row_id: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "UPDATE historical_content SET usage_count = usage_count + 1 WHERE id = ?1",
            params![row_id],
        )?;
        Ok(())
    }

    async fn usage_stats(&self) -> Result<UsageStats> {
        let db = self.db.lock().await;
        let (total_content, total_usage): (i64, i64) = db.query_row(
            "SELECT COUNT(*), COALESCE(SUM(usage_count), 0) FROM historical_content",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(UsageStats {
            total_content: total_content.max(0) as u64,
            total_usage: total_usage.max(0) as u64,
        })
    }

    async fn ping(&self) -> bool {
        let db = self.db.lock().await;
        db.query_row("SELECT COUNT(*) FROM historical_content", [], |row| {
            row.get::<_, i64>(0)
        })
        .is_ok()
    }

    async fn prune(&self, days_old: u32) -> Result<usize> {
        let cutoff = (Utc::now() - Duration::days(i64::from(days_old))).timestamp_millis();
        let db = self.db.lock().await;

        let deleted = db.execute(
            "DELETE FROM historical_content WHERE updated_at < ?1 AND usage_count = 0",
            params![cutoff],
        )?;

        tracing::info!(deleted, days_old, "Pruned unused shared content");
        Ok(deleted)
    }

    async fn find_similar(
        &self,
        params: &GenerationParams,
        limit: usize,
    ) -> Result<Vec<RemoteRow>> {
        let db = self.db.lock().await;

        let mut stmt = db.prepare(&format!(
            "SELECT {} FROM historical_content
             WHERE (region = ?1 OR topic = ?2) AND year != ?3
             ORDER BY usage_count DESC, updated_at DESC
             LIMIT ?4",
            ROW_COLUMNS
        ))?;

        let stored = stmt
            .query_map(
                params![&params.region, &params.topic, params.year, limit as i64],
                StoredRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        stored.into_iter().map(StoredRow::decode).collect()
    }
}
