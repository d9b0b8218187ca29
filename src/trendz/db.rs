//! # Snapshot Repository
//!
//! Durable per-day word counts, stored in SQLite across three relations:
//!
//! ```text
//! groups(id PRIMARY KEY, name UNIQUE NOT NULL)
//! timestamps(id AUTOINCREMENT, timestamp UNIQUE NOT NULL)       -- YYYY-MM-DD
//! word_trends(id, group_id, timestamp_id, word, count,
//!             UNIQUE(group_id, timestamp_id, word))
//! ```
//!
//! Rows are immutable once written: every insert is `INSERT OR IGNORE`, so
//! re-submitting a batch is a no-op and a conflicting recount for an
//! existing (group, day, word) triple is silently dropped. Batch writes run
//! in a single transaction — a day's words land all-or-nothing.

use crate::error::{Result, TrendzError};
use crate::model::{DayBucket, TrendRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS timestamps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS word_trends (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id TEXT NOT NULL,
    timestamp_id INTEGER NOT NULL,
    word TEXT NOT NULL,
    count INTEGER NOT NULL,
    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE,
    FOREIGN KEY (timestamp_id) REFERENCES timestamps(id) ON DELETE CASCADE,
    UNIQUE(group_id, timestamp_id, word)
);
";

/// Durable store of per-day, per-group word counts.
pub struct SnapshotRepository {
    conn: Connection,
}

impl SnapshotRepository {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    // Foreign keys stay at SQLite's default (off): a group row insert that
    // loses the UNIQUE(name) race must leave the word rows of the losing id
    // readable, not abort the batch.
    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Write a group's daily buckets in one transaction.
    ///
    /// Each (day, word, count) row is `INSERT OR IGNORE`d, keyed on the
    /// (group, timestamp, word) triple, so replays are no-ops. A timestamp
    /// row that cannot be resolved right after its insert is a storage
    /// contract violation and aborts the whole batch.
    pub fn write_batch(
        &mut self,
        group_id: &str,
        group_name: &str,
        buckets: &[DayBucket],
    ) -> Result<()> {
        if group_id.is_empty() {
            return Err(TrendzError::Validation("group id is required".to_string()));
        }

        let tx = self.conn.transaction()?;
        for bucket in buckets {
            tx.execute(
                "INSERT OR IGNORE INTO groups (id, name) VALUES (?1, ?2)",
                params![group_id, group_name],
            )?;
            tx.execute(
                "INSERT OR IGNORE INTO timestamps (timestamp) VALUES (?1)",
                params![bucket.date],
            )?;
            let timestamp_id: i64 = tx
                .query_row(
                    "SELECT id FROM timestamps WHERE timestamp = ?1",
                    params![bucket.date],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| {
                    TrendzError::Consistency(format!(
                        "timestamp '{}' not found after insertion attempt",
                        bucket.date
                    ))
                })?;

            for (word, count) in &bucket.words {
                tx.execute(
                    "INSERT OR IGNORE INTO word_trends (group_id, timestamp_id, word, count) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![group_id, timestamp_id, word, count],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All snapshot rows for a group, one record per day, days ascending,
    /// words ascending within each day. Empty if the group has no rows.
    pub fn read_by_group(&self, group_id: &str) -> Result<Vec<TrendRecord>> {
        self.query_by_group(group_id).map_err(|e| {
            log::error!("word trend query failed for group {group_id}: {e}");
            e
        })
    }

    fn query_by_group(&self, group_id: &str) -> Result<Vec<TrendRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.timestamp, w.word, w.count \
             FROM word_trends w \
             JOIN timestamps t ON t.id = w.timestamp_id \
             WHERE w.group_id = ?1 \
             ORDER BY t.timestamp ASC, w.word ASC",
        )?;
        let rows = stmt.query_map(params![group_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut records: Vec<TrendRecord> = Vec::new();
        for row in rows {
            let (timestamp, word, count) = row?;
            match records.last_mut() {
                Some(record) if record.timestamp == timestamp => {
                    record.words.insert(word, count);
                }
                _ => {
                    let mut words = BTreeMap::new();
                    words.insert(word, count);
                    records.push(TrendRecord { timestamp, words });
                }
            }
        }
        Ok(records)
    }
}
