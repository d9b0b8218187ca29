//! # Aggregation
//!
//! Bridges message history to both stores. The streaming path feeds each
//! incoming message into the decaying live store; the batch path folds a
//! history fetch into per-day buckets and snapshots them into SQLite.
//!
//! Bucketing rules (batch path):
//! - each message's words come from [`crate::extract::extract`]
//! - messages yielding fewer than 2 words are discarded
//! - the day key is the UTC calendar day of the unix timestamp
//! - per day, word frequencies are counted, counts <= 3 are cut, and the
//!   rest sort descending by count
//!
//! Day buckets keep the order in which days first appear in the input
//! stream; the snapshot read path re-orders chronologically anyway.

use crate::db::SnapshotRepository;
use crate::error::{Result, TrendzError};
use crate::extract::{self, Stopwords};
use crate::model::{DayBucket, RawMessage, Trend, TrendRecord};
use crate::store::KvBackend;
use crate::transport::{FetchOptions, MessageSource};
use crate::trend::{self, TrendStore};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::sync::Arc;

/// Messages with fewer extracted words than this are noise and dropped
/// before day bucketing.
const MIN_WORDS_PER_MESSAGE: usize = 2;

/// Per-day counts must exceed this to be snapshotted. Integer twin of
/// [`trend::TREND_THRESHOLD`].
const COUNT_THRESHOLD: u32 = 3;

/// UTC calendar-day key (`YYYY-MM-DD`) for a unix timestamp. `None` for
/// timestamps chrono cannot represent.
pub fn format_day(unix_secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(unix_secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn word_frequency(words: &[String]) -> IndexMap<String, u32> {
    let mut freq = IndexMap::new();
    for word in words {
        *freq.entry(word.clone()).or_insert(0) += 1;
    }
    freq
}

fn threshold_filter(freq: IndexMap<String, u32>) -> Vec<(String, u32)> {
    let mut entries: Vec<(String, u32)> = freq
        .into_iter()
        .filter(|(_, count)| *count > COUNT_THRESHOLD)
        .collect();
    entries.sort_by_key(|(_, count)| Reverse(*count));
    entries
}

/// Fold a message history into one bucket per UTC calendar day, frequency
/// counted, threshold-filtered, sorted descending by count.
pub fn bucket_by_day(messages: &[RawMessage], stopwords: &Stopwords) -> Vec<DayBucket> {
    let mut days: IndexMap<String, Vec<String>> = IndexMap::new();

    for message in messages {
        let words = extract::extract(&message.text, stopwords);
        if words.len() < MIN_WORDS_PER_MESSAGE {
            continue;
        }
        let Some(date) = format_day(message.timestamp) else {
            log::debug!("skipping message with unrepresentable timestamp {}", message.timestamp);
            continue;
        };
        days.entry(date).or_default().extend(words);
    }

    days.into_iter()
        .map(|(date, words)| DayBucket {
            date,
            words: threshold_filter(word_frequency(&words)),
        })
        .collect()
}

/// Orchestrates the live and batch pipelines over one live store and one
/// snapshot repository.
pub struct Aggregator<B: KvBackend> {
    trends: Arc<TrendStore<B>>,
    snapshots: SnapshotRepository,
}

impl Aggregator<crate::store::fs::FileBackend> {
    /// Wire up the production stores from a config: file-backed live store
    /// plus the SQLite snapshot database.
    pub fn open(config: &crate::config::TrendzConfig) -> Result<Self> {
        let backend = crate::store::fs::FileBackend::new(config.trends_dir.clone().into());
        let trends = Arc::new(TrendStore::with_key_prefix(backend, &config.key_prefix));
        let snapshots = SnapshotRepository::open(&config.db_path)?;
        Ok(Self::new(trends, snapshots))
    }
}

impl<B: KvBackend> Aggregator<B> {
    pub fn new(trends: Arc<TrendStore<B>>, snapshots: SnapshotRepository) -> Self {
        Self { trends, snapshots }
    }

    pub fn trends(&self) -> &Arc<TrendStore<B>> {
        &self.trends
    }

    pub fn snapshots(&self) -> &SnapshotRepository {
        &self.snapshots
    }

    /// Streaming path: extract one message's words and bump the live scores.
    pub fn run_live_update(
        &self,
        group_id: &str,
        text: &str,
        stopwords: &Stopwords,
    ) -> Result<()> {
        let words = extract::extract(text, stopwords);
        self.trends.update(group_id, &words)
    }

    /// Batch path: day-bucket a message history and snapshot it.
    pub fn run_backfill(
        &mut self,
        group_id: &str,
        group_name: &str,
        messages: &[RawMessage],
        stopwords: &Stopwords,
    ) -> Result<()> {
        let buckets = bucket_by_day(messages, stopwords);
        self.snapshots.write_batch(group_id, group_name, &buckets)
    }

    /// Backfill straight from a transport: resolve the group's display
    /// name, fetch its history, snapshot it.
    pub fn backfill_from_source<S: MessageSource>(
        &mut self,
        source: &S,
        group_id: &str,
        opts: &FetchOptions,
        stopwords: &Stopwords,
    ) -> Result<()> {
        let group_name = source.resolve_group_name(group_id)?.ok_or_else(|| {
            TrendzError::Validation(format!("cannot resolve a name for group {group_id}"))
        })?;
        let messages = source.fetch_messages(group_id, opts)?;
        self.run_backfill(group_id, &group_name, &messages, stopwords)
    }

    /// Live render path: the group's current trends, noise-filtered
    /// (score > 3), sorted descending, truncated to `limit` rows.
    pub fn trending_table(&self, group_id: &str, limit: usize) -> Result<Vec<(String, f64)>> {
        let Some(trends) = self.trends.get_trends(group_id)? else {
            return Ok(Vec::new());
        };
        let filtered: Trend = trend::filter_trends(&trends);
        Ok(filtered.into_iter().take(limit).collect())
    }

    /// Historical render path: the group's snapshots, chronological.
    pub fn history(&self, group_id: &str) -> Result<Vec<TrendRecord>> {
        self.snapshots.read_by_group(group_id)
    }
}
