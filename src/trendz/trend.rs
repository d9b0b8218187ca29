//! # Decaying Trend Store
//!
//! Live "trending now" scores per group, held in a shared [`KvBackend`].
//! Every word occurrence bumps its score by 1; a background sweep shrinks
//! all scores by 5% on a fixed interval and evicts entries that fall below
//! 1.0. The result is a map that favors words people are using *right now*
//! over words that were popular yesterday.
//!
//! ## Wire format
//!
//! One backend value per group, keyed `<prefix><group_id>`, containing the
//! JSON-encoded word → score object. Serialization round-trips exactly,
//! including entry order (see [`crate::model::Trend`]).
//!
//! ## Concurrency
//!
//! Both `update` and the decay sweep are read-modify-write cycles against
//! the same backend value, so they race if allowed to interleave. Every
//! cycle here runs under a per-key mutex; callers never see a lost update
//! between ingestion and the sweep.

use crate::error::{Result, TrendzError};
use crate::model::Trend;
use crate::store::KvBackend;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 5% decay per sweep.
pub const DECAY_FACTOR: f64 = 0.95;

/// Lower bound applied during decay arithmetic, before the eviction test.
pub const DECAY_FLOOR: f64 = 0.1;

/// Entries decayed below this are evicted from the map.
const KEEP_MIN: f64 = 1.0;

/// Scores at or below this are noise; `filter_trends` cuts them before
/// rendering or persisting.
pub const TREND_THRESHOLD: f64 = 3.0;

/// Default sweep interval: every 2 hours.
pub const DECAY_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

pub const DEFAULT_KEY_PREFIX: &str = "trends:";

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Entries with score > 3, sorted descending by score. Stable: ties keep
/// their insertion order.
pub fn filter_trends(trend: &Trend) -> Trend {
    let mut entries: Vec<(&String, &f64)> =
        trend.iter().filter(|(_, s)| **s > TREND_THRESHOLD).collect();
    entries.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(Ordering::Equal));
    entries
        .into_iter()
        .map(|(w, s)| (w.clone(), *s))
        .collect()
}

/// Live decaying score store for all groups, generic over the backend.
pub struct TrendStore<B: KvBackend> {
    backend: B,
    key_prefix: String,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<B: KvBackend> TrendStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key_prefix(backend, DEFAULT_KEY_PREFIX)
    }

    pub fn with_key_prefix(backend: B, prefix: &str) -> Self {
        Self {
            backend,
            key_prefix: prefix.to_string(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, group_id: &str) -> String {
        format!("{}{}", self.key_prefix, group_id)
    }

    /// Get-or-create the mutex guarding read-modify-write cycles for a key.
    fn key_lock(&self, key: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| TrendzError::Store("key lock table poisoned".to_string()))?;
        Ok(locks.entry(key.to_string()).or_default().clone())
    }

    fn read_trend(&self, key: &str) -> Result<Option<Trend>> {
        match self.backend.get(key)? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    fn write_trend(&self, key: &str, trend: &Trend) -> Result<()> {
        let data = serde_json::to_string(trend)?;
        self.backend.set(key, &data)
    }

    /// Increment the score of each word by 1 for a group. New words start
    /// at 1. Applied as one read-modify-write cycle under the group's lock.
    pub fn update(&self, group_id: &str, words: &[String]) -> Result<()> {
        if group_id.is_empty() {
            return Err(TrendzError::Validation("group id is required".to_string()));
        }
        if words.is_empty() {
            return Ok(());
        }

        let key = self.key(group_id);
        let lock = self.key_lock(&key)?;
        let _guard = lock
            .lock()
            .map_err(|_| TrendzError::Store(format!("key lock poisoned for {key}")))?;

        let mut trend = self.read_trend(&key)?.unwrap_or_default();
        for word in words {
            *trend.entry(word.clone()).or_insert(0.0) += 1.0;
        }
        self.write_trend(&key, &trend)
    }

    /// Current live map for a group, or `None` if the group has no entry.
    pub fn get_trends(&self, group_id: &str) -> Result<Option<Trend>> {
        self.read_trend(&self.key(group_id))
    }

    /// Words with score >= 1, sorted descending by score (stable).
    pub fn get_trending_words(&self, group_id: &str) -> Result<Option<Vec<String>>> {
        let Some(trend) = self.get_trends(group_id)? else {
            return Ok(None);
        };

        let mut entries: Vec<(String, f64)> =
            trend.into_iter().filter(|(_, s)| *s >= KEEP_MIN).collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        Ok(Some(entries.into_iter().map(|(w, _)| w).collect()))
    }

    /// Global decay sweep over every group key under the prefix.
    ///
    /// A failure on one key is logged and skipped; the sweep continues with
    /// the remaining groups. Only a failure to list the keys at all aborts
    /// the sweep.
    pub fn apply_decay(&self) -> Result<()> {
        let keys = self.backend.keys(&self.key_prefix)?;
        for key in keys {
            if let Err(e) = self.decay_key(&key) {
                log::warn!("decay sweep: skipping {key}: {e}");
            }
        }
        Ok(())
    }

    fn decay_key(&self, key: &str) -> Result<()> {
        let lock = self.key_lock(key)?;
        let _guard = lock
            .lock()
            .map_err(|_| TrendzError::Store(format!("key lock poisoned for {key}")))?;

        let Some(trend) = self.read_trend(key)? else {
            return Ok(());
        };

        let mut decayed = Trend::new();
        for (word, score) in &trend {
            let shrunk = (score * DECAY_FACTOR).max(DECAY_FLOOR);
            if shrunk >= KEEP_MIN {
                decayed.insert(word.clone(), round2(shrunk));
            }
        }
        self.write_trend(key, &decayed)
    }

    /// Release the backing connection.
    pub fn close(&self) -> Result<()> {
        self.backend.close()
    }
}

impl<B: KvBackend + 'static> TrendStore<B> {
    /// Start the periodic decay sweep on a background thread.
    ///
    /// Call on an `Arc`'d store (`Arc::clone(&store).start_decay_scheduler(..)`);
    /// the worker shares ownership with the caller. The returned handle stops
    /// the scheduler when dropped or when [`DecayScheduler::stop`] is called:
    /// no further sweeps are scheduled, and an in-flight sweep is allowed to
    /// finish before the thread joins.
    pub fn start_decay_scheduler(self: Arc<Self>, interval: Duration) -> DecayScheduler {
        let store = self;
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            let (flag, cvar) = &*stop_flag;
            loop {
                let stopped = match flag.lock() {
                    Ok(g) => g,
                    Err(_) => return,
                };
                let (stopped, timeout) = match cvar.wait_timeout(stopped, interval) {
                    Ok(r) => r,
                    Err(_) => return,
                };
                if *stopped {
                    return;
                }
                drop(stopped);

                if timeout.timed_out() {
                    if let Err(e) = store.apply_decay() {
                        log::warn!("decay sweep failed: {e}");
                    }
                }
            }
        });

        log::debug!("decay scheduler started, interval {interval:?}");
        DecayScheduler {
            stop,
            thread: Some(thread),
        }
    }
}

/// Cancellable handle for the periodic decay sweep.
pub struct DecayScheduler {
    stop: Arc<(Mutex<bool>, Condvar)>,
    thread: Option<JoinHandle<()>>,
}

impl DecayScheduler {
    /// Stop the scheduler and wait for the worker thread to exit. An
    /// in-flight sweep finishes first.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let (flag, cvar) = &*self.stop;
        if let Ok(mut stopped) = flag.lock() {
            *stopped = true;
        }
        cvar.notify_all();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
            log::debug!("decay scheduler stopped");
        }
    }
}

impl Drop for DecayScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
