use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Live popularity scores for one group: word → decaying score.
///
/// Insertion order is significant — descending sorts over a trend are stable,
/// so ties keep the order in which words first appeared. The map serializes
/// to a plain JSON object and deserializes back in document order.
pub type Trend = IndexMap<String, f64>;

/// One calendar day's worth of extracted words for a group, ready for the
/// snapshot store. `words` is threshold-filtered (count > 3) and sorted
/// descending by count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: String,
    pub words: Vec<(String, u32)>,
}

/// One row of the historical read path: a day key plus the word counts
/// snapshotted for it. The inner map iterates in ascending word order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub timestamp: String,
    pub words: BTreeMap<String, i64>,
}

/// A raw chat message as delivered by a transport implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Unix seconds.
    pub timestamp: i64,
    pub text: String,
}

impl RawMessage {
    pub fn new(timestamp: i64, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }
}
