//! # Transport Boundary
//!
//! The engine needs exactly two things from a chat transport: message
//! history and a group's display name. [`MessageSource`] is that narrow
//! capability surface — implementations wrap whatever client library the
//! host uses, and the core never sees the rest of it.

use crate::error::Result;
use crate::model::RawMessage;
use chrono::Utc;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Options for a history fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum number of messages to return.
    pub limit: Option<usize>,
    /// Only messages at or after this unix timestamp.
    pub since_timestamp: Option<i64>,
    /// Newest-first when set.
    pub reverse: bool,
}

impl FetchOptions {
    /// Everything from the last `days` days.
    pub fn last_days(days: u32) -> Self {
        Self {
            since_timestamp: Some(Utc::now().timestamp() - i64::from(days) * SECONDS_PER_DAY),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The message-history capabilities the trend engine consumes.
pub trait MessageSource {
    fn fetch_messages(&self, group_id: &str, opts: &FetchOptions) -> Result<Vec<RawMessage>>;

    /// Display name for a group, or `None` if the transport cannot
    /// resolve it.
    fn resolve_group_name(&self, group_id: &str) -> Result<Option<String>>;
}

/// Scripted in-memory source for tests: a fixed set of groups, each with a
/// name and a message log.
#[derive(Default)]
pub struct ScriptedSource {
    groups: Vec<(String, String, Vec<RawMessage>)>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(
        mut self,
        group_id: impl Into<String>,
        name: impl Into<String>,
        messages: Vec<RawMessage>,
    ) -> Self {
        self.groups.push((group_id.into(), name.into(), messages));
        self
    }
}

impl MessageSource for ScriptedSource {
    fn fetch_messages(&self, group_id: &str, opts: &FetchOptions) -> Result<Vec<RawMessage>> {
        let Some((_, _, log)) = self.groups.iter().find(|(id, _, _)| id == group_id) else {
            return Ok(Vec::new());
        };

        let mut messages: Vec<RawMessage> = log
            .iter()
            .filter(|m| opts.since_timestamp.map_or(true, |since| m.timestamp >= since))
            .cloned()
            .collect();
        if opts.reverse {
            messages.reverse();
        }
        if let Some(limit) = opts.limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    fn resolve_group_name(&self, group_id: &str) -> Result<Option<String>> {
        Ok(self
            .groups
            .iter()
            .find(|(id, _, _)| id == group_id)
            .map(|(_, name, _)| name.clone()))
    }
}
