//! # Live Store Backends
//!
//! The decaying trend store keeps one JSON value per group in a shared
//! key-value store. The [`KvBackend`] trait abstracts that store so the
//! trend logic is decoupled from where the bytes live.
//!
//! ## Implementations
//!
//! - [`fs::FileBackend`]: production file-per-key backend. Each key is one
//!   JSON file under a root directory; writes are atomic (temp file +
//!   rename) so a crashed writer never leaves a torn value behind.
//! - [`memory::InMemoryBackend`]: shared in-memory backend for tests and
//!   embedded use. No persistence.
//!
//! ## Contract
//!
//! Implementations take `&self` and must be safe to share across threads:
//! the ingestion path and the decay sweep run concurrently and both go
//! through the same backend. Read-modify-write cycles are serialized one
//! level up, in [`crate::trend::TrendStore`] — a backend only has to make
//! each individual `get`/`set` atomic.

use crate::error::Result;

pub mod fs;
pub mod memory;

/// Abstract interface for the live trend store.
pub trait KvBackend: Send + Sync {
    /// Fetch the value for a key, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set the value for a key (create or overwrite).
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// List every key starting with `prefix`, in unspecified order.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<()>;

    /// Release the backing connection or handle. Further calls after
    /// `close` are implementation-defined.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}
