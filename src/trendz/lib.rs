//! # Trendz Architecture
//!
//! Trendz is a **UI-agnostic word-trend engine**. It turns free-text chat
//! messages into ranked "trending word" statistics per group, at two time
//! horizons: a fast, decaying live score and a durable per-day snapshot.
//! Rendering, command dispatch, and the chat transport itself live in host
//! applications; this crate is the part with the invariants.
//!
//! ## The Pipeline
//!
//! ```text
//! incoming message
//!        │
//!        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Extraction (extract.rs)                                    │
//! │  - whitespace split, lowercase, Latin/Cyrillic letters only │
//! │  - length [2,8], stopword filter                            │
//! └─────────────────────────────────────────────────────────────┘
//!        │                                │
//!        ▼ live path                      ▼ batch path
//! ┌──────────────────────────┐  ┌──────────────────────────────┐
//! │  TrendStore (trend.rs)   │  │  Aggregation (aggregate.rs)  │
//! │  - +1 per occurrence     │  │  - bucket by UTC day         │
//! │  - 5% decay sweep, 2h    │  │  - count, threshold > 3      │
//! │  - evict below 1.0       │  │  - descending sort           │
//! │  - KvBackend (store/)    │  └──────────────────────────────┘
//! └──────────────────────────┘                │
//!                                             ▼
//!                              ┌──────────────────────────────┐
//!                              │  SnapshotRepository (db.rs)  │
//!                              │  - SQLite, one transaction   │
//!                              │    per batch                 │
//!                              │  - INSERT OR IGNORE rows     │
//!                              │  - chronological read path   │
//!                              └──────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Everything here takes regular Rust arguments and returns
//! `Result<T, TrendzError>`. Nothing writes to stdout, assumes a terminal,
//! or owns a process-global. The decay scheduler is the one background
//! concern, and it hands the caller an explicit cancellable handle instead
//! of installing itself ambiently.
//!
//! ## Boundaries
//!
//! The chat transport appears only as the narrow [`transport::MessageSource`]
//! capability trait (fetch history, resolve a display name). The live store
//! backend is the [`store::KvBackend`] trait with file-backed and in-memory
//! implementations.
//!
//! ## Module Overview
//!
//! - [`aggregate`]: orchestration — live updates, day bucketing, backfills
//! - [`trend`]: the decaying live score store and its sweep scheduler
//! - [`db`]: the durable snapshot repository (SQLite)
//! - [`extract`]: pure word extraction and the stopword set
//! - [`store`]: KV backend abstraction for the live store
//! - [`transport`]: capability trait for message history
//! - [`model`]: core data types (`Trend`, `DayBucket`, `TrendRecord`)
//! - [`config`]: configuration management
//! - [`error`]: error types

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod model;
pub mod store;
pub mod transport;
pub mod trend;
