//! # Operations Desk Store
//!
//! Access to the shared roster sheet: pilots, drones and missions kept as
//! versioned rows.
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │   SnapshotLoader<S>      │      │   apply_assignment       │
//! │  rows -> Snapshot        │      │  AssignmentUpdate -> row │
//! └────────────┬─────────────┘      └────────────┬─────────────┘
//!              │ RowSource                        │ RowSink
//!              ▼                                  ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │           MemoryStore  |  JsonFileStore                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ops_store::{JsonFileStore, SnapshotLoader, SnapshotSource};
//!
//! let loader = SnapshotLoader::new(JsonFileStore::new("roster.json"));
//! let snapshot = loader.load_snapshot().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod loader;
pub mod repository;
pub mod row;
pub mod writeback;

pub use error::{Result, StoreError};
pub use loader::{HOURS_PER_DAY, SnapshotLoader};
pub use repository::{JsonFileStore, MemoryStore, RowSink, RowSource, SnapshotSource};
pub use row::{FieldUpdates, Row};
pub use writeback::{AssignmentUpdate, apply_assignment};
