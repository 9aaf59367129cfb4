//! # Store Traits
//!
//! Abstract interfaces over the shared sheet. Implementations can be
//! swapped (in-memory, JSON file, a hosted spreadsheet) without touching
//! the rule engine or the router.

use std::sync::Arc;

use async_trait::async_trait;
use ops_domain::{EntityKind, Snapshot};

use crate::error::Result;
use crate::row::{FieldUpdates, Row};

// =============================================================================
// ROW SOURCE
// =============================================================================

/// Read side of the sheet
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Every row of one sheet, in sheet order
    async fn fetch_rows(&self, kind: EntityKind) -> Result<Vec<Row>>;
}

#[async_trait]
impl<T: RowSource + ?Sized> RowSource for Arc<T> {
    async fn fetch_rows(&self, kind: EntityKind) -> Result<Vec<Row>> {
        (**self).fetch_rows(kind).await
    }
}

// =============================================================================
// ROW SINK
// =============================================================================

/// Write side of the sheet
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Update columns of one row and return its new version.
    ///
    /// Fails with [`StoreError::Conflict`] when `updates.expected_version`
    /// is set and the row has moved on.
    ///
    /// [`StoreError::Conflict`]: crate::StoreError::Conflict
    async fn write_row(&self, kind: EntityKind, id: &str, updates: &FieldUpdates) -> Result<u64>;
}

#[async_trait]
impl<T: RowSink + ?Sized> RowSink for Arc<T> {
    async fn write_row(&self, kind: EntityKind, id: &str, updates: &FieldUpdates) -> Result<u64> {
        (**self).write_row(kind, id, updates).await
    }
}

// =============================================================================
// SNAPSHOT SOURCE
// =============================================================================

/// Produces a fresh, immutable roster snapshot per call
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load_snapshot(&self) -> Result<Snapshot>;
}
