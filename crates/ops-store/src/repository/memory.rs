//! In-process row store.
//!
//! Holds the sheets in memory behind a lock. Used for local runs and as the
//! test double for the shared sheet, including an offline switch that makes
//! every call fail with a connectivity error.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ops_domain::EntityKind;
use tokio::sync::RwLock;

use super::traits::{RowSink, RowSource};
use crate::error::{Result, StoreError};
use crate::row::{FieldUpdates, Row};

/// Versioned sheets held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: RwLock<HashMap<EntityKind, Vec<Row>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet from raw cell maps; every row starts at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for a row with no key column.
    pub fn with_sheet(mut self, kind: EntityKind, rows: Vec<BTreeMap<String, String>>) -> Result<Self> {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, fields)| {
                Row::from_fields(kind, fields, 1).ok_or_else(|| StoreError::Validation {
                    sheet: kind.sheet().to_string(),
                    row: format!("#{}", i + 1),
                    reason: "row has no identifier column".to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.sheets.get_mut().insert(kind, rows);
        Ok(self)
    }

    /// Simulate losing the connection to the sheet
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current copy of one row
    pub async fn row(&self, kind: EntityKind, id: &str) -> Option<Row> {
        self.sheets
            .read()
            .await
            .get(&kind)
            .and_then(|rows| rows.iter().find(|r| r.id == id))
            .cloned()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connectivity("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RowSource for MemoryStore {
    async fn fetch_rows(&self, kind: EntityKind) -> Result<Vec<Row>> {
        self.ensure_online()?;
        Ok(self.sheets.read().await.get(&kind).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl RowSink for MemoryStore {
    async fn write_row(&self, kind: EntityKind, id: &str, updates: &FieldUpdates) -> Result<u64> {
        self.ensure_online()?;

        let mut sheets = self.sheets.write().await;
        let row = sheets
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;

        apply_versioned(kind, row, updates)
    }
}

/// Shared write rule: check the expected version, apply, bump.
pub(crate) fn apply_versioned(kind: EntityKind, row: &mut Row, updates: &FieldUpdates) -> Result<u64> {
    if let Some(expected) = updates.expected_version {
        if expected != row.version {
            return Err(StoreError::Conflict {
                kind,
                id: row.id.clone(),
                expected,
                actual: row.version,
            });
        }
    }

    row.apply(&updates.fields);
    row.version += 1;
    tracing::debug!(kind = %kind, id = %row.id, version = row.version, "Row updated");
    Ok(row.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mission_rows() -> Vec<BTreeMap<String, String>> {
        vec![BTreeMap::from([
            ("project_id".to_string(), "PRJ001".to_string()),
            ("assigned_pilot".to_string(), "P001".to_string()),
        ])]
    }

    #[tokio::test]
    async fn test_write_bumps_version() {
        let store = MemoryStore::new()
            .with_sheet(EntityKind::Mission, mission_rows())
            .unwrap();

        let updates = FieldUpdates::new()
            .set("assigned_pilot", "P002")
            .expect_version(Some(1));
        let version = store.write_row(EntityKind::Mission, "PRJ001", &updates).await.unwrap();
        assert_eq!(version, 2);

        let row = store.row(EntityKind::Mission, "PRJ001").await.unwrap();
        assert_eq!(row.get("assigned_pilot"), Some("P002"));
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let store = MemoryStore::new()
            .with_sheet(EntityKind::Mission, mission_rows())
            .unwrap();
        let first = FieldUpdates::new().set("assigned_pilot", "P002").expect_version(Some(1));
        store.write_row(EntityKind::Mission, "PRJ001", &first).await.unwrap();

        let second = FieldUpdates::new().set("assigned_pilot", "P003").expect_version(Some(1));
        let err = store
            .write_row(EntityKind::Mission, "PRJ001", &second)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { expected: 1, actual: 2, .. }));
    }

    #[tokio::test]
    async fn test_blind_write_is_last_writer_wins() {
        let store = MemoryStore::new()
            .with_sheet(EntityKind::Mission, mission_rows())
            .unwrap();
        for pilot in ["P002", "P003"] {
            let updates = FieldUpdates::new().set("assigned_pilot", pilot);
            store.write_row(EntityKind::Mission, "PRJ001", &updates).await.unwrap();
        }
        let row = store.row(EntityKind::Mission, "PRJ001").await.unwrap();
        assert_eq!(row.get("assigned_pilot"), Some("P003"));
        assert_eq!(row.version, 3);
    }

    #[tokio::test]
    async fn test_offline_store_reports_connectivity() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.fetch_rows(EntityKind::Pilot).await.unwrap_err();
        assert!(matches!(err, StoreError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_unknown_row_not_found() {
        let store = MemoryStore::new();
        let err = store
            .write_row(EntityKind::Mission, "NOPE", &FieldUpdates::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
