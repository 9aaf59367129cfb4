//! # Sheet Rows
//!
//! The external store is a set of sheets whose rows are flat maps of
//! column name to cell text. Every row carries a version that the store
//! bumps on each write.

use std::collections::BTreeMap;

use ops_domain::EntityKind;
use serde::{Deserialize, Serialize};

/// Cells that mean "no value" in the shared sheet
const BLANK_CELLS: [&str; 2] = ["", "-"];

/// One sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub version: u64,
    pub fields: BTreeMap<String, String>,
}

impl Row {
    /// Build a row from its cells, deriving the id from the kind's key
    /// columns. Returns `None` when no key column is filled.
    pub fn from_fields(kind: EntityKind, fields: BTreeMap<String, String>, version: u64) -> Option<Self> {
        let id = key_columns(kind)
            .iter()
            .find_map(|col| cell(&fields, col))?
            .to_string();
        Some(Self {
            id,
            version,
            fields,
        })
    }

    /// Trimmed cell value; blank and `-` cells read as absent
    pub fn get(&self, column: &str) -> Option<&str> {
        cell(&self.fields, column)
    }

    /// First filled cell among several column spellings
    pub fn get_any(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|col| self.get(col))
    }

    /// Apply column updates in place
    pub fn apply(&mut self, updates: &BTreeMap<String, String>) {
        for (column, value) in updates {
            self.fields.insert(column.clone(), value.clone());
        }
    }
}

fn cell<'a>(fields: &'a BTreeMap<String, String>, column: &str) -> Option<&'a str> {
    fields
        .get(column)
        .map(|v| v.trim())
        .filter(|v| !BLANK_CELLS.contains(v))
}

/// Columns identifying a row, in order of preference
pub fn key_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Pilot => &["pilot_id", "name"],
        EntityKind::Drone => &["drone_id"],
        EntityKind::Mission => &["project_id", "mission_id"],
    }
}

/// Column changes for a single row write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdates {
    /// Version observed when the change was decided; `None` writes blindly
    pub expected_version: Option<u64>,
    pub fields: BTreeMap<String, String>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    #[must_use]
    pub fn expect_version(mut self, version: Option<u64>) -> Self {
        self.expected_version = version;
        self
    }
}
