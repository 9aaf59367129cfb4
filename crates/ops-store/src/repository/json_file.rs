//! JSON document row store.
//!
//! The document mirrors the shared spreadsheet: one array per sheet, one
//! object per row. Cells may be strings, numbers, booleans or arrays of
//! scalars (joined with `", "`). Row versions live in a `_version` member
//! that defaults to 1.
//!
//! ```json
//! {
//!   "pilots":   [{ "pilot_id": "P001", "name": "Arjun", "skills": ["Mapping"] }],
//!   "drones":   [{ "drone_id": "D001", "weather_resistance": "IP43 (Rain)" }],
//!   "missions": [{ "project_id": "PRJ001", "start_date": "2026-02-10" }]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ops_domain::EntityKind;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::memory::apply_versioned;
use super::traits::{RowSink, RowSource};
use crate::error::{Result, StoreError};
use crate::row::{FieldUpdates, Row};

const VERSION_KEY: &str = "_version";

/// Row store backed by a JSON file on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,

    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StoreError::Connectivity(format!("cannot read {}: {e}", self.path.display()))
        })?;
        match serde_json::from_str(&text)? {
            Value::Object(doc) => Ok(doc),
            _ => Err(StoreError::Serialization(format!(
                "{} is not a JSON object of sheets",
                self.path.display()
            ))),
        }
    }

    async fn write_document(&self, doc: Map<String, Value>) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(&Value::Object(doc))?;
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RowSource for JsonFileStore {
    async fn fetch_rows(&self, kind: EntityKind) -> Result<Vec<Row>> {
        let doc = self.read_document().await?;
        let Some(sheet) = doc.get(kind.sheet()) else {
            return Ok(Vec::new());
        };
        let Value::Array(objects) = sheet else {
            return Err(StoreError::Serialization(format!(
                "sheet '{}' is not an array",
                kind.sheet()
            )));
        };

        objects
            .iter()
            .enumerate()
            .map(|(i, object)| row_from_value(kind, i, object))
            .collect()
    }
}

#[async_trait]
impl RowSink for JsonFileStore {
    async fn write_row(&self, kind: EntityKind, id: &str, updates: &FieldUpdates) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_document().await?;

        let objects = doc
            .get_mut(kind.sheet())
            .and_then(Value::as_array_mut)
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;

        let mut target = None;
        for (i, object) in objects.iter().enumerate() {
            if row_from_value(kind, i, object)?.id == id {
                target = Some(i);
                break;
            }
        }
        let index = target.ok_or_else(|| StoreError::NotFound {
            kind,
            id: id.to_string(),
        })?;

        let mut row = row_from_value(kind, index, &objects[index])?;
        let version = apply_versioned(kind, &mut row, updates)?;

        if let Some(object) = objects[index].as_object_mut() {
            for (column, value) in &updates.fields {
                object.insert(column.clone(), Value::String(value.clone()));
            }
            object.insert(VERSION_KEY.to_string(), Value::from(version));
        }

        self.write_document(doc).await?;
        tracing::info!(kind = %kind, id, version, path = %self.path.display(), "Row written");
        Ok(version)
    }
}

fn row_from_value(kind: EntityKind, index: usize, value: &Value) -> Result<Row> {
    let invalid = |reason: &str| StoreError::Validation {
        sheet: kind.sheet().to_string(),
        row: format!("#{}", index + 1),
        reason: reason.to_string(),
    };

    let Value::Object(object) = value else {
        return Err(invalid("row is not a JSON object"));
    };

    let version = object.get(VERSION_KEY).and_then(Value::as_u64).unwrap_or(1);
    let fields: BTreeMap<String, String> = object
        .iter()
        .filter(|(key, _)| key.as_str() != VERSION_KEY)
        .map(|(key, cell)| (key.clone(), cell_text(cell)))
        .collect();

    Row::from_fields(kind, fields, version).ok_or_else(|| invalid("row has no identifier column"))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
