//! Assignment write-back.
//!
//! A reassignment changes exactly one mission cell, guarded by the row
//! version seen in the snapshot the decision was made on.

use ops_domain::{EntityKind, Role, Snapshot};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::repository::RowSink;
use crate::row::FieldUpdates;

/// A pending change of a mission's pilot or drone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    pub mission_id: String,
    pub role: Role,
    pub entity_id: String,

    /// Mission row version observed in the snapshot
    pub expected_version: Option<u64>,
}

impl AssignmentUpdate {
    /// Prepare an update, capturing the mission's version from the snapshot
    pub fn from_snapshot(
        snapshot: &Snapshot,
        mission_id: impl Into<String>,
        role: Role,
        entity_id: impl Into<String>,
    ) -> Self {
        let mission_id = mission_id.into();
        let expected_version = snapshot.row_version(EntityKind::Mission, &mission_id);
        Self {
            mission_id,
            role,
            entity_id: entity_id.into(),
            expected_version,
        }
    }

    pub fn field_updates(&self) -> FieldUpdates {
        FieldUpdates::new()
            .set(self.role.mission_column(), self.entity_id.clone())
            .expect_version(self.expected_version)
    }
}

/// Write an assignment to the mission sheet and return the new row version.
///
/// # Errors
///
/// Propagates the sink's error unchanged, including
/// [`StoreError::Conflict`](crate::StoreError::Conflict) when the mission
/// row moved on since the snapshot.
pub async fn apply_assignment(sink: &dyn RowSink, update: &AssignmentUpdate) -> Result<u64> {
    let version = sink
        .write_row(EntityKind::Mission, &update.mission_id, &update.field_updates())
        .await?;

    tracing::info!(
        mission_id = %update.mission_id,
        role = update.role.as_str(),
        entity_id = %update.entity_id,
        version,
        "Assignment written"
    );
    Ok(version)
}
