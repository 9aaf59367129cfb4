//! Response payloads returned by the router.

use chrono::{DateTime, Utc};
use ops_domain::{Conflict, CostEstimate, DateRange, ReassignmentCandidate, Role};
use ops_engine::ConflictSummary;
use serde::Serialize;
use uuid::Uuid;

use crate::request::RequestKind;

/// Answer to one request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub request_id: Uuid,
    pub kind: RequestKind,

    /// One-line human summary
    pub summary: String,
    pub payload: ResponsePayload,

    /// When the roster snapshot behind this answer was read
    pub snapshot_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Availability(AvailabilityReport),
    Capability(CapabilityReport),
    Cost(CostReport),
    Conflicts(ConflictReport),
    Reassignment(ReassignmentReport),
}

/// Roster line shown in availability answers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    pub id: String,
    pub label: String,
    pub location: String,
    pub status: String,
    pub available: bool,

    /// Missions whose dates collide with the requested range
    pub blocking_missions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub range: DateRange,
    pub location: Option<String>,
    pub pilots: Vec<AvailabilityEntry>,
    pub drones: Vec<AvailabilityEntry>,
}

/// Roster line shown in capability answers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub label: String,
    pub location: String,
    pub status: String,

    /// Skills and certifications for pilots, capabilities for drones
    pub holds: Vec<String>,
    pub weather_rating: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    pub mission_id: Option<String>,
    pub pilots: Vec<RosterEntry>,
    pub drones: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    #[serde(flatten)]
    pub estimate: CostEstimate,
    pub margin: f64,

    /// Priced with a pilot other than the one assigned
    pub hypothetical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub mission_id: Option<String>,
    pub summary: ConflictSummary,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignmentReport {
    pub mission_id: String,
    pub role: Role,
    pub previous: Option<String>,

    /// Entity chosen for the mission; `None` when nobody qualifies
    pub assigned: Option<String>,
    pub candidates: Vec<ReassignmentCandidate>,

    /// Mission row version after the write-back
    pub committed_version: Option<u64>,
}
