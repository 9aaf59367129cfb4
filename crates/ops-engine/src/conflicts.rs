//! # Conflict Detection
//!
//! Deterministic pass over a snapshot. Each mission is evaluated on its
//! own, in snapshot order, and its findings are emitted together:
//!
//! 1. resource unavailable (missing, sick, on leave, grounded, maintenance due)
//! 2. double booking against earlier missions
//! 3. skill / certification / capability mismatch
//! 4. weather mismatch
//! 5. budget overrun (or invalid cost inputs)
//! 6. location mismatch

use ops_domain::{Conflict, ConflictKind, EntityRef, Mission, Severity, Snapshot};
use serde::{Deserialize, Serialize};

use crate::availability::Schedulable;
use crate::cost::estimate_cost;
use crate::matching::missing_items;
use crate::policy::SeverityPolicy;
use crate::weather::can_operate;

/// Detect every conflict in the snapshot.
pub fn detect_conflicts(snapshot: &Snapshot, policy: &SeverityPolicy) -> Vec<Conflict> {
    let missions = snapshot.missions();
    let mut conflicts = Vec::new();

    for (position, mission) in missions.iter().enumerate() {
        let mut detector = MissionDetector {
            snapshot,
            policy,
            mission,
            found: &mut conflicts,
        };
        detector.resource_status();
        detector.double_bookings(&missions[..position]);
        detector.requirements();
        detector.weather();
        detector.budget();
        detector.location();
    }

    tracing::debug!(
        missions = missions.len(),
        conflicts = conflicts.len(),
        "Conflict detection complete"
    );
    conflicts
}

/// Conflicts touching one mission, including double bookings where it is
/// the earlier half of the pair.
pub fn conflicts_for_mission(
    snapshot: &Snapshot,
    policy: &SeverityPolicy,
    mission_id: &str,
) -> Vec<Conflict> {
    detect_conflicts(snapshot, policy)
        .into_iter()
        .filter(|c| c.involves(mission_id))
        .collect()
}

struct MissionDetector<'a> {
    snapshot: &'a Snapshot,
    policy: &'a SeverityPolicy,
    mission: &'a Mission,
    found: &'a mut Vec<Conflict>,
}

impl MissionDetector<'_> {
    fn push(
        &mut self,
        kind: ConflictKind,
        entity: Option<EntityRef>,
        explanation: String,
        suggestions: &[&str],
    ) {
        self.found.push(Conflict {
            kind,
            severity: self.policy.severity_of(kind),
            mission_id: self.mission.mission_id.clone(),
            related_mission_id: None,
            entity,
            explanation,
            suggestions: suggestions.iter().map(|s| (*s).to_string()).collect(),
        });
    }

    fn resource_status(&mut self) {
        let mission = self.mission;
        let snapshot = self.snapshot;

        if let Some(pilot_id) = mission.pilot_id.as_deref() {
            match snapshot.pilot(pilot_id) {
                None => self.push(
                    ConflictKind::ResourceUnavailable,
                    Some(EntityRef::pilot(pilot_id)),
                    format!("Pilot '{pilot_id}' not found in roster"),
                    &["Assign a pilot from the roster"],
                ),
                Some(pilot) if pilot.status.is_unavailable() => self.push(
                    ConflictKind::ResourceUnavailable,
                    Some(EntityRef::pilot(pilot_id)),
                    format!("Pilot '{}' is {}", pilot.name, pilot.status.as_str()),
                    &["Find a replacement pilot", "Reschedule the mission"],
                ),
                Some(pilot) if !pilot.is_operational_for(&mission.range) => self.push(
                    ConflictKind::ResourceUnavailable,
                    Some(EntityRef::pilot(pilot_id)),
                    format!(
                        "Pilot '{}' is not available before {}",
                        pilot.name,
                        pilot
                            .available_from
                            .map_or_else(|| "an unknown date".to_string(), |d| d.to_string())
                    ),
                    &["Find a replacement pilot", "Reschedule the mission"],
                ),
                Some(_) => {}
            }
        }

        if let Some(drone_id) = mission.drone_id.as_deref() {
            match snapshot.drone(drone_id) {
                None => self.push(
                    ConflictKind::ResourceUnavailable,
                    Some(EntityRef::drone(drone_id)),
                    format!("Drone '{drone_id}' not found in fleet"),
                    &["Assign a drone from the fleet"],
                ),
                Some(drone) if drone.status.is_unavailable() => self.push(
                    ConflictKind::ResourceUnavailable,
                    Some(EntityRef::drone(drone_id)),
                    format!("Drone '{drone_id}' is in {}", drone.status.as_str()),
                    &["Use a different drone", "Complete maintenance before the mission"],
                ),
                Some(drone) if !drone.is_operational_for(&mission.range) => self.push(
                    ConflictKind::ResourceUnavailable,
                    Some(EntityRef::drone(drone_id)),
                    format!(
                        "Drone '{drone_id}' is due for maintenance on {}",
                        drone
                            .maintenance_due
                            .map_or_else(|| "an unknown date".to_string(), |d| d.to_string())
                    ),
                    &["Use a different drone", "Service the drone before the mission"],
                ),
                Some(_) => {}
            }
        }
    }

    fn double_bookings(&mut self, earlier: &[Mission]) {
        let mission = self.mission;

        for other in earlier {
            if !other.range.overlaps(&mission.range) {
                continue;
            }

            let mut shared = Vec::new();
            if let Some(pilot_id) = shared_id(&mission.pilot_id, &other.pilot_id) {
                shared.push(format!("pilot '{pilot_id}'"));
            }
            if let Some(drone_id) = shared_id(&mission.drone_id, &other.drone_id) {
                shared.push(format!("drone '{drone_id}'"));
            }
            if shared.is_empty() {
                continue;
            }

            let entity = shared_id(&mission.pilot_id, &other.pilot_id)
                .map(EntityRef::pilot)
                .or_else(|| shared_id(&mission.drone_id, &other.drone_id).map(EntityRef::drone));

            self.found.push(Conflict {
                kind: ConflictKind::DoubleBooking,
                severity: self.policy.severity_of(ConflictKind::DoubleBooking),
                mission_id: mission.mission_id.clone(),
                related_mission_id: Some(other.mission_id.clone()),
                entity,
                explanation: format!(
                    "{} booked on overlapping missions {} {} and {} {}",
                    shared.join(" and "),
                    other.mission_id,
                    other.range,
                    mission.mission_id,
                    mission.range,
                ),
                suggestions: vec![
                    "Reassign one mission".to_string(),
                    "Reschedule one mission".to_string(),
                ],
            });
        }
    }

    fn requirements(&mut self) {
        let mission = self.mission;
        let snapshot = self.snapshot;

        if let Some(pilot) = mission.pilot_id.as_deref().and_then(|id| snapshot.pilot(id)) {
            let required: Vec<String> = mission
                .required_skills
                .iter()
                .chain(&mission.required_certifications)
                .cloned()
                .collect();
            let missing = missing_items(&required, &[&pilot.skills, &pilot.certifications]);
            if !missing.is_empty() {
                let explanation = format!(
                    "Pilot '{}' lacks required skills/certifications: {}",
                    pilot.name,
                    missing.join(", ")
                );
                self.push(
                    ConflictKind::SkillMismatch,
                    Some(EntityRef::pilot(&pilot.pilot_id)),
                    explanation,
                    &["Find a pilot holding the missing qualifications"],
                );
            }
        }

        if let Some(drone) = mission.drone_id.as_deref().and_then(|id| snapshot.drone(id)) {
            let missing = missing_items(&mission.required_capabilities, &[&drone.capabilities]);
            if !missing.is_empty() {
                let explanation = format!(
                    "Drone '{}' lacks required capabilities: {}",
                    drone.drone_id,
                    missing.join(", ")
                );
                self.push(
                    ConflictKind::SkillMismatch,
                    Some(EntityRef::drone(&drone.drone_id)),
                    explanation,
                    &["Use a drone with the missing capabilities"],
                );
            }
        }
    }

    fn weather(&mut self) {
        let mission = self.mission;
        let snapshot = self.snapshot;
        let Some(drone) = mission.drone_id.as_deref().and_then(|id| snapshot.drone(id)) else {
            return;
        };

        if !can_operate(&drone.weather_rating, &mission.expected_weather) {
            let explanation = format!(
                "Drone '{}' rated '{}' cannot fly in '{}' conditions",
                drone.drone_id, drone.weather_rating, mission.expected_weather
            );
            self.push(
                ConflictKind::WeatherMismatch,
                Some(EntityRef::drone(&drone.drone_id)),
                explanation,
                &["Use a weather-rated drone", "Reschedule the mission"],
            );
        }
    }

    fn budget(&mut self) {
        let mission = self.mission;
        let snapshot = self.snapshot;
        let Some(pilot) = mission.pilot_id.as_deref().and_then(|id| snapshot.pilot(id)) else {
            return;
        };

        match estimate_cost(mission, pilot) {
            Ok(estimate) if estimate.over_budget => {
                let explanation = format!(
                    "Pilot cost {:.2} exceeds budget {:.2} by {:.2}",
                    estimate.cost,
                    estimate.budget,
                    -estimate.margin()
                );
                self.push(
                    ConflictKind::BudgetOverrun,
                    Some(EntityRef::mission(&mission.mission_id)),
                    explanation,
                    &["Increase the mission budget", "Assign a lower-rate pilot"],
                );
            }
            Ok(_) => {}
            Err(err) => self.push(
                ConflictKind::InvalidRecord,
                Some(EntityRef::pilot(&pilot.pilot_id)),
                err.to_string(),
                &["Fix the roster row before costing the mission"],
            ),
        }
    }

    fn location(&mut self) {
        let mission = self.mission;
        let snapshot = self.snapshot;

        if let Some(pilot) = mission.pilot_id.as_deref().and_then(|id| snapshot.pilot(id)) {
            if pilot.location != mission.location {
                let explanation = format!(
                    "Pilot '{}' is based in '{}' but the mission is in '{}'",
                    pilot.name, pilot.location, mission.location
                );
                self.push(
                    ConflictKind::LocationMismatch,
                    Some(EntityRef::pilot(&pilot.pilot_id)),
                    explanation,
                    &["Factor in travel time and cost", "Use a local pilot"],
                );
            }
        }

        if let Some(drone) = mission.drone_id.as_deref().and_then(|id| snapshot.drone(id)) {
            if drone.location != mission.location {
                let explanation = format!(
                    "Drone '{}' is based in '{}' but the mission is in '{}'",
                    drone.drone_id, drone.location, mission.location
                );
                self.push(
                    ConflictKind::LocationMismatch,
                    Some(EntityRef::drone(&drone.drone_id)),
                    explanation,
                    &["Arrange drone transport", "Use a local drone"],
                );
            }
        }
    }
}

fn shared_id<'a>(a: &'a Option<String>, b: &Option<String>) -> Option<&'a str> {
    match (a, b) {
        (Some(x), Some(y)) if x == y => Some(x.as_str()),
        _ => None,
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Counts by severity for a detection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub total: usize,
    pub critical: usize,
    pub informational: usize,
}

impl ConflictSummary {
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        let critical = conflicts
            .iter()
            .filter(|c| c.severity == Severity::Critical)
            .count();
        Self {
            total: conflicts.len(),
            critical,
            informational: conflicts.len() - critical,
        }
    }

    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.critical > 0
    }

    /// One-line human summary
    pub fn describe(&self) -> String {
        if self.total == 0 {
            return "No conflicts detected. All assignments are valid.".to_string();
        }

        let mut parts = Vec::new();
        if self.critical > 0 {
            parts.push(format!("{} Critical", self.critical));
        }
        if self.informational > 0 {
            parts.push(format!("{} Informational", self.informational));
        }
        format!("Found {} conflict(s): {}", self.total, parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_text() {
        assert_eq!(
            ConflictSummary::default().describe(),
            "No conflicts detected. All assignments are valid."
        );
        let summary = ConflictSummary {
            total: 3,
            critical: 1,
            informational: 2,
        };
        assert_eq!(summary.describe(), "Found 3 conflict(s): 1 Critical, 2 Informational");
        assert!(summary.has_critical());
    }

    #[test]
    fn test_shared_id() {
        let a = Some("P1".to_string());
        let b = Some("P1".to_string());
        assert_eq!(shared_id(&a, &b), Some("P1"));
        assert_eq!(shared_id(&a, &None), None);
        assert_eq!(shared_id(&None, &None), None);
    }
}
