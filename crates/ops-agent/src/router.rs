//! # Request Router
//!
//! Dispatches a [`StructuredRequest`] to the rule engine over one roster
//! snapshot. Routing is synchronous and does no I/O: a reassignment comes
//! back as an [`AssignmentUpdate`] for the caller to write.

use ops_domain::{DateRange, Drone, Mission, Pilot, Role, Snapshot};
use ops_engine::availability::overlapping;
use ops_engine::matching::{covers, holds};
use ops_engine::{
    ConflictSummary, Schedulable, SeverityPolicy, can_operate, conflicts_for_mission,
    detect_conflicts, estimate_cost, find_candidates, is_available_excluding,
};
use ops_store::AssignmentUpdate;
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::request::{RequestKind, StructuredRequest};
use crate::response::{
    AgentResponse, AvailabilityEntry, AvailabilityReport, CapabilityReport, ConflictReport,
    CostReport, ReassignmentReport, ResponsePayload, RosterEntry,
};

/// Router output: the answer plus an optional pending write
#[derive(Debug, Clone)]
pub struct Routed {
    pub response: AgentResponse,
    pub write: Option<AssignmentUpdate>,
}

/// Answer one request against `snapshot`.
///
/// # Errors
///
/// - [`AgentError::MissingField`] when the kind needs an id or filter that
///   is absent
/// - [`AgentError::Reference`] for ids the snapshot does not contain
/// - [`AgentError::Validation`] for uncostable missions and ineligible
///   reassignment targets
pub fn route(
    snapshot: &Snapshot,
    policy: &SeverityPolicy,
    request: &StructuredRequest,
) -> Result<Routed> {
    let answer = match request.kind {
        RequestKind::QueryAvailability => availability(snapshot, request)?,
        RequestKind::QueryCapability => capability(snapshot, request)?,
        RequestKind::CalculateCost => cost(snapshot, request)?,
        RequestKind::DetectConflicts => conflicts(snapshot, policy, request)?,
        RequestKind::Reassign => reassign(snapshot, request)?,
    };

    tracing::info!(
        kind = %request.kind,
        mission_id = request.entity_refs.mission_id.as_deref().unwrap_or("-"),
        writes = answer.write.is_some(),
        "Request routed"
    );

    Ok(Routed {
        response: AgentResponse {
            request_id: Uuid::new_v4(),
            kind: request.kind,
            summary: answer.summary,
            payload: answer.payload,
            snapshot_at: snapshot.loaded_at(),
        },
        write: answer.write,
    })
}

struct Answer {
    summary: String,
    payload: ResponsePayload,
    write: Option<AssignmentUpdate>,
}

impl Answer {
    fn read(summary: String, payload: ResponsePayload) -> Self {
        Self {
            summary,
            payload,
            write: None,
        }
    }
}

// =============================================================================
// AVAILABILITY
// =============================================================================

fn availability(snapshot: &Snapshot, request: &StructuredRequest) -> Result<Answer> {
    let refs = &request.entity_refs;
    let mission = refs
        .mission_id
        .as_deref()
        .map(|id| snapshot.require_mission(id))
        .transpose()?;

    let range = match (mission, request.filters.date) {
        (Some(m), _) => m.range,
        (None, Some(date)) => DateRange::single_day(date),
        (None, None) => {
            return Err(AgentError::MissingField {
                kind: request.kind.as_str(),
                field: "entityRefs.missionId or filters.date",
            });
        }
    };
    let skip = mission.map(|m| m.mission_id.as_str());
    let location = request.filters.location.as_deref();

    // A named pilot or drone gets a yes/no answer; otherwise list who is free.
    if refs.pilot_id.is_some() || refs.drone_id.is_some() {
        let mut pilots = Vec::new();
        let mut drones = Vec::new();
        let mut lines = Vec::new();

        if let Some(id) = &refs.pilot_id {
            let entry = pilot_entry(snapshot.require_pilot(id)?, &range, skip);
            lines.push(describe_entry("Pilot", &entry, &range));
            pilots.push(entry);
        }
        if let Some(id) = &refs.drone_id {
            let entry = drone_entry(snapshot.require_drone(id)?, &range, skip);
            lines.push(describe_entry("Drone", &entry, &range));
            drones.push(entry);
        }

        let report = AvailabilityReport {
            range,
            location: None,
            pilots,
            drones,
        };
        return Ok(Answer::read(
            lines.join(" "),
            ResponsePayload::Availability(report),
        ));
    }

    let pilots: Vec<_> = snapshot
        .pilots()
        .iter()
        .filter(|p| in_location(p.home(), location))
        .map(|p| pilot_entry(p, &range, skip))
        .filter(|e| e.available)
        .collect();
    let drones: Vec<_> = snapshot
        .drones()
        .iter()
        .filter(|d| in_location(d.home(), location))
        .map(|d| drone_entry(d, &range, skip))
        .filter(|e| e.available)
        .collect();

    let summary = format!(
        "{} pilot(s) and {} drone(s) available for {range}{}",
        pilots.len(),
        drones.len(),
        location.map(|l| format!(" in {l}")).unwrap_or_default()
    );
    let report = AvailabilityReport {
        range,
        location: location.map(str::to_string),
        pilots,
        drones,
    };
    Ok(Answer::read(summary, ResponsePayload::Availability(report)))
}

fn pilot_entry(pilot: &Pilot, range: &DateRange, skip: Option<&str>) -> AvailabilityEntry {
    availability_entry(pilot, &pilot.name, pilot.status.as_str(), range, skip)
}

fn drone_entry(drone: &Drone, range: &DateRange, skip: Option<&str>) -> AvailabilityEntry {
    availability_entry(drone, &drone.model, drone.status.as_str(), range, skip)
}

fn availability_entry<E: Schedulable>(
    entity: &E,
    label: &str,
    status: &str,
    range: &DateRange,
    skip: Option<&str>,
) -> AvailabilityEntry {
    let blocking_missions: Vec<String> = overlapping(entity, range, skip)
        .map(|b| b.mission_id.clone())
        .collect();
    AvailabilityEntry {
        id: entity.entity_id().to_string(),
        label: label.to_string(),
        location: entity.home().to_string(),
        status: status.to_string(),
        available: entity.is_operational_for(range) && blocking_missions.is_empty(),
        blocking_missions,
    }
}

fn describe_entry(noun: &str, entry: &AvailabilityEntry, range: &DateRange) -> String {
    let who = format!("{noun} {} ({})", entry.label, entry.id);
    if entry.available {
        format!("{who} is available for {range}.")
    } else if entry.blocking_missions.is_empty() {
        format!("{who} is not available for {range} (status: {}).", entry.status)
    } else {
        format!(
            "{who} is booked on {} during {range}.",
            entry.blocking_missions.join(", ")
        )
    }
}

fn in_location(home: &str, wanted: Option<&str>) -> bool {
    wanted.is_none_or(|w| home.trim().eq_ignore_ascii_case(w.trim()))
}

// =============================================================================
// CAPABILITY
// =============================================================================

fn capability(snapshot: &Snapshot, request: &StructuredRequest) -> Result<Answer> {
    let location = request.filters.location.as_deref();

    if let Some(id) = &request.entity_refs.mission_id {
        let mission = snapshot.require_mission(id)?;
        let required: Vec<String> = mission
            .required_skills
            .iter()
            .chain(&mission.required_certifications)
            .cloned()
            .collect();

        let pilots: Vec<_> = snapshot
            .pilots()
            .iter()
            .filter(|p| in_location(p.home(), location))
            .filter(|p| covers(&required, &[&p.skills, &p.certifications]))
            .map(pilot_roster_entry)
            .collect();
        let drones: Vec<_> = snapshot
            .drones()
            .iter()
            .filter(|d| in_location(d.home(), location))
            .filter(|d| covers(&mission.required_capabilities, &[&d.capabilities]))
            .filter(|d| can_operate(&d.weather_rating, &mission.expected_weather))
            .map(drone_roster_entry)
            .collect();

        let summary = format!(
            "{} pilot(s) and {} drone(s) meet the requirements of mission {id}",
            pilots.len(),
            drones.len()
        );
        let report = CapabilityReport {
            mission_id: Some(id.clone()),
            pilots,
            drones,
        };
        return Ok(Answer::read(summary, ResponsePayload::Capability(report)));
    }

    let skill = request.filters.skill.as_deref();
    let wanted_capability = request.filters.capability.as_deref();
    if skill.is_none() && wanted_capability.is_none() {
        return Err(AgentError::MissingField {
            kind: request.kind.as_str(),
            field: "filters.skill, filters.capability or entityRefs.missionId",
        });
    }

    let pilots: Vec<_> = skill
        .map(|s| {
            snapshot
                .pilots()
                .iter()
                .filter(|p| in_location(p.home(), location))
                .filter(|p| holds(&p.skills, s) || holds(&p.certifications, s))
                .map(pilot_roster_entry)
                .collect()
        })
        .unwrap_or_default();
    let drones: Vec<_> = wanted_capability
        .map(|c| {
            snapshot
                .drones()
                .iter()
                .filter(|d| in_location(d.home(), location))
                .filter(|d| holds(&d.capabilities, c))
                .map(drone_roster_entry)
                .collect()
        })
        .unwrap_or_default();

    let mut parts = Vec::new();
    if let Some(s) = skill {
        parts.push(format!("{} pilot(s) with '{s}'", pilots.len()));
    }
    if let Some(c) = wanted_capability {
        parts.push(format!("{} drone(s) with '{c}'", drones.len()));
    }
    let summary = format!(
        "Found {}{}",
        parts.join(" and "),
        location.map(|l| format!(" in {l}")).unwrap_or_default()
    );

    let report = CapabilityReport {
        mission_id: None,
        pilots,
        drones,
    };
    Ok(Answer::read(summary, ResponsePayload::Capability(report)))
}

fn pilot_roster_entry(pilot: &Pilot) -> RosterEntry {
    RosterEntry {
        id: pilot.pilot_id.clone(),
        label: pilot.name.clone(),
        location: pilot.location.clone(),
        status: pilot.status.as_str().to_string(),
        holds: pilot
            .skills
            .iter()
            .chain(&pilot.certifications)
            .cloned()
            .collect(),
        weather_rating: None,
    }
}

fn drone_roster_entry(drone: &Drone) -> RosterEntry {
    RosterEntry {
        id: drone.drone_id.clone(),
        label: drone.model.clone(),
        location: drone.location.clone(),
        status: drone.status.as_str().to_string(),
        holds: drone.capabilities.clone(),
        weather_rating: Some(drone.weather_rating.clone()),
    }
}

// =============================================================================
// COST
// =============================================================================

fn cost(snapshot: &Snapshot, request: &StructuredRequest) -> Result<Answer> {
    let mission = snapshot.require_mission(request.require_mission_id()?)?;

    let (pilot_id, hypothetical) = match request.entity_refs.pilot_id.as_deref() {
        Some(id) => (id, mission.pilot_id.as_deref() != Some(id)),
        None => (
            mission.pilot_id.as_deref().ok_or(AgentError::MissingField {
                kind: request.kind.as_str(),
                field: "entityRefs.pilotId",
            })?,
            false,
        ),
    };
    let pilot = snapshot.require_pilot(pilot_id)?;
    let estimate = estimate_cost(mission, pilot)?;
    let margin = estimate.margin();

    let verdict = if estimate.over_budget {
        format!("over budget by {:.2}", -margin)
    } else {
        format!("within budget with {margin:.2} to spare")
    };
    let summary = format!(
        "Mission {} with {} ({:.1} h at {:.2}/h) costs {:.2} against a budget of {:.2}: {verdict}",
        mission.mission_id,
        pilot.name,
        estimate.flight_hours,
        estimate.hourly_rate,
        estimate.cost,
        estimate.budget
    );

    let report = CostReport {
        estimate,
        margin,
        hypothetical,
    };
    Ok(Answer::read(summary, ResponsePayload::Cost(report)))
}

// =============================================================================
// CONFLICTS
// =============================================================================

fn conflicts(
    snapshot: &Snapshot,
    policy: &SeverityPolicy,
    request: &StructuredRequest,
) -> Result<Answer> {
    let (mission_id, found) = match &request.entity_refs.mission_id {
        Some(id) => {
            snapshot.require_mission(id)?;
            (Some(id.clone()), conflicts_for_mission(snapshot, policy, id))
        }
        None => (None, detect_conflicts(snapshot, policy)),
    };

    let summary = ConflictSummary::from_conflicts(&found);
    let text = match &mission_id {
        Some(id) => format!("Mission {id}: {}", summary.describe()),
        None => summary.describe(),
    };

    let report = ConflictReport {
        mission_id,
        summary,
        conflicts: found,
    };
    Ok(Answer::read(text, ResponsePayload::Conflicts(report)))
}

// =============================================================================
// REASSIGNMENT
// =============================================================================

fn reassign(snapshot: &Snapshot, request: &StructuredRequest) -> Result<Answer> {
    let mission = snapshot.require_mission(request.require_mission_id()?)?;
    let refs = &request.entity_refs;

    let (role, named) = match (&refs.pilot_id, &refs.drone_id, request.filters.role) {
        (Some(id), _, _) => (Role::Pilot, Some(id.as_str())),
        (None, Some(id), _) => (Role::Drone, Some(id.as_str())),
        (None, None, Some(role)) => (role, None),
        (None, None, None) => {
            return Err(AgentError::MissingField {
                kind: request.kind.as_str(),
                field: "entityRefs.pilotId, entityRefs.droneId or filters.role",
            });
        }
    };

    let previous = mission.assignee(role).map(str::to_string);

    // Naming the current assignee asks for their replacement.
    let target = named.filter(|id| Some(*id) != previous.as_deref());
    if let Some(id) = target {
        match role {
            Role::Pilot => {
                snapshot.require_pilot(id)?;
            }
            Role::Drone => {
                snapshot.require_drone(id)?;
            }
        }
    }

    let candidates = find_candidates(mission, role, snapshot);
    let chosen = match target {
        Some(id) if candidates.iter().any(|c| c.candidate_id == id) => Some(id.to_string()),
        Some(id) => {
            return Err(AgentError::Validation(format!(
                "{} '{id}' cannot take mission '{}': {}",
                role.as_str(),
                mission.mission_id,
                unmet_constraints(mission, role, snapshot, id).join(", ")
            )));
        }
        None => candidates.first().map(|c| c.candidate_id.clone()),
    };

    let summary = match (&chosen, &previous) {
        (Some(new), Some(old)) => format!(
            "Reassigned {} on mission {} from {old} to {new}",
            role.as_str(),
            mission.mission_id
        ),
        (Some(new), None) => format!(
            "Assigned {} {new} to mission {}",
            role.as_str(),
            mission.mission_id
        ),
        (None, _) => format!(
            "No eligible {} found for mission {}; assignment unchanged",
            role.as_str(),
            mission.mission_id
        ),
    };

    let write = chosen.as_ref().map(|id| {
        AssignmentUpdate::from_snapshot(snapshot, mission.mission_id.clone(), role, id.clone())
    });

    let report = ReassignmentReport {
        mission_id: mission.mission_id.clone(),
        role,
        previous,
        assigned: chosen,
        candidates,
        committed_version: None,
    };

    Ok(Answer {
        summary,
        payload: ResponsePayload::Reassignment(report),
        write,
    })
}

/// Human-readable reasons an entity fails the candidate filters
fn unmet_constraints(mission: &Mission, role: Role, snapshot: &Snapshot, id: &str) -> Vec<String> {
    let mut reasons = Vec::new();
    match role {
        Role::Pilot => {
            if let Some(pilot) = snapshot.pilot(id) {
                let required: Vec<String> = mission
                    .required_skills
                    .iter()
                    .chain(&mission.required_certifications)
                    .cloned()
                    .collect();
                if !covers(&required, &[&pilot.skills, &pilot.certifications]) {
                    reasons.push("missing required skills or certifications".to_string());
                }
                push_common(&mut reasons, pilot, mission);
            }
        }
        Role::Drone => {
            if let Some(drone) = snapshot.drone(id) {
                if !covers(&mission.required_capabilities, &[&drone.capabilities]) {
                    reasons.push("missing required capabilities".to_string());
                }
                push_common(&mut reasons, drone, mission);
                if !can_operate(&drone.weather_rating, &mission.expected_weather) {
                    reasons.push(format!(
                        "rated {} for {} weather",
                        drone.weather_rating, mission.expected_weather
                    ));
                }
            }
        }
    }
    if reasons.is_empty() {
        reasons.push("does not qualify".to_string());
    }
    reasons
}

fn push_common<E: Schedulable>(reasons: &mut Vec<String>, entity: &E, mission: &Mission) {
    if entity.home() != mission.location {
        reasons.push(format!("based in {} not {}", entity.home(), mission.location));
    }
    if !is_available_excluding(entity, &mission.range, &mission.mission_id) {
        reasons.push(format!("not available for {}", mission.range));
    }
}
