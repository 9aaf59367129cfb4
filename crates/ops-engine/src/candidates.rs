//! Reassignment candidate search.
//!
//! Candidates come back in roster order, first match first. No ranking by
//! cost or experience is applied.

use ops_domain::{ConstraintChecklist, Mission, ReassignmentCandidate, Role, Snapshot};

use crate::availability::{Schedulable, is_available_excluding};
use crate::matching::covers;
use crate::weather::can_operate;

/// Pilots or drones that satisfy every hard constraint of `mission`.
///
/// Filters, in order: requirements subset, same home location, free over
/// the mission dates (ignoring the mission's own booking), and for drones
/// weather compatibility. The entity currently assigned to the role is
/// never proposed. An empty result is not an error.
pub fn find_candidates(mission: &Mission, role: Role, snapshot: &Snapshot) -> Vec<ReassignmentCandidate> {
    let current = mission.assignee(role);

    let candidates: Vec<ReassignmentCandidate> = match role {
        Role::Pilot => {
            let required: Vec<String> = mission
                .required_skills
                .iter()
                .chain(&mission.required_certifications)
                .cloned()
                .collect();
            snapshot
                .pilots()
                .iter()
                .filter(|p| Some(p.pilot_id.as_str()) != current)
                .filter(|p| covers(&required, &[&p.skills, &p.certifications]))
                .filter(|p| p.home() == mission.location)
                .filter(|p| is_available_excluding(*p, &mission.range, &mission.mission_id))
                .enumerate()
                .map(|(rank, p)| ReassignmentCandidate {
                    role,
                    candidate_id: p.pilot_id.clone(),
                    label: p.name.clone(),
                    checklist: ConstraintChecklist {
                        skills: true,
                        location: true,
                        availability: true,
                        weather: None,
                    },
                    rank,
                })
                .collect()
        }
        Role::Drone => snapshot
            .drones()
            .iter()
            .filter(|d| Some(d.drone_id.as_str()) != current)
            .filter(|d| covers(&mission.required_capabilities, &[&d.capabilities]))
            .filter(|d| d.home() == mission.location)
            .filter(|d| is_available_excluding(*d, &mission.range, &mission.mission_id))
            .filter(|d| can_operate(&d.weather_rating, &mission.expected_weather))
            .enumerate()
            .map(|(rank, d)| ReassignmentCandidate {
                role,
                candidate_id: d.drone_id.clone(),
                label: d.model.clone(),
                checklist: ConstraintChecklist {
                    skills: true,
                    location: true,
                    availability: true,
                    weather: Some(true),
                },
                rank,
            })
            .collect(),
    };

    tracing::debug!(
        mission_id = %mission.mission_id,
        role = role.as_str(),
        found = candidates.len(),
        "Candidate search complete"
    );
    candidates
}

/// Whether `entity_id` would pass the search for `mission`
pub fn is_eligible(mission: &Mission, role: Role, snapshot: &Snapshot, entity_id: &str) -> bool {
    find_candidates(mission, role, snapshot)
        .iter()
        .any(|c| c.candidate_id == entity_id)
}
