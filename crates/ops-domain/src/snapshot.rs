//! # Roster Snapshot
//!
//! Immutable, point-in-time copy of all pilots, drones and missions used
//! for a single request. Bookings are derived here from mission
//! assignments; row versions are kept so a write-back can detect that the
//! store moved on since the snapshot was taken.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{Booking, Drone, DomainError, EntityKind, EntityRef, Mission, Pilot};

/// Immutable view of the roster for one request cycle
#[derive(Debug, Clone)]
pub struct Snapshot {
    pilots: Vec<Pilot>,
    drones: Vec<Drone>,
    missions: Vec<Mission>,

    pilot_index: HashMap<String, usize>,
    drone_index: HashMap<String, usize>,
    mission_index: HashMap<String, usize>,

    versions: HashMap<EntityRef, u64>,
    loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// Assemble a snapshot, deriving each pilot's and drone's bookings from
    /// the missions assigned to them.
    ///
    /// Bookings are ordered by start date. References to unknown pilots or
    /// drones are left in the missions untouched; the rule engine reports
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DuplicateId`] if an identifier repeats within
    /// one kind.
    pub fn new(
        mut pilots: Vec<Pilot>,
        mut drones: Vec<Drone>,
        missions: Vec<Mission>,
    ) -> Result<Self, DomainError> {
        let pilot_index = index_by(EntityKind::Pilot, &pilots, |p| &p.pilot_id)?;
        let drone_index = index_by(EntityKind::Drone, &drones, |d| &d.drone_id)?;
        let mission_index = index_by(EntityKind::Mission, &missions, |m| &m.mission_id)?;

        for pilot in &mut pilots {
            pilot.bookings.clear();
        }
        for drone in &mut drones {
            drone.bookings.clear();
        }

        for mission in &missions {
            let booking = Booking {
                mission_id: mission.mission_id.clone(),
                range: mission.range,
            };
            if let Some(&idx) = mission.pilot_id.as_ref().and_then(|id| pilot_index.get(id)) {
                pilots[idx].bookings.push(booking.clone());
            }
            if let Some(&idx) = mission.drone_id.as_ref().and_then(|id| drone_index.get(id)) {
                drones[idx].bookings.push(booking);
            }
        }

        for pilot in &mut pilots {
            pilot.bookings.sort_by_key(|b| b.range.start);
        }
        for drone in &mut drones {
            drone.bookings.sort_by_key(|b| b.range.start);
        }

        Ok(Self {
            pilots,
            drones,
            missions,
            pilot_index,
            drone_index,
            mission_index,
            versions: HashMap::new(),
            loaded_at: Utc::now(),
        })
    }

    /// Attach the store row versions observed while loading
    #[must_use]
    pub fn with_versions(mut self, versions: HashMap<EntityRef, u64>) -> Self {
        self.versions = versions;
        self
    }

    pub fn pilots(&self) -> &[Pilot] {
        &self.pilots
    }

    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn pilot(&self, pilot_id: &str) -> Option<&Pilot> {
        self.pilot_index.get(pilot_id).map(|&i| &self.pilots[i])
    }

    pub fn drone(&self, drone_id: &str) -> Option<&Drone> {
        self.drone_index.get(drone_id).map(|&i| &self.drones[i])
    }

    pub fn mission(&self, mission_id: &str) -> Option<&Mission> {
        self.mission_index.get(mission_id).map(|&i| &self.missions[i])
    }

    /// Lookup that turns a dangling id into [`DomainError::NotFound`]
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the mission is absent.
    pub fn require_mission(&self, mission_id: &str) -> Result<&Mission, DomainError> {
        self.mission(mission_id).ok_or_else(|| not_found(EntityKind::Mission, mission_id))
    }

    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the pilot is absent.
    pub fn require_pilot(&self, pilot_id: &str) -> Result<&Pilot, DomainError> {
        self.pilot(pilot_id).ok_or_else(|| not_found(EntityKind::Pilot, pilot_id))
    }

    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] when the drone is absent.
    pub fn require_drone(&self, drone_id: &str) -> Result<&Drone, DomainError> {
        self.drone(drone_id).ok_or_else(|| not_found(EntityKind::Drone, drone_id))
    }

    /// Store version of a row as seen when the snapshot was loaded
    pub fn row_version(&self, kind: EntityKind, id: &str) -> Option<u64> {
        self.versions.get(&EntityRef::new(kind, id)).copied()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn not_found(kind: EntityKind, id: &str) -> DomainError {
    DomainError::NotFound {
        entity_type: kind.as_str().to_string(),
        id: id.to_string(),
    }
}

fn index_by<T>(
    kind: EntityKind,
    items: &[T],
    key: impl Fn(&T) -> &String,
) -> Result<HashMap<String, usize>, DomainError> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if index.insert(key(item).clone(), i).is_some() {
            return Err(DomainError::DuplicateId {
                kind,
                id: key(item).clone(),
            });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateRange, DroneStatus, PilotStatus};
    use chrono::NaiveDate;
    use fake::Fake;
    use fake::faker::name::en::Name;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn pilot(id: &str) -> Pilot {
        Pilot {
            pilot_id: id.to_string(),
            name: Name().fake(),
            location: "Bangalore".to_string(),
            skills: vec!["Mapping".to_string()],
            certifications: vec![],
            hourly_rate: Some(60.0),
            experience_hours: 120,
            status: PilotStatus::Available,
            available_from: None,
            current_assignment: None,
            bookings: vec![],
        }
    }

    fn drone(id: &str) -> Drone {
        Drone {
            drone_id: id.to_string(),
            model: "DJI M300".to_string(),
            weather_rating: "IP43 (Rain)".to_string(),
            capabilities: vec!["LiDAR".to_string()],
            location: "Bangalore".to_string(),
            status: DroneStatus::Available,
            current_assignment: None,
            maintenance_due: None,
            bookings: vec![],
        }
    }

    fn mission(id: &str, pilot: &str, drone: &str, start: u32, end: u32) -> Mission {
        Mission {
            mission_id: id.to_string(),
            client: "Acme Surveys".to_string(),
            priority: "High".to_string(),
            location: "Bangalore".to_string(),
            range: DateRange::new(day(start), day(end)).unwrap(),
            pilot_id: Some(pilot.to_string()),
            drone_id: Some(drone.to_string()),
            required_skills: vec![],
            required_certifications: vec![],
            required_capabilities: vec![],
            expected_weather: "Clear".to_string(),
            budget: 10_000.0,
            estimated_flight_hours: 8.0,
        }
    }

    #[test]
    fn test_bookings_derived_and_sorted() {
        let snapshot = Snapshot::new(
            vec![pilot("P1"), pilot("P2")],
            vec![drone("D1")],
            vec![
                mission("M2", "P1", "D1", 12, 14),
                mission("M1", "P1", "D1", 2, 4),
            ],
        )
        .unwrap();

        let p1 = snapshot.pilot("P1").unwrap();
        let starts: Vec<_> = p1.bookings.iter().map(|b| b.mission_id.as_str()).collect();
        assert_eq!(starts, ["M1", "M2"]);
        assert!(snapshot.pilot("P2").unwrap().bookings.is_empty());
        assert_eq!(snapshot.drone("D1").unwrap().bookings.len(), 2);
    }

    #[test]
    fn test_stale_bookings_replaced() {
        let mut stale = pilot("P1");
        stale.bookings.push(Booking {
            mission_id: "GONE".to_string(),
            range: DateRange::new(day(1), day(2)).unwrap(),
        });
        let snapshot = Snapshot::new(vec![stale], vec![], vec![]).unwrap();
        assert!(snapshot.pilot("P1").unwrap().bookings.is_empty());
    }

    #[test]
    fn test_dangling_reference_kept_on_mission() {
        let snapshot = Snapshot::new(
            vec![],
            vec![],
            vec![mission("M1", "GHOST", "NOPE", 1, 2)],
        )
        .unwrap();
        assert_eq!(snapshot.mission("M1").unwrap().pilot_id.as_deref(), Some("GHOST"));
        assert!(matches!(
            snapshot.require_pilot("GHOST"),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Snapshot::new(vec![pilot("P1"), pilot("P1")], vec![], vec![]).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateId { kind: EntityKind::Pilot, .. }));
    }

    #[test]
    fn test_row_versions() {
        let mut versions = HashMap::new();
        versions.insert(EntityRef::mission("M1"), 7);
        let snapshot = Snapshot::new(vec![], vec![], vec![])
            .unwrap()
            .with_versions(versions);
        assert_eq!(snapshot.row_version(EntityKind::Mission, "M1"), Some(7));
        assert_eq!(snapshot.row_version(EntityKind::Mission, "M2"), None);
    }
}
