//! Availability of pilots and drones over a date range.

use ops_domain::{Booking, DateRange, Drone, Pilot};

/// Anything that can be booked onto missions
pub trait Schedulable {
    /// Roster identifier
    fn entity_id(&self) -> &str;

    /// Home location
    fn home(&self) -> &str;

    /// Missions already claiming the entity's calendar
    fn bookings(&self) -> &[Booking];

    /// Status gate, independent of bookings
    fn is_operational_for(&self, range: &DateRange) -> bool;
}

impl Schedulable for Pilot {
    fn entity_id(&self) -> &str {
        &self.pilot_id
    }

    fn home(&self) -> &str {
        &self.location
    }

    fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    fn is_operational_for(&self, range: &DateRange) -> bool {
        !self.status.is_unavailable() && self.available_from.is_none_or(|from| from <= range.start)
    }
}

impl Schedulable for Drone {
    fn entity_id(&self) -> &str {
        &self.drone_id
    }

    fn home(&self) -> &str {
        &self.location
    }

    fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    fn is_operational_for(&self, range: &DateRange) -> bool {
        !self.status.is_unavailable() && self.maintenance_due.is_none_or(|due| range.start < due)
    }
}

/// Available iff operational and no booking overlaps `range`.
pub fn is_available<E: Schedulable + ?Sized>(entity: &E, range: &DateRange) -> bool {
    entity.is_operational_for(range) && overlapping(entity, range, None).next().is_none()
}

/// Like [`is_available`] but ignores the booking held by `mission_id`.
pub fn is_available_excluding<E: Schedulable + ?Sized>(
    entity: &E,
    range: &DateRange,
    mission_id: &str,
) -> bool {
    entity.is_operational_for(range)
        && overlapping(entity, range, Some(mission_id)).next().is_none()
}

/// Bookings overlapping `range`, optionally skipping one mission.
pub fn overlapping<'a, E: Schedulable + ?Sized>(
    entity: &'a E,
    range: &'a DateRange,
    skip_mission: Option<&'a str>,
) -> impl Iterator<Item = &'a Booking> + 'a {
    entity
        .bookings()
        .iter()
        .filter(move |b| Some(b.mission_id.as_str()) != skip_mission)
        .filter(move |b| b.range.overlaps(range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ops_domain::{DroneStatus, PilotStatus};
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(day(start), day(end)).unwrap()
    }

    fn pilot(status: PilotStatus, bookings: Vec<Booking>) -> Pilot {
        Pilot {
            pilot_id: "P001".to_string(),
            name: "Arjun".to_string(),
            location: "Bangalore".to_string(),
            skills: vec![],
            certifications: vec![],
            hourly_rate: Some(50.0),
            experience_hours: 0,
            status,
            available_from: None,
            current_assignment: None,
            bookings,
        }
    }

    fn booking(id: &str, start: u32, end: u32) -> Booking {
        Booking {
            mission_id: id.to_string(),
            range: range(start, end),
        }
    }

    #[test]
    fn test_free_pilot_is_available() {
        let p = pilot(PilotStatus::Available, vec![booking("M1", 1, 5)]);
        assert!(is_available(&p, &range(5, 9)));
        assert!(!is_available(&p, &range(4, 9)));
    }

    #[test]
    fn test_sick_pilot_unavailable_without_overlap() {
        let p = pilot(PilotStatus::Unavailable, vec![]);
        assert!(!is_available(&p, &range(10, 12)));
    }

    #[test]
    fn test_available_from_gates_start() {
        let mut p = pilot(PilotStatus::Available, vec![]);
        p.available_from = Some(day(8));
        assert!(!is_available(&p, &range(6, 9)));
        assert!(is_available(&p, &range(8, 9)));
    }

    #[test]
    fn test_own_booking_excluded() {
        let p = pilot(PilotStatus::Assigned, vec![booking("M1", 3, 6)]);
        assert!(!is_available(&p, &range(3, 6)));
        assert!(is_available_excluding(&p, &range(3, 6), "M1"));
        assert!(!is_available_excluding(&p, &range(3, 6), "M2"));
    }

    fn drone(status: DroneStatus) -> Drone {
        Drone {
            drone_id: "D001".to_string(),
            model: "Matrice".to_string(),
            weather_rating: "IP43".to_string(),
            capabilities: vec![],
            location: "Mumbai".to_string(),
            status,
            current_assignment: None,
            maintenance_due: None,
            bookings: vec![],
        }
    }

    #[test]
    fn test_drone_in_maintenance() {
        let d = drone(DroneStatus::Maintenance);
        assert!(!is_available(&d, &range(1, 2)));
    }

    #[test]
    fn test_maintenance_due_gates_start() {
        let mut d = drone(DroneStatus::Available);
        d.maintenance_due = Some(day(10));
        assert!(is_available(&d, &range(5, 12)));
        assert!(!is_available(&d, &range(10, 12)));
        assert!(!is_available_excluding(&d, &range(14, 15), "M1"));
    }

    fn any_range() -> impl Strategy<Value = DateRange> {
        (1u32..28, 0u32..10).prop_map(|(start, len)| {
            let end = (start + len).min(28);
            range(start, end)
        })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in any_range(), b in any_range()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_non_degenerate_range_overlaps_itself(a in any_range()) {
            prop_assume!(!a.is_empty());
            prop_assert!(a.overlaps(&a));
        }
    }
}
