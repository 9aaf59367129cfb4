//! Pilot cost estimation.

use ops_domain::{CostEstimate, Mission, Pilot};

use crate::error::{EngineError, Result};

/// Cost of flying `mission` with `pilot`: hourly rate × estimated hours.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when the pilot has no hourly rate,
/// or when the rate or the mission's flight hours are negative or not
/// finite. Nothing is defaulted to zero.
pub fn estimate_cost(mission: &Mission, pilot: &Pilot) -> Result<CostEstimate> {
    let invalid = |reason: String| EngineError::Validation {
        mission_id: mission.mission_id.clone(),
        pilot_id: pilot.pilot_id.clone(),
        reason,
    };

    let hours = mission.estimated_flight_hours;
    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid(format!("estimated flight hours must be non-negative, got {hours}")));
    }

    let rate = pilot
        .hourly_rate
        .ok_or_else(|| invalid("pilot has no hourly rate".to_string()))?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(invalid(format!("hourly rate must be non-negative, got {rate}")));
    }

    let cost = rate * hours;
    Ok(CostEstimate {
        mission_id: mission.mission_id.clone(),
        pilot_id: pilot.pilot_id.clone(),
        hourly_rate: rate,
        flight_hours: hours,
        cost,
        budget: mission.budget,
        over_budget: cost > mission.budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ops_domain::{DateRange, PilotStatus};
    use proptest::prelude::*;

    fn mission(hours: f64, budget: f64) -> Mission {
        let start = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 2, 12).unwrap();
        Mission {
            mission_id: "PRJ001".to_string(),
            client: "Client A".to_string(),
            priority: "High".to_string(),
            location: "Bangalore".to_string(),
            range: DateRange::new(start, end).unwrap(),
            pilot_id: Some("P001".to_string()),
            drone_id: None,
            required_skills: vec![],
            required_certifications: vec![],
            required_capabilities: vec![],
            expected_weather: "Clear".to_string(),
            budget,
            estimated_flight_hours: hours,
        }
    }

    fn pilot(rate: Option<f64>) -> Pilot {
        Pilot {
            pilot_id: "P001".to_string(),
            name: "Arjun".to_string(),
            location: "Bangalore".to_string(),
            skills: vec![],
            certifications: vec![],
            hourly_rate: rate,
            experience_hours: 0,
            status: PilotStatus::Available,
            available_from: None,
            current_assignment: None,
            bookings: vec![],
        }
    }

    #[test]
    fn test_rate_times_hours() {
        let estimate = estimate_cost(&mission(3.0, 100.0), &pilot(Some(50.0))).unwrap();
        assert!((estimate.cost - 150.0).abs() < f64::EPSILON);
        assert!(estimate.over_budget);
        assert!((estimate.margin() + 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_within_budget() {
        let estimate = estimate_cost(&mission(2.0, 100.0), &pilot(Some(50.0))).unwrap();
        assert!(!estimate.over_budget);
    }

    #[test]
    fn test_missing_rate_rejected() {
        let err = estimate_cost(&mission(3.0, 100.0), &pilot(None)).unwrap_err();
        let EngineError::Validation { mission_id, pilot_id, .. } = err;
        assert_eq!(mission_id, "PRJ001");
        assert_eq!(pilot_id, "P001");
    }

    #[test]
    fn test_negative_hours_rejected() {
        assert!(estimate_cost(&mission(-1.0, 100.0), &pilot(Some(50.0))).is_err());
        assert!(estimate_cost(&mission(f64::NAN, 100.0), &pilot(Some(50.0))).is_err());
    }

    proptest! {
        #[test]
        fn prop_cost_linear_in_hours(hours in 0.0f64..500.0, rate in 1.0f64..400.0) {
            let p = pilot(Some(rate));
            let single = estimate_cost(&mission(hours, 1e9), &p).unwrap();
            let double = estimate_cost(&mission(hours * 2.0, 1e9), &p).unwrap();
            prop_assert!((double.cost - 2.0 * single.cost).abs() <= 1e-9 * double.cost.max(1.0));
        }
    }
}
