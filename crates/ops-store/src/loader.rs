//! # Snapshot Loader
//!
//! Turns raw sheet rows into domain entities. Column names follow the
//! shared roster spreadsheet; a few columns accept alternate spellings.
//!
//! Rows that cannot be interpreted fail the whole load with
//! [`StoreError::Validation`] naming the sheet, the row and the cell. Soft
//! problems (a pilot without a rate, a negative hour estimate) are kept as-is
//! so the rule engine can report them against the mission.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use ops_domain::{
    DateRange, Drone, DroneStatus, EntityKind, EntityRef, Mission, Pilot, PilotStatus, Snapshot,
};

use crate::error::{Result, StoreError};
use crate::repository::{RowSource, SnapshotSource};
use crate::row::Row;

/// Working hours assumed per mission day when no estimate is recorded
pub const HOURS_PER_DAY: f64 = 8.0;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Builds snapshots from any row source
#[derive(Debug)]
pub struct SnapshotLoader<S> {
    source: S,
}

impl<S: RowSource> SnapshotLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S: RowSource> SnapshotSource for SnapshotLoader<S> {
    async fn load_snapshot(&self) -> Result<Snapshot> {
        let pilot_rows = self.source.fetch_rows(EntityKind::Pilot).await?;
        let drone_rows = self.source.fetch_rows(EntityKind::Drone).await?;
        let mission_rows = self.source.fetch_rows(EntityKind::Mission).await?;

        let mut versions = HashMap::new();
        for (kind, rows) in [
            (EntityKind::Pilot, &pilot_rows),
            (EntityKind::Drone, &drone_rows),
            (EntityKind::Mission, &mission_rows),
        ] {
            for row in rows {
                versions.insert(EntityRef::new(kind, row.id.clone()), row.version);
            }
        }

        let pilots = pilot_rows.iter().map(parse_pilot).collect::<Result<Vec<_>>>()?;
        let drones = drone_rows.iter().map(parse_drone).collect::<Result<Vec<_>>>()?;
        let missions = mission_rows
            .iter()
            .map(parse_mission)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            pilots = pilots.len(),
            drones = drones.len(),
            missions = missions.len(),
            "Snapshot loaded"
        );

        Ok(Snapshot::new(pilots, drones, missions)?.with_versions(versions))
    }
}

// =============================================================================
// ROW PARSERS
// =============================================================================

/// Parse a pilot row.
///
/// The hourly rate comes from `hourly_rate`, else `daily_rate_inr / 8`.
pub fn parse_pilot(row: &Row) -> Result<Pilot> {
    let sheet = Sheet::new(EntityKind::Pilot, row);

    let hourly_rate = match sheet.number("hourly_rate")? {
        Some(rate) => Some(rate),
        None => sheet.number("daily_rate_inr")?.map(|daily| daily / HOURS_PER_DAY),
    };

    let experience_hours = match row.get("experience_hours") {
        None => 0,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| sheet.invalid("experience_hours", raw, "expected a whole number"))?,
    };

    Ok(Pilot {
        pilot_id: row.id.clone(),
        name: row.get_any(&["name", "pilot_id"]).unwrap_or_default().to_string(),
        location: text(row, "location"),
        skills: list(row, "skills"),
        certifications: list(row, "certifications"),
        hourly_rate,
        experience_hours,
        status: PilotStatus::from_sheet(row.get("status").unwrap_or_default()),
        available_from: sheet.date("available_from")?,
        current_assignment: row.get("current_assignment").map(str::to_string),
        bookings: Vec::new(),
    })
}

/// Parse a drone row
pub fn parse_drone(row: &Row) -> Result<Drone> {
    let sheet = Sheet::new(EntityKind::Drone, row);

    Ok(Drone {
        drone_id: row.id.clone(),
        model: text(row, "model"),
        weather_rating: row
            .get_any(&["weather_resistance", "weather_rating"])
            .unwrap_or("None")
            .to_string(),
        capabilities: list(row, "capabilities"),
        location: text(row, "location"),
        status: DroneStatus::from_sheet(row.get("status").unwrap_or_default()),
        current_assignment: row.get("current_assignment").map(str::to_string),
        maintenance_due: sheet.date("maintenance_due")?,
        bookings: Vec::new(),
    })
}

/// Parse a mission row.
///
/// `end_date` is exclusive and defaults to the day after `start_date`.
/// An `end_date` equal to `start_date` is a one-day mission.
/// Without `estimated_flight_hours` the estimate is one working day of
/// [`HOURS_PER_DAY`] per mission day.
pub fn parse_mission(row: &Row) -> Result<Mission> {
    let sheet = Sheet::new(EntityKind::Mission, row);

    let start = sheet
        .date("start_date")?
        .ok_or_else(|| sheet.missing("start_date"))?;
    let range = match sheet.date("end_date")? {
        Some(end) if end == start => DateRange::single_day(start),
        Some(end) => DateRange::new(start, end)
            .map_err(|e| sheet.invalid("end_date", &end.to_string(), &e.to_string()))?,
        None => DateRange::single_day(start),
    };

    let budget = sheet
        .number_any(&["mission_budget_inr", "budget"])?
        .ok_or_else(|| sheet.missing("mission_budget_inr"))?;
    if budget < 0.0 {
        return Err(sheet.invalid("mission_budget_inr", &budget.to_string(), "budget is negative"));
    }

    let estimated_flight_hours = match sheet.number("estimated_flight_hours")? {
        Some(hours) => hours,
        #[allow(clippy::cast_precision_loss)]
        None => range.days().max(1) as f64 * HOURS_PER_DAY,
    };

    Ok(Mission {
        mission_id: row.id.clone(),
        client: text(row, "client"),
        priority: row.get("priority").unwrap_or("Medium").to_string(),
        location: text(row, "location"),
        range,
        pilot_id: row.get("assigned_pilot").map(str::to_string),
        drone_id: row.get("assigned_drone").map(str::to_string),
        required_skills: list(row, "required_skills"),
        required_certifications: row
            .get_any(&["required_certs", "required_certifications"])
            .map(split_list)
            .unwrap_or_default(),
        required_capabilities: list(row, "required_capabilities"),
        expected_weather: row
            .get_any(&["weather_forecast", "expected_weather"])
            .unwrap_or("Clear")
            .to_string(),
        budget,
        estimated_flight_hours,
    })
}

// =============================================================================
// CELL HELPERS
// =============================================================================

/// Row plus the context needed to name a bad cell
struct Sheet<'a> {
    kind: EntityKind,
    row: &'a Row,
}

impl<'a> Sheet<'a> {
    fn new(kind: EntityKind, row: &'a Row) -> Self {
        Self { kind, row }
    }

    fn invalid(&self, column: &str, value: &str, reason: &str) -> StoreError {
        StoreError::Validation {
            sheet: self.kind.sheet().to_string(),
            row: self.row.id.clone(),
            reason: format!("{column} = '{value}': {reason}"),
        }
    }

    fn missing(&self, column: &str) -> StoreError {
        StoreError::Validation {
            sheet: self.kind.sheet().to_string(),
            row: self.row.id.clone(),
            reason: format!("{column} is required"),
        }
    }

    fn number(&self, column: &str) -> Result<Option<f64>> {
        self.number_any(&[column])
    }

    fn number_any(&self, columns: &[&str]) -> Result<Option<f64>> {
        for column in columns {
            if let Some(raw) = self.row.get(column) {
                let cleaned = raw.replace(',', "");
                return cleaned
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Some)
                    .ok_or_else(|| self.invalid(column, raw, "expected a number"));
            }
        }
        Ok(None)
    }

    fn date(&self, column: &str) -> Result<Option<NaiveDate>> {
        match self.row.get(column) {
            None => Ok(None),
            Some(raw) => parse_date(raw)
                .map(Some)
                .ok_or_else(|| self.invalid(column, raw, "unrecognised date")),
        }
    }
}

/// Parse a sheet date in any of the accepted formats
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn text(row: &Row, column: &str) -> String {
    row.get(column).unwrap_or_default().to_string()
}

fn list(row: &Row, column: &str) -> Vec<String> {
    row.get(column).map(split_list).unwrap_or_default()
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
