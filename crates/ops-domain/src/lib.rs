//! # Flight Operations Desk - Domain Model
//!
//! Core entities, value objects, and enums for the operations desk that
//! staffs survey and inspection missions with pilots and drones. These
//! types are shared by every layer: the row store, the rule engine, and the
//! request router.
//!
//! Everything derived from the roster (bookings, conflicts, cost estimates,
//! reassignment candidates) is recomputed per request and never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod snapshot;

pub use snapshot::Snapshot;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Half-open calendar range `[start, end)`.
///
/// A mission ending on day X and another starting on day X do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting an end that precedes the start.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidDateRange`] when `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one calendar day.
    #[must_use]
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day.succ_opt().unwrap_or(day),
        }
    }

    /// Half-open overlap test: `s1 < e2 && s2 < e1`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of days covered by the range.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A slice of an entity's calendar claimed by a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub mission_id: String,
    pub range: DateRange,
}

// =============================================================================
// ENUMS
// =============================================================================

/// Entity kinds held by the row store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Pilot,
    Drone,
    Mission,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Pilot, Self::Drone, Self::Mission];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pilot => "pilot",
            Self::Drone => "drone",
            Self::Mission => "mission",
        }
    }

    /// Sheet (tab) name the kind lives in
    pub fn sheet(&self) -> &'static str {
        match self {
            Self::Pilot => "pilots",
            Self::Drone => "drones",
            Self::Mission => "missions",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pilot roster status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PilotStatus {
    Available,
    Assigned,
    OnLeave,
    Unavailable,
}

impl PilotStatus {
    /// Map a sheet cell to a status. Anything unrecognised is `Unavailable`.
    pub fn from_sheet(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" | "" => Self::Available,
            "assigned" | "on mission" => Self::Assigned,
            "on leave" | "leave" => Self::OnLeave,
            _ => Self::Unavailable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Assigned => "Assigned",
            Self::OnLeave => "On Leave",
            Self::Unavailable => "Unavailable",
        }
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::OnLeave | Self::Unavailable)
    }
}

/// Drone fleet status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneStatus {
    Available,
    Deployed,
    Maintenance,
    Grounded,
}

impl DroneStatus {
    /// Map a sheet cell to a status. Anything unrecognised is `Grounded`.
    pub fn from_sheet(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" | "" => Self::Available,
            "deployed" | "assigned" => Self::Deployed,
            "maintenance" => Self::Maintenance,
            _ => Self::Grounded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Deployed => "Deployed",
            Self::Maintenance => "Maintenance",
            Self::Grounded => "Grounded",
        }
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Maintenance | Self::Grounded)
    }
}

/// Ingress-protection rating of a drone airframe.
///
/// Variants are declared in ascending order of capability; the derived
/// `Ord` is the weather rating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherRating {
    None,
    Ip43,
    Ip67,
}

impl WeatherRating {
    pub const ALL: [Self; 3] = [Self::None, Self::Ip43, Self::Ip67];

    /// Parse a rating label such as `"IP43 (Rain)"` or `"None (Clear Sky Only)"`.
    ///
    /// Only the part before any parenthesis is significant.
    pub fn parse(label: &str) -> Option<Self> {
        let base = label.split('(').next().unwrap_or_default().trim();
        match base.to_ascii_lowercase().as_str() {
            "none" | "standard" => Some(Self::None),
            "ip43" => Some(Self::Ip43),
            "ip67" => Some(Self::Ip67),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Ip43 => "IP43",
            Self::Ip67 => "IP67",
        }
    }

    /// Minimum rating demanded by a mission weather label.
    ///
    /// Accepts a condition name (`"Rainy"`) or a rating label (`"IP43"`).
    pub fn required_for(label: &str) -> Option<Self> {
        WeatherCondition::parse(label)
            .map(WeatherCondition::required_rating)
            .or_else(|| Self::parse(label))
    }
}

/// Forecast condition recorded against a mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeatherCondition {
    Clear,
    Sunny,
    Cloudy,
    Foggy,
    Rainy,
    Stormy,
}

impl WeatherCondition {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "clear" => Some(Self::Clear),
            "sunny" => Some(Self::Sunny),
            "cloudy" => Some(Self::Cloudy),
            "foggy" => Some(Self::Foggy),
            "rainy" | "rain" => Some(Self::Rainy),
            "stormy" | "storm" => Some(Self::Stormy),
            _ => None,
        }
    }

    #[must_use]
    pub fn required_rating(self) -> WeatherRating {
        match self {
            Self::Clear | Self::Sunny | Self::Cloudy | Self::Foggy => WeatherRating::None,
            Self::Rainy => WeatherRating::Ip43,
            Self::Stormy => WeatherRating::Ip67,
        }
    }
}

/// Which side of an assignment is being re-staffed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Pilot,
    Drone,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pilot" => Some(Self::Pilot),
            "drone" => Some(Self::Drone),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pilot => "pilot",
            Self::Drone => "drone",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Pilot => EntityKind::Pilot,
            Self::Drone => EntityKind::Drone,
        }
    }

    /// Mission column holding the assignment for this role
    pub fn mission_column(&self) -> &'static str {
        match self {
            Self::Pilot => "assigned_pilot",
            Self::Drone => "assigned_drone",
        }
    }
}

/// Conflict severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Informational,
    Critical,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "informational" | "info" => Some(Self::Informational),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Conflict categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    DoubleBooking,
    SkillMismatch,
    WeatherMismatch,
    BudgetOverrun,
    ResourceUnavailable,
    LocationMismatch,
    InvalidRecord,
}

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// Pilot roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    pub pilot_id: String,
    pub name: String,
    pub location: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,

    /// Missing rates are kept as `None`; cost estimation refuses them.
    pub hourly_rate: Option<f64>,
    pub experience_hours: u32,

    pub status: PilotStatus,
    pub available_from: Option<NaiveDate>,
    pub current_assignment: Option<String>,

    /// Derived from missions when the snapshot is assembled
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// Drone fleet entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub drone_id: String,
    pub model: String,

    /// Raw sheet label, parsed against [`WeatherRating`] at check time
    pub weather_rating: String,
    pub capabilities: Vec<String>,
    pub location: String,

    pub status: DroneStatus,
    pub current_assignment: Option<String>,

    /// First day the drone must be in for service; missions starting on
    /// or after it cannot fly this drone
    #[serde(default)]
    pub maintenance_due: Option<NaiveDate>,

    /// Derived from missions when the snapshot is assembled
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// Client mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub mission_id: String,
    pub client: String,
    pub priority: String,
    pub location: String,
    pub range: DateRange,

    // Assignment (weak references by id)
    pub pilot_id: Option<String>,
    pub drone_id: Option<String>,

    // Requirements
    pub required_skills: Vec<String>,
    pub required_certifications: Vec<String>,
    pub required_capabilities: Vec<String>,
    pub expected_weather: String,

    // Money & effort
    pub budget: f64,
    pub estimated_flight_hours: f64,
}

impl Mission {
    /// Currently assigned entity for a role
    pub fn assignee(&self, role: Role) -> Option<&str> {
        match role {
            Role::Pilot => self.pilot_id.as_deref(),
            Role::Drone => self.drone_id.as_deref(),
        }
    }
}

// =============================================================================
// DERIVED FINDINGS
// =============================================================================

/// Reference to a roster row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn pilot(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Pilot, id)
    }

    pub fn drone(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Drone, id)
    }

    pub fn mission(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Mission, id)
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.id)
    }
}

/// An inconsistency between a mission's assignment and roster state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub mission_id: String,

    /// Second mission of a double-booked pair
    pub related_mission_id: Option<String>,
    pub entity: Option<EntityRef>,
    pub explanation: String,
    pub suggestions: Vec<String>,
}

impl Conflict {
    /// Whether the conflict touches the given mission
    #[must_use]
    pub fn involves(&self, mission_id: &str) -> bool {
        self.mission_id == mission_id || self.related_mission_id.as_deref() == Some(mission_id)
    }
}

/// Pilot cost for a mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub mission_id: String,
    pub pilot_id: String,
    pub hourly_rate: f64,
    pub flight_hours: f64,
    pub cost: f64,
    pub budget: f64,
    pub over_budget: bool,
}

impl CostEstimate {
    /// Budget left after the cost; negative when over budget
    #[must_use]
    pub fn margin(&self) -> f64 {
        self.budget - self.cost
    }
}

/// Which hard constraints a candidate satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintChecklist {
    pub skills: bool,
    pub location: bool,
    pub availability: bool,

    /// Only evaluated for drones
    pub weather: Option<bool>,
}

/// Replacement pilot or drone for a mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignmentCandidate {
    pub role: Role,
    pub candidate_id: String,
    pub label: String,
    pub checklist: ConstraintChecklist,

    /// Zero-based roster scan position among matches
    pub rank: usize,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid date range: end {end} precedes start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Duplicate {kind} id '{id}' in snapshot")]
    DuplicateId { kind: EntityKind, id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let a = DateRange::new(day(1), day(5)).unwrap();
        let b = DateRange::new(day(5), day(9)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_nested_range_overlaps() {
        let outer = DateRange::new(day(1), day(20)).unwrap();
        let inner = DateRange::new(day(4), day(6)).unwrap();
        assert!(outer.overlaps(&inner));
        assert_eq!(inner.days(), 2);
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(matches!(
            DateRange::new(day(9), day(3)),
            Err(DomainError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_weather_rating_labels() {
        assert_eq!(WeatherRating::parse("IP43 (Rain)"), Some(WeatherRating::Ip43));
        assert_eq!(
            WeatherRating::parse("None (Clear Sky Only)"),
            Some(WeatherRating::None)
        );
        assert_eq!(WeatherRating::parse("Standard"), Some(WeatherRating::None));
        assert_eq!(WeatherRating::parse("splash-proof"), None);
        assert!(WeatherRating::None < WeatherRating::Ip43);
        assert!(WeatherRating::Ip43 < WeatherRating::Ip67);
    }

    #[test]
    fn test_required_rating_from_condition_or_label() {
        assert_eq!(WeatherRating::required_for("Rainy"), Some(WeatherRating::Ip43));
        assert_eq!(WeatherRating::required_for("clear"), Some(WeatherRating::None));
        assert_eq!(WeatherRating::required_for("IP67"), Some(WeatherRating::Ip67));
        assert_eq!(WeatherRating::required_for("Hail"), None);
    }

    #[test]
    fn test_unknown_statuses_fail_closed() {
        assert_eq!(PilotStatus::from_sheet("Sick"), PilotStatus::Unavailable);
        assert!(PilotStatus::from_sheet("On Leave").is_unavailable());
        assert!(!PilotStatus::from_sheet("Assigned").is_unavailable());
        assert_eq!(DroneStatus::from_sheet("crashed"), DroneStatus::Grounded);
        assert!(DroneStatus::from_sheet("Maintenance").is_unavailable());
    }

    #[test]
    fn test_conflict_kind_wire_name() {
        let json = serde_json::to_string(&ConflictKind::DoubleBooking).unwrap();
        assert_eq!(json, "\"DOUBLE_BOOKING\"");
    }
}
