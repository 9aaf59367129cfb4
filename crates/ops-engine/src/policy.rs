//! Severity classification for conflicts.

use ops_domain::{ConflictKind, Severity};
use serde::{Deserialize, Serialize};

/// Severity assigned to the conflict kinds whose gravity depends on the
/// operations desk. Double bookings, unavailable resources and invalid
/// records are always critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPolicy {
    pub skill_mismatch: Severity,
    pub weather_mismatch: Severity,
    pub budget_overrun: Severity,
    pub location_mismatch: Severity,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            skill_mismatch: Severity::Informational,
            weather_mismatch: Severity::Informational,
            budget_overrun: Severity::Informational,
            location_mismatch: Severity::Informational,
        }
    }
}

impl SeverityPolicy {
    /// Every configurable kind escalated to critical
    #[must_use]
    pub fn strict() -> Self {
        Self {
            skill_mismatch: Severity::Critical,
            weather_mismatch: Severity::Critical,
            budget_overrun: Severity::Critical,
            location_mismatch: Severity::Critical,
        }
    }

    #[must_use]
    pub fn severity_of(&self, kind: ConflictKind) -> Severity {
        match kind {
            ConflictKind::DoubleBooking
            | ConflictKind::ResourceUnavailable
            | ConflictKind::InvalidRecord => Severity::Critical,
            ConflictKind::SkillMismatch => self.skill_mismatch,
            ConflictKind::WeatherMismatch => self.weather_mismatch,
            ConflictKind::BudgetOverrun => self.budget_overrun,
            ConflictKind::LocationMismatch => self.location_mismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_kinds_stay_critical() {
        let policy = SeverityPolicy::default();
        assert_eq!(policy.severity_of(ConflictKind::DoubleBooking), Severity::Critical);
        assert_eq!(policy.severity_of(ConflictKind::ResourceUnavailable), Severity::Critical);
        assert_eq!(policy.severity_of(ConflictKind::SkillMismatch), Severity::Informational);
        assert_eq!(
            SeverityPolicy::strict().severity_of(ConflictKind::BudgetOverrun),
            Severity::Critical
        );
    }
}
