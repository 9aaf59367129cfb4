//! End-to-end desk requests against the bundled demo roster, run on a
//! scratch copy of the JSON file.

use std::path::PathBuf;
use std::sync::Arc;

use ops_agent::response::ResponsePayload;
use ops_agent::{AgentContext, AgentError, RequestKind, StructuredRequest};
use ops_domain::{ConflictKind, EntityKind, Role, Severity};
use ops_engine::SeverityPolicy;
use ops_store::{JsonFileStore, RowSource};

fn demo_roster() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/roster.json")
}

fn scratch_copy() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.json");
    std::fs::copy(demo_roster(), &path).unwrap();
    (dir, path)
}

fn desk(path: &PathBuf, policy: SeverityPolicy) -> AgentContext {
    AgentContext::over_store(Arc::new(JsonFileStore::new(path)), policy)
}

#[tokio::test]
async fn demo_roster_conflicts() {
    let (_dir, path) = scratch_copy();
    let response = desk(&path, SeverityPolicy::default())
        .handle(&StructuredRequest::new(RequestKind::DetectConflicts))
        .await
        .unwrap();

    assert_eq!(response.summary, "Found 4 conflict(s): 1 Critical, 3 Informational");
    let ResponsePayload::Conflicts(report) = response.payload else {
        panic!("expected conflict payload");
    };
    let found: Vec<_> = report
        .conflicts
        .iter()
        .map(|c| (c.mission_id.as_str(), c.kind))
        .collect();
    assert_eq!(
        found,
        [
            ("PRJ002", ConflictKind::DoubleBooking),
            ("PRJ002", ConflictKind::BudgetOverrun),
            ("PRJ003", ConflictKind::WeatherMismatch),
            ("PRJ004", ConflictKind::SkillMismatch),
        ]
    );
    assert_eq!(report.conflicts[0].related_mission_id.as_deref(), Some("PRJ001"));
}

#[tokio::test]
async fn same_day_mission_and_maintenance_due_drone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.json");
    let roster = serde_json::json!({
        "pilots": [
            {"pilot_id": "P1", "name": "Arjun", "location": "Bangalore", "hourly_rate": 50}
        ],
        "drones": [
            {"drone_id": "D1", "model": "M300", "weather_resistance": "IP43",
             "location": "Bangalore", "maintenance_due": "2026-02-20"}
        ],
        "missions": [
            {"project_id": "M1", "location": "Bangalore", "start_date": "2026-02-10",
             "end_date": "2026-02-15", "mission_budget_inr": 50000,
             "assigned_pilot": "P1", "assigned_drone": "D1"},
            {"project_id": "M2", "location": "Bangalore", "start_date": "2026-02-12",
             "end_date": "2026-02-12", "mission_budget_inr": 1000, "assigned_pilot": "P1"},
            {"project_id": "M3", "location": "Bangalore", "start_date": "2026-02-20",
             "end_date": "2026-02-21", "mission_budget_inr": 1000, "assigned_drone": "D1"}
        ]
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&roster).unwrap()).unwrap();

    let response = desk(&path, SeverityPolicy::default())
        .handle(&StructuredRequest::new(RequestKind::DetectConflicts))
        .await
        .unwrap();
    let ResponsePayload::Conflicts(report) = response.payload else {
        panic!("expected conflict payload");
    };
    let found: Vec<_> = report
        .conflicts
        .iter()
        .map(|c| (c.mission_id.as_str(), c.kind))
        .collect();
    assert_eq!(
        found,
        [
            ("M2", ConflictKind::DoubleBooking),
            ("M3", ConflictKind::ResourceUnavailable),
        ]
    );
    assert_eq!(report.conflicts[0].related_mission_id.as_deref(), Some("M1"));
}

#[tokio::test]
async fn strict_policy_escalates_configurable_kinds() {
    let (_dir, path) = scratch_copy();
    let response = desk(&path, SeverityPolicy::strict())
        .handle(&StructuredRequest::new(RequestKind::DetectConflicts).mission("PRJ003"))
        .await
        .unwrap();

    let ResponsePayload::Conflicts(report) = response.payload else {
        panic!("expected conflict payload");
    };
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].severity, Severity::Critical);
}

#[tokio::test]
async fn over_budget_cost_from_daily_rate() {
    let (_dir, path) = scratch_copy();
    let response = desk(&path, SeverityPolicy::default())
        .handle(&StructuredRequest::new(RequestKind::CalculateCost).mission("PRJ002"))
        .await
        .unwrap();

    let ResponsePayload::Cost(report) = response.payload else {
        panic!("expected cost payload");
    };
    assert!((report.estimate.hourly_rate - 50.0).abs() < f64::EPSILON);
    assert!((report.estimate.cost - 150.0).abs() < f64::EPSILON);
    assert!(report.estimate.over_budget);
}

#[tokio::test]
async fn reassignment_is_persisted() {
    let (_dir, path) = scratch_copy();
    let ctx = desk(&path, SeverityPolicy::default());

    let response = ctx
        .handle(
            &StructuredRequest::new(RequestKind::Reassign)
                .mission("PRJ004")
                .pilot("P001"),
        )
        .await
        .unwrap();
    let ResponsePayload::Reassignment(report) = response.payload else {
        panic!("expected reassignment payload");
    };
    assert_eq!(report.role, Role::Pilot);
    assert_eq!(report.assigned.as_deref(), Some("P003"));
    assert_eq!(report.committed_version, Some(2));

    let missions = JsonFileStore::new(&path)
        .fetch_rows(EntityKind::Mission)
        .await
        .unwrap();
    let prj004 = missions.iter().find(|r| r.id == "PRJ004").unwrap();
    assert_eq!(prj004.get("assigned_pilot"), Some("P003"));

    // The skill conflict is gone on the next read.
    let after = ctx
        .handle(&StructuredRequest::new(RequestKind::DetectConflicts).mission("PRJ004"))
        .await
        .unwrap();
    assert!(after.summary.ends_with("No conflicts detected. All assignments are valid."));
}

#[tokio::test]
async fn ineligible_target_is_rejected_without_write() {
    let (_dir, path) = scratch_copy();
    let err = desk(&path, SeverityPolicy::default())
        .handle(
            &StructuredRequest::new(RequestKind::Reassign)
                .mission("PRJ004")
                .pilot("P002"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Validation(_)));

    let missions = JsonFileStore::new(&path)
        .fetch_rows(EntityKind::Mission)
        .await
        .unwrap();
    let prj004 = missions.iter().find(|r| r.id == "PRJ004").unwrap();
    assert_eq!(prj004.get("assigned_pilot"), Some("P001"));
    assert_eq!(prj004.version, 1);
}
