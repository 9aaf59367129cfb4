//! # Structured Requests
//!
//! Wire shape of a desk request and its validated form. The request kind is
//! a closed set; anything else is rejected before the roster is read.
//!
//! ```json
//! {
//!   "kind": "reassign",
//!   "entityRefs": { "missionId": "PRJ001", "pilotId": "P002" },
//!   "filters": { "location": "Bangalore" },
//!   "rawText": "Put Neha on PRJ001"
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use ops_domain::Role;
use ops_store::loader::parse_date;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

// =============================================================================
// REQUEST KIND
// =============================================================================

/// Everything the desk knows how to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    QueryAvailability,
    QueryCapability,
    CalculateCost,
    DetectConflicts,
    Reassign,
}

impl RequestKind {
    pub const ALL: [Self; 5] = [
        Self::QueryAvailability,
        Self::QueryCapability,
        Self::CalculateCost,
        Self::DetectConflicts,
        Self::Reassign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryAvailability => "query-availability",
            Self::QueryCapability => "query-capability",
            Self::CalculateCost => "calculate-cost",
            Self::DetectConflicts => "detect-conflicts",
            Self::Reassign => "reassign",
        }
    }
}

impl FromStr for RequestKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| AgentError::RequestKind(s.to_string()))
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Ids mentioned by a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRefs {
    pub mission_id: Option<String>,
    pub pilot_id: Option<String>,
    pub drone_id: Option<String>,
}

/// Filters as received, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilters {
    pub skill: Option<String>,
    pub capability: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub role: Option<String>,
}

/// Request as received over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    pub kind: String,
    #[serde(default)]
    pub entity_refs: EntityRefs,
    #[serde(default)]
    pub filters: RawFilters,
    #[serde(default)]
    pub raw_text: String,
}

// =============================================================================
// VALIDATED FORM
// =============================================================================

/// Filters with dates and roles parsed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub skill: Option<String>,
    pub capability: Option<String>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub role: Option<Role>,
}

/// A request the router can act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRequest {
    pub kind: RequestKind,
    pub entity_refs: EntityRefs,
    pub filters: Filters,
    pub raw_text: String,
}

impl StructuredRequest {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            entity_refs: EntityRefs::default(),
            filters: Filters::default(),
            raw_text: String::new(),
        }
    }

    #[must_use]
    pub fn mission(mut self, id: impl Into<String>) -> Self {
        self.entity_refs.mission_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn pilot(mut self, id: impl Into<String>) -> Self {
        self.entity_refs.pilot_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn drone(mut self, id: impl Into<String>) -> Self {
        self.entity_refs.drone_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Mission id, or [`AgentError::MissingField`]
    pub fn require_mission_id(&self) -> Result<&str> {
        self.entity_refs
            .mission_id
            .as_deref()
            .ok_or(AgentError::MissingField {
                kind: self.kind.as_str(),
                field: "entityRefs.missionId",
            })
    }
}

impl TryFrom<RawRequest> for StructuredRequest {
    type Error = AgentError;

    fn try_from(raw: RawRequest) -> Result<Self> {
        let kind = raw.kind.parse::<RequestKind>()?;

        let date = raw
            .filters
            .date
            .as_deref()
            .map(|d| parse_date(d).ok_or_else(|| AgentError::Validation(format!("unrecognised date '{d}'"))))
            .transpose()?;
        let role = raw
            .filters
            .role
            .as_deref()
            .map(|r| Role::parse(r).ok_or_else(|| AgentError::Validation(format!("unknown role '{r}'"))))
            .transpose()?;

        Ok(Self {
            kind,
            entity_refs: EntityRefs {
                mission_id: non_blank(raw.entity_refs.mission_id),
                pilot_id: non_blank(raw.entity_refs.pilot_id),
                drone_id: non_blank(raw.entity_refs.drone_id),
            },
            filters: Filters {
                skill: non_blank(raw.filters.skill),
                capability: non_blank(raw.filters.capability),
                location: non_blank(raw.filters.location),
                date,
                role,
            },
            raw_text: raw.raw_text,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// PARSERS
// =============================================================================

/// Turns free text into a structured request.
///
/// A language-model backed parser plugs in here; the router only ever sees
/// [`StructuredRequest`].
#[async_trait]
pub trait RequestParser: Send + Sync {
    async fn parse(&self, text: &str) -> Result<StructuredRequest>;
}

/// Accepts text that already is a JSON-encoded [`RawRequest`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRequestParser;

#[async_trait]
impl RequestParser for JsonRequestParser {
    async fn parse(&self, text: &str) -> Result<StructuredRequest> {
        let mut raw: RawRequest =
            serde_json::from_str(text).map_err(|e| AgentError::Parse(e.to_string()))?;
        if raw.raw_text.is_empty() {
            raw.raw_text = text.to_string();
        }
        raw.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_closed() {
        assert_eq!("detect-conflicts".parse::<RequestKind>().unwrap(), RequestKind::DetectConflicts);
        assert_eq!("QUERY_AVAILABILITY".parse::<RequestKind>().unwrap(), RequestKind::QueryAvailability);
        assert!(matches!(
            "book-flight".parse::<RequestKind>(),
            Err(AgentError::RequestKind(k)) if k == "book-flight"
        ));
    }

    #[test]
    fn test_raw_request_validated() {
        let raw: RawRequest = serde_json::from_value(serde_json::json!({
            "kind": "reassign",
            "entityRefs": { "missionId": "PRJ001", "pilotId": "  " },
            "filters": { "date": "02/10/2026", "role": "Drone" }
        }))
        .unwrap();

        let request = StructuredRequest::try_from(raw).unwrap();
        assert_eq!(request.kind, RequestKind::Reassign);
        assert_eq!(request.entity_refs.pilot_id, None);
        assert_eq!(request.filters.role, Some(Role::Drone));
        assert_eq!(request.filters.date, NaiveDate::from_ymd_opt(2026, 2, 10));
        assert_eq!(request.require_mission_id().unwrap(), "PRJ001");
    }

    #[test]
    fn test_bad_filters_rejected() {
        let raw = RawRequest {
            kind: "query-availability".to_string(),
            entity_refs: EntityRefs::default(),
            filters: RawFilters {
                date: Some("next tuesday".to_string()),
                ..RawFilters::default()
            },
            raw_text: String::new(),
        };
        assert!(matches!(StructuredRequest::try_from(raw), Err(AgentError::Validation(_))));

        let bare = StructuredRequest::new(RequestKind::CalculateCost);
        let missing = bare.require_mission_id();
        assert!(matches!(missing, Err(AgentError::MissingField { .. })));
    }

    #[test]
    fn test_json_parser_keeps_text() {
        let text = r#"{"kind":"detect-conflicts"}"#;
        let request = tokio_test::block_on(JsonRequestParser.parse(text)).unwrap();
        assert_eq!(request.kind, RequestKind::DetectConflicts);
        assert_eq!(request.raw_text, text);

        let err = tokio_test::block_on(JsonRequestParser.parse("who is free tomorrow?")).unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }
}
