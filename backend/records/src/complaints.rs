//! # Complaints
//!
//! A complaint is a citizen's road-damage report. It is identified by its
//! reference id, never changes its `created_at`, and only moves forward
//! through [`Status`].
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown status: {0}")]
    Status(String),

    #[error("Unknown severity: {0}")]
    Severity(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Submitted,
    Assigned,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Submitted, Status::Assigned, Status::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Submitted => "Submitted",
            Status::Assigned => "Assigned",
            Status::Resolved => "Resolved",
        }
    }

    /// Only strictly forward moves are legal. Skipping `Assigned` is allowed,
    /// re-applying the current status is not.
    pub fn can_transition_to(&self, next: Status) -> bool {
        next > *self
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ParseError::Status(s.to_string()))
    }
}

/// Ordinal severity, sent over the wire as `"1"`, `"2"` or `"3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Mild = 1,
    Moderate = 2,
    Severe = 3,
}

impl Severity {
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal())
    }
}

impl FromStr for Severity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Severity::Mild),
            "2" => Ok(Severity::Moderate),
            "3" => Ok(Severity::Severe),
            _ => Err(ParseError::Severity(s.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRecord {
    pub ref_id: String,
    pub phone: String,
    pub area: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComplaintRecord {
    /// Fresh record in `Submitted` with both timestamps at `now`.
    pub fn submitted(
        ref_id: String,
        phone: String,
        area: String,
        location: String,
        severity: Severity,
        description: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            ref_id,
            phone,
            area,
            location,
            description,
            severity,
            status: Status::Submitted,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves to `next` and refreshes `updated_at`, never earlier than
    /// `created_at`. Returns the rejected pair when the move is not forward.
    pub fn advance(&mut self, next: Status, now: DateTime<Utc>) -> Result<(), (Status, Status)> {
        if !self.status.can_transition_to(next) {
            return Err((self.status, next));
        }

        self.status = next;
        self.updated_at = now.max(self.created_at);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{ComplaintRecord, Severity, Status};

    fn record() -> ComplaintRecord {
        ComplaintRecord::submitted(
            "FMR-2025-12345".to_string(),
            "9876543210".to_string(),
            "Koramangala".to_string(),
            "80 Feet Road".to_string(),
            Severity::Moderate,
            String::new(),
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Submitted".parse::<Status>(), Ok(Status::Submitted));
        assert_eq!("Assigned".parse::<Status>(), Ok(Status::Assigned));
        assert_eq!(" Resolved ".parse::<Status>(), Ok(Status::Resolved));
        assert!("resolved".parse::<Status>().is_err());
        assert!("".parse::<Status>().is_err());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(Status::Submitted.can_transition_to(Status::Assigned));
        assert!(Status::Submitted.can_transition_to(Status::Resolved));
        assert!(Status::Assigned.can_transition_to(Status::Resolved));
    }

    #[test]
    fn test_backward_and_repeated_transitions() {
        for status in Status::ALL {
            assert!(!status.can_transition_to(status));
        }
        assert!(!Status::Resolved.can_transition_to(Status::Submitted));
        assert!(!Status::Resolved.can_transition_to(Status::Assigned));
        assert!(!Status::Assigned.can_transition_to(Status::Submitted));
    }

    #[test]
    fn test_severity_wire_form() {
        assert_eq!("1".parse::<Severity>(), Ok(Severity::Mild));
        assert_eq!("3".parse::<Severity>(), Ok(Severity::Severe));
        assert!("4".parse::<Severity>().is_err());
        assert!("Severe".parse::<Severity>().is_err());

        assert_eq!(serde_json::to_string(&Severity::Moderate).unwrap(), "\"2\"");
        assert_eq!(
            serde_json::from_str::<Severity>("\"3\"").unwrap(),
            Severity::Severe
        );
        assert!(serde_json::from_str::<Severity>("\"9\"").is_err());
        assert_eq!(Severity::Severe.label(), "Severe");
    }

    #[test]
    fn test_submitted_record_timestamps_match() {
        let record = record();

        assert_eq!(record.status, Status::Submitted);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_advance_refreshes_updated_at() {
        let mut record = record();
        let later = record.created_at + Duration::minutes(30);

        record.advance(Status::Assigned, later).unwrap();

        assert_eq!(record.status, Status::Assigned);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn test_advance_clamps_to_created_at() {
        let mut record = record();
        let skewed = record.created_at - Duration::seconds(5);

        record.advance(Status::Resolved, skewed).unwrap();

        assert_eq!(record.updated_at, record.created_at);
    }

    #[test]
    fn test_advance_rejects_backward() {
        let mut record = record();
        let later = record.created_at + Duration::hours(1);
        record.advance(Status::Resolved, later).unwrap();

        let result = record.advance(Status::Submitted, later + Duration::hours(1));

        assert_eq!(result, Err((Status::Resolved, Status::Submitted)));
        assert_eq!(record.status, Status::Resolved);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record()).unwrap();

        assert_eq!(json["refId"], "FMR-2025-12345");
        assert_eq!(json["severity"], "2");
        assert_eq!(json["status"], "Submitted");
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
    }
}
