//! # Payloads
//!
//! JSON bodies for `/api`. Every response carries `success`.
//!
//! Request fields stay as raw strings so the server can answer a missing or
//! unknown value with its own validation error instead of a decode failure.
use serde::{Deserialize, Serialize};

use crate::{
    complaints::{ComplaintRecord, Status},
    timeline::TimelineEntry,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub phone: Option<String>,
    pub area: Option<String>,
    pub location: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub new_status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledged {
    pub success: bool,
}

impl Acknowledged {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub ref_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub success: bool,
    pub ref_id: String,
    pub status: Status,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub roads_fixed: u64,
    pub success_rate: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    pub complaints: Vec<ComplaintRecord>,
}

/// Failure body. Login failures use `message`, everything else `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Failure {
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn reason(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("Unknown error")
    }
}

#[cfg(test)]
mod tests {
    use super::{Failure, SubmitRequest, UpdateStatusRequest};

    #[test]
    fn test_update_status_camel_case() {
        let request: UpdateStatusRequest =
            serde_json::from_str(r#"{"refId":"FMR-2025-10001","newStatus":"Assigned"}"#).unwrap();

        assert_eq!(request.ref_id, "FMR-2025-10001");
        assert_eq!(request.new_status, "Assigned");
    }

    #[test]
    fn test_submit_missing_fields_decode() {
        let request: SubmitRequest = serde_json::from_str(r#"{"phone":"123"}"#).unwrap();

        assert_eq!(request.phone.as_deref(), Some("123"));
        assert!(request.area.is_none());
        assert!(request.description.is_none());
    }

    #[test]
    fn test_failure_shapes() {
        let error = serde_json::to_value(Failure::error("Not found")).unwrap();
        assert_eq!(error, serde_json::json!({"success": false, "error": "Not found"}));

        let message = serde_json::to_value(Failure::message("Invalid")).unwrap();
        assert_eq!(message, serde_json::json!({"success": false, "message": "Invalid"}));
    }
}
