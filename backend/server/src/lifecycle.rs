//! # Complaint Lifecycle
//!
//! Submission, tracking, moderation and the dashboard numbers. Holds no
//! record state of its own, everything is read from and written to the
//! [`ComplaintStore`] per call.
use std::sync::Arc;

use chrono::Utc;
use records::{
    ComplaintRecord, Severity, Status, TimelineEntry, derive_timeline, payloads::SubmitRequest,
};
use tracing::{info, warn};

use crate::{
    error::{LifecycleError, StoreError},
    refid::generate_ref_id,
    store::{ComplaintStore, Replaced},
};

pub const MAX_REF_ID_ATTEMPTS: usize = 5;

/// Checked submission. Required fields are trimmed and non-empty.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub phone: String,
    pub area: String,
    pub location: String,
    pub severity: Severity,
    pub description: String,
}

impl TryFrom<SubmitRequest> for NewComplaint {
    type Error = LifecycleError;

    fn try_from(request: SubmitRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            phone: required("phone", request.phone)?,
            area: required("area", request.area)?,
            location: required("location", request.location)?,
            severity: required("severity", request.severity)?.parse()?,
            description: request
                .description
                .map(|description| description.trim().to_string())
                .unwrap_or_default(),
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, LifecycleError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LifecycleError::Validation(format!("{field} is required")))
}

#[derive(Debug, Clone)]
pub struct Tracking {
    pub ref_id: String,
    pub status: Status,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub resolved: u64,
    pub success_rate: u64,
}

/// `round(resolved / total * 100)`, half rounds up, zero when empty.
pub fn success_rate(resolved: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }

    (resolved * 200 + total) / (total * 2)
}

#[derive(Clone)]
pub struct ComplaintService {
    store: Arc<dyn ComplaintStore>,
}

impl ComplaintService {
    pub fn new(store: Arc<dyn ComplaintStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, complaint: NewComplaint) -> Result<String, LifecycleError> {
        for attempt in 1..=MAX_REF_ID_ATTEMPTS {
            let now = Utc::now();
            let ref_id = generate_ref_id(&mut rand::thread_rng(), now);

            let record = ComplaintRecord::submitted(
                ref_id.clone(),
                complaint.phone.clone(),
                complaint.area.clone(),
                complaint.location.clone(),
                complaint.severity,
                complaint.description.clone(),
                now,
            );

            match self.store.insert(&record).await {
                Ok(()) => {
                    info!("Complaint {ref_id} submitted");
                    return Ok(ref_id);
                }
                Err(StoreError::Duplicate(_)) => {
                    warn!("Reference id {ref_id} already issued, attempt {attempt}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LifecycleError::RefIdExhausted)
    }

    pub async fn track(&self, ref_id: &str) -> Result<Tracking, LifecycleError> {
        let record = self.find(ref_id).await?;

        Ok(Tracking {
            timeline: derive_timeline(
                record.status,
                record.created_at,
                record.updated_at,
                Utc::now(),
            ),
            ref_id: record.ref_id,
            status: record.status,
        })
    }

    /// Newest first, optionally narrowed to one status.
    pub async fn list_all(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<ComplaintRecord>, LifecycleError> {
        let mut records = self.store.list().await?;

        if let Some(status) = status {
            records.retain(|record| record.status == status);
        }

        Ok(records)
    }

    pub async fn update_status(
        &self,
        ref_id: &str,
        new_status: Status,
    ) -> Result<ComplaintRecord, LifecycleError> {
        // A conflict means the status moved forward under us, which can
        // happen at most once per remaining status.
        for _ in 0..Status::ALL.len() {
            let mut record = self.find(ref_id).await?;
            let read_status = record.status;

            record
                .advance(new_status, Utc::now())
                .map_err(|(from, to)| LifecycleError::InvalidTransition { from, to })?;

            match self.store.replace_if(&record, read_status).await? {
                Replaced::Written => {
                    info!("Complaint {ref_id} moved to {new_status}");
                    return Ok(record);
                }
                Replaced::Missing => return Err(LifecycleError::NotFound(ref_id.to_string())),
                Replaced::Conflict(current) => {
                    warn!("Complaint {ref_id} moved to {current} concurrently, re-reading");
                }
            }
        }

        let current = self.find(ref_id).await?.status;
        Err(LifecycleError::InvalidTransition {
            from: current,
            to: new_status,
        })
    }

    pub async fn delete(&self, ref_id: &str) -> Result<(), LifecycleError> {
        if !self.store.remove(ref_id).await? {
            return Err(LifecycleError::NotFound(ref_id.to_string()));
        }

        info!("Complaint {ref_id} deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<Stats, LifecycleError> {
        let counts = self.store.counts().await?;

        Ok(Stats {
            resolved: counts.resolved,
            success_rate: success_rate(counts.resolved, counts.total),
        })
    }

    async fn find(&self, ref_id: &str) -> Result<ComplaintRecord, LifecycleError> {
        self.store
            .get(ref_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(ref_id.to_string()))
    }
}
