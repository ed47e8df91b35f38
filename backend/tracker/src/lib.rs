//! # Tracker
//!
//! Command-line client for the complaint service.
//!
//! Citizens submit and track complaints. Every complaint submitted from
//! this machine is mirrored into a local history file (see [`history`]),
//! kept in step with the server whenever it is tracked or refreshed:
//!
//! - server knows the complaint: status and `updatedAt` are refreshed
//! - server answers not found: the entry is removed, it was deleted by a moderator
//!
//! Moderators list, advance and delete complaints. Their changes are
//! applied to the local history too when the same machine tracks them.
use std::path::Path;

use anyhow::{Result, bail};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use records::{
    Severity, Status, is_well_formed,
    payloads::{SubmitRequest, TrackResponse},
};

pub mod api;
pub mod history;

use api::ApiClient;
use history::{History, Reconciled};

pub async fn submit(
    client: &ApiClient,
    history_path: &Path,
    request: SubmitRequest,
) -> Result<String> {
    let severity: Severity = request.severity.as_deref().unwrap_or_default().parse()?;
    let location = request.location.clone().unwrap_or_default();

    let ref_id = client.submit(&request).await?;

    let mut history = History::load(history_path)?;
    history.record_submission(ref_id.clone(), location, severity, Utc::now());
    history.save(history_path)?;

    Ok(ref_id)
}

/// `None` when the complaint is gone, its history entry is dropped.
pub async fn track(
    client: &ApiClient,
    history_path: &Path,
    ref_id: &str,
) -> Result<Option<TrackResponse>> {
    if !is_well_formed(ref_id) {
        bail!("Malformed reference id {ref_id}, expected FMR-YYYY-NNNNN");
    }

    let tracking = client.track(ref_id).await?;

    let mut history = History::load(history_path)?;
    let status = tracking.as_ref().map(|tracking| tracking.status);
    if history.reconcile(ref_id, status, Utc::now()) != Reconciled::Untracked {
        history.save(history_path)?;
    }

    Ok(tracking)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub updated: usize,
    pub removed: usize,
    /// Entries left as they were because the server could not be asked.
    pub failed: usize,
}

/// Polls every history entry and applies the server's answer. An entry
/// that cannot be tracked is reported and kept, the rest still sync.
pub async fn refresh(client: &ApiClient, history_path: &Path) -> Result<RefreshSummary> {
    let mut history = History::load(history_path)?;
    let ref_ids = history.ref_ids();

    let pb = ProgressBar::new(ref_ids.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut summary = RefreshSummary::default();

    for ref_id in ref_ids {
        pb.set_message(format!("Tracking {ref_id}"));

        match client.track(&ref_id).await {
            Ok(tracking) => {
                let status = tracking.map(|tracking| tracking.status);

                match history.reconcile(&ref_id, status, Utc::now()) {
                    Reconciled::Updated => summary.updated += 1,
                    Reconciled::Removed => summary.removed += 1,
                    Reconciled::Untracked => {}
                }
            }
            Err(e) => {
                pb.println(format!("Could not track {ref_id}: {e:#}"));
                summary.failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    history.save(history_path)?;

    Ok(summary)
}

pub async fn set_status(
    client: &ApiClient,
    history_path: &Path,
    ref_id: &str,
    status: Status,
) -> Result<bool> {
    let updated = client.update_status(ref_id, status).await?;

    let mut history = History::load(history_path)?;
    let server_status = updated.then_some(status);
    if history.reconcile(ref_id, server_status, Utc::now()) != Reconciled::Untracked {
        history.save(history_path)?;
    }

    Ok(updated)
}

pub async fn delete(client: &ApiClient, history_path: &Path, ref_id: &str) -> Result<bool> {
    let deleted = client.delete(ref_id).await?;

    let mut history = History::load(history_path)?;
    if history.remove(ref_id) {
        history.save(history_path)?;
    }

    Ok(deleted)
}
