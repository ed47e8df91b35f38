//! # Local History
//!
//! Citizen-side mirror of the complaints submitted from this machine. Not
//! authoritative: entries follow the server on every track, and an entry
//! the server no longer knows is dropped.
//!
//! Files written by older clients may hold severities outside `1..=3` or
//! entries missing fields. Severity is kept as written, and entries that
//! cannot be read at all are skipped with a warning instead of failing the
//! whole load.
use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use records::{Severity, Status};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HISTORY_KEY: &str = "fmrComplaints";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(alias = "refid")]
    pub ref_id: String,
    pub location: String,
    pub severity: String,
    pub status: Status,
    pub updated_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// `Mild`/`Moderate`/`Severe`, or the stored value when it is none of them.
    pub fn severity_label(&self) -> &str {
        self.severity
            .parse::<Severity>()
            .map(|severity| severity.label())
            .unwrap_or(self.severity.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Updated,
    Removed,
    Untracked,
}

/// Newest submission first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let raw: Vec<Value> = serde_json::from_str(&json)
                    .with_context(|| format!("Corrupt history file {}", path.display()))?;

                let entries = raw
                    .into_iter()
                    .filter_map(|value| match serde_json::from_value(value) {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            eprintln!("Skipping unreadable history entry: {e}");
                            None
                        }
                    })
                    .collect();

                Ok(Self { entries })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;

        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn ref_ids(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.ref_id.clone()).collect()
    }

    pub fn record_submission(
        &mut self,
        ref_id: String,
        location: String,
        severity: Severity,
        now: DateTime<Utc>,
    ) {
        self.entries.insert(
            0,
            HistoryEntry {
                ref_id,
                location,
                severity: severity.to_string(),
                status: Status::Submitted,
                updated_at: now,
            },
        );
    }

    pub fn update_status(&mut self, ref_id: &str, status: Status, now: DateTime<Utc>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.ref_id == ref_id) {
            Some(entry) => {
                entry.status = status;
                entry.updated_at = now;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, ref_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.ref_id != ref_id);

        self.entries.len() != before
    }

    /// Applies a server answer for `ref_id`: `Some(status)` refreshes the
    /// entry, `None` (unknown to the server) removes it.
    pub fn reconcile(
        &mut self,
        ref_id: &str,
        server_status: Option<Status>,
        now: DateTime<Utc>,
    ) -> Reconciled {
        let applied = match server_status {
            Some(status) => self.update_status(ref_id, status, now),
            None => self.remove(ref_id),
        };

        match (applied, server_status) {
            (false, _) => Reconciled::Untracked,
            (true, Some(_)) => Reconciled::Updated,
            (true, None) => Reconciled::Removed,
        }
    }
}
