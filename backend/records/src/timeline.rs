//! # Timeline
//!
//! Progress shown to a citizen tracking a complaint.
//!
//! Only `created_at` and `updated_at` are stored, so the timeline is
//! reconstructed from those two instants:
//!
//! - `Submitted`: one entry at `created_at`
//! - `Assigned`: plus one entry at `updated_at`
//! - `Resolved`: plus an assignment entry at the midpoint of the two
//!   instants, then a completion entry at `updated_at`
//!
//! The midpoint is approximate. The real assignment time is not recorded.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::complaints::Status;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub stage: Status,
    pub text: String,
    pub time: String,
    #[serde(rename = "class")]
    pub style_class: String,
    pub at: DateTime<Utc>,
}

impl TimelineEntry {
    fn new(stage: Status, at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            stage,
            text: stage_text(stage).to_string(),
            time: relative_time(at, now),
            style_class: style_class(stage).to_string(),
            at,
        }
    }
}

pub fn stage_text(stage: Status) -> &'static str {
    match stage {
        Status::Submitted => "Submitted",
        Status::Assigned => "BBMP Assigned",
        Status::Resolved => "Work Completed",
    }
}

pub fn style_class(stage: Status) -> &'static str {
    match stage {
        Status::Submitted => "status-submitted",
        Status::Assigned => "status-in-progress",
        Status::Resolved => "status-resolved",
    }
}

pub fn derive_timeline(
    status: Status,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<TimelineEntry> {
    let mut timeline = vec![TimelineEntry::new(Status::Submitted, created_at, now)];

    match status {
        Status::Submitted => {}
        Status::Assigned => {
            timeline.push(TimelineEntry::new(Status::Assigned, updated_at, now));
        }
        Status::Resolved => {
            let assigned_at = created_at + (updated_at - created_at) / 2;

            timeline.push(TimelineEntry::new(Status::Assigned, assigned_at, now));
            timeline.push(TimelineEntry::new(Status::Resolved, updated_at, now));
        }
    }

    timeline
}

/// `Just now`, `<m>m ago`, `<h>h ago`, then the `en-IN` short date.
/// Instants ahead of `now` count as zero elapsed.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);

    if seconds < 60 {
        return "Just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }

    then.format("%-d/%-m/%Y").to_string()
}
