//! # Records
//!
//! Shared complaint model between the server and the tracker client.
//!
//! - [`complaints`]: the record itself plus the status and severity enums
//! - [`timeline`]: progress timeline shown to a tracking citizen
//! - [`payloads`]: JSON bodies exchanged over `/api`
use std::sync::LazyLock;

use regex::Regex;

pub mod complaints;
pub mod payloads;
pub mod timeline;

pub use complaints::{ComplaintRecord, ParseError, Severity, Status};
pub use timeline::{TimelineEntry, derive_timeline, relative_time};

pub const REF_ID_PREFIX: &str = "FMR";
pub const REF_ID_MIN_SUFFIX: u32 = 10000;
pub const REF_ID_MAX_SUFFIX: u32 = 99999;

static REF_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FMR-\d{4}-\d{5}$").expect("static pattern"));

/// Builds `FMR-<year>-<suffix>`. Callers keep `suffix` within
/// [`REF_ID_MIN_SUFFIX`]..=[`REF_ID_MAX_SUFFIX`].
pub fn format_ref_id(year: i32, suffix: u32) -> String {
    format!("{REF_ID_PREFIX}-{year:04}-{suffix:05}")
}

pub fn is_well_formed(ref_id: &str) -> bool {
    REF_ID_PATTERN.is_match(ref_id)
}
