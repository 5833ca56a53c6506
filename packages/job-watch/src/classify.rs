//! Novelty and deadline classification over freshly extracted records.

use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use tracing::warn;

use crate::types::JobRecord;

/// Deadline format used by the source site.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Records in `fresh` that are not in `history`, in extraction order.
///
/// A record repeated within `fresh` is reported once.
pub fn new_listings(fresh: &[JobRecord], history: &[JobRecord]) -> Vec<JobRecord> {
    let mut seen: HashSet<&JobRecord> = history.iter().collect();
    fresh
        .iter()
        .filter(|job| seen.insert(*job))
        .cloned()
        .collect()
}

/// Parse a deadline string, or `None` if it is not `YYYY-MM-DD`.
pub fn parse_deadline(deadline: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(deadline.trim(), DEADLINE_FORMAT).ok()
}

/// Records whose deadline falls in `today..=today + horizon_days`.
///
/// Runs over every fresh record, not only new ones, so a posting keeps
/// showing up here on each run until its deadline passes. Unparseable
/// deadlines are logged and left out.
pub fn approaching(fresh: &[JobRecord], today: NaiveDate, horizon_days: u32) -> Vec<JobRecord> {
    let Some(last_day) = today.checked_add_days(Days::new(u64::from(horizon_days))) else {
        return Vec::new();
    };

    fresh
        .iter()
        .filter(|job| match parse_deadline(&job.deadline) {
            Some(date) => today <= date && date <= last_day,
            None => {
                warn!(
                    company = %job.company,
                    title = %job.title,
                    deadline = %job.deadline,
                    "Could not parse deadline"
                );
                false
            }
        })
        .cloned()
        .collect()
}
