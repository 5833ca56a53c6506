//! Core value types passed between pipeline stages.

use serde::{Deserialize, Serialize};

/// One job posting as scraped from a listing panel.
///
/// Equality and hashing cover all three fields and are the only
/// deduplication key: two postings with identical text are the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobRecord {
    pub company: String,
    pub title: String,
    /// Expected as `YYYY-MM-DD`, validated only when classifying.
    pub deadline: String,
}

impl JobRecord {
    pub fn new(
        company: impl Into<String>,
        title: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            title: title.into(),
            deadline: deadline.into(),
        }
    }
}

/// Input to a notifier: what is new and what is closing soon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digest {
    pub new_listings: Vec<JobRecord>,
    pub approaching: Vec<JobRecord>,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.new_listings.is_empty() && self.approaching.is_empty()
    }
}

/// Result of a notify attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed { reason: String },
    /// Dry run; nothing left the process.
    Skipped,
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Records extracted from the page this run
    pub fetched: usize,
    pub new_listings: Vec<JobRecord>,
    pub approaching: Vec<JobRecord>,
    pub delivery: Delivery,
    /// Whether the history file was rewritten
    pub history_written: bool,
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Source answered with a non-200 status; nothing was sent or stored.
    SourceUnavailable { status: u16 },
    /// No new listings and nothing approaching.
    NothingNew { fetched: usize },
    Completed(RunReport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_structural_equality_collapses_identical_postings() {
        let a = JobRecord::new("Acme", "Engineer", "2024-05-01");
        let b = JobRecord::new("Acme", "Engineer", "2024-05-01");
        let c = JobRecord::new("Acme", "Engineer", "2024-05-02");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_digest_is_empty() {
        assert!(Digest::default().is_empty());

        let digest = Digest {
            new_listings: vec![],
            approaching: vec![JobRecord::new("Acme", "Engineer", "2024-05-01")],
        };
        assert!(!digest.is_empty());
    }

    #[test]
    fn test_record_json_field_names() {
        let record = JobRecord::new("Acme", "Engineer", "2024-05-01");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["title"], "Engineer");
        assert_eq!(json["deadline"], "2024-05-01");
    }
}
