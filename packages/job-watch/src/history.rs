//! History persistence to a flat JSON file.
//!
//! The file holds every job record ever seen as a pretty-printed JSON array
//! (4-space indent). It is read once per run and rewritten in full when new
//! records were found. Records are only ever appended.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{HistoryError, HistoryResult};
use crate::types::JobRecord;

/// Store for previously seen job records.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all recorded jobs.
    ///
    /// A missing or blank file is an empty history, not an error.
    pub async fn load(&self) -> HistoryResult<Vec<JobRecord>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No history file yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            debug!(path = %self.path.display(), "History file is empty");
            return Ok(Vec::new());
        }

        let records: Vec<JobRecord> =
            serde_json::from_str(&content).map_err(|source| HistoryError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = records.len(), "Loaded history");
        Ok(records)
    }

    /// Rewrite the whole file with `records`.
    ///
    /// Writes to a sibling temp file first and renames it into place so a
    /// crash mid-write leaves the previous history intact.
    pub async fn save(&self, records: &[JobRecord]) -> HistoryResult<()> {
        let json = to_pretty_json(records)?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json)
            .await
            .map_err(|source| HistoryError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| HistoryError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!(path = %self.path.display(), count = records.len(), "History saved");
        Ok(())
    }

    /// Append `new_records` to `existing` and persist the result.
    pub async fn append(
        &self,
        existing: &mut Vec<JobRecord>,
        new_records: &[JobRecord],
    ) -> HistoryResult<()> {
        existing.extend_from_slice(new_records);
        self.save(existing).await
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn to_pretty_json(records: &[JobRecord]) -> HistoryResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records
        .serialize(&mut serializer)
        .map_err(HistoryError::Serialize)?;
    Ok(buf)
}
