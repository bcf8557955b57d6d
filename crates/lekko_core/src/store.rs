//! JSON-file persistence for the tracker document. Loading never fails from
//! the caller's point of view: anything short of a valid document degrades to
//! the default one.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::document::TrackerDocument;
use crate::ops;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("stored document is not valid: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Read the document at `path`. A missing file starts fresh; an unreadable
/// file or invalid document falls back to the default with a warning. There
/// is no partial recovery of a corrupt document.
pub fn load(path: &Path) -> TrackerDocument {
    match try_load(path) {
        Ok(doc) => repair(doc),
        Err(err) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), %err, "falling back to default document");
            } else {
                tracing::info!(path = %path.display(), "no stored document, starting fresh");
            }
            TrackerDocument::default()
        }
    }
}

fn try_load(path: &Path) -> Result<TrackerDocument, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Tolerated-absence cleanup: weight logs stored before ids existed get one
/// assigned so deletion stays unambiguous.
fn repair(mut doc: TrackerDocument) -> TrackerDocument {
    let mut repaired = 0;
    for log in doc.weight_logs.iter_mut().filter(|log| log.id.is_empty()) {
        log.id = ops::fresh_id();
        repaired += 1;
    }
    if repaired > 0 {
        tracing::debug!(repaired, "assigned ids to stored weight logs");
    }
    doc
}

/// Persist the document as pretty JSON, creating parent directories on
/// demand.
pub fn save(path: &Path, doc: &TrackerDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
    }
    let raw = serde_json::to_string_pretty(doc).context("serializing document")?;
    fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_the_default_document() {
        let temp = tempdir().expect("tempdir");
        let doc = load(&temp.path().join("absent.json"));
        assert_eq!(doc, TrackerDocument::default());
    }

    #[test]
    fn corrupt_json_loads_the_default_document() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tracker.json");
        fs::write(&path, "{not json").expect("write fixture");
        assert_eq!(load(&path), TrackerDocument::default());
    }

    #[test]
    fn wrong_shape_loads_the_default_document() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tracker.json");
        fs::write(
            &path,
            r#"{"habits": "nope", "habitChecks": {}, "weightLogs": [], "milestones": []}"#,
        )
        .expect("write fixture");
        assert_eq!(load(&path), TrackerDocument::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("tracker.json");

        let doc = ops::add_habit(TrackerDocument::default(), "Morning walk", None);
        let doc = ops::add_weight_log(
            doc,
            NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
            96.4,
        );
        save(&path, &doc).expect("save");

        assert_eq!(load(&path), doc);
    }

    #[test]
    fn absent_skip_dates_are_repaired_to_empty() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tracker.json");
        fs::write(
            &path,
            r#"{"habits": [], "habitChecks": {}, "weightLogs": [], "milestones": []}"#,
        )
        .expect("write fixture");
        let doc = load(&path);
        assert!(doc.skip_dates.is_empty());
        assert_eq!(doc, TrackerDocument::default());
    }

    #[test]
    fn weight_logs_without_ids_get_one_on_load() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tracker.json");
        fs::write(
            &path,
            r#"{
                "habits": [],
                "habitChecks": {},
                "weightLogs": [
                    {"date": "2024-01-01", "weightKg": 100.0},
                    {"date": "2024-01-08", "weightKg": 97.0}
                ],
                "milestones": []
            }"#,
        )
        .expect("write fixture");

        let doc = load(&path);
        assert_eq!(doc.weight_logs.len(), 2);
        assert!(doc.weight_logs.iter().all(|log| !log.id.is_empty()));
        assert_ne!(doc.weight_logs[0].id, doc.weight_logs[1].id);
    }
}
