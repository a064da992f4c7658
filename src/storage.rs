//! Append-only audit log.
//!
//! The store is a narrow trait so the backing implementation can change
//! without touching the orchestrator or the CLI. `JsonAuditStore` keeps the
//! whole history as one pretty-printed JSON array and rewrites it on every
//! append; an in-process mutex serializes the read-modify-write and the
//! rewrite goes through a temp file plus atomic rename. A corrupt history
//! file is quarantined to a `.corrupt` sidecar and logged loudly instead of
//! being silently discarded.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::models::audit::AuditEntry;
use crate::models::classification::ClassificationResult;
use crate::models::document::DocumentInfo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Audit store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Audit store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to replace audit store file: {0}")]
    Persist(String),
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Narrow interface over the audit log backend.
pub trait AuditStore {
    fn append(&self, entry: AuditEntry) -> Result<(), StoreError>;
    /// Entries in insertion order. Consumers sort/filter themselves.
    fn read_all(&self) -> Result<Vec<AuditEntry>, StoreError>;
}

/// Single-file JSON array store.
pub struct JsonAuditStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonAuditStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Load history, quarantining a corrupt file.
    ///
    /// Data already written is never silently dropped: the unparsable file
    /// is moved aside to `<name>.corrupt` and history restarts empty.
    fn load_or_quarantine(&self) -> Result<Vec<AuditEntry>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(&self.path)?;
        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let quarantine = quarantine_path(&self.path);
                tracing::error!(
                    path = %self.path.display(),
                    quarantine = %quarantine.display(),
                    error = %e,
                    "Audit history is corrupt; moving it aside and starting fresh"
                );
                std::fs::rename(&self.path, &quarantine)?;
                Ok(Vec::new())
            }
        }
    }

    fn write_all(&self, entries: &[AuditEntry]) -> Result<(), StoreError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::Persist(e.to_string()))?;
        Ok(())
    }
}

impl AuditStore for JsonAuditStore {
    fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut entries = self.load_or_quarantine()?;
        entries.push(entry);
        self.write_all(&entries)
    }

    fn read_all(&self) -> Result<Vec<AuditEntry>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        self.load_or_quarantine()
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}

/// Build and append one review entry for a classified document.
///
/// `final_category` is the reviewer's override, or the AI category when the
/// reviewer accepted it unchanged.
pub fn save_review(
    store: &dyn AuditStore,
    doc: &DocumentInfo,
    result: &ClassificationResult,
    final_category: &str,
    reviewer_comment: &str,
) -> Result<AuditEntry, StoreError> {
    let entry = AuditEntry {
        filename: doc.filename.clone(),
        pages: doc.num_pages,
        images: doc.num_images,
        ai_category: result.category(),
        final_category: final_category.to_string(),
        unsafe_content: result.label.unsafe_content,
        kid_safe: result.kid_safe,
        confidence: result.confidence,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        reviewer_comment: reviewer_comment.to_string(),
    };
    store.append(entry.clone())?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classification::{Label, Sensitivity};
    use crate::models::document::Page;

    fn entry(filename: &str, final_category: &str) -> AuditEntry {
        AuditEntry {
            filename: filename.to_string(),
            pages: 2,
            images: 1,
            ai_category: "Confidential".to_string(),
            final_category: final_category.to_string(),
            unsafe_content: false,
            kid_safe: true,
            confidence: 0.85,
            timestamp: "2026-08-27T12:00:00.000000Z".to_string(),
            reviewer_comment: String::new(),
        }
    }

    #[test]
    fn append_then_read_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAuditStore::new(dir.path().join("history.json"));

        store.append(entry("a.pdf", "Confidential")).unwrap();
        store.append(entry("b.pdf", "Public")).unwrap();

        let history = store.read_all().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].filename, "a.pdf");
        assert_eq!(history[1].filename, "b.pdf");
        assert_eq!(history[0], entry("a.pdf", "Confidential"));
    }

    #[test]
    fn read_all_on_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAuditStore::new(dir.path().join("history.json"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn corrupt_history_is_quarantined_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonAuditStore::new(&path);
        assert!(store.read_all().unwrap().is_empty());

        let quarantined = dir.path().join("history.json.corrupt");
        assert!(quarantined.exists());
        assert_eq!(std::fs::read_to_string(quarantined).unwrap(), "{not json");

        // Appending afterward starts a fresh, valid history.
        store.append(entry("c.pdf", "Public")).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }

    #[test]
    fn file_is_a_pretty_printed_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = JsonAuditStore::new(&path);
        store.append(entry("a.pdf", "Public")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.trim_start().starts_with('['));
        assert!(text.contains('\n'));
        // The unsafe facet serializes under its historical key.
        assert!(text.contains("\"unsafe\""));
    }

    #[test]
    fn save_review_round_trips_and_stamps_utc() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonAuditStore::new(dir.path().join("history.json"));
        let doc = DocumentInfo {
            num_pages: 1,
            num_images: 0,
            pages: vec![Page::new(1, "text")],
            legible: true,
            filename: "review.pdf".to_string(),
        };
        let result = ClassificationResult {
            label: Label::new(Sensitivity::Confidential, false),
            confidence: 0.88,
            reasoning: "because".to_string(),
            decisions: vec![],
            citations: vec![],
            kid_safe: true,
        };

        let written = save_review(&store, &doc, &result, "Highly Sensitive", "override").unwrap();
        let history = store.read_all().unwrap();
        assert_eq!(history.len(), 1);
        let reloaded = &history[0];

        assert_eq!(reloaded, &written);
        assert_eq!(reloaded.ai_category, "Confidential");
        assert_eq!(reloaded.final_category, "Highly Sensitive");
        assert!(!reloaded.unsafe_content);
        assert!(reloaded.kid_safe);
        assert_eq!(reloaded.confidence, 0.88);
        assert_eq!(reloaded.reviewer_comment, "override");
        assert!(reloaded.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&reloaded.timestamp).is_ok());
    }
}
