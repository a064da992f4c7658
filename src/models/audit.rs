use serde::{Deserialize, Serialize};

/// One human review recorded to the audit log.
///
/// Entries are append-only: once written they are never updated or deleted.
/// Category strings are stored in rendered form so the log stays readable
/// without the crate's type definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub filename: String,
    pub pages: usize,
    pub images: usize,
    /// Category the pipeline produced, before any human override.
    pub ai_category: String,
    /// Category after the reviewer's (optional) override.
    pub final_category: String,
    #[serde(rename = "unsafe")]
    pub unsafe_content: bool,
    pub kid_safe: bool,
    pub confidence: f32,
    /// UTC, RFC 3339 with trailing "Z".
    pub timestamp: String,
    pub reviewer_comment: String,
}
