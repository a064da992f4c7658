//! Regdoc classifies uploaded documents (PDF or image) into sensitivity
//! categories with a two-tier LLM pipeline layered under deterministic
//! heuristic and policy rules, then records human review decisions to an
//! append-only audit log.
//!
//! The core is [`pipeline::classifier::classify_document`]: heuristic
//! feature extraction, prompt selection, a primary model call, a
//! conditional validator call, disagreement resolution, and the override
//! stages that produce the final category, confidence, reasoning, and
//! citations. Everything upstream (text extraction) and downstream (the
//! audit log) sits behind small seams so it can be swapped independently.

pub mod config;
pub mod error;
pub mod gateway;
pub mod ingestion;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use error::RegdocError;
pub use models::classification::{ClassificationResult, Label, Sensitivity};
pub use models::document::{DocumentInfo, Page};
pub use pipeline::classifier::{classify_document, classify_with_findings};
