//! Model gateway contract.
//!
//! The orchestrator talks to hosted models through the `LlmClient` trait;
//! production uses [`openrouter::OpenRouterClient`], tests plug in stubs.
//! Whatever JSON a model returns is deserialized into the loose
//! [`RawVerdict`] and normalized here into a fully populated
//! [`ModelVerdict`] with documented defaults. Transport and protocol
//! failures are never defaulted away; they fail the classification request.

pub mod openrouter;

use serde::Deserialize;
use thiserror::Error;

use crate::models::classification::{Citation, Sensitivity};

/// Default confidence when the model omits or mangles the field.
const DEFAULT_CONFIDENCE: f32 = 0.6;

/// Errors from a gateway call. All are fatal to the classification request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("OPENROUTER_API_KEY environment variable is not set")]
    MissingApiKey,
    #[error("Cannot connect to model gateway at {0}")]
    Connection(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Model gateway returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse gateway response: {0}")]
    ResponseParsing(String),
    #[error("Model reply violated the JSON contract: {0}")]
    Protocol(String),
}

/// Single-operation seam to a hosted model.
pub trait LlmClient {
    /// Send one system+user prompt pair to `model` and return its parsed
    /// JSON reply. Must not retry or swallow failures.
    fn classify(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<RawVerdict, GatewayError>;
}

/// The model's reply as it came off the wire. Every field optional;
/// normalization supplies the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVerdict {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "unsafe")]
    pub unsafe_content: Option<bool>,
    #[serde(default)]
    pub kid_safe: Option<bool>,
    /// Accepts a JSON number or a numeric string; anything else defaults.
    #[serde(default)]
    pub confidence: Option<serde_json::Value>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub citations: Option<Vec<RawCitation>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCitation {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A normalized model verdict: no missing fields, confidence clamped,
/// category parsed into facets (raw string kept for reasoning text).
#[derive(Debug, Clone)]
pub struct ModelVerdict {
    /// Model id that produced this verdict.
    pub model: String,
    /// The category string as the model wrote it (defaulted to "Public").
    pub category: String,
    pub sensitivity: Sensitivity,
    pub unsafe_content: bool,
    pub kid_safe: bool,
    /// In [0, 1].
    pub confidence: f32,
    pub reasoning: String,
    pub citations: Vec<Citation>,
}

impl ModelVerdict {
    /// Apply the defaulting rules to a raw reply.
    pub fn normalize(raw: RawVerdict, model: &str) -> Self {
        let category = raw.category.unwrap_or_else(|| "Public".to_string());
        let sensitivity = Sensitivity::parse_lenient(&category);
        let unsafe_content =
            raw.unsafe_content.unwrap_or(false) || category.to_lowercase().contains("unsafe");
        let kid_safe = raw.kid_safe.unwrap_or(!unsafe_content);
        let confidence = parse_confidence(raw.confidence.as_ref()).clamp(0.0, 1.0);
        let reasoning = raw
            .reasoning
            .unwrap_or_else(|| "No reasoning provided.".to_string());
        let citations = raw
            .citations
            .unwrap_or_default()
            .into_iter()
            .map(|c| Citation::new(c.page.unwrap_or(1), c.reason.unwrap_or_default()))
            .collect();

        Self {
            model: model.to_string(),
            category,
            sensitivity,
            unsafe_content,
            kid_safe,
            confidence,
            reasoning,
            citations,
        }
    }
}

fn parse_confidence(value: Option<&serde_json::Value>) -> f32 {
    match value {
        Some(serde_json::Value::Number(n)) => {
            n.as_f64().map(|f| f as f32).unwrap_or(DEFAULT_CONFIDENCE)
        }
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_CONFIDENCE),
        _ => DEFAULT_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reply_gets_full_defaults() {
        let verdict = ModelVerdict::normalize(RawVerdict::default(), "test-model");
        assert_eq!(verdict.category, "Public");
        assert_eq!(verdict.sensitivity, Sensitivity::Public);
        assert!(!verdict.unsafe_content);
        assert!(verdict.kid_safe);
        assert_eq!(verdict.confidence, 0.6);
        assert_eq!(verdict.reasoning, "No reasoning provided.");
        assert!(verdict.citations.is_empty());
    }

    #[test]
    fn kid_safe_defaults_to_negated_unsafe() {
        let raw = RawVerdict {
            unsafe_content: Some(true),
            ..Default::default()
        };
        let verdict = ModelVerdict::normalize(raw, "m");
        assert!(verdict.unsafe_content);
        assert!(!verdict.kid_safe);
    }

    #[test]
    fn confidence_accepts_numeric_string_and_clamps() {
        let raw = RawVerdict {
            confidence: Some(serde_json::json!("0.8")),
            ..Default::default()
        };
        assert_eq!(ModelVerdict::normalize(raw, "m").confidence, 0.8);

        let raw = RawVerdict {
            confidence: Some(serde_json::json!(1.7)),
            ..Default::default()
        };
        assert_eq!(ModelVerdict::normalize(raw, "m").confidence, 1.0);

        let raw = RawVerdict {
            confidence: Some(serde_json::json!(-0.3)),
            ..Default::default()
        };
        assert_eq!(ModelVerdict::normalize(raw, "m").confidence, 0.0);

        let raw = RawVerdict {
            confidence: Some(serde_json::json!({"oops": true})),
            ..Default::default()
        };
        assert_eq!(ModelVerdict::normalize(raw, "m").confidence, 0.6);
    }

    #[test]
    fn compound_category_parses_to_facets() {
        let raw = RawVerdict {
            category: Some("Confidential and Unsafe".to_string()),
            ..Default::default()
        };
        let verdict = ModelVerdict::normalize(raw, "m");
        assert_eq!(verdict.sensitivity, Sensitivity::Confidential);
        assert!(verdict.unsafe_content);
        assert!(!verdict.kid_safe);
    }

    #[test]
    fn citations_default_page_and_reason() {
        let raw = RawVerdict {
            citations: Some(vec![RawCitation {
                page: None,
                reason: Some("header".to_string()),
            }]),
            ..Default::default()
        };
        let verdict = ModelVerdict::normalize(raw, "m");
        assert_eq!(verdict.citations, vec![Citation::new(1, "header")]);
    }

    #[test]
    fn raw_verdict_deserializes_from_partial_json() {
        let raw: RawVerdict =
            serde_json::from_str(r#"{"category": "Confidential", "confidence": 0.92}"#).unwrap();
        let verdict = ModelVerdict::normalize(raw, "m");
        assert_eq!(verdict.sensitivity, Sensitivity::Confidential);
        assert_eq!(verdict.confidence, 0.92);
    }
}
