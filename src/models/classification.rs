//! Classification result types.
//!
//! The category is modeled as two orthogonal facets, `Sensitivity` and an
//! unsafe flag, instead of one free-text field. Overlay rules can only raise
//! the sensitivity (`raise_to`), which makes the monotonicity guarantee a
//! property of the type rather than of careful string handling. The familiar
//! display strings ("Confidential and Unsafe", ...) are derived at the
//! boundary.

use serde::{Deserialize, Serialize};

/// Base sensitivity tier. Ordered: overlays may only move rightward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Sensitivity {
    Public,
    Confidential,
    HighlySensitive,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Confidential => "Confidential",
            Self::HighlySensitive => "Highly Sensitive",
        }
    }

    /// Raise to at least `floor`. Never lowers.
    pub fn raise_to(self, floor: Sensitivity) -> Sensitivity {
        self.max(floor)
    }

    /// Lenient parse of a model-supplied category string.
    ///
    /// Matches by substring so compound forms ("Confidential and Unsafe")
    /// and casing variants resolve to the right tier. Anything
    /// unrecognizable is Public, per the gateway defaulting rules.
    pub fn parse_lenient(raw: &str) -> Sensitivity {
        let lower = raw.to_lowercase();
        if lower.contains("highly sensitive") {
            Sensitivity::HighlySensitive
        } else if lower.contains("confidential") {
            Sensitivity::Confidential
        } else {
            Sensitivity::Public
        }
    }
}

/// The two-facet category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub sensitivity: Sensitivity,
    #[serde(rename = "unsafe")]
    pub unsafe_content: bool,
}

impl Label {
    pub fn new(sensitivity: Sensitivity, unsafe_content: bool) -> Self {
        Self {
            sensitivity,
            unsafe_content,
        }
    }

    /// Render the user-facing category string.
    ///
    /// By construction the rendered string contains "Unsafe" exactly when
    /// the unsafe facet is set.
    pub fn render(&self) -> String {
        match (self.sensitivity, self.unsafe_content) {
            (Sensitivity::Public, true) => "Unsafe".to_string(),
            (s, true) => format!("{} and Unsafe", s.as_str()),
            (s, false) => s.as_str().to_string(),
        }
    }
}

/// A (page, reason) pair justifying part of the classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub page: u32,
    pub reason: String,
}

impl Citation {
    pub fn new(page: u32, reason: impl Into<String>) -> Self {
        Self {
            page,
            reason: reason.into(),
        }
    }
}

/// One deterministic rule firing, recorded as it happens.
///
/// The pipeline accumulates these instead of growing a reasoning string
/// stage by stage; the final text is rendered once at the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    /// Stable stage identifier ("ssn_override", "policy_internal", ...).
    pub stage: &'static str,
    pub rationale: String,
    /// Confidence floor the rule applied (0.0 for informational notes).
    pub confidence_floor: f32,
}

impl DecisionRecord {
    pub fn new(stage: &'static str, rationale: impl Into<String>, confidence_floor: f32) -> Self {
        Self {
            stage,
            rationale: rationale.into(),
            confidence_floor,
        }
    }
}

/// Final output of `classify_document`.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub label: Label,
    /// In [0, 1]. Monotonically non-decreasing under override rules, except
    /// the cross-validation cap applied before any override runs.
    pub confidence: f32,
    /// Model reasoning followed by the rendered decision records.
    pub reasoning: String,
    /// The raw rule firings behind `reasoning`, kept for audit.
    pub decisions: Vec<DecisionRecord>,
    /// Append-only across stages; earlier citations are never removed.
    pub citations: Vec<Citation>,
    /// True iff not unsafe and no page matched the profanity list.
    pub kid_safe: bool,
}

impl ClassificationResult {
    /// The user-facing category string, derived from the label facets.
    pub fn category(&self) -> String {
        self.label.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_ordering_supports_raise_only() {
        assert!(Sensitivity::Public < Sensitivity::Confidential);
        assert!(Sensitivity::Confidential < Sensitivity::HighlySensitive);
        assert_eq!(
            Sensitivity::HighlySensitive.raise_to(Sensitivity::Confidential),
            Sensitivity::HighlySensitive
        );
        assert_eq!(
            Sensitivity::Public.raise_to(Sensitivity::Confidential),
            Sensitivity::Confidential
        );
    }

    #[test]
    fn render_matrix() {
        assert_eq!(Label::new(Sensitivity::Public, false).render(), "Public");
        assert_eq!(Label::new(Sensitivity::Public, true).render(), "Unsafe");
        assert_eq!(
            Label::new(Sensitivity::Confidential, true).render(),
            "Confidential and Unsafe"
        );
        assert_eq!(
            Label::new(Sensitivity::HighlySensitive, false).render(),
            "Highly Sensitive"
        );
        assert_eq!(
            Label::new(Sensitivity::HighlySensitive, true).render(),
            "Highly Sensitive and Unsafe"
        );
    }

    #[test]
    fn rendered_string_contains_unsafe_iff_flag() {
        for sensitivity in [
            Sensitivity::Public,
            Sensitivity::Confidential,
            Sensitivity::HighlySensitive,
        ] {
            for unsafe_content in [false, true] {
                let rendered = Label::new(sensitivity, unsafe_content).render();
                assert_eq!(rendered.contains("Unsafe"), unsafe_content, "{rendered}");
            }
        }
    }

    #[test]
    fn parse_lenient_handles_compounds_and_case() {
        assert_eq!(
            Sensitivity::parse_lenient("Highly Sensitive and Unsafe"),
            Sensitivity::HighlySensitive
        );
        assert_eq!(
            Sensitivity::parse_lenient("confidential"),
            Sensitivity::Confidential
        );
        assert_eq!(Sensitivity::parse_lenient("Unsafe"), Sensitivity::Public);
        assert_eq!(Sensitivity::parse_lenient("garbage"), Sensitivity::Public);
    }
}
