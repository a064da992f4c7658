//! Regex-driven PII extraction over page text.
//!
//! Deliberately naive: one finding per raw match, no deduplication of
//! overlapping matches (a phone-like string inside an email stays as two
//! findings). The findings double as hints in the LLM payload and as audit
//! citations, so the raw matched value and a short context snippet are kept.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::document::Page;

static SSN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("SSN regex"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});

static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\+?\d{1,3}[-.\s]?)?(?:\d{3}[-.\s]?){2}\d{4}\b").expect("phone regex")
});

/// Characters of surrounding context captured on each side of a match.
const SNIPPET_CONTEXT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    Ssn,
    Email,
    Phone,
}

impl PiiKind {
    /// Uppercase label used in citation text ("Detected SSN: ...").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ssn => "SSN",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
        }
    }
}

/// A single raw PII match on one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiiFinding {
    #[serde(rename = "type")]
    pub kind: PiiKind,
    pub page: u32,
    /// The matched text, verbatim.
    pub value: String,
    /// Match plus surrounding context.
    pub snippet: String,
    /// Externally attached signal marking an email as a routine business
    /// contact. The extractor itself never sets this; detection is out of
    /// scope here and supplied (if at all) by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_business: Option<bool>,
}

impl PiiFinding {
    /// Business-safe emails are excluded from the `has_pii` signal.
    pub fn is_business_email(&self) -> bool {
        self.kind == PiiKind::Email && self.is_business == Some(true)
    }
}

/// Scan all pages for SSN, email, and phone patterns.
///
/// Order is fixed: pages in order; within a page all SSNs, then all emails,
/// then all phones, each in match order.
pub fn find_pii(pages: &[Page]) -> Vec<PiiFinding> {
    let mut findings = Vec::new();

    for page in pages {
        for (kind, regex) in [
            (PiiKind::Ssn, &*SSN_REGEX),
            (PiiKind::Email, &*EMAIL_REGEX),
            (PiiKind::Phone, &*PHONE_REGEX),
        ] {
            for m in regex.find_iter(&page.text) {
                findings.push(PiiFinding {
                    kind,
                    page: page.page_num,
                    value: m.as_str().to_string(),
                    snippet: snippet(&page.text, m.start(), m.end()),
                    is_business: None,
                });
            }
        }
    }

    findings
}

/// Slice `SNIPPET_CONTEXT` bytes of context around the match, clamped to
/// char boundaries so multi-byte text never panics.
fn snippet(text: &str, start: usize, end: usize) -> String {
    let from = floor_boundary(text, start.saturating_sub(SNIPPET_CONTEXT));
    let to = ceil_boundary(text, (end + SNIPPET_CONTEXT).min(text.len()));
    text[from..to].to_string()
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> Vec<Page> {
        vec![Page::new(1, text)]
    }

    #[test]
    fn finds_ssn_with_snippet() {
        let findings = find_pii(&page("My SSN is 123-45-6789."));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, PiiKind::Ssn);
        assert_eq!(findings[0].page, 1);
        assert_eq!(findings[0].value, "123-45-6789");
        assert!(findings[0].snippet.contains("My SSN is 123-45-6789"));
        assert_eq!(findings[0].is_business, None);
    }

    #[test]
    fn finds_email_and_phone() {
        let findings = find_pii(&page("Contact jane.doe@example.com or 415-555-1234."));
        let kinds: Vec<PiiKind> = findings.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&PiiKind::Email));
        assert!(kinds.contains(&PiiKind::Phone));
    }

    #[test]
    fn ordering_is_ssn_then_email_then_phone_per_page() {
        let pages = vec![
            Page::new(1, "phone 415-555-1234 then a@b.io then 123-45-6789"),
            Page::new(2, "second 987-65-4321"),
        ];
        let findings = find_pii(&pages);
        let order: Vec<(u32, PiiKind)> = findings.iter().map(|f| (f.page, f.kind)).collect();
        assert_eq!(order[0], (1, PiiKind::Ssn));
        assert_eq!(order[1], (1, PiiKind::Email));
        assert!(order.contains(&(1, PiiKind::Phone)));
        assert_eq!(*order.last().unwrap(), (2, PiiKind::Ssn));
    }

    #[test]
    fn snippet_clamps_at_text_edges() {
        let findings = find_pii(&page("123-45-6789"));
        assert_eq!(findings[0].snippet, "123-45-6789");
    }

    #[test]
    fn snippet_respects_multibyte_boundaries() {
        let findings = find_pii(&page("délégué résumé naïveté 123-45-6789 café—déjà—vu"));
        assert_eq!(findings[0].value, "123-45-6789");
        // Would panic on a non-boundary slice; reaching here is the assertion.
        assert!(!findings[0].snippet.is_empty());
    }

    #[test]
    fn no_findings_on_clean_text() {
        assert!(find_pii(&page("Quarterly revenue grew by 4 percent.")).is_empty());
    }
}
