//! Document-handling policy cues.
//!
//! These scanners feed the deterministic policy overlay: equipment/serial
//! conjunction per page, three independent wording flags over the full
//! text, the marketing-safe guard that suppresses the equipment and
//! template branches, and the operational-context check the template
//! branch additionally requires.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::document::Page;

/// Aircraft / sensitive-equipment vocabulary.
const EQUIPMENT_KEYWORDS: &[&str] = &[
    "stealth",
    "f-22",
    "f-35",
    "b-21",
    "raptor",
    "fighter jet",
    "fighter aircraft",
    "airframe",
    "avionics",
    "radar cross-section",
    "unmanned aerial",
    "uav",
];

/// Serial / part-identifier vocabulary.
const IDENTIFIER_KEYWORDS: &[&str] = &[
    "serial number",
    "serial no.",
    "tail number",
    "part number",
    "part no.",
    "asset tag",
    "nsn",
    "lot number",
];

/// Marketing phrases marking a document as deliberately public-facing.
const MARKETING_PHRASES: &[&str] = &[
    "brochure",
    "press release",
    "case study",
    "marketing",
    "advertisement",
    "newsletter",
    "media kit",
    "public announcement",
];

/// Internal-use / memo / proposal wording.
static INTERNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(internal\s+use(\s+only)?|internal\s+only|internal\s+memo(randum)?|memorandum|do\s+not\s+distribute|not\s+for\s+(public\s+)?(distribution|release)|restricted\s+(distribution|document|handling)|proposal)\b",
    )
    .expect("internal wording regex")
});

/// Template / editable / shared-document wording.
static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(template|editable|fillable|fill[-\s]?in|shared\s+(drive|folder|document)|collaborative\s+draft)\b",
    )
    .expect("template wording regex")
});

/// Aircraft-or-serial wording (looser than the per-page conjunction).
static EQUIPMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(aircraft|stealth|f-22|f-35|airframe|avionics|tail\s+number|serial\s+number)\b",
    )
    .expect("equipment wording regex")
});

/// Flight / manual / operations / safety context for the template branch.
static OPERATIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(flight|manual|operations?|operational|safety)\b")
        .expect("operational context regex")
});

/// Independent wording flags over the full document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicySignals {
    pub internal: bool,
    pub template: bool,
    pub equipment: bool,
}

/// Pages mentioning both an equipment keyword and a serial/part identifier.
///
/// The conjunction is intentional: text that merely mentions aircraft is
/// common in public material, identifiers next to it are not.
pub fn sensitive_equipment_pages(pages: &[Page]) -> BTreeSet<u32> {
    pages
        .iter()
        .filter(|p| {
            let text = p.text.to_lowercase();
            EQUIPMENT_KEYWORDS.iter().any(|kw| text.contains(kw))
                && IDENTIFIER_KEYWORDS.iter().any(|kw| text.contains(kw))
        })
        .map(|p| p.page_num)
        .collect()
}

/// Evaluate the three wording regexes over the full concatenated text.
pub fn detect_policy_keywords(text: &str) -> PolicySignals {
    PolicySignals {
        internal: INTERNAL_RE.is_match(text),
        template: TEMPLATE_RE.is_match(text),
        equipment: EQUIPMENT_RE.is_match(text),
    }
}

/// True when the text reads as deliberately public marketing material.
///
/// Suppresses the equipment and template overlay branches only; the
/// internal-wording branch and the equipment fallback ignore it.
pub fn marketing_guard(text: &str) -> bool {
    let lower = text.to_lowercase();
    MARKETING_PHRASES.iter().any(|p| lower.contains(p))
}

/// Does the text mention flight/manual/operations/safety context?
pub fn mentions_operational_context(text: &str) -> bool {
    OPERATIONAL_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_requires_identifier_conjunction() {
        let aircraft_only = vec![Page::new(1, "The F-22 is a fifth generation fighter.")];
        assert!(sensitive_equipment_pages(&aircraft_only).is_empty());

        let identifier_only = vec![Page::new(1, "Record the serial number of each unit.")];
        assert!(sensitive_equipment_pages(&identifier_only).is_empty());

        let both = vec![Page::new(1, "F-22 tail assembly, serial number 88-401.")];
        assert_eq!(sensitive_equipment_pages(&both), BTreeSet::from([1]));
    }

    #[test]
    fn equipment_pages_are_per_page() {
        let pages = vec![
            Page::new(1, "F-22 overview"),
            Page::new(2, "serial number listing"),
        ];
        // Conjunction must hold on a single page, not across pages.
        assert!(sensitive_equipment_pages(&pages).is_empty());
    }

    #[test]
    fn policy_signals_are_independent() {
        let signals = detect_policy_keywords("Internal use only. Editable template attached.");
        assert!(signals.internal);
        assert!(signals.template);
        assert!(!signals.equipment);

        let signals = detect_policy_keywords("Aircraft serial number registry");
        assert!(!signals.internal);
        assert!(!signals.template);
        assert!(signals.equipment);
    }

    #[test]
    fn policy_signals_empty_on_plain_text() {
        assert_eq!(
            detect_policy_keywords("Recipe collection for the bake sale"),
            PolicySignals::default()
        );
    }

    #[test]
    fn marketing_guard_matches_phrases() {
        assert!(marketing_guard("Download our product BROCHURE today"));
        assert!(marketing_guard("see the attached press release"));
        assert!(!marketing_guard("internal maintenance schedule"));
    }

    #[test]
    fn operational_context_words() {
        assert!(mentions_operational_context("flight operations manual"));
        assert!(mentions_operational_context("Safety briefing notes"));
        assert!(!mentions_operational_context("holiday party planning"));
    }
}
