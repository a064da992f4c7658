//! System prompt selection.
//!
//! `PromptLibrary` is an explicitly constructed, immutable object: built-in
//! template texts are compiled in, an optional prompts directory can
//! overlay any of them, and selection afterward is pure. There is no
//! process-wide cache; whoever runs classifications owns the library and
//! passes it in.

use std::collections::HashMap;
use std::path::Path;

/// Base classification instructions. Always present; the fallback when a
/// template set resolves to nothing.
pub const BASE_TEMPLATE: &str = "base_classification.txt";
/// Extra guidance appended when unsafe keywords were detected.
pub const UNSAFE_TEMPLATE: &str = "unsafe_guidance.txt";
/// Extra guidance appended when PII was detected.
pub const SENSITIVE_TEMPLATE: &str = "sensitive_guidance.txt";

const UNSAFE_SET: &[&str] = &[BASE_TEMPLATE, UNSAFE_TEMPLATE];
const SENSITIVE_SET: &[&str] = &[BASE_TEMPLATE, SENSITIVE_TEMPLATE];
const PUBLIC_SET: &[&str] = &[BASE_TEMPLATE];

const BASE_CLASSIFICATION: &str = r#"You are a regulatory document sensitivity classifier.

You receive a JSON payload describing one uploaded document: page count,
image count, per-page text excerpts, regex-based PII findings, and a
heuristic unsafe-keyword flag. Classify the document into exactly one
category:

- "Public": safe for unrestricted distribution.
- "Confidential": business-internal material (contracts, internal plans,
  customer data, equipment records).
- "Highly Sensitive": regulated personal data such as SSNs, medical or
  financial records tied to individuals.
- "Unsafe": content describing or enabling serious harm. May be combined
  with a base category as "<Category> and Unsafe".

Respond with a single JSON object and nothing else:

{
  "category": "Public | Confidential | Highly Sensitive | Unsafe",
  "unsafe": false,
  "kid_safe": true,
  "confidence": 0.0,
  "reasoning": "One short paragraph citing the decisive evidence.",
  "citations": [{"page": 1, "reason": "what on this page mattered"}]
}

Rules:
1. Judge only from the supplied text. Do not invent content.
2. "unsafe" is reserved for clearly dangerous or illegal material, not
   profanity or merely confidential data.
3. "confidence" is your own calibrated estimate in [0, 1].
4. Cite the specific pages that drove the decision.
"#;

const UNSAFE_GUIDANCE: &str = r#"Heuristic screening flagged possible dangerous content in this document.
Scrutinize the flagged phrases in context before deciding: instructions for
violence or self-harm make the document "Unsafe" even if most of it is
routine. If the phrase is clearly benign in context (fiction excerpt, safety
training, news reporting), say so in the reasoning and do not set "unsafe".
"#;

const SENSITIVE_GUIDANCE: &str = r#"Regex screening found personal identifiers (SSN, email, or phone) in this
document. Weigh them when choosing between "Confidential" and "Highly
Sensitive": government identifiers tied to a person are "Highly Sensitive";
routine business contact details alone are not. Cite the pages where the
identifiers appear.
"#;

/// Heuristic context flags driving template selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptContext {
    pub unsafe_keyword_flag: bool,
    pub has_ssn: bool,
    pub has_pii: bool,
}

/// Immutable set of named prompt templates.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl PromptLibrary {
    /// The compiled-in templates, no filesystem involved.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(BASE_TEMPLATE.to_string(), BASE_CLASSIFICATION.to_string());
        templates.insert(UNSAFE_TEMPLATE.to_string(), UNSAFE_GUIDANCE.to_string());
        templates.insert(SENSITIVE_TEMPLATE.to_string(), SENSITIVE_GUIDANCE.to_string());
        Self { templates }
    }

    /// Built-ins overlaid with any template files found in `dir`.
    ///
    /// A missing directory or unreadable file falls back to the built-in
    /// text for that template; overrides are read once, here.
    pub fn load(dir: &Path) -> Self {
        let mut library = Self::builtin();
        for name in [BASE_TEMPLATE, UNSAFE_TEMPLATE, SENSITIVE_TEMPLATE] {
            let path = dir.join(name);
            if let Ok(text) = std::fs::read_to_string(&path) {
                tracing::info!(template = name, path = %path.display(), "Loaded prompt override");
                library.templates.insert(name.to_string(), text);
            }
        }
        library
    }

    /// Construct from an explicit template map (tests, embedders).
    pub fn from_templates(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Select and concatenate the system prompt for the given context.
    ///
    /// Precedence, first match wins: unsafe keywords, then PII/SSN, then
    /// public. Set members missing from the library are skipped; an empty
    /// result falls back to the compiled-in base template.
    pub fn system_prompt(&self, ctx: &PromptContext) -> String {
        let set: &[&str] = if ctx.unsafe_keyword_flag {
            UNSAFE_SET
        } else if ctx.has_ssn || ctx.has_pii {
            SENSITIVE_SET
        } else {
            PUBLIC_SET
        };

        let parts: Vec<&str> = set
            .iter()
            .filter_map(|name| self.templates.get(*name).map(String::as_str))
            .collect();

        if parts.is_empty() {
            BASE_CLASSIFICATION.trim().to_string()
        } else {
            parts
                .iter()
                .map(|p| p.trim())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    }
}
