//! The classification decision engine.
//!
//! A fixed-stage pipeline, no branching back: heuristic extraction, prompt
//! selection, primary model call, conditional validator call, disagreement
//! resolution, then the deterministic overlays (unsafe/SSN, the policy
//! branches, citation augmentation, kid-safe normalization). Gateway
//! failures propagate; classification is all-or-nothing per document.

use serde::Serialize;
use thiserror::Error;

use crate::config::ClassifierConfig;
use crate::gateway::{GatewayError, LlmClient, ModelVerdict};
use crate::models::classification::{
    Citation, ClassificationResult, DecisionRecord, Label, Sensitivity,
};
use crate::models::document::DocumentInfo;

use super::pii::{find_pii, PiiFinding, PiiKind};
use super::policy::{
    detect_policy_keywords, marketing_guard, mentions_operational_context,
    sensitive_equipment_pages,
};
use super::prompt::{PromptContext, PromptLibrary};
use super::safety::{naive_unsafe_check, profanity_pages};

/// Per-page excerpt cap in the model payload, characters.
const PAGE_EXCERPT_LIMIT: usize = 800;

/// Validator-resolved results never exceed this confidence: a triggered
/// cross-check means residual uncertainty regardless of what either model
/// claims.
const VALIDATED_CONFIDENCE_CAP: f32 = 0.7;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("model gateway call failed: {0}")]
    Gateway(#[from] GatewayError),
    #[error("failed to encode classification payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The JSON payload both models receive.
#[derive(Serialize)]
struct ClassificationPayload<'a> {
    num_pages: usize,
    num_images: usize,
    /// Raw regex findings, business flags included, as hints for the model.
    pii_findings: &'a [PiiFinding],
    unsafe_keyword_flag: bool,
    page_summaries: Vec<PageSummary>,
}

#[derive(Serialize)]
struct PageSummary {
    page: u32,
    text: String,
}

/// Classify one document. At most two sequential model calls.
pub fn classify_document(
    doc: &DocumentInfo,
    client: &dyn LlmClient,
    prompts: &PromptLibrary,
    cfg: &ClassifierConfig,
) -> Result<ClassificationResult, ClassifyError> {
    classify_with_findings(doc, find_pii(&doc.pages), client, prompts, cfg)
}

/// Classify with pre-computed PII findings.
///
/// The business-contact signal on email findings comes from outside the
/// extractor; callers that have it attach `is_business` to the findings
/// and enter here. `classify_document` is the no-signal shorthand.
pub fn classify_with_findings(
    doc: &DocumentInfo,
    pii: Vec<PiiFinding>,
    client: &dyn LlmClient,
    prompts: &PromptLibrary,
    cfg: &ClassifierConfig,
) -> Result<ClassificationResult, ClassifyError> {
    // 1. Heuristic feature extraction.
    let has_ssn = pii.iter().any(|f| f.kind == PiiKind::Ssn);
    let surviving: Vec<&PiiFinding> = pii.iter().filter(|f| !f.is_business_email()).collect();
    let has_pii = !surviving.is_empty();
    let unsafe_heuristic = naive_unsafe_check(&doc.pages);
    let profane_pages = profanity_pages(&doc.pages);
    let equipment_pages = sensitive_equipment_pages(&doc.pages);
    let has_sensitive_equipment = !equipment_pages.is_empty() && doc.num_images > 0;
    let full_text = doc.full_text_lower();
    let signals = detect_policy_keywords(&full_text);
    let marketing = marketing_guard(&full_text);

    // 2. Prompt selection from heuristic context.
    let ctx = PromptContext {
        unsafe_keyword_flag: unsafe_heuristic,
        has_ssn,
        has_pii,
    };
    let system_prompt = prompts.system_prompt(&ctx);

    // 3. Primary model call, page text capped to bound request size.
    let payload = ClassificationPayload {
        num_pages: doc.num_pages,
        num_images: doc.num_images,
        pii_findings: &pii,
        unsafe_keyword_flag: unsafe_heuristic,
        page_summaries: doc
            .pages
            .iter()
            .map(|p| PageSummary {
                page: p.page_num,
                text: truncate_excerpt(p.text.trim()),
            })
            .collect(),
    };
    let user_prompt = serde_json::to_string(&payload)?;
    let primary = run_model(client, &cfg.primary_model, &system_prompt, &user_prompt)?;

    // 4. Validation gate: second, higher-precision model on low confidence.
    let validator = if primary.confidence < cfg.validation_threshold {
        tracing::info!(
            confidence = primary.confidence,
            threshold = cfg.validation_threshold,
            "Primary confidence below threshold, invoking validator"
        );
        Some(run_model(client, &cfg.validator_model, &system_prompt, &user_prompt)?)
    } else {
        None
    };

    // 5. Disagreement resolution: the validator wins, conservatively.
    let mut sensitivity = primary.sensitivity;
    let mut unsafe_llm = primary.unsafe_content;
    let mut confidence = primary.confidence;
    let mut reasoning = primary.reasoning.clone();
    let mut citations = primary.citations.clone();
    let mut decisions: Vec<DecisionRecord> = Vec::new();

    if let Some(v) = &validator {
        let disagreement =
            v.sensitivity != primary.sensitivity || v.unsafe_content != primary.unsafe_content;
        if disagreement {
            tracing::info!(
                primary = %primary.category,
                validator = %v.category,
                "Validator disagreed with primary model"
            );
            sensitivity = v.sensitivity;
            unsafe_llm = v.unsafe_content;
            confidence = primary
                .confidence
                .min(v.confidence)
                .min(VALIDATED_CONFIDENCE_CAP);
            reasoning = format!(
                "Cross-validation triggered: the validator model disagreed with the \
                 primary model. Primary model '{}' proposed '{}' (confidence {:.0}%), \
                 validator '{}' proposed '{}' (confidence {:.0}%). The final category \
                 favors the validator for higher precision.\n\n\
                 Primary reasoning: {}\n\nValidator reasoning: {}",
                primary.model,
                primary.category,
                primary.confidence * 100.0,
                v.model,
                v.category,
                v.confidence * 100.0,
                primary.reasoning,
                v.reasoning,
            );
            citations.extend(v.citations.iter().cloned());
        }
    }

    // 6. Deterministic overlay: unsafe flag, then the SSN hard rule.
    let unsafe_flag = unsafe_llm || unsafe_heuristic;
    if unsafe_heuristic && !unsafe_llm {
        decisions.push(DecisionRecord::new(
            "unsafe_keywords",
            "Heuristic keyword scan found explicit dangerous-content phrasing; the \
             document is marked Unsafe regardless of the model verdict.",
            0.0,
        ));
    }

    if has_ssn {
        if sensitivity < Sensitivity::HighlySensitive {
            sensitivity = Sensitivity::HighlySensitive;
            decisions.push(DecisionRecord::new(
                "ssn_override",
                "A Social Security Number pattern was detected; the document is \
                 Highly Sensitive by hard rule.",
                0.9,
            ));
        }
        confidence = confidence.max(0.9);
    }

    // 7. Policy overlay: mutually exclusive branches, first match wins.
    //    "Force Confidential" raises, never downgrades, so the SSN rule
    //    above keeps precedence when both apply.
    if signals.internal {
        sensitivity = sensitivity.raise_to(Sensitivity::Confidential);
        confidence = confidence.max(0.85);
        decisions.push(DecisionRecord::new(
            "policy_internal",
            "Internal-use or restricted-distribution wording detected; handling \
             policy requires at least Confidential.",
            0.85,
        ));
        citations.push(Citation::new(
            1,
            "Internal-use or restricted-distribution wording",
        ));
    } else if (!equipment_pages.is_empty() || signals.equipment) && !marketing {
        sensitivity = sensitivity.raise_to(Sensitivity::Confidential);
        confidence = confidence.max(0.9);
        let cited_page = equipment_pages.iter().next().copied().unwrap_or(1);
        decisions.push(DecisionRecord::new(
            "policy_equipment",
            "Sensitive equipment references with serial or part identifiers \
             detected; equipment records are at least Confidential.",
            0.9,
        ));
        citations.push(Citation::new(
            cited_page,
            "Sensitive equipment and identifier references",
        ));
    } else if signals.template && !marketing && mentions_operational_context(&full_text) {
        sensitivity = sensitivity.raise_to(Sensitivity::Confidential);
        confidence = confidence.max(0.85);
        decisions.push(DecisionRecord::new(
            "policy_template",
            "Editable or shared template wording in an operational context \
             (flight/manual/operations/safety); treated as at least Confidential.",
            0.85,
        ));
        citations.push(Citation::new(1, "Editable template wording in operational context"));
    } else if has_sensitive_equipment && sensitivity < Sensitivity::Confidential {
        sensitivity = Sensitivity::Confidential;
        confidence = confidence.max(0.8);
        decisions.push(DecisionRecord::new(
            "policy_equipment_fallback",
            "Pages combine equipment keywords with identifiers and the document \
             carries images; raised to Confidential as a precaution.",
            0.8,
        ));
    }

    // 8. Citation augmentation, always appended whatever branch fired.
    for finding in &surviving {
        citations.push(Citation::new(
            finding.page,
            format!("Detected {}: {}", finding.kind.label(), finding.value),
        ));
    }
    for page in &profane_pages {
        citations.push(Citation::new(
            *page,
            "Strong profanity detected (not kid-safe).",
        ));
    }

    // 9. Kid-safe normalization.
    let kid_safe = !unsafe_flag && profane_pages.is_empty();

    // 10. Business-contact note.
    if !unsafe_flag && pii.iter().any(|f| f.is_business_email()) {
        decisions.push(DecisionRecord::new(
            "business_contact",
            "Business contact emails were detected and treated as routine \
             correspondence rather than personal PII.",
            0.0,
        ));
    }

    let reasoning = render_reasoning(&reasoning, &decisions);

    Ok(ClassificationResult {
        label: Label::new(sensitivity, unsafe_flag),
        confidence,
        reasoning,
        decisions,
        citations,
        kid_safe,
    })
}

fn run_model(
    client: &dyn LlmClient,
    model: &str,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<ModelVerdict, GatewayError> {
    let raw = client.classify(model, system_prompt, user_prompt)?;
    Ok(ModelVerdict::normalize(raw, model))
}

/// Model reasoning first, then each rule firing on its own paragraph.
fn render_reasoning(base: &str, decisions: &[DecisionRecord]) -> String {
    let mut out = base.trim().to_string();
    for decision in decisions {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&decision.rationale);
    }
    out
}

/// Cap page text at `PAGE_EXCERPT_LIMIT` characters, marking the cut.
fn truncate_excerpt(text: &str) -> String {
    match text.char_indices().nth(PAGE_EXCERPT_LIMIT) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
