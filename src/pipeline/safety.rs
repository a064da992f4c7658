//! Hard-keyword safety scans.
//!
//! Two independent signals: a document-level unsafe flag for clearly
//! dangerous or illegal content, and a per-page profanity set that only
//! affects kid-safety, never the unsafe flag. Both are plain substring
//! scans over lowercased text; compound-word false positives are a known
//! and accepted limitation.

use std::collections::BTreeSet;

use crate::models::document::Page;

/// Only very explicit, truly harmful phrases qualify as "unsafe".
/// Swearing alone does not belong here.
const UNSAFE_KEYWORDS: &[&str] = &[
    "child porn",
    "child pornography",
    "csam",
    "kill myself",
    "kill him",
    "kill her",
    "kill them",
    "shoot up",
    "school shooting",
    "mass shooting",
    "bomb recipe",
    "how to make a bomb",
    "how to build a bomb",
    "suicide tutorial",
    "suicide instructions",
    "rape",
    "lynch",
    "hang yourself",
    "behead",
];

/// Strong profanity that makes content not kid-safe.
const PROFANITY_WORDS: &[&str] = &[
    "fuck",
    "fucking",
    "fucked",
    "motherfucker",
    "shit",
    "bullshit",
    "bitch",
    "bitches",
    "asshole",
    "dickhead",
    "bastard",
    "cunt",
];

/// True iff any unsafe phrase appears anywhere in the document text.
///
/// Feeds the unsafe flag and can upgrade the final category; it is OR'd
/// with the model's own unsafe verdict, never used to clear it.
pub fn naive_unsafe_check(pages: &[Page]) -> bool {
    let text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    UNSAFE_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// Pages containing at least one strong profanity hit.
///
/// Marks `kid_safe = false` downstream but does not mark the document
/// unsafe on its own.
pub fn profanity_pages(pages: &[Page]) -> BTreeSet<u32> {
    pages
        .iter()
        .filter(|p| {
            let text = p.text.to_lowercase();
            PROFANITY_WORDS.iter().any(|w| text.contains(w))
        })
        .map(|p| p.page_num)
        .collect()
}
