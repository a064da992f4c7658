use serde::{Deserialize, Serialize};

/// One physical page of an uploaded document.
///
/// Produced once by ingestion and immutable afterward. `text` is empty when
/// extraction found nothing (scanned page, pure image, malformed source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub page_num: u32,
    pub text: String,
}

impl Page {
    pub fn new(page_num: u32, text: impl Into<String>) -> Self {
        Self {
            page_num,
            text: text.into(),
        }
    }
}

/// Normalized snapshot of an uploaded document, as handed to classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub num_pages: usize,
    pub num_images: usize,
    pub pages: Vec<Page>,
    /// True iff at least one page carries non-whitespace text (or, for image
    /// uploads, the bytes decoded as a valid image).
    pub legible: bool,
    pub filename: String,
}

impl DocumentInfo {
    /// All page texts joined with single spaces, lowercased.
    ///
    /// The heuristic scanners work over this form; keeping the join in one
    /// place guarantees they all see the same text.
    pub fn full_text_lower(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_joins_pages_with_spaces() {
        let doc = DocumentInfo {
            num_pages: 2,
            num_images: 0,
            pages: vec![Page::new(1, "Alpha"), Page::new(2, "BETA")],
            legible: true,
            filename: "doc.pdf".into(),
        };
        assert_eq!(doc.full_text_lower(), "alpha beta");
    }
}
