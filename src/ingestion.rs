//! Document ingestion: raw upload bytes to a normalized `DocumentInfo`.
//!
//! PDFs yield one `Page` per physical page with whatever text lopdf can
//! extract, plus a document-level count of embedded image streams. Anything
//! else is treated as an image upload: a single empty page, legible iff the
//! bytes decode. Malformed input never fails the pipeline; it downgrades to
//! an illegible single-page result so the caller can route the document to
//! manual review.

use lopdf::{Document, Object};

use crate::models::document::{DocumentInfo, Page};

/// Normalize one uploaded file.
pub fn process_file(bytes: &[u8], filename: &str) -> DocumentInfo {
    let mut info = if filename.to_lowercase().ends_with(".pdf") {
        process_pdf(bytes)
    } else {
        process_image(bytes)
    };
    info.filename = filename.to_string();
    info
}

fn process_pdf(bytes: &[u8]) -> DocumentInfo {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed PDF; downgrading to illegible result");
            return illegible_fallback();
        }
    };

    let pages: Vec<Page> = doc
        .get_pages()
        .keys()
        .map(|&page_num| {
            let text = doc.extract_text(&[page_num]).unwrap_or_default();
            Page::new(page_num, text)
        })
        .collect();

    let num_images = doc
        .objects
        .values()
        .filter(|obj| is_image_stream(obj))
        .count();

    let legible = pages.iter().any(|p| !p.text.trim().is_empty());

    DocumentInfo {
        num_pages: pages.len(),
        num_images,
        pages,
        legible,
        filename: String::new(),
    }
}

fn is_image_stream(obj: &Object) -> bool {
    match obj {
        Object::Stream(stream) => stream
            .dict
            .get(b"Subtype")
            .and_then(|subtype| subtype.as_name())
            .map(|name| name == b"Image")
            .unwrap_or(false),
        _ => false,
    }
}

/// No OCR here: image uploads carry no text, just a legibility signal.
fn process_image(bytes: &[u8]) -> DocumentInfo {
    let legible = image::load_from_memory(bytes).is_ok();
    if !legible {
        tracing::warn!("Upload did not decode as an image; marking illegible");
    }
    DocumentInfo {
        num_pages: 1,
        num_images: 1,
        pages: vec![Page::new(1, "")],
        legible,
        filename: String::new(),
    }
}

fn illegible_fallback() -> DocumentInfo {
    DocumentInfo {
        num_pages: 1,
        num_images: 0,
        pages: vec![Page::new(1, "")],
        legible: false,
        filename: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_pdf_downgrades_to_illegible() {
        let info = process_file(b"definitely not a pdf", "broken.PDF");
        assert_eq!(info.filename, "broken.PDF");
        assert!(!info.legible);
        assert_eq!(info.num_pages, 1);
        assert_eq!(info.pages[0].text, "");
    }

    #[test]
    fn non_image_bytes_are_illegible_single_page() {
        let info = process_file(b"plain text payload", "scan.png");
        assert!(!info.legible);
        assert_eq!(info.num_pages, 1);
        assert_eq!(info.num_images, 1);
        assert_eq!(info.pages, vec![Page::new(1, "")]);
    }

    #[test]
    fn extension_routing_is_case_insensitive() {
        // Same invalid bytes: a .pdf name goes down the PDF path (0 images),
        // everything else is treated as an image upload (1 image).
        let as_pdf = process_file(b"junk", "a.Pdf");
        let as_image = process_file(b"junk", "a.jpeg");
        assert_eq!(as_pdf.num_images, 0);
        assert_eq!(as_image.num_images, 1);
    }
}
