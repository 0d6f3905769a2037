//! PDF text extraction backed by `lopdf`, one segment per page.

use std::panic;

use lopdf::Document;
use tracing::warn;

use crate::error::{ChatError, Result};

pub fn extract(bytes: &[u8]) -> Result<Vec<String>> {
    contain_panics(|| extract_pages(bytes))
}

/// Run a parse, turning a panic inside lopdf into a `ParseFailure`.
///
/// The default panic hook still reports the panic on stderr before it is
/// caught here.
fn contain_panics<F>(parse: F) -> Result<Vec<String>>
where
    F: FnOnce() -> Result<Vec<String>> + panic::UnwindSafe,
{
    panic::catch_unwind(parse).unwrap_or_else(|_| {
        warn!("PDF parser panicked on malformed input");
        Err(ChatError::parse_failure("PDF", "parser aborted on malformed input"))
    })
}

fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    let document = Document::load_mem(bytes).map_err(|e| ChatError::parse_failure("PDF", e))?;

    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(ChatError::parse_failure("PDF", "document has no pages"));
    }

    let mut segments = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let text = document
            .extract_text(&[*page_number])
            .map_err(|e| ChatError::parse_failure("PDF", format!("page {page_number}: {e}")))?;
        segments.push(text.trim().to_string());
    }

    Ok(segments)
}

#[cfg(test)]
pub(crate) mod tests {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    use super::*;

    /// Build a minimal PDF with one Courier text line per page.
    pub(crate) fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn extracts_one_segment_per_page_in_order() {
        let bytes = pdf_with_pages(&["First page", "Second page"]);
        let segments = extract(&bytes).unwrap();

        assert_eq!(segments.len(), 2);
        assert!(segments[0].contains("First"));
        assert!(segments[1].contains("Second"));
    }

    #[test]
    fn parser_panic_becomes_a_parse_failure() {
        let err = contain_panics(|| panic!("xref offset out of range")).unwrap_err();

        match err {
            ChatError::ParseFailure { format, cause } => {
                assert_eq!(format, "PDF");
                assert!(cause.contains("malformed input"));
            }
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_a_parse_failure() {
        let err = extract(b"This is not a PDF").unwrap_err();
        assert!(matches!(err, ChatError::ParseFailure { ref format, .. } if format == "PDF"));
    }
}
