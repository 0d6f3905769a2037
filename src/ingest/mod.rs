pub mod pdf;
pub mod text;

use std::fmt;

use tracing::debug;

use crate::error::{ChatError, Result};

/// Document formats that can be loaded into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Pdf,
}

impl DocumentFormat {
    /// Resolve a file extension such as `.txt` or `PDF`.
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = extension.trim().trim_start_matches('.').to_lowercase();
        match normalized.as_str() {
            "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ChatError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Pdf => f.write_str("PDF"),
        }
    }
}

/// Extract the text segments of a document, one per logical unit (the whole
/// file for plain text, one per page for PDF), in source order, along with
/// the format the extension resolved to.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for unknown extensions and `ParseFailure`
/// when the content cannot be decoded or holds no text at all.
pub fn ingest(bytes: &[u8], extension: &str) -> Result<(DocumentFormat, Vec<String>)> {
    let format = DocumentFormat::from_extension(extension)?;

    let segments = match format {
        DocumentFormat::Text => text::extract(bytes)?,
        DocumentFormat::Pdf => pdf::extract(bytes)?,
    };

    if segments.iter().all(|segment| segment.trim().is_empty()) {
        return Err(ChatError::parse_failure(
            format.to_string(),
            "document contains no extractable text",
        ));
    }

    debug!("Extracted {} segment(s) from {} document", segments.len(), format);
    Ok((format, segments))
}
