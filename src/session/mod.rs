//! Per-session conversation state and the components that drive it.

pub mod assembler;
pub mod controller;
pub mod registry;

use chrono::{DateTime, Local};

use crate::ingest::DocumentFormat;

/// Separator placed between ingested segments.
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// The document currently resident in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub name: String,
    pub format: DocumentFormat,
    pub text: String,
    pub segments: usize,
    /// Character count before truncation, when the text was cut.
    pub original_chars: Option<usize>,
}

impl LoadedDocument {
    /// Flatten ingested segments, keeping at most `max_chars` characters
    /// (0 keeps everything).
    pub fn from_segments(
        name: impl Into<String>,
        format: DocumentFormat,
        segments: &[String],
        max_chars: usize,
    ) -> Self {
        let mut text = segments.join(SEGMENT_SEPARATOR);
        let mut original_chars = None;

        if max_chars > 0 {
            if let Some((cut, _)) = text.char_indices().nth(max_chars) {
                original_chars = Some(text.chars().count());
                text.truncate(cut);
            }
        }

        Self {
            name: name.into(),
            format,
            text,
            segments: segments.len(),
            original_chars,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.original_chars.is_some()
    }
}

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    pub answered_at: DateTime<Local>,
}

/// Everything a session remembers between questions.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    document: Option<LoadedDocument>,
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn document_text(&self) -> Option<&str> {
        self.document.as_ref().map(|doc| doc.text.as_str())
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub(crate) fn replace_document(&mut self, document: LoadedDocument) -> &LoadedDocument {
        self.document.insert(document)
    }

    pub(crate) fn clear_document(&mut self) {
        self.document = None;
    }

    pub(crate) fn push_turn(&mut self, question: &str, answer: &str) {
        self.turns.push(Turn {
            question: question.to_string(),
            answer: answer.to_string(),
            answered_at: Local::now(),
        });
    }

    pub(crate) fn clear_turns(&mut self) {
        self.turns.clear();
    }
}
