use std::sync::Arc;

use tracing::{debug, info, warn};

use super::assembler::assemble;
use super::{ConversationState, LoadedDocument};
use crate::error::Result;
use crate::ingest;
use crate::llm::AnswerService;

/// Drives one session: loads documents, answers questions, and owns the
/// session's `ConversationState`.
///
/// Every operation takes `&mut self`, so operations on one session run one
/// at a time, and each either completes or leaves the state as it was.
pub struct SessionController {
    state: ConversationState,
    answers: Arc<dyn AnswerService>,
    max_document_chars: usize,
}

impl SessionController {
    pub fn new(answers: Arc<dyn AnswerService>, max_document_chars: usize) -> Self {
        Self {
            state: ConversationState::new(),
            answers,
            max_document_chars,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Replace the session's document with the content of `bytes`.
    ///
    /// On error the previous document (if any) stays loaded.
    pub fn load_document(
        &mut self,
        name: &str,
        bytes: &[u8],
        extension: &str,
    ) -> Result<&LoadedDocument> {
        let (format, segments) = ingest::ingest(bytes, extension).map_err(|e| {
            warn!("Failed to load {}: {}", name, e);
            e
        })?;

        let document =
            LoadedDocument::from_segments(name, format, &segments, self.max_document_chars);
        if let Some(original_chars) = document.original_chars {
            warn!(
                "Document {} truncated from {} to {} characters",
                name, original_chars, self.max_document_chars
            );
        }
        info!(
            "Loaded {} document {} ({} segment(s), {} bytes of text)",
            format,
            name,
            document.segments,
            document.text.len()
        );

        Ok(self.state.replace_document(document))
    }

    /// Ask one question in the context of the loaded document and history.
    ///
    /// The turn is recorded only when an answer comes back.
    pub async fn ask_question(&mut self, question: &str) -> Result<String> {
        let messages = assemble(&self.state, question);
        debug!(
            "Asking {} with {} message(s), {} prior turn(s), {} bytes of document",
            self.answers.describe(),
            messages.len(),
            self.state.turns().len(),
            self.state.document_text().map_or(0, str::len)
        );

        let answer = self.answers.complete(&messages).await.map_err(|e| {
            warn!("Question failed: {}", e);
            e
        })?;

        self.state.push_turn(question, &answer);
        Ok(answer)
    }

    pub fn reset_conversation(&mut self) {
        info!("Conversation reset ({} turn(s) dropped)", self.state.turns().len());
        self.state.clear_turns();
    }

    pub fn clear_documents(&mut self) {
        if let Some(document) = self.state.document() {
            info!("Unloading document {}", document.name);
        }
        self.state.clear_document();
    }
}
