//! Builds the prompt for one question from the session state.
//!
//! The whole loaded document is inlined into the system entry; there is no
//! retrieval step. Size is bounded once, at load time, by the document cap.

use super::ConversationState;
use crate::llm::ChatMessage;

pub const DOCUMENT_START: &str = "=== DOCUMENT CONTENT ===";
pub const DOCUMENT_END: &str = "=== END OF DOCUMENT ===";

const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful and friendly conversational assistant.";

const DOCUMENT_INSTRUCTIONS: &str = "Instructions:
- If the user asks for a summary, an analysis, or asks questions about the document, use the content above
- If the user asks a general question unrelated to the document, answer normally
- Be precise and rely on the document content when it is relevant
- State clearly whether your answer is based on the document or not";

/// Assemble the messages for `question`: a system entry, then every prior
/// turn in order, then the question itself.
pub fn assemble(state: &ConversationState, question: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(state.turns().len() * 2 + 2);
    messages.push(ChatMessage::system(system_prompt(state)));

    for turn in state.turns() {
        messages.push(ChatMessage::user(turn.question.as_str()));
        messages.push(ChatMessage::assistant(turn.answer.as_str()));
    }

    messages.push(ChatMessage::user(question));
    messages
}

fn system_prompt(state: &ConversationState) -> String {
    let Some(document) = state.document() else {
        return GENERAL_SYSTEM_PROMPT.to_string();
    };

    let mut prompt = format!(
        "You are an intelligent conversational assistant. A document has been loaded; here is its content:\n\n\
         {DOCUMENT_START}\n{}\n{DOCUMENT_END}\n\n",
        document.text
    );

    if let Some(original_chars) = document.original_chars {
        prompt.push_str(&format!(
            "Note: the document was truncated to its first {} of {} characters. \
             Say so when an answer may depend on the missing part.\n\n",
            document.text.chars().count(),
            original_chars
        ));
    }

    prompt.push_str(DOCUMENT_INSTRUCTIONS);
    prompt
}
