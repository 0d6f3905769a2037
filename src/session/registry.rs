use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::controller::SessionController;
use crate::llm::AnswerService;

/// Owns every live session, keyed by session name.
///
/// Sessions share the answer service, which holds no per-session state;
/// each keeps its own `ConversationState`.
pub struct SessionRegistry {
    sessions: HashMap<String, SessionController>,
    answers: Arc<dyn AnswerService>,
    max_document_chars: usize,
}

impl SessionRegistry {
    pub fn new(answers: Arc<dyn AnswerService>, max_document_chars: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            answers,
            max_document_chars,
        }
    }

    /// Get the session with this id, starting an empty one if needed.
    pub fn get_or_create(&mut self, id: &str) -> &mut SessionController {
        let answers = &self.answers;
        let max_document_chars = self.max_document_chars;
        self.sessions.entry(id.to_string()).or_insert_with(|| {
            debug!("Starting session {}", id);
            SessionController::new(Arc::clone(answers), max_document_chars)
        })
    }

    pub fn get(&self, id: &str) -> Option<&SessionController> {
        self.sessions.get(id)
    }

    /// End a session, discarding its state.
    pub fn remove(&mut self, id: &str) -> Option<SessionController> {
        let removed = self.sessions.remove(id);
        if removed.is_some() {
            debug!("Ended session {}", id);
        }
        removed
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sessions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}
