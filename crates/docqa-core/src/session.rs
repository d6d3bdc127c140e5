//! Explicit application state: registry, conversation and pipeline, mutated
//! only through the operations below.
//!
//! Asynchronous work is split in two halves around this struct. [`Session::submit`]
//! records the question and hands out a [`QueryTicket`]; whoever runs the
//! request reports back through [`Session::settle`]. Document loading works the
//! same way with [`Gateway`](crate::Gateway) producing the handle and
//! [`Session::add_document`] committing it.

use std::sync::Arc;

use thiserror::Error;

use crate::conversation::{ConversationLog, PendingTurn, Turn};
use crate::document::{DocumentHandle, DocumentId};
use crate::inference::{Answer, InferenceError};
use crate::pipeline::{QueryPipeline, QueryStatus, QueryTicket};
use crate::registry::Registry;

/// Invalid-state rejections from [`Session::submit`]. Nothing is appended
/// and no request is made when one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid state: a question is already pending")]
    Pending,
    #[error("invalid state: no active document")]
    NoDocument,
    #[error("invalid state: question is empty")]
    EmptyQuestion,
}

/// What [`Session::settle`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// Answer appended after its question; the input can be cleared.
    Answered,
    /// Request failed; the question stays, no answer was appended.
    Failed(InferenceError),
    /// The conversation was reset while the request was in flight; the
    /// response was dropped and the pipeline is idle again.
    Stale,
    /// Not the request currently in flight.
    Ignored,
}

#[derive(Debug, Default)]
pub struct Session {
    registry: Registry,
    log: ConversationLog,
    pipeline: QueryPipeline,
    pending: Option<(u64, PendingTurn)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new document, make it active and start a fresh conversation.
    pub fn add_document(&mut self, handle: DocumentHandle) -> Arc<DocumentHandle> {
        let handle = Arc::new(handle);
        self.registry.add(Arc::clone(&handle));
        self.log.reset();
        tracing::debug!(document = %handle.id(), name = handle.name(), "document active");
        handle
    }

    /// Switch the active document. Unknown ids and re-selecting the current
    /// document are no-ops; a real switch clears the conversation.
    pub fn set_active(&mut self, id: DocumentId) -> bool {
        let changed = self.registry.set_active(id);
        if changed {
            self.log.reset();
            tracing::debug!(document = %id, "switched active document");
        }
        changed
    }

    /// "New chat": drop the transcript, keep the documents.
    pub fn new_chat(&mut self) {
        self.log.reset();
    }

    /// Ask about the active document.
    ///
    /// Appends the question immediately and moves the pipeline to `Pending`.
    /// The caller must run the returned ticket (see [`crate::pipeline::execute`])
    /// and report back via [`settle`](Self::settle).
    pub fn submit(&mut self, question: &str) -> Result<QueryTicket, SessionError> {
        let question = question.trim();
        if self.pipeline.is_pending() {
            return Err(SessionError::Pending);
        }
        let document = self
            .registry
            .active()
            .cloned()
            .ok_or(SessionError::NoDocument)?;
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let ticket = self
            .pipeline
            .begin(document, question.to_string(), self.log.epoch())
            .ok_or(SessionError::Pending)?;
        let token = self.log.append_pending(question);
        self.pending = Some((ticket.id(), token));
        tracing::debug!(ticket = ticket.id(), document = %ticket.document_id(), "question submitted");
        Ok(ticket)
    }

    /// Apply the outcome of the request identified by `ticket_id`.
    pub fn settle(&mut self, ticket_id: u64, result: Result<Answer, InferenceError>) -> Settled {
        if !self.pipeline.owns(ticket_id) {
            return Settled::Ignored;
        }
        let token = match self.pending.take() {
            Some((id, token)) if id == ticket_id => Some(token),
            _ => None,
        };

        let current = token.filter(|t| t.epoch() == self.log.epoch());
        let Some(token) = current else {
            tracing::debug!(ticket = ticket_id, "dropping response for a conversation that was reset");
            self.pipeline.discard();
            return Settled::Stale;
        };

        match result {
            Ok(answer) => {
                self.pipeline.succeed();
                self.log
                    .resolve_pending(token, Some(Turn::answer(answer.text, answer.sources)));
                self.pipeline.finish();
                Settled::Answered
            }
            Err(error) => {
                self.log.resolve_pending(token, None);
                self.pipeline.fail(error.clone());
                Settled::Failed(error)
            }
        }
    }

    /// Dismiss a failure so the pipeline shows `Idle` again.
    pub fn acknowledge_error(&mut self) {
        self.pipeline.acknowledge();
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn pipeline(&self) -> &QueryPipeline {
        &self.pipeline
    }

    pub fn status(&self) -> QueryStatus {
        self.pipeline.status()
    }

    pub fn active(&self) -> Option<&Arc<DocumentHandle>> {
        self.registry.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    fn handle(name: &str) -> DocumentHandle {
        DocumentHandle::from_path(name, b"%PDF".to_vec(), std::env::temp_dir().join(name))
    }

    fn answer(text: &str) -> Answer {
        Answer {
            text: text.to_string(),
            sources: None,
        }
    }

    #[test]
    fn adding_document_activates_it_and_clears_log() {
        let mut s = Session::new();
        s.add_document(handle("a.pdf"));
        let t = s.submit("hello").unwrap();
        s.settle(t.id(), Ok(answer("hi")));
        assert_eq!(s.log().len(), 2);

        let b = s.add_document(handle("b.pdf"));
        assert_eq!(s.active().map(|d| d.id()), Some(b.id()));
        assert!(s.log().is_empty());
    }

    #[test]
    fn switching_documents_always_empties_log() {
        let mut s = Session::new();
        let a = s.add_document(handle("a.pdf"));
        s.add_document(handle("b.pdf"));
        let t = s.submit("q").unwrap();
        s.settle(t.id(), Ok(answer("a")));
        assert!(!s.log().is_empty());
        assert!(s.set_active(a.id()));
        assert!(s.log().is_empty());
    }

    #[test]
    fn set_active_unknown_keeps_log_and_active() {
        let mut s = Session::new();
        let a = s.add_document(handle("a.pdf"));
        let t = s.submit("q").unwrap();
        s.settle(t.id(), Ok(answer("a")));
        assert!(!s.set_active(DocumentId::new()));
        assert_eq!(s.active().map(|d| d.id()), Some(a.id()));
        assert_eq!(s.log().len(), 2);
    }

    #[test]
    fn submit_without_document_is_invalid() {
        let mut s = Session::new();
        assert_eq!(s.submit("anything").unwrap_err(), SessionError::NoDocument);
        assert!(s.log().is_empty());
        assert_eq!(s.status(), QueryStatus::Idle);
    }

    #[test]
    fn submit_blank_question_is_invalid() {
        let mut s = Session::new();
        s.add_document(handle("a.pdf"));
        assert_eq!(s.submit("   ").unwrap_err(), SessionError::EmptyQuestion);
        assert!(s.log().is_empty());
    }

    #[test]
    fn submit_while_pending_adds_nothing() {
        let mut s = Session::new();
        s.add_document(handle("a.pdf"));
        let _t = s.submit("first").unwrap();
        let err = s.submit("second").unwrap_err();
        assert_eq!(err, SessionError::Pending);
        assert_eq!(s.log().len(), 1);
        assert_eq!(s.status(), QueryStatus::Pending);
    }

    #[test]
    fn question_then_answer() {
        let mut s = Session::new();
        s.add_document(handle("a.pdf"));
        let t = s.submit("What is covered?").unwrap();
        assert_eq!(s.log().turns(), &[Turn::question("What is covered?")]);
        assert_eq!(s.settle(t.id(), Ok(answer("Dental is covered."))), Settled::Answered);
        assert_eq!(s.log().turns()[1].role, Role::Answer);
        assert_eq!(s.log().turns()[1].text, "Dental is covered.");
        assert_eq!(s.status(), QueryStatus::Idle);
    }

    #[test]
    fn failure_keeps_question_only_and_allows_retry() {
        let mut s = Session::new();
        s.add_document(handle("a.pdf"));
        let t = s.submit("X").unwrap();
        let err = InferenceError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(s.settle(t.id(), Err(err.clone())), Settled::Failed(err));
        assert_eq!(s.log().turns(), &[Turn::question("X")]);
        assert_eq!(s.status(), QueryStatus::Failed);
        assert!(s.submit("X").is_ok());
    }

    #[test]
    fn answer_after_document_switch_is_discarded() {
        let mut s = Session::new();
        let a = s.add_document(handle("a.pdf"));
        s.add_document(handle("b.pdf"));
        let t = s.submit("about b").unwrap();
        s.set_active(a.id());
        assert_eq!(s.settle(t.id(), Ok(answer("late"))), Settled::Stale);
        assert!(s.log().is_empty());
        assert_eq!(s.status(), QueryStatus::Idle);
        assert!(s.pipeline().last_error().is_none());
    }

    #[test]
    fn failure_after_new_chat_is_discarded_silently() {
        let mut s = Session::new();
        s.add_document(handle("a.pdf"));
        let t = s.submit("q").unwrap();
        s.new_chat();
        let res = s.settle(t.id(), Err(InferenceError::Transport("down".into())));
        assert_eq!(res, Settled::Stale);
        assert_eq!(s.status(), QueryStatus::Idle);
    }

    #[test]
    fn unknown_ticket_is_ignored() {
        let mut s = Session::new();
        s.add_document(handle("a.pdf"));
        let t = s.submit("q").unwrap();
        assert_eq!(s.settle(t.id() + 100, Ok(answer("x"))), Settled::Ignored);
        assert_eq!(s.status(), QueryStatus::Pending);
        assert_eq!(s.settle(t.id(), Ok(answer("x"))), Settled::Answered);
        // Settling twice does nothing the second time.
        assert_eq!(s.settle(t.id(), Ok(answer("x"))), Settled::Ignored);
    }
}
