//! Single-flight question pipeline.
//!
//! State machine: `Idle -> Pending -> (Succeeded -> Idle) | Failed`.
//! `Failed` holds the error until it is acknowledged or a new question is
//! submitted. A second submission while `Pending` is rejected, never queued.

use std::sync::Arc;

use crate::document::{DocumentHandle, DocumentId};
use crate::inference::{Answer, InferenceClient, InferenceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl QueryStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "waiting for answer",
            Self::Succeeded => "answered",
            Self::Failed => "failed",
        }
    }
}

/// Everything needed to run one inference request, and to recognise its
/// response when it settles.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    id: u64,
    document: Arc<DocumentHandle>,
    question: String,
    epoch: u64,
}

impl QueryTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn document(&self) -> &Arc<DocumentHandle> {
        &self.document
    }

    pub fn document_id(&self) -> DocumentId {
        self.document.id()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Conversation epoch the question was asked in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug)]
pub struct QueryPipeline {
    status: QueryStatus,
    in_flight: Option<u64>,
    next_id: u64,
    last_error: Option<InferenceError>,
}

impl Default for QueryPipeline {
    fn default() -> Self {
        Self {
            status: QueryStatus::Idle,
            in_flight: None,
            next_id: 1,
            last_error: None,
        }
    }
}

impl QueryPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn last_error(&self) -> Option<&InferenceError> {
        self.last_error.as_ref()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// `Idle`/`Failed` -> `Pending`. Returns `None` if already pending.
    pub(crate) fn begin(
        &mut self,
        document: Arc<DocumentHandle>,
        question: String,
        epoch: u64,
    ) -> Option<QueryTicket> {
        if self.is_pending() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.status = QueryStatus::Pending;
        self.in_flight = Some(id);
        self.last_error = None;
        Some(QueryTicket {
            id,
            document,
            question,
            epoch,
        })
    }

    /// Whether `ticket_id` is the request currently in flight.
    pub(crate) fn owns(&self, ticket_id: u64) -> bool {
        self.in_flight == Some(ticket_id)
    }

    /// `Pending -> Succeeded`. The caller records the answer, then calls
    /// [`finish`](Self::finish).
    pub(crate) fn succeed(&mut self) {
        self.status = QueryStatus::Succeeded;
        self.in_flight = None;
    }

    /// `Succeeded -> Idle`.
    pub(crate) fn finish(&mut self) {
        if self.status == QueryStatus::Succeeded {
            self.status = QueryStatus::Idle;
        }
    }

    /// `Pending -> Failed`, keeping the error for display.
    pub(crate) fn fail(&mut self, error: InferenceError) {
        self.status = QueryStatus::Failed;
        self.in_flight = None;
        self.last_error = Some(error);
    }

    /// Settle without surfacing anything (response for a discarded context).
    pub(crate) fn discard(&mut self) {
        self.in_flight = None;
        self.status = QueryStatus::Idle;
    }

    /// `Failed -> Idle` once the user has seen the error.
    pub fn acknowledge(&mut self) {
        if self.status == QueryStatus::Failed {
            self.status = QueryStatus::Idle;
            self.last_error = None;
        }
    }
}

/// Issue exactly one request for `ticket`.
pub async fn execute(
    client: &dyn InferenceClient,
    ticket: &QueryTicket,
) -> Result<Answer, InferenceError> {
    let started = std::time::Instant::now();
    let result = client.ask(ticket.document(), ticket.question()).await;
    match &result {
        Ok(_) => tracing::info!(
            ticket = ticket.id(),
            client = client.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answer received"
        ),
        Err(e) => tracing::warn!(
            ticket = ticket.id(),
            client = client.name(),
            error = %e,
            "inference failed"
        ),
    }
    result
}
