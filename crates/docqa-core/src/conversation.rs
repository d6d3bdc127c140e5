//! Question/answer transcript bound to the active document.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Question,
    Answer,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub text: String,
    #[serde(rename = "type")]
    pub role: Role,
    /// Page references reported alongside an answer, e.g. "Page 2, Page 3".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
}

impl Turn {
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Question,
            sources: None,
        }
    }

    pub fn answer(text: impl Into<String>, sources: Option<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Answer,
            sources,
        }
    }
}

/// Token for a question appended by [`ConversationLog::append_pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTurn {
    epoch: u64,
    index: usize,
}

impl PendingTurn {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Outcome of [`ConversationLog::resolve_pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The answer was placed right after its question.
    Appended,
    /// The question was settled without an answer (request failed).
    Closed,
    /// The log was reset since the question was asked; nothing was written.
    Stale,
}

/// Ordered turns for the current context.
///
/// Every [`reset`](Self::reset) bumps `epoch`, which lets in-flight work
/// detect that the conversation it belonged to is gone.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    epoch: u64,
    pending: Option<usize>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn reset(&mut self) {
        self.turns.clear();
        self.pending = None;
        self.epoch += 1;
    }

    /// Phase one: record the question immediately and hand back a token.
    pub fn append_pending(&mut self, question: impl Into<String>) -> PendingTurn {
        let index = self.turns.len();
        self.turns.push(Turn::question(question));
        self.pending = Some(index);
        PendingTurn {
            epoch: self.epoch,
            index,
        }
    }

    /// Phase two: settle a pending question with its answer, or with nothing
    /// on failure.
    pub fn resolve_pending(&mut self, token: PendingTurn, answer: Option<Turn>) -> Resolution {
        if token.epoch != self.epoch || self.pending != Some(token.index) {
            return Resolution::Stale;
        }
        self.pending = None;
        match answer {
            Some(turn) => {
                self.turns.insert(token.index + 1, turn);
                Resolution::Appended
            }
            None => Resolution::Closed,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_answer(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::Answer)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
