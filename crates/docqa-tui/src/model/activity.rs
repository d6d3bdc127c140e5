use std::collections::VecDeque;

use chrono::{DateTime, Local};
use tracing::Level;

/// Lines kept in the activity log.
pub const ACTIVITY_CAPACITY: usize = 200;

/// One line of the in-app activity log.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub at: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl ActivityEntry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            level,
            message: message.into(),
        }
    }
}

/// Bounded ring of recent activity, newest last.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: ActivityEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ActivityEntry::new(Level::INFO, message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(ActivityEntry::new(Level::WARN, message));
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
