//! Per-panel diagnostic ring buffer.
//!
//! Non-fatal problems (unreachable stylesheets, a failed engine repair) never
//! escape a refresh. They are logged through `tracing` and also kept here so the
//! embedding application can show them next to the panel.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DIAGNOSTICS_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warn,
}

/// A single diagnostic entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub id: u64,
    pub timestamp_ms: i64,
    pub level: DiagnosticLevel,
    pub source: String,
    pub message: String,
}

/// Bounded log of diagnostics; the oldest entry is evicted once full.
#[derive(Debug)]
pub struct Diagnostics {
    entries: VecDeque<DiagnosticEntry>,
    capacity: usize,
    next_id: u64,
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Record an entry and return its id. Ids keep increasing across `clear`.
    pub fn push(&mut self, level: DiagnosticLevel, source: &str, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(DiagnosticEntry {
            id,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            level,
            source: source.to_string(),
            message: message.into(),
        });
        id
    }

    pub(crate) fn warn(&mut self, source: &str, message: impl Into<String>) -> u64 {
        let message = message.into();
        tracing::warn!(source, "{message}");
        self.push(DiagnosticLevel::Warn, source, message)
    }

    pub(crate) fn info(&mut self, source: &str, message: impl Into<String>) -> u64 {
        let message = message.into();
        tracing::info!(source, "{message}");
        self.push(DiagnosticLevel::Info, source, message)
    }

    /// The `limit` most recent entries, oldest first (0 = all).
    pub fn entries(&self, limit: usize) -> Vec<DiagnosticEntry> {
        let skip = match limit {
            0 => 0,
            n => self.entries.len().saturating_sub(n),
        };
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DIAGNOSTICS_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
