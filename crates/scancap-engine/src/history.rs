//! Bounded, newest-first history of negotiation results.

use std::collections::VecDeque;

use scancap_protocol::{NegotiationResult, ProtocolResult, results_to_json};
use tracing::trace;

use crate::config::DEFAULT_HISTORY_CAPACITY;

/// Most-recent-first ring of [`NegotiationResult`]s.
///
/// A capacity of zero keeps nothing.
#[derive(Debug, Clone)]
pub struct ErrorHistory {
    entries: VecDeque<NegotiationResult>,
    capacity: usize,
}

impl Default for ErrorHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ErrorHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Inserts at the front, evicting the oldest entries beyond capacity.
    pub fn record(&mut self, result: NegotiationResult) {
        trace!(
            cap = %result.capability,
            success = result.success,
            code = result.error_code,
            "recording negotiation result"
        );
        self.entries.push_front(result);
        self.entries.truncate(self.capacity);
    }

    /// Changes the capacity, evicting the oldest entries if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.entries.truncate(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a copy of the newest record.
    pub fn most_recent(&self) -> Option<NegotiationResult> {
        self.entries.front().cloned()
    }

    /// Returns copies of all records, newest first.
    pub fn all(&self) -> Vec<NegotiationResult> {
        self.entries.iter().cloned().collect()
    }

    /// The newest failed get or set, skipping support tests.
    pub fn most_recent_failure(&self) -> Option<NegotiationResult> {
        self.entries
            .iter()
            .find(|r| !r.success && !r.is_support_test())
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NegotiationResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Exports the history, newest first, as a JSON array.
    pub fn to_json(&self) -> ProtocolResult<String> {
        results_to_json(&self.all())
    }
}
