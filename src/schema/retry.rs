//! Work queue for parsing the branches of a top-level union.
//!
//! The branches of a standalone union may refer to named types declared by
//! later branches. Branches that fail are moved to the back of the queue
//! and retried once another branch succeeds, since that success may have
//! registered the name they were missing.

use std::collections::VecDeque;

use serde_json::Value;

#[derive(Debug)]
struct QueuedBranch {
    value: Value,
    failed: bool,
    error: Option<String>,
}

/// FIFO of union branches still waiting to be parsed.
#[derive(Debug, Default)]
pub(crate) struct RetryQueue {
    queue: VecDeque<QueuedBranch>,
}

impl RetryQueue {
    /// Queue every branch, in document order.
    pub(crate) fn new(values: Vec<Value>) -> Self {
        let queue = values
            .into_iter()
            .map(|value| QueuedBranch {
                value,
                failed: false,
                error: None,
            })
            .collect();
        Self { queue }
    }

    /// Pop the next branch to try.
    ///
    /// Returns `None` when the queue is empty or when the front branch has
    /// already failed since the last success, which means a whole pass made
    /// no progress. A failed front branch stays queued so its error is still
    /// reported.
    pub(crate) fn dequeue(&mut self) -> Option<Value> {
        if self.queue.front()?.failed {
            return None;
        }
        self.queue.pop_front().map(|branch| branch.value)
    }

    /// Re-queue a branch at the back after a failed attempt.
    pub(crate) fn add_failed(&mut self, value: Value, error: String) {
        self.queue.push_back(QueuedBranch {
            value,
            failed: true,
            error: Some(error),
        });
    }

    /// Clear every failure mark after a branch succeeded.
    pub(crate) fn reset_failed(&mut self) {
        for branch in &mut self.queue {
            branch.failed = false;
            branch.error = None;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Error messages of the failed branches, comma separated.
    pub(crate) fn errors(&self) -> String {
        self.queue
            .iter()
            .filter(|branch| branch.failed)
            .filter_map(|branch| branch.error.as_deref())
            .collect::<Vec<_>>()
            .join(",")
    }
}
