//! Unbounded FIFO between producers and the single writer task
//!
//! Producers never block: `push` takes a short lock and `notify` stores at most one wake permit,
//! so any number of notifications between two wakes collapse into one. The queue has no capacity
//! bound; a producer rate above disk throughput grows it without limit. `len` exposes the depth.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};
use tracing::trace;

/// Something waiting for the writer task
#[derive(Debug)]
pub enum Entry {
    /// Bytes to append, copied from the caller
    Data(Vec<u8>),
    /// Completed once every entry queued before it has been written and flushed
    Barrier(oneshot::Sender<()>),
}

/// Pending entries plus a coalescing wake signal
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Mutex<VecDeque<Entry>>,
    wake: Notify,
}

impl PendingQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; never blocks on the consumer
    pub fn push(&self, entry: Entry) {
        self.entries.lock().push_back(entry);
    }

    /// Take the oldest entry
    pub fn pop(&self) -> Option<Entry> {
        self.entries.lock().pop_front()
    }

    /// Number of entries not yet taken
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Wake the consumer.
    ///
    /// `force` marks a caller asking for an immediate drain (`sync`); both kinds share the same
    /// single permit, so the wake is coalesced either way and the call returns at once.
    pub fn notify(&self, force: bool) {
        if force {
            trace!(pending = self.len(), "drain requested");
        }
        self.wake.notify_one();
    }

    /// Wait for the next wake
    pub async fn wait(&self) {
        self.wake.notified().await;
    }

    /// Drop every pending entry, returning how many data entries were discarded
    pub fn clear(&self) -> usize {
        let drained: Vec<Entry> = self.entries.lock().drain(..).collect();
        drained
            .iter()
            .filter(|entry| matches!(entry, Entry::Data(_)))
            .count()
    }
}
