//! Writer health counters
//!
//! Write and rotation failures never reach the `write` caller, so these counters (together with
//! the `tracing` events emitted at the failure sites) are how a writer's health is observed.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Point-in-time view of a writer's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Bytes appended across all files
    pub bytes_written: u64,
    /// Entries appended across all files
    pub entries_written: u64,
    /// Entries discarded after a failed write, or written after close
    pub entries_dropped: u64,
    /// Completed rotations
    pub rotations: u64,
    /// Rotations that could not open the next file
    pub rotation_failures: u64,
    /// Files removed by retention
    pub files_pruned: u64,
    /// Files retention failed to remove
    pub prune_failures: u64,
    /// Entries still queued
    pub pending: usize,
    /// File currently receiving writes
    pub active_path: PathBuf,
    /// Bytes in the file currently receiving writes
    pub active_size: u64,
}

#[derive(Debug)]
struct ActiveInfo {
    path: PathBuf,
    size: Arc<AtomicU64>,
}

#[derive(Debug)]
pub(crate) struct Counters {
    pub(crate) bytes_written: AtomicU64,
    pub(crate) entries_written: AtomicU64,
    pub(crate) entries_dropped: AtomicU64,
    pub(crate) rotations: AtomicU64,
    pub(crate) rotation_failures: AtomicU64,
    pub(crate) files_pruned: AtomicU64,
    pub(crate) prune_failures: AtomicU64,
    active: Mutex<ActiveInfo>,
}

impl Counters {
    pub(crate) fn new(path: PathBuf, size: Arc<AtomicU64>) -> Self {
        Self {
            bytes_written: AtomicU64::new(0),
            entries_written: AtomicU64::new(0),
            entries_dropped: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            files_pruned: AtomicU64::new(0),
            prune_failures: AtomicU64::new(0),
            active: Mutex::new(ActiveInfo { path, size }),
        }
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn set_active(&self, path: PathBuf, size: Arc<AtomicU64>) {
        *self.active.lock() = ActiveInfo { path, size };
    }

    pub(crate) fn active_path(&self) -> PathBuf {
        self.active.lock().path.clone()
    }

    pub(crate) fn snapshot(&self, pending: usize) -> WriterStats {
        let (active_path, active_size) = {
            let active = self.active.lock();
            (active.path.clone(), active.size.load(Ordering::Acquire))
        };

        WriterStats {
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            entries_written: self.entries_written.load(Ordering::Relaxed),
            entries_dropped: self.entries_dropped.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_failures: self.rotation_failures.load(Ordering::Relaxed),
            files_pruned: self.files_pruned.load(Ordering::Relaxed),
            prune_failures: self.prune_failures.load(Ordering::Relaxed),
            pending,
            active_path,
            active_size,
        }
    }
}
