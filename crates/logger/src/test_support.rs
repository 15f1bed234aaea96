//! Test support utilities
//!
//! This module provides a sink that captures formatted records in memory.
//! It's only available when the `test-support` feature is enabled.

use crate::sink::LogSink;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

/// A sink that keeps every write in memory
#[derive(Clone, Debug, Default)]
pub struct CaptureSink {
    inner: Arc<Captured>,
}

#[derive(Debug, Default)]
struct Captured {
    bytes: Mutex<Vec<u8>>,
    writes: AtomicUsize,
    syncs: AtomicUsize,
}

impl CaptureSink {
    /// Create an empty capture sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.bytes.lock()).into_owned()
    }

    /// Captured output split into lines, without terminators
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Check if the output contains `text`
    pub fn contains(&self, text: &str) -> bool {
        self.contents().contains(text)
    }

    /// Number of `write` calls
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Number of `sync` calls
    pub fn syncs(&self) -> usize {
        self.inner.syncs.load(Ordering::SeqCst)
    }

    /// Forget everything captured
    pub fn clear(&self) {
        self.inner.bytes.lock().clear();
        self.inner.writes.store(0, Ordering::SeqCst);
        self.inner.syncs.store(0, Ordering::SeqCst);
    }
}

impl LogSink for CaptureSink {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.bytes.lock().extend_from_slice(buf);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(buf.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.inner.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
