//! The single task that owns the active file
//!
//! All file I/O and every rotation decision happen here, one entry at a time, in queue order.
//! A rotation opens the next file before closing the previous one, so two handles are open for
//! the length of that close.

use crate::active::ActiveFile;
use crate::clock::Clock;
use crate::config::{RotationModel, WriterConfig};
use crate::error::Result;
use crate::naming::{self, NamePattern};
use crate::policy;
use crate::queue::{Entry, PendingQueue};
use crate::scanner;
use crate::stats::Counters;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

pub(crate) struct Worker {
    pub(crate) config: Arc<WriterConfig>,
    pub(crate) pattern: NamePattern,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) queue: Arc<PendingQueue>,
    pub(crate) counters: Arc<Counters>,
    pub(crate) cancel: CancellationToken,
    pub(crate) active: ActiveFile,
}

impl Worker {
    /// Run until cancelled, then hand the active file back for closing
    pub(crate) async fn run(mut self) -> ActiveFile {
        debug!("Rotating writer started on {}", self.active.path().display());

        let queue = Arc::clone(&self.queue);
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = queue.wait() => self.drain().await,
            }
        }

        debug!("Rotating writer stopped on {}", self.active.path().display());
        self.active
    }

    async fn drain(&mut self) {
        while !self.cancel.is_cancelled() {
            let Some(entry) = self.queue.pop() else {
                break;
            };

            match entry {
                Entry::Data(buf) => self.write_entry(&buf).await,
                Entry::Barrier(done) => {
                    if let Err(e) = self.active.flush().await {
                        warn!("{}", e);
                    }
                    let _ = done.send(());
                }
            }
        }
    }

    async fn write_entry(&mut self, buf: &[u8]) {
        let today = self.clock.today();

        if policy::must_rotate(&self.active, &self.config, today) {
            if let Err(e) = self.rotate(today).await {
                // Keep going on the previous file.
                error!(
                    "Failed to rotate log file {}: {}",
                    self.active.path().display(),
                    e
                );
                Counters::add(&self.counters.rotation_failures, 1);
            }
        }

        match self.active.write(buf).await {
            Ok(()) => {
                Counters::add(&self.counters.bytes_written, buf.len() as u64);
                Counters::add(&self.counters.entries_written, 1);
            }
            Err(e) => {
                warn!(
                    "Dropped {} byte log entry, write to {} failed: {}",
                    buf.len(),
                    self.active.path().display(),
                    e
                );
                Counters::add(&self.counters.entries_dropped, 1);
            }
        }
    }

    async fn rotate(&mut self, today: NaiveDate) -> Result<()> {
        let scan = scanner::scan(self.config.dir(), &self.pattern, today).await?;
        let path = naming::next_path(
            self.config.dir(),
            &self.config.prefix,
            today,
            scan.next_sequence()?,
        );

        // Open first so a failure leaves the current file in place. Both handles are open until
        // the previous one is closed below; only the new one receives writes.
        let next = ActiveFile::open(path, today).await?;
        let previous = std::mem::replace(&mut self.active, next);
        self.counters
            .set_active(self.active.path().to_path_buf(), self.active.size_handle());
        Counters::add(&self.counters.rotations, 1);

        debug!(
            "Rotated log file {} -> {}",
            previous.path().display(),
            self.active.path().display()
        );

        let previous_path = previous.path().to_path_buf();
        if let Err(e) = previous.close().await {
            warn!("Failed to close rotated log file {}: {}", previous_path.display(), e);
        }

        if self.config.model == RotationModel::Size {
            self.prune(&scan.paths).await;
        }

        Ok(())
    }

    /// Remove the oldest of `existing` so that, with the file just opened, at most
    /// `max_file_count` remain. Failures are counted and do not undo the rotation.
    async fn prune(&self, existing: &[PathBuf]) {
        let count = scanner::prune_count(existing.len(), self.config.max_file_count);
        if count == 0 {
            return;
        }

        let outcome = scanner::prune(existing, count).await;
        Counters::add(&self.counters.files_pruned, outcome.removed as u64);
        Counters::add(&self.counters.prune_failures, outcome.failed as u64);
    }
}
