//! Public rotating writer handle

use crate::active::ActiveFile;
use crate::clock::{Clock, SystemClock};
use crate::config::WriterConfig;
use crate::error::{Error, Result};
use crate::naming::{self, NamePattern};
use crate::queue::{Entry, PendingQueue};
use crate::scanner;
use crate::stats::{Counters, WriterStats};
use crate::worker::Worker;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::fmt::MakeWriter;

/// Asynchronous, self-rotating log file sink.
///
/// Any number of producers may call [`write`](Self::write) concurrently; one background task
/// appends the buffers in the order they were queued and rotates and prunes files according to
/// the [`WriterConfig`]. Cloning yields another handle onto the same task.
///
/// `write` never blocks and never reports I/O failures: an entry whose write fails is dropped and
/// reported through `tracing` and [`stats`](Self::stats). The queue is unbounded.
#[derive(Clone, Debug)]
pub struct RotatingWriter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: Arc<WriterConfig>,
    queue: Arc<PendingQueue>,
    counters: Arc<Counters>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<ActiveFile>>>,
    closed: AtomicBool,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl RotatingWriter {
    /// Create a writer using the local calendar day as the period.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the directory cannot be created or scanned, today's
    /// sequence numbers are used up, the first file cannot be opened, or no tokio runtime is
    /// running.
    pub async fn new(config: WriterConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Create a writer that takes "today" from `clock`.
    ///
    /// # Errors
    ///
    /// See [`RotatingWriter::new`].
    pub async fn with_clock(config: WriterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()?;

        tokio::fs::create_dir_all(config.dir())
            .await
            .map_err(|source| Error::CreateDirectory {
                path: config.dir().to_path_buf(),
                source,
            })?;

        let pattern = NamePattern::new(&config.prefix)
            .map_err(|e| Error::Configuration(format!("invalid prefix: {e}")))?;

        let today = clock.today();
        let scan = scanner::scan(config.dir(), &pattern, today).await?;
        let sequence = scan.next_sequence()?;
        let path = naming::next_path(config.dir(), &config.prefix, today, sequence);
        let active = ActiveFile::open(path, today).await?;

        debug!(
            "Opened log file {} ({} existing files for prefix {:?})",
            active.path().display(),
            scan.paths.len(),
            config.prefix
        );

        let config = Arc::new(config);
        let queue = Arc::new(PendingQueue::new());
        let counters = Arc::new(Counters::new(
            active.path().to_path_buf(),
            active.size_handle(),
        ));
        let cancel = CancellationToken::new();

        let worker = Worker {
            config: Arc::clone(&config),
            pattern,
            clock,
            queue: Arc::clone(&queue),
            counters: Arc::clone(&counters),
            cancel: cancel.clone(),
            active,
        };
        let handle = runtime.spawn(worker.run());

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                queue,
                counters,
                cancel,
                worker: Mutex::new(Some(handle)),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Queue a copy of `buf` for appending and return at once with `buf.len()`.
    ///
    /// After [`close`](Self::close) the bytes are discarded.
    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        if self.inner.closed.load(Ordering::Acquire) {
            Counters::add(&self.inner.counters.entries_dropped, 1);
            return Ok(buf.len());
        }

        self.inner.queue.push(Entry::Data(buf.to_vec()));
        self.inner.queue.notify(false);
        Ok(buf.len())
    }

    /// Ask the writer task to drain now.
    ///
    /// Returns as soon as the request is posted; it does not wait for the data to reach the file.
    /// Use [`flush`](Self::flush) to wait.
    ///
    /// # Errors
    ///
    /// Never fails; the `Result` matches the sink contract.
    pub fn sync(&self) -> Result<()> {
        self.inner.queue.notify(true);
        Ok(())
    }

    /// Wait until everything queued before this call has been written and flushed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the writer is, or becomes, closed first.
    pub async fn flush(&self) -> Result<()> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }

        let (done, acked) = oneshot::channel();
        self.inner.queue.push(Entry::Barrier(done));
        self.inner.queue.notify(true);

        tokio::select! {
            biased;
            ack = acked => ack.map_err(|_| Error::Closed),
            () = self.inner.cancel.cancelled() => Err(Error::Closed),
        }
    }

    /// Stop the writer task and close the active file.
    ///
    /// Entries still queued are discarded, not written. Calling `close` again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer task panicked or the final flush of the file fails.
    pub async fn close(&self) -> Result<()> {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.cancel.cancel();

        let Some(handle) = self.inner.worker.lock().await.take() else {
            return Ok(());
        };

        let active = handle.await?;
        let discarded = self.inner.queue.clear();
        if discarded > 0 {
            Counters::add(&self.inner.counters.entries_dropped, discarded as u64);
            debug!("Discarded {} queued log entries on close", discarded);
        }

        active.close().await
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Entries queued but not yet written
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    /// The file currently receiving writes
    pub fn active_path(&self) -> PathBuf {
        self.inner.counters.active_path()
    }

    /// Counters describing the writer's health
    pub fn stats(&self) -> WriterStats {
        self.inner.counters.snapshot(self.inner.queue.len())
    }

    /// The configuration the writer was built with
    pub fn config(&self) -> &WriterConfig {
        &self.inner.config
    }
}

impl io::Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Self::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.queue.notify(true);
        Ok(())
    }
}

impl io::Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RotatingWriter::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.queue.notify(true);
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RotatingWriter {
    type Writer = &'a Self;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
