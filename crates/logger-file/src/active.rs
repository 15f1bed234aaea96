//! The file currently receiving writes

use crate::error::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// One open log file, its period and the bytes written to it since creation
#[derive(Debug)]
pub struct ActiveFile {
    path: PathBuf,
    date: NaiveDate,
    file: File,
    size: Arc<AtomicU64>,
}

impl ActiveFile {
    /// Open (or create) `path` for appending, stamped with `date`.
    ///
    /// The counter starts at the file's current length so a reopened file keeps counting.
    pub async fn open(path: PathBuf, date: NaiveDate) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;

        let existing = match file.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(_) => 0,
        };

        Ok(Self {
            path,
            date,
            file,
            size: Arc::new(AtomicU64::new(existing)),
        })
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Day the file was created for
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Bytes written since creation
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    /// Shared handle to the byte counter, for reading from outside the writer task
    pub fn size_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.size)
    }

    /// Append a whole buffer and count it.
    ///
    /// The buffer is flushed before returning, so an error belongs to this buffer and a failed
    /// buffer is not counted.
    pub async fn write(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.file.write_all(buf).await?;
        self.file.flush().await?;
        self.size.fetch_add(buf.len() as u64, Ordering::AcqRel);
        Ok(())
    }

    /// Push buffered data down to the OS
    pub async fn flush(&mut self) -> Result<()> {
        self.file
            .flush()
            .await
            .map_err(|e| Error::Io("error flushing log file", e))
    }

    /// Flush and release the handle
    pub async fn close(mut self) -> Result<()> {
        self.flush().await?;
        self.file
            .sync_data()
            .await
            .map_err(|e| Error::Io("error syncing log file", e))
    }
}
