//! Directory scanning and pruning

use crate::error::{Error, Result};
use crate::naming::NamePattern;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tokio::fs;
use tracing::{debug, warn};

/// What a directory scan found for one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Directory that was scanned
    pub dir: PathBuf,
    /// Day the sequence was recovered for
    pub date: NaiveDate,
    /// Every managed file, any day, oldest first
    pub paths: Vec<PathBuf>,
    /// Highest sequence in use for the scanned day
    pub max_sequence: Option<u32>,
}

impl ScanResult {
    /// First sequence number above every one in use for the scanned day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SequenceExhausted`] when `u32::MAX` is already in use.
    pub fn next_sequence(&self) -> Result<u32> {
        match self.max_sequence {
            None => Ok(0),
            Some(max) => max.checked_add(1).ok_or_else(|| Error::SequenceExhausted {
                dir: self.dir.clone(),
                date: self.date,
            }),
        }
    }
}

/// List the files in `dir` managed under `pattern` and recover the highest sequence used on
/// `today`.
///
/// Subdirectories and names that don't match are skipped. The returned paths are ordered by day,
/// then by sequence, which is creation order.
///
/// # Errors
///
/// Returns [`Error::Scan`] when the directory itself cannot be read.
pub async fn scan(dir: &Path, pattern: &NamePattern, today: NaiveDate) -> Result<ScanResult> {
    let scan_err = |source: std::io::Error| Error::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(scan_err)?;
    let mut found = Vec::new();
    let mut max_sequence = None;

    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => continue,
            Ok(_) => {}
            Err(_) => continue,
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some((date, sequence)) = pattern.parse(name) else {
            continue;
        };

        if date == today {
            max_sequence = max_sequence.max(Some(sequence));
        }
        found.push((date, sequence, entry.path()));
    }

    found.sort();

    Ok(ScanResult {
        dir: dir.to_path_buf(),
        date: today,
        paths: found.into_iter().map(|(_, _, path)| path).collect(),
        max_sequence,
    })
}

/// Result of a pruning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Files removed
    pub removed: usize,
    /// Files that could not be removed
    pub failed: usize,
}

/// Number of files to delete so that, with one more file created, at most `max_file_count`
/// remain
pub const fn prune_count(existing: usize, max_file_count: usize) -> usize {
    (existing + 1).saturating_sub(max_file_count)
}

/// Remove the first `count` of `paths`. Failures are reported and skipped.
pub async fn prune(paths: &[PathBuf], count: usize) -> PruneOutcome {
    let mut outcome = PruneOutcome::default();

    for path in paths.iter().take(count) {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!("Pruned log file {}", path.display());
                outcome.removed += 1;
            }
            Err(e) => {
                warn!("Failed to prune log file {}: {}", path.display(), e);
                outcome.failed += 1;
            }
        }
    }

    outcome
}
