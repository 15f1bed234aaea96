//! End-to-end behaviour of the rotating writer

use flogging_file::*;

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::tempdir;

const PREFIX: &str = "write_test-";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Managed files in `dir`, oldest first
fn log_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            let name = path.file_name().unwrap().to_str().unwrap();
            name.starts_with(PREFIX) && name.ends_with(".log")
        })
        .collect();
    files.sort();
    files
}

fn file_names(dir: &Path) -> Vec<String> {
    log_files(dir)
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect()
}

fn read_all(dir: &Path) -> String {
    log_files(dir)
        .iter()
        .map(|path| std::fs::read_to_string(path).unwrap())
        .collect()
}

fn size_config(dir: &Path, max_size: u64, max_file_count: usize) -> WriterConfig {
    WriterConfig::builder(dir, PREFIX)
        .size_model()
        .max_size(max_size)
        .max_file_count(max_file_count)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_writes_land_in_order() {
    let dir = tempdir().unwrap();
    let writer = RotatingWriter::new(size_config(dir.path(), 1024 * 1024, 10))
        .await
        .unwrap();

    for i in 0..1024 {
        let n = writer.write(format!("TestWriter_Write {i}\n").as_bytes()).unwrap();
        assert_eq!(n, format!("TestWriter_Write {i}\n").len());
    }
    writer.flush().await.unwrap();

    let content = read_all(dir.path());
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1024);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("TestWriter_Write {i}"));
    }

    let stats = writer.stats();
    assert_eq!(stats.entries_written, 1024);
    assert_eq!(stats.entries_dropped, 0);
    assert_eq!(stats.pending, 0);

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_first_file_uses_sequence_zero() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX).build().unwrap();

    let writer = RotatingWriter::with_clock(config, clock).await.unwrap();

    assert_eq!(
        writer.active_path(),
        dir.path().join("write_test-2024-01-01_0000.log")
    );
    assert!(writer.active_path().exists());
    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_date_rotation_on_new_day() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX).build().unwrap();
    let writer = RotatingWriter::with_clock(config, clock.clone()).await.unwrap();

    writer.write(b"day one\n").unwrap();
    writer.flush().await.unwrap();

    clock.advance_days(1);
    writer.write(b"day two\n").unwrap();
    writer.flush().await.unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["write_test-2024-01-01_0000.log", "write_test-2024-01-02_0000.log"]
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("write_test-2024-01-01_0000.log")).unwrap(),
        "day one\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("write_test-2024-01-02_0000.log")).unwrap(),
        "day two\n"
    );
    assert_eq!(writer.stats().rotations, 1);

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_date_rotation_continues_existing_sequence() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("write_test-2024-01-02_0005.log"), b"earlier run\n").unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX).build().unwrap();
    let writer = RotatingWriter::with_clock(config, clock.clone()).await.unwrap();

    clock.set(day(2024, 1, 2));
    writer.write(b"after midnight\n").unwrap();
    writer.flush().await.unwrap();

    assert_eq!(
        writer.active_path(),
        dir.path().join("write_test-2024-01-02_0006.log")
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("write_test-2024-01-02_0005.log")).unwrap(),
        "earlier run\n"
    );

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_date_model_ignores_size() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX)
        .date_model()
        .max_size(16)
        .max_file_count(1)
        .build()
        .unwrap();
    let writer = RotatingWriter::with_clock(config, clock).await.unwrap();

    for _ in 0..100 {
        writer.write(b"0123456789abcdef\n").unwrap();
    }
    writer.flush().await.unwrap();

    assert_eq!(log_files(dir.path()).len(), 1);
    assert_eq!(writer.stats().rotations, 0);
    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_size_rotation_bounds_file_size() {
    let dir = tempdir().unwrap();
    let writer = RotatingWriter::new(size_config(dir.path(), 1024, 10))
        .await
        .unwrap();

    let buf = [b'x'; 100];
    for _ in 0..30 {
        writer.write(&buf).unwrap();
    }
    writer.flush().await.unwrap();

    let files = log_files(dir.path());
    assert!(files.len() >= 2, "expected rotation, got {files:?}");

    let mut total = 0;
    for file in &files {
        let len = std::fs::metadata(file).unwrap().len();
        assert!(len <= 1024 + 100, "{} is {len} bytes", file.display());
        total += len;
    }
    assert_eq!(total, 3000);

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_size_model_ignores_date() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let writer = RotatingWriter::with_clock(size_config(dir.path(), 1024 * 1024, 10), clock.clone())
        .await
        .unwrap();

    writer.write(b"before\n").unwrap();
    writer.flush().await.unwrap();
    clock.advance_days(3);
    writer.write(b"after\n").unwrap();
    writer.flush().await.unwrap();

    assert_eq!(file_names(dir.path()), vec!["write_test-2024-01-01_0000.log"]);
    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_retention_keeps_at_most_max_file_count() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let writer = RotatingWriter::with_clock(size_config(dir.path(), 64, 3), clock)
        .await
        .unwrap();

    let buf = [b'y'; 64];
    for _ in 0..50 {
        writer.write(&buf).unwrap();
    }
    writer.flush().await.unwrap();

    let names = file_names(dir.path());
    assert_eq!(names.len(), 3, "{names:?}");
    // Newest files survive.
    assert_eq!(
        names,
        vec![
            "write_test-2024-01-01_0047.log",
            "write_test-2024-01-01_0048.log",
            "write_test-2024-01-01_0049.log",
        ]
    );

    let stats = writer.stats();
    assert_eq!(stats.rotations, 49);
    assert_eq!(stats.files_pruned, 47);
    assert_eq!(stats.prune_failures, 0);

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_retention_counts_preexisting_files() {
    let dir = tempdir().unwrap();
    for name in [
        "write_test-2023-12-30_0000.log",
        "write_test-2023-12-31_0000.log",
        "write_test-2023-12-31_0001.log",
    ] {
        std::fs::write(dir.path().join(name), b"old\n").unwrap();
    }
    std::fs::write(dir.path().join("unrelated.log"), b"keep me\n").unwrap();

    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let writer = RotatingWriter::with_clock(size_config(dir.path(), 8, 2), clock)
        .await
        .unwrap();

    writer.write(b"12345678").unwrap();
    writer.write(b"rotate!\n").unwrap();
    writer.flush().await.unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["write_test-2024-01-01_0000.log", "write_test-2024-01-01_0001.log"]
    );
    assert!(dir.path().join("unrelated.log").exists());

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_startup_recovers_sequence() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("write_test-2024-01-01_0003.log"), b"seed\n").unwrap();
    std::fs::write(dir.path().join("write_test-2023-12-31_0009.log"), b"seed\n").unwrap();
    std::fs::write(dir.path().join("write_test-notes.log"), b"seed\n").unwrap();

    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX).build().unwrap();
    let writer = RotatingWriter::with_clock(config, clock).await.unwrap();

    assert_eq!(
        writer.active_path(),
        dir.path().join("write_test-2024-01-01_0004.log")
    );

    writer.write(b"fresh\n").unwrap();
    writer.flush().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("write_test-2024-01-01_0003.log")).unwrap(),
        "seed\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("write_test-2024-01-01_0004.log")).unwrap(),
        "fresh\n"
    );

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_restart_never_reuses_a_file() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX).build().unwrap();

    for run in 0..3 {
        let writer = RotatingWriter::with_clock(config.clone(), clock.clone())
            .await
            .unwrap();
        writer.write(format!("run {run}\n").as_bytes()).unwrap();
        writer.flush().await.unwrap();
        writer.close().await.unwrap();
    }

    assert_eq!(
        file_names(dir.path()),
        vec![
            "write_test-2024-01-01_0000.log",
            "write_test-2024-01-01_0001.log",
            "write_test-2024-01-01_0002.log",
        ]
    );
}

#[tokio::test]
async fn test_startup_refuses_exhausted_sequence() {
    let dir = tempdir().unwrap();
    let last = dir.path().join("write_test-2024-01-01_4294967295.log");
    std::fs::write(&last, b"old\n").unwrap();

    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX).build().unwrap();
    let err = RotatingWriter::with_clock(config, clock).await.unwrap_err();

    assert!(matches!(err, Error::SequenceExhausted { .. }));
    assert_eq!(std::fs::read_to_string(&last).unwrap(), "old\n");
}

#[tokio::test]
async fn test_exhausted_sequence_keeps_current_file() {
    let dir = tempdir().unwrap();
    let seed = dir.path().join("write_test-2024-01-01_4294967294.log");
    std::fs::write(&seed, b"").unwrap();

    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let writer = RotatingWriter::with_clock(size_config(dir.path(), 8, 10), clock)
        .await
        .unwrap();
    let last = dir.path().join("write_test-2024-01-01_4294967295.log");
    assert_eq!(writer.active_path(), last);

    writer.write(b"12345678\n").unwrap();
    writer.write(b"second\n").unwrap();
    writer.flush().await.unwrap();

    let stats = writer.stats();
    assert_eq!(stats.rotations, 0);
    assert_eq!(stats.rotation_failures, 1);
    assert_eq!(stats.entries_written, 2);
    assert_eq!(writer.active_path(), last);
    assert_eq!(std::fs::read_to_string(&last).unwrap(), "12345678\nsecond\n");
    assert_eq!(std::fs::read_to_string(&seed).unwrap(), "");

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_failed_rotation_keeps_writing_previous_file() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(day(2024, 1, 1)));
    let config = WriterConfig::builder(dir.path(), PREFIX).build().unwrap();
    let writer = RotatingWriter::with_clock(config, clock.clone()).await.unwrap();

    writer.write(b"day one\n").unwrap();
    writer.flush().await.unwrap();

    // A directory squats on the next file name, so opening it fails.
    std::fs::create_dir(dir.path().join("write_test-2024-01-02_0000.log")).unwrap();
    clock.advance_days(1);
    writer.write(b"still day one\n").unwrap();
    writer.flush().await.unwrap();

    let first = dir.path().join("write_test-2024-01-01_0000.log");
    let stats = writer.stats();
    assert_eq!(stats.rotations, 0);
    assert_eq!(stats.rotation_failures, 1);
    assert_eq!(stats.entries_written, 2);
    assert_eq!(stats.entries_dropped, 0);
    assert_eq!(writer.active_path(), first);
    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        "day one\nstill day one\n"
    );

    // Once the name is free the next write rotates.
    std::fs::remove_dir(dir.path().join("write_test-2024-01-02_0000.log")).unwrap();
    writer.write(b"day two\n").unwrap();
    writer.flush().await.unwrap();

    assert_eq!(writer.stats().rotations, 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("write_test-2024-01-02_0000.log")).unwrap(),
        "day two\n"
    );

    writer.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers() {
    const TASKS: usize = 8;
    const WRITES: usize = 250;

    let dir = tempdir().unwrap();
    let writer = RotatingWriter::new(size_config(dir.path(), 4096, 1000))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let writer = writer.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..WRITES {
                let line = format!("<task-{task:02}-entry-{i:04}-payload-payload-payload>\n");
                writer.write(line.as_bytes()).unwrap();
                if i % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    writer.sync().unwrap();
    tokio::time::timeout(Duration::from_secs(10), writer.flush())
        .await
        .expect("drained")
        .unwrap();

    let content = read_all(dir.path());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for line in content.lines() {
        assert!(
            line.starts_with("<task-") && line.ends_with("-payload-payload-payload>"),
            "torn line: {line:?}"
        );
        *seen.entry(line.to_string()).or_default() += 1;
    }
    assert_eq!(seen.len(), TASKS * WRITES);
    assert!(seen.values().all(|count| *count == 1));

    // Per producer, order is preserved.
    for task in 0..TASKS {
        let tag = format!("<task-{task:02}-");
        let entries: Vec<&str> = content.lines().filter(|l| l.starts_with(&tag)).collect();
        for (i, line) in entries.iter().enumerate() {
            assert!(line.contains(&format!("-entry-{i:04}-")));
        }
    }

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_sync_does_not_wait_but_data_arrives() {
    let dir = tempdir().unwrap();
    let writer = RotatingWriter::new(size_config(dir.path(), 1024 * 1024, 10))
        .await
        .unwrap();

    writer.write(b"eventually\n").unwrap();
    writer.sync().unwrap();

    let path = writer.active_path();
    let arrived = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if std::fs::read_to_string(&path).unwrap_or_default() == "eventually\n" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(arrived.is_ok());

    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_close_is_idempotent_and_discards_later_writes() {
    let dir = tempdir().unwrap();
    let writer = RotatingWriter::new(size_config(dir.path(), 1024 * 1024, 10))
        .await
        .unwrap();

    writer.write(b"kept\n").unwrap();
    writer.flush().await.unwrap();

    writer.close().await.unwrap();
    writer.close().await.unwrap();
    assert!(writer.is_closed());

    assert_eq!(writer.write(b"lost\n").unwrap(), 5);
    assert!(matches!(writer.flush().await, Err(Error::Closed)));
    assert!(writer.sync().is_ok());

    assert_eq!(read_all(dir.path()), "kept\n");
    assert_eq!(writer.stats().entries_dropped, 1);
}

#[tokio::test]
async fn test_std_io_write_impls() {
    let dir = tempdir().unwrap();
    let mut writer = RotatingWriter::new(size_config(dir.path(), 1024 * 1024, 10))
        .await
        .unwrap();

    writeln!(writer, "via io::Write {}", 1).unwrap();
    writeln!(&writer, "via &RotatingWriter {}", 2).unwrap();
    std::io::Write::flush(&mut writer).unwrap();
    writer.flush().await.unwrap();

    assert_eq!(
        read_all(dir.path()),
        "via io::Write 1\nvia &RotatingWriter 2\n"
    );
    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_tracing_fmt_layer_writes_through() {
    let dir = tempdir().unwrap();
    let writer = RotatingWriter::new(size_config(dir.path(), 1024 * 1024, 10))
        .await
        .unwrap();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("hello from tracing");
    });
    writer.flush().await.unwrap();

    let content = read_all(dir.path());
    assert!(content.contains("hello from tracing"));
    assert!(content.contains("INFO"));
    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_creates_missing_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let writer = RotatingWriter::new(WriterConfig::builder(&nested, PREFIX).build().unwrap())
        .await
        .unwrap();

    assert!(nested.is_dir());
    assert_eq!(log_files(&nested).len(), 1);
    writer.close().await.unwrap();
}

#[tokio::test]
async fn test_directory_creation_failure() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let err = RotatingWriter::new(
        WriterConfig::builder(blocker.join("logs"), PREFIX)
            .build()
            .unwrap(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::CreateDirectory { .. }));
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let dir = tempdir().unwrap();
    let config = WriterConfig {
        dir: dir.path().to_path_buf(),
        prefix: PREFIX.to_string(),
        model: RotationModel::Size,
        max_size: 0,
        max_file_count: 1,
    };

    let err = RotatingWriter::new(config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(log_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_drop_stops_worker() {
    let dir = tempdir().unwrap();
    let writer = RotatingWriter::new(size_config(dir.path(), 1024 * 1024, 10))
        .await
        .unwrap();
    writer.write(b"before drop\n").unwrap();
    writer.flush().await.unwrap();
    drop(writer);

    // A new writer for the same directory takes the next sequence.
    let writer = RotatingWriter::new(size_config(dir.path(), 1024 * 1024, 10))
        .await
        .unwrap();
    assert_eq!(log_files(dir.path()).len(), 2);
    writer.close().await.unwrap();
}
