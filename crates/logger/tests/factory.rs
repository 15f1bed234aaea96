//! Tests for building logging from configuration

use flogging::*;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn log_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(prefix))
        })
        .collect();
    files.sort();
    files
}

fn read_all(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|path| std::fs::read_to_string(path).unwrap())
        .collect()
}

#[tokio::test]
async fn test_init_writes_to_files() {
    let dir = tempdir().unwrap();
    let mut factory = LoggingFactory::builder("info", "svc")
        .root_dir(dir.path())
        .build();

    let logging = factory.init().await.unwrap();
    let logger = logging.logger("api");
    logger.info("started");
    logger.debug("hidden");
    factory.writer().unwrap().flush().await.unwrap();

    let files = log_files(dir.path(), "svc");
    assert_eq!(files.len(), 1);

    let contents = read_all(&files);
    assert!(contents.contains("[api][INFO] ["));
    assert!(contents.contains("factory.rs:"));
    assert!(contents.ends_with("] \"started\"\n"));
    assert!(!contents.contains("hidden"));
    assert!(!contents.contains('\x1b'), "file output must not be colored");

    factory.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_empty_name_uses_stderr() {
    let mut factory = LoggingFactory::new(LoggingConfig::default());

    let logging = factory.init().await.unwrap();

    assert!(factory.writer().is_none());
    assert!(factory.logger("x").is_some());
    assert_eq!(logging.spec(), LogSpec::new(Level::Info));
    factory.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_apply_switches_files() {
    let dir = tempdir().unwrap();
    let mut factory = LoggingFactory::builder("info", "first")
        .root_dir(dir.path())
        .format("%{message}")
        .build();

    let logging = factory.init().await.unwrap();
    let logger = logging.logger("app");
    logger.info("one");
    let old_writer = factory.writer().unwrap().clone();

    factory
        .apply(|config| {
            config.name = "second".to_string();
            config.level = "debug".to_string();
        })
        .await
        .unwrap();
    logger.debug("two");
    factory.writer().unwrap().flush().await.unwrap();

    assert!(old_writer.is_closed());
    assert_eq!(read_all(&log_files(dir.path(), "first")), "one\n");
    assert_eq!(read_all(&log_files(dir.path(), "second")), "two\n");

    factory.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_apply_keeps_previous_setup() {
    let dir = tempdir().unwrap();
    let mut factory = LoggingFactory::builder("info", "keep")
        .root_dir(dir.path())
        .format("%{message}")
        .build();
    let logging = factory.init().await.unwrap();

    let result = factory
        .apply(|config| config.level = "verbose".to_string())
        .await;
    assert!(matches!(result, Err(Error::InvalidSpec { .. })));
    assert_eq!(factory.config().level, "info");

    logging.logger("app").info("still here");
    factory.writer().unwrap().flush().await.unwrap();
    assert_eq!(read_all(&log_files(dir.path(), "keep")), "still here\n");

    factory.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_size_model_rotates() {
    let dir = tempdir().unwrap();
    let mut factory = LoggingFactory::builder("info", "sized")
        .root_dir(dir.path())
        .format("%{message}")
        .size_model()
        .max_file_size(16)
        .max_file_num(2)
        .build();
    let logging = factory.init().await.unwrap();
    let logger = logging.logger("m");

    for i in 0..5 {
        logger.info(format_args!("entry number {i:02}"));
    }
    factory.writer().unwrap().flush().await.unwrap();

    let files = log_files(dir.path(), "sized");
    assert_eq!(files.len(), 2);
    assert_eq!(read_all(&files), "entry number 03\nentry number 04\n");

    factory.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_format_fails_init() {
    let mut factory = LoggingFactory::builder("info", "")
        .format("%{bogus}")
        .build();

    assert!(matches!(factory.init().await, Err(Error::Format(_))));
    assert!(factory.logging().is_none());
}

#[tokio::test]
async fn test_shutdown_before_init() {
    let mut factory = LoggingFactory::new(LoggingConfig::default());
    assert!(matches!(
        factory.shutdown().await,
        Err(Error::NotInitialized)
    ));
}

#[tokio::test]
async fn test_records_after_shutdown_are_dropped() {
    let dir = tempdir().unwrap();
    let mut factory = LoggingFactory::builder("info", "closed")
        .root_dir(dir.path())
        .format("%{message}")
        .build();
    let logging = factory.init().await.unwrap();
    let logger = logging.logger("m");

    logger.info("before");
    factory.shutdown().await.unwrap();
    logger.info("after");

    assert_eq!(read_all(&log_files(dir.path(), "closed")), "before\n");
}
