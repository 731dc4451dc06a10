use std::fs;

use serial_test::serial;
use tempfile::tempdir;
use uninstall_by_name::logging::{file_appender, subscriber};

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    let appender = file_appender(&path).expect("open log file");
    tracing::subscriber::with_default(subscriber(false, Some(appender)), || {
        tracing::info!("Uninstalling Example.");
        tracing::debug!("hidden at info level");
    });

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("Uninstalling Example."));
    assert!(contents.starts_with("uninstall_by_name: "));
    assert!(!contents.contains("hidden at info level"));
}

#[test]
#[serial]
fn debug_lines_reach_the_file_when_enabled() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("debug.txt");

    let appender = file_appender(&path).expect("open log file");
    std::env::remove_var("RUST_LOG");
    tracing::subscriber::with_default(subscriber(true, Some(appender)), || {
        tracing::debug!("scanning uninstall root");
    });

    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("scanning uninstall root"));
}
