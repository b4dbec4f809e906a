//! Library log lines re-emitted through the process logger
//!
//! The logger is process-global, so these tests run serially.

use kafka_bridge::app::host::forward_library_log;
use kafka_bridge::callbacks::api::{log_callback, OpaqueRef};
use kafka_bridge::context::EventQueues;
use kafka_bridge::core::logging::{flush_logging, init_logging, reconfigure_logging};
use serial_test::serial;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static LOG_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

fn log_file() -> PathBuf {
    let dir = LOG_DIR.get_or_init(|| tempfile::tempdir().unwrap());
    let path = dir.path().join("bridge.log");
    static STARTED: OnceLock<()> = OnceLock::new();
    STARTED.get_or_init(|| {
        init_logging(Some("debug"), Some("ext"), Some(path.as_path()), false).unwrap();
    });
    path
}

/// Everything written to the log directory so far
fn logged_text(path: &Path) -> String {
    flush_logging();
    let dir = path.parent().unwrap();
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| std::fs::read_to_string(entry.ok()?.path()).ok())
        .collect()
}

fn forward(level: i32, facility: &str, message: &str) {
    let mut queues = EventQueues::new();
    queues.attach_log_queue(None);
    let context = queues.activate();
    log_callback(&OpaqueRef::new(&context), level, facility, message);
    let event = context.pop_log().unwrap().unwrap();
    forward_library_log(&event);
}

#[test]
#[serial]
fn test_library_log_reaches_file_with_facility_target() {
    let path = log_file();
    reconfigure_logging("debug").unwrap();

    forward(4, "BROKER", "connection refused by broker");

    let text = logged_text(&path);
    assert!(
        text.contains("WRN connection refused by broker (library/BROKER"),
        "got: {}",
        text
    );
}

#[test]
#[serial]
fn test_level_change_filters_library_debug() {
    let path = log_file();
    reconfigure_logging("warn").unwrap();

    forward(7, "PRODUCE", "debug line that should be filtered");
    forward(3, "FAIL", "error line that should pass");

    let text = logged_text(&path);
    assert!(!text.contains("debug line that should be filtered"));
    assert!(text.contains("ERR error line that should pass"));
}
