use tempfile::TempDir;

use servint::logging::{LoggingError, init_logging};

// Logger state is process-global, so the whole lifecycle lives in one test.
#[test]
fn init_is_idempotent_and_rejects_conflicting_setups() {
    let tmp = TempDir::new().expect("tmp");
    let dir = tmp.path().join("logs");

    assert!(matches!(
        init_logging("chatty", &dir),
        Err(LoggingError::Level(level)) if level == "chatty"
    ));
    assert!(!dir.exists());

    init_logging("Info", &dir).expect("first init");
    assert!(dir.is_dir());
    init_logging("info", &dir).expect("same setup again");

    assert!(matches!(
        init_logging("debug", &dir),
        Err(LoggingError::AlreadyInitialized { level, .. }) if level == "info"
    ));
    assert!(matches!(
        init_logging("info", tmp.path().join("elsewhere")),
        Err(LoggingError::AlreadyInitialized { .. })
    ));

    log::info!("event=test_marker");
    log::logger().flush();
    let files: Vec<_> = std::fs::read_dir(&dir)
        .expect("read log dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("servint"))
        .collect();
    assert!(!files.is_empty());
}
