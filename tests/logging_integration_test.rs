//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so the
//! file logging checks share a single test.

use cosmos_harness::adapters::memory::InMemoryStore;
use cosmos_harness::config::{LoggingConfig, MemoryStoreConfig};
use cosmos_harness::core::OperationHarness;
use cosmos_harness::generator::{PartitionStrategy, PersonGenerator};
use cosmos_harness::logging::init_logging;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[tokio::test]
async fn test_operation_outcomes_are_written_to_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "hourly".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    assert!(log_path.is_dir());

    let store = Arc::new(InMemoryStore::new(&MemoryStoreConfig::default()));
    let (_tx, rx) = watch::channel(false);
    let harness = OperationHarness::new(store, rx);
    harness.prepare().await.unwrap();

    let person = PersonGenerator::new(PartitionStrategy::default()).generate();
    assert!(harness.create_record(&person).await.success);

    // flushes the non-blocking writer
    drop(guard);

    let contents: String = std::fs::read_dir(&log_path)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| std::fs::read_to_string(entry.path()).ok())
        .collect();
    assert!(contents.contains(&person.id));
    assert!(contents.contains("request_charge"));

    // a second subscriber cannot be installed
    assert!(init_logging("info", &LoggingConfig::default()).is_err());
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let err = init_logging("verbose", &LoggingConfig::default()).err().unwrap();
    assert!(err.to_string().contains("verbose"));
}
