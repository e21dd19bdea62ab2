//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - Shutdown signals reach every receiver
//! - A running query stops between pages once shutdown is requested
//! - The menu loop exits while waiting for input

use async_trait::async_trait;
use cosmos_harness::adapters::database::{
    DocumentStore, FieldPatch, QueryPage, QuerySpec, StoreResponse, StoreResult,
};
use cosmos_harness::adapters::memory::InMemoryStore;
use cosmos_harness::cli::commands::run::run_menu;
use cosmos_harness::cli::menu::Prompter;
use cosmos_harness::config::{MemoryStoreConfig, WorkloadConfig};
use cosmos_harness::core::OperationHarness;
use cosmos_harness::domain::{Document, ETag, ErrorClass, PartitionKeyValue, StoreError};
use cosmos_harness::generator::{PartitionStrategy, PersonGenerator};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::watch;

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

/// Store whose query raises the shutdown signal while the second page is
/// being fetched
struct SignallingQueryStore {
    shutdown_tx: watch::Sender<bool>,
}

#[async_trait]
impl DocumentStore for SignallingQueryStore {
    fn backend_name(&self) -> &str {
        "signalling"
    }

    async fn ensure_database_exists(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn ensure_container_exists(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_item(&self, _document: Document) -> StoreResult<StoreResponse<()>> {
        Err(StoreError::InvalidRequest("unsupported".to_string()))
    }

    async fn read_item(
        &self,
        id: &str,
        _partition_key: &PartitionKeyValue,
    ) -> StoreResult<StoreResponse<Document>> {
        Err(StoreError::NotFound(id.to_string()))
    }

    async fn patch_item(
        &self,
        _id: &str,
        _partition_key: &PartitionKeyValue,
        _patch: &FieldPatch,
    ) -> StoreResult<StoreResponse<()>> {
        Err(StoreError::InvalidRequest("unsupported".to_string()))
    }

    async fn replace_item(
        &self,
        _document: Document,
        _if_match: Option<&ETag>,
    ) -> StoreResult<StoreResponse<()>> {
        Err(StoreError::InvalidRequest("unsupported".to_string()))
    }

    fn query_items(&self, _query: QuerySpec) -> BoxStream<'_, StoreResult<QueryPage>> {
        stream::iter(0..5)
            .map(move |index| {
                if index == 1 {
                    let _ = self.shutdown_tx.send(true);
                }
                Ok(QueryPage {
                    items: vec![json!({ "id": index.to_string(), "partitionKey": "1" })],
                    request_charge: 1.0,
                    continuation: Some(index.to_string()),
                })
            })
            .boxed()
    }
}

#[tokio::test]
async fn test_query_stops_between_pages_on_shutdown() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let store = Arc::new(SignallingQueryStore { shutdown_tx });
    let harness = OperationHarness::new(store, shutdown_rx);

    let outcome = harness.query(QuerySpec::new("SELECT * FROM c")).await;

    // the in-flight page is kept, the remaining three are never fetched
    assert!(outcome.cancelled);
    assert!(!outcome.completed);
    assert_eq!(outcome.pages, 2);
    assert_eq!(outcome.item_count, 2);
    assert_eq!(outcome.error, Some(ErrorClass::Cancelled));
}

#[tokio::test]
async fn test_menu_exits_while_waiting_for_input() {
    let store = Arc::new(InMemoryStore::new(&MemoryStoreConfig::default()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let harness = OperationHarness::new(store, shutdown_rx.clone());
    harness.prepare().await.unwrap();

    // nothing is ever written, so reads stay pending
    let (_writer, reader) = tokio::io::duplex(64);
    let mut prompter = Prompter::new(BufReader::new(reader), false);
    let mut generator = PersonGenerator::new(PartitionStrategy::default());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = shutdown_tx.send(true);
    });

    let executed = tokio::time::timeout(
        Duration::from_secs(5),
        run_menu(
            &harness,
            &mut generator,
            &mut prompter,
            &WorkloadConfig::default(),
            shutdown_rx,
            Duration::ZERO,
        ),
    )
    .await
    .expect("menu loop should stop on shutdown");

    assert_eq!(executed, 0);
}
