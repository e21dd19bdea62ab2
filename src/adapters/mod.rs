//! Store backends for the harness.
//!
//! - [`database`] - Store interface and factory
//! - [`cosmosdb`] - Azure Cosmos DB implementation
//! - [`memory`] - In-memory implementation for tests and offline runs
//!
//! # Design Pattern
//!
//! Adapters isolate the client libraries behind [`database::DocumentStore`],
//! so the harness never handles SDK types and can be tested against the
//! in-memory store.
//!
//! ```rust
//! use cosmos_harness::adapters::database::DocumentStore;
//! use cosmos_harness::adapters::memory::InMemoryStore;
//! use cosmos_harness::config::MemoryStoreConfig;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new(&MemoryStoreConfig::default()));
//! assert_eq!(store.backend_name(), "memory");
//! ```

pub mod cosmosdb;
pub mod database;
pub mod memory;
