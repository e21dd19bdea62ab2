//! Core harness logic.
//!
//! - [`harness`] - [`OperationHarness`], the store operations and their outcomes
//! - [`command`] - [`HarnessCommand`], one value per menu action
//!
//! # Example
//!
//! ```rust
//! use cosmos_harness::adapters::memory::InMemoryStore;
//! use cosmos_harness::config::MemoryStoreConfig;
//! use cosmos_harness::core::{HarnessCommand, OperationHarness};
//! use cosmos_harness::generator::{PartitionStrategy, PersonGenerator};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let store = Arc::new(InMemoryStore::new(&MemoryStoreConfig::default()));
//! let harness = OperationHarness::new(store, shutdown_rx);
//! let mut generator = PersonGenerator::new(PartitionStrategy::default());
//!
//! let report = HarnessCommand::BulkWrite { count: 100 }
//!     .execute(&harness, &mut generator)
//!     .await;
//! println!("{}", report.summary());
//! # }
//! ```

pub mod command;
pub mod harness;

pub use command::{CommandReport, HarnessCommand};
pub use harness::OperationHarness;
