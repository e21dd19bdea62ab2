// Cosmos Harness - Azure Cosmos DB operations demo harness
// Copyright (c) 2025 Cosmos Harness Contributors
// Licensed under the MIT License

//! # Cosmos Harness
//!
//! An interactive harness that exercises the core document operations of
//! Azure Cosmos DB for NoSQL against generated person records, reporting
//! status codes and request-unit charges for every call.
//!
//! ## Overview
//!
//! The library provides:
//! - **Single writes** and **bulk writes** of generated [`domain::Person`] records
//! - **Point reads**, **field patches**, and **optimistic-concurrency replaces**
//! - **Per-item TTL** updates
//! - **Paged queries**, including cross-partition queries
//! - A **hot partition demo** that concentrates writes on one partition key
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and the interactive menu
//! - [`core`] - The operation harness and its commands
//! - [`adapters`] - Store backends (Azure Cosmos DB, in-memory)
//! - [`domain`] - Documents, identifiers, outcomes, and errors
//! - [`generator`] - Synthetic person records and partition strategies
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cosmos_harness::adapters::database::create_document_store;
//! use cosmos_harness::config::load_config;
//! use cosmos_harness::core::{HarnessCommand, OperationHarness};
//! use cosmos_harness::generator::{PartitionStrategy, PersonGenerator};
//! use tokio::sync::watch;
//!
//! # async fn example() -> cosmos_harness::domain::Result<()> {
//! let config = load_config("cosmos-harness.toml")?;
//! let store = create_document_store(&config)?;
//!
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//! let harness = OperationHarness::new(store, shutdown_rx);
//! harness.prepare().await?;
//!
//! let mut generator = PersonGenerator::new(PartitionStrategy::default());
//! let report = HarnessCommand::BulkWrite { count: 100 }
//!     .execute(&harness, &mut generator)
//!     .await;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible setup calls return [`domain::HarnessError`]. Store operations
//! never return errors to the caller: each produces a
//! [`domain::OperationOutcome`] carrying the status code, request charge,
//! and error class, so one failure does not stop a bulk run or the menu.
//!
//! ## Logging
//!
//! Logging uses the `tracing` crate. Every operation outcome is logged with
//! its document id, partition key, status code, and request charge.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod generator;
pub mod logging;
