//! Azure Cosmos DB store backend

pub mod adapter;
pub mod client;

pub use adapter::CosmosDbAdapter;
pub use client::CosmosDbClient;
