//! Store abstraction layer
//!
//! A trait-based interface over document stores so the harness works the
//! same against Cosmos DB and the in-memory store.

pub mod factory;
pub mod traits;

pub use factory::create_document_store;
pub use traits::{DocumentStore, FieldPatch, QueryPage, QuerySpec, StoreResponse, StoreResult};
