//! In-memory document store
//!
//! Used for tests and for running the harness offline with
//! `store_target = "memory"`.

pub mod store;

pub use store::InMemoryStore;
