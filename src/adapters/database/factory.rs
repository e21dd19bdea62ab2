//! Document store factory
//!
//! Creates the store selected by `store_target`. The returned handle is
//! meant to be created once per process and shared.

use crate::adapters::cosmosdb::{CosmosDbAdapter, CosmosDbClient};
use crate::adapters::database::traits::DocumentStore;
use crate::adapters::memory::InMemoryStore;
use crate::config::schema::{HarnessConfig, StoreTarget};
use crate::domain::Result;
use std::sync::Arc;

/// Create a document store based on the configuration
///
/// # Errors
///
/// Returns [`crate::domain::HarnessError::Configuration`] if required
/// connection settings are missing, or
/// [`crate::domain::HarnessError::StoreConnection`] if the client cannot be
/// constructed.
///
/// # Example
///
/// ```rust
/// use cosmos_harness::adapters::database::create_document_store;
/// use cosmos_harness::config::{HarnessConfig, StoreTarget};
///
/// let config = HarnessConfig {
///     store_target: StoreTarget::Memory,
///     ..Default::default()
/// };
/// let store = create_document_store(&config)?;
/// assert_eq!(store.backend_name(), "memory");
/// # Ok::<(), cosmos_harness::domain::HarnessError>(())
/// ```
pub fn create_document_store(config: &HarnessConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store_target {
        StoreTarget::CosmosDB => {
            tracing::info!("Creating Cosmos DB client");
            let client = CosmosDbClient::new(config.cosmosdb.clone())?;
            Ok(Arc::new(CosmosDbAdapter::new(client)) as Arc<dyn DocumentStore>)
        }
        StoreTarget::Memory => {
            tracing::info!(
                page_size = config.memory.page_size,
                partition_rate_limit = ?config.memory.partition_rate_limit,
                "Creating in-memory store"
            );
            Ok(Arc::new(InMemoryStore::new(&config.memory)) as Arc<dyn DocumentStore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HarnessError;

    #[test]
    fn test_memory_target() {
        let config = HarnessConfig {
            store_target: StoreTarget::Memory,
            ..Default::default()
        };
        let store = create_document_store(&config).unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_cosmos_target_without_endpoint_fails() {
        let config = HarnessConfig::default();
        let err = create_document_store(&config).err().unwrap();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }
}
