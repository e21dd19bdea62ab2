//! Configuration management for the harness.
//!
//! Configuration comes from an optional TOML file plus environment variables:
//! - `${VAR_NAME}` placeholders in the file are substituted on load
//! - `HARNESS_<SECTION>_<KEY>` variables override file values
//! - Every setting has a default; the Cosmos DB endpoint is the only value
//!   required when `store_target = "cosmosdb"`
//!
//! # Example Configuration
//!
//! ```toml
//! store_target = "cosmosdb"
//!
//! [application]
//! log_level = "info"
//!
//! [cosmosdb]
//! endpoint = "https://your-account.documents.azure.com:443/"
//! auth = "azure_cli"
//! tenant_id = "${HARNESS_TENANT_ID}"
//! database_name = "harness"
//! container_name = "people"
//!
//! [workload]
//! bulk_count = 1000
//! partition_key_values = ["1", "2", "3"]
//! hot_partition_key = "3"
//! default_ttl_seconds = 60
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CosmosAuth, CosmosDbConfig, HarnessConfig, LoggingConfig,
    MemoryStoreConfig, StoreTarget, WorkloadConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};

/// Serializes tests that read or mutate `HARNESS_*` environment variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
