//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML
//! file. Every section has defaults, so an empty file (or no file at all,
//! with values supplied through the environment) is a valid starting point.

use crate::config::SecretString;
use serde::Deserialize;

/// Which document store backs the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreTarget {
    /// Azure Cosmos DB
    #[default]
    CosmosDB,
    /// Process-local in-memory store
    Memory,
}

impl std::str::FromStr for StoreTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosmosdb" | "cosmos" => Ok(StoreTarget::CosmosDB),
            "memory" | "in-memory" => Ok(StoreTarget::Memory),
            other => Err(format!(
                "Invalid store target '{other}'. Must be one of: cosmosdb, memory"
            )),
        }
    }
}

/// How the Cosmos DB client authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CosmosAuth {
    /// Account key
    Key,
    /// Entra ID token from the Azure CLI login, honoring `tenant_id`
    #[default]
    AzureCli,
    /// Entra ID token from the host's managed identity
    ManagedIdentity,
}

impl std::str::FromStr for CosmosAuth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "key" => Ok(CosmosAuth::Key),
            "azure_cli" | "cli" => Ok(CosmosAuth::AzureCli),
            "managed_identity" => Ok(CosmosAuth::ManagedIdentity),
            other => Err(format!(
                "Invalid cosmosdb.auth '{other}'. Must be one of: key, azure_cli, managed_identity"
            )),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HarnessConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Store backend (cosmosdb or memory)
    #[serde(default)]
    pub store_target: StoreTarget,

    /// Azure Cosmos DB connection (required when store_target = cosmosdb)
    #[serde(default)]
    pub cosmosdb: CosmosDbConfig,

    /// In-memory store settings
    #[serde(default)]
    pub memory: MemoryStoreConfig,

    /// Demo workload settings
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HarnessConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;

        // Only the active store section is validated
        match self.store_target {
            StoreTarget::CosmosDB => self.cosmosdb.validate()?,
            StoreTarget::Memory => self.memory.validate()?,
        }

        self.workload.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Azure Cosmos DB configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CosmosDbConfig {
    /// Account endpoint, e.g. `https://account.documents.azure.com:443/`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Authentication method
    #[serde(default)]
    pub auth: CosmosAuth,

    /// Account key (required when auth = key)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub key: Option<SecretString>,

    /// Entra tenant hint for Azure CLI authentication
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Database name
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Container name
    #[serde(default = "default_container_name")]
    pub container_name: String,

    /// Partition key path used when the container is created
    #[serde(default = "default_partition_key_path")]
    pub partition_key_path: String,
}

impl CosmosDbConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let endpoint = match self.endpoint.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e,
            _ => {
                return Err(
                    "cosmosdb.endpoint is required when store_target = 'cosmosdb' \
                     (set it in the config file or HARNESS_COSMOSDB_ENDPOINT)"
                        .to_string(),
                )
            }
        };

        let url = url::Url::parse(endpoint)
            .map_err(|e| format!("cosmosdb.endpoint '{endpoint}' is not a valid URL: {e}"))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err("cosmosdb.endpoint must start with https:// or http://".to_string());
        }

        if self.auth == CosmosAuth::Key
            && self
                .key
                .as_ref()
                .map(|k| k.expose_secret().is_empty())
                .unwrap_or(true)
        {
            return Err("cosmosdb.key cannot be empty when auth = 'key'".to_string());
        }

        if self.database_name.trim().is_empty() {
            return Err("cosmosdb.database_name cannot be empty".to_string());
        }

        if self.container_name.trim().is_empty() {
            return Err("cosmosdb.container_name cannot be empty".to_string());
        }

        if !self.partition_key_path.starts_with('/') || self.partition_key_path.len() < 2 {
            return Err(format!(
                "cosmosdb.partition_key_path must look like '/field', got '{}'",
                self.partition_key_path
            ));
        }

        Ok(())
    }
}

impl Default for CosmosDbConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth: CosmosAuth::default(),
            key: None,
            tenant_id: None,
            database_name: default_database_name(),
            container_name: default_container_name(),
            partition_key_path: default_partition_key_path(),
        }
    }
}

/// In-memory store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryStoreConfig {
    /// Items per query page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Requests per partition per second before requests are throttled (429)
    #[serde(default)]
    pub partition_rate_limit: Option<u32>,
}

impl MemoryStoreConfig {
    fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 {
            return Err("memory.page_size must be > 0".to_string());
        }
        if self.partition_rate_limit == Some(0) {
            return Err("memory.partition_rate_limit must be > 0 when set".to_string());
        }
        Ok(())
    }
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            partition_rate_limit: None,
        }
    }
}

/// Demo workload configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    /// Documents written by the bulk and hot-partition actions
    #[serde(default = "default_bulk_count")]
    pub bulk_count: usize,

    /// Partition key values drawn by the distributed strategy
    #[serde(default = "default_partition_key_values")]
    pub partition_key_values: Vec<String>,

    /// Partition key suggested for the hot-partition demo
    #[serde(default = "default_hot_partition_key")]
    pub hot_partition_key: String,

    /// TTL applied when the operator leaves the TTL prompt blank
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: i32,
}

impl WorkloadConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=100_000).contains(&self.bulk_count) {
            return Err(format!(
                "workload.bulk_count must be between 1 and 100000, got {}",
                self.bulk_count
            ));
        }

        if self.partition_key_values.is_empty() {
            return Err("workload.partition_key_values cannot be empty".to_string());
        }

        if self
            .partition_key_values
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err("workload.partition_key_values cannot contain empty values".to_string());
        }

        if self.hot_partition_key.trim().is_empty() {
            return Err("workload.hot_partition_key cannot be empty".to_string());
        }

        if self.default_ttl_seconds < -1 {
            return Err(format!(
                "workload.default_ttl_seconds must be -1 or >= 0, got {}",
                self.default_ttl_seconds
            ));
        }

        Ok(())
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            bulk_count: default_bulk_count(),
            partition_key_values: default_partition_key_values(),
            hot_partition_key: default_hot_partition_key(),
            default_ttl_seconds: default_ttl_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_name() -> String {
    "harness".to_string()
}

fn default_container_name() -> String {
    "people".to_string()
}

fn default_partition_key_path() -> String {
    "/partitionKey".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_bulk_count() -> usize {
    1000
}

fn default_partition_key_values() -> Vec<String> {
    vec!["1".to_string(), "2".to_string(), "3".to_string()]
}

fn default_hot_partition_key() -> String {
    "3".to_string()
}

fn default_ttl_seconds() -> i32 {
    60
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
