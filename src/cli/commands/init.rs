//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cosmos-harness.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing harness configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set cosmosdb.endpoint in {}", self.output);
                println!("  2. Sign in with `az login`, or set auth = \"key\" and HARNESS_COSMOSDB_KEY");
                println!("  3. Validate configuration: cosmos-harness validate-config");
                println!("  4. Start the harness: cosmos-harness run");
                println!("     (or try it offline: cosmos-harness run --store memory)");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Cosmos Harness Configuration File

store_target = "cosmosdb"  # cosmosdb | memory

[application]
log_level = "info"

[cosmosdb]
endpoint = "https://your-account.documents.azure.com:443/"
auth = "azure_cli"  # azure_cli | managed_identity | key
# tenant_id = "00000000-0000-0000-0000-000000000000"
# key = "${HARNESS_COSMOSDB_KEY}"
database_name = "harness"
container_name = "people"
partition_key_path = "/partitionKey"

[workload]
bulk_count = 1000
partition_key_values = ["1", "2", "3"]
hot_partition_key = "3"
default_ttl_seconds = 60

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Cosmos Harness Configuration File
#
# Every value below has a default, and any of them can be overridden with a
# HARNESS_<SECTION>_<KEY> environment variable (for example
# HARNESS_COSMOSDB_ENDPOINT). ${VAR} references are substituted from the
# environment, including variables loaded from a .env file.

# ============================================================================
# Store Selection
# ============================================================================
# cosmosdb: Azure Cosmos DB for NoSQL
# memory:   process-local store that mimics Cosmos DB status codes and charges
store_target = "cosmosdb"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Azure Cosmos DB
# ============================================================================
[cosmosdb]
# Account endpoint URL
endpoint = "https://your-account.documents.azure.com:443/"

# Authentication: azure_cli | managed_identity | key
auth = "azure_cli"

# Entra ID tenant used with azure_cli (optional)
# tenant_id = "00000000-0000-0000-0000-000000000000"

# Account key, required when auth = "key" (use an environment variable)
# key = "${HARNESS_COSMOSDB_KEY}"

# Database and container, created on startup when missing
database_name = "harness"
container_name = "people"

# Partition key path for a new container
partition_key_path = "/partitionKey"

# ============================================================================
# In-Memory Store
# ============================================================================
[memory]
# Maximum items per query page
page_size = 100

# Requests per second each partition accepts before answering 429
# partition_rate_limit = 200

# ============================================================================
# Workload
# ============================================================================
[workload]
# Documents written by the bulk and hot partition actions (1-100000)
bulk_count = 1000

# Partition keys drawn by the distributed strategy
partition_key_values = ["1", "2", "3"]

# Partition key used by the hot partition demo and --partition-strategy hot
hot_partition_key = "3"

# TTL applied when the Set Item TTL prompt is left blank (-1 never expires)
default_ttl_seconds = 60

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON logs to rotating files in addition to the console
local_enabled = false

# Directory for log files
local_path = "logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, StoreTarget, ENV_MUTEX};

    #[test]
    fn test_generated_configs_parse() {
        let _guard = ENV_MUTEX.lock().unwrap();
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse_config(&content).unwrap();
            assert_eq!(config.store_target, StoreTarget::CosmosDB);
            assert_eq!(config.cosmosdb.container_name, "people");
            assert_eq!(config.workload.hot_partition_key, "3");
        }
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("harness.toml");
        fs::write(&output, "existing").unwrap();

        let mut args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output)
            .unwrap()
            .contains("store_target"));
    }
}
