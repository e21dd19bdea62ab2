//! Validate config command implementation
//!
//! This module implements the `validate-config` command, which loads the
//! configuration (file, `${VAR}` substitution and `HARNESS_*` overrides)
//! and prints a summary without connecting to any store.

use crate::config::{load_config, CosmosAuth, HarnessConfig, StoreTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration: {config_path}");
        println!();

        // load_config validates as part of loading
        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                println!("{}", summarize(&config));
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

/// Render the configuration summary; the account key is never printed
fn summarize(config: &HarnessConfig) -> String {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Log Level: {}", config.application.log_level),
    ];

    match config.store_target {
        StoreTarget::CosmosDB => {
            let cosmos = &config.cosmosdb;
            let auth = match cosmos.auth {
                CosmosAuth::Key => "key",
                CosmosAuth::AzureCli => "azure_cli",
                CosmosAuth::ManagedIdentity => "managed_identity",
            };
            lines.push("  Store Target: Cosmos DB".to_string());
            lines.push(format!(
                "  Endpoint: {}",
                cosmos.endpoint.as_deref().unwrap_or("<unset>")
            ));
            lines.push(format!("  Auth: {auth}"));
            if let Some(tenant) = &cosmos.tenant_id {
                lines.push(format!("  Tenant: {tenant}"));
            }
            lines.push(format!("  Database: {}", cosmos.database_name));
            lines.push(format!(
                "  Container: {} (partition key {})",
                cosmos.container_name, cosmos.partition_key_path
            ));
        }
        StoreTarget::Memory => {
            lines.push("  Store Target: in-memory".to_string());
            lines.push(format!("  Page Size: {}", config.memory.page_size));
            if let Some(limit) = config.memory.partition_rate_limit {
                lines.push(format!("  Partition Rate Limit: {limit}/s"));
            }
        }
    }

    lines.push(format!("  Bulk Count: {}", config.workload.bulk_count));
    lines.push(format!(
        "  Partition Keys: {}",
        config.workload.partition_key_values.join(", ")
    ));
    lines.push(format!(
        "  Hot Partition Key: {}",
        config.workload.hot_partition_key
    ));
    lines.push(format!(
        "  Default TTL: {}s",
        config.workload.default_ttl_seconds
    ));
    if config.logging.local_enabled {
        lines.push(format!(
            "  Log Files: {} ({})",
            config.logging.local_path, config.logging.local_rotation
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, secret_string, ENV_MUTEX};

    #[test]
    fn test_summary_for_memory_store() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = parse_config(
            r#"
store_target = "memory"

[memory]
partition_rate_limit = 50
"#,
        )
        .unwrap();

        let summary = summarize(&config);
        assert!(summary.contains("Store Target: in-memory"));
        assert!(summary.contains("Partition Rate Limit: 50/s"));
        assert!(summary.contains("Bulk Count: 1000"));
    }

    #[test]
    fn test_summary_never_prints_key() {
        let mut config = HarnessConfig::default();
        config.cosmosdb.endpoint = Some("https://acct.documents.azure.com:443/".to_string());
        config.cosmosdb.auth = CosmosAuth::Key;
        config.cosmosdb.key = Some(secret_string("super-secret-key".to_string()));

        let summary = summarize(&config);
        assert!(summary.contains("Auth: key"));
        assert!(!summary.contains("super-secret-key"));
    }

    #[tokio::test]
    async fn test_invalid_file_returns_config_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "store_target = \"mongo\"\n").unwrap();

        let code = ValidateArgs {}
            .execute(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
