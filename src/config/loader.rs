//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HarnessConfig;
use crate::config::secret_string;
use crate::domain::errors::HarnessError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file, falling back to defaults when it does not exist
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into [`HarnessConfig`]
/// 4. Applies environment variable overrides (HARNESS_* prefix)
/// 5. Validates the configuration
///
/// A missing file is not an error so the harness can be configured entirely
/// through the environment (e.g. `HARNESS_COSMOSDB_ENDPOINT`).
///
/// # Errors
///
/// Returns [`HarnessError::Configuration`] if the file cannot be read or
/// parsed, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use cosmos_harness::config::load_config;
///
/// let config = load_config("cosmos-harness.toml")?;
/// # Ok::<(), cosmos_harness::domain::HarnessError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HarnessConfig> {
    let path = path.as_ref();

    let contents = if path.exists() {
        fs::read_to_string(path).map_err(|e| {
            HarnessError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?
    } else {
        tracing::debug!(
            path = %path.display(),
            "Configuration file not found, using defaults and environment"
        );
        String::new()
    };

    parse_config(&contents)
}

/// Parses configuration text, applies overrides and validates it
///
/// # Errors
///
/// Same as [`load_config`], minus file access.
pub fn parse_config(contents: &str) -> Result<HarnessConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: HarnessConfig = toml::from_str(&contents)
        .map_err(|e| HarnessError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        HarnessError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HarnessError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                if !missing_vars.iter().any(|v| v == var_name) {
                    missing_vars.push(var_name.to_string());
                }
                String::new()
            })
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(HarnessError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Reads an environment override, parsing it into `T`
///
/// # Errors
///
/// Returns an error naming the variable if the value does not parse
fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| HarnessError::Configuration(format!("Invalid value for {name}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the HARNESS_* prefix
///
/// Variables follow the pattern HARNESS_<SECTION>_<KEY>, for example
/// HARNESS_COSMOSDB_ENDPOINT or HARNESS_WORKLOAD_BULK_COUNT.
fn apply_env_overrides(config: &mut HarnessConfig) -> Result<()> {
    if let Ok(val) = std::env::var("HARNESS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(target) = env_parse("HARNESS_STORE_TARGET")? {
        config.store_target = target;
    }

    // Cosmos DB
    if let Ok(val) = std::env::var("HARNESS_COSMOSDB_ENDPOINT") {
        config.cosmosdb.endpoint = Some(val);
    }
    if let Some(auth) = env_parse("HARNESS_COSMOSDB_AUTH")? {
        config.cosmosdb.auth = auth;
    }
    if let Ok(val) = std::env::var("HARNESS_COSMOSDB_KEY") {
        config.cosmosdb.key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("HARNESS_COSMOSDB_TENANT_ID") {
        config.cosmosdb.tenant_id = Some(val);
    }
    if let Ok(val) = std::env::var("HARNESS_COSMOSDB_DATABASE_NAME") {
        config.cosmosdb.database_name = val;
    }
    if let Ok(val) = std::env::var("HARNESS_COSMOSDB_CONTAINER_NAME") {
        config.cosmosdb.container_name = val;
    }
    if let Ok(val) = std::env::var("HARNESS_COSMOSDB_PARTITION_KEY_PATH") {
        config.cosmosdb.partition_key_path = val;
    }

    // In-memory store
    if let Some(size) = env_parse("HARNESS_MEMORY_PAGE_SIZE")? {
        config.memory.page_size = size;
    }
    if let Some(limit) = env_parse("HARNESS_MEMORY_PARTITION_RATE_LIMIT")? {
        config.memory.partition_rate_limit = Some(limit);
    }

    // Workload
    if let Some(count) = env_parse("HARNESS_WORKLOAD_BULK_COUNT")? {
        config.workload.bulk_count = count;
    }
    if let Ok(val) = std::env::var("HARNESS_WORKLOAD_PARTITION_KEY_VALUES") {
        config.workload.partition_key_values = val.split(',').map(|v| v.trim().to_string()).collect();
    }
    if let Ok(val) = std::env::var("HARNESS_WORKLOAD_HOT_PARTITION_KEY") {
        config.workload.hot_partition_key = val;
    }
    if let Some(ttl) = env_parse("HARNESS_WORKLOAD_DEFAULT_TTL_SECONDS")? {
        config.workload.default_ttl_seconds = ttl;
    }

    // Logging
    if let Some(enabled) = env_parse("HARNESS_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("HARNESS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("HARNESS_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
