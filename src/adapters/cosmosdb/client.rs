//! Cosmos DB client construction and provisioning
//!
//! Builds an authenticated `CosmosClient` from configuration and makes sure
//! the configured database and container exist.

use crate::config::{CosmosAuth, CosmosDbConfig};
use crate::domain::{HarnessError, Result, StoreError};
use azure_core::credentials::{Secret, TokenCredential};
use azure_data_cosmos::clients::{ContainerClient, DatabaseClient};
use azure_data_cosmos::models::{
    ContainerProperties, IndexingPolicy, PartitionKeyDefinition, PartitionKeyKind,
};
use azure_data_cosmos::{CosmosClient, CosmosClientOptions};
use azure_identity::{AzureCliCredential, AzureCliCredentialOptions, ManagedIdentityCredential};
use std::borrow::Cow;
use std::sync::Arc;

/// Cosmos DB client for the harness
///
/// Created once per process and shared by every operation.
pub struct CosmosDbClient {
    client: CosmosClient,
    database: DatabaseClient,
    container: ContainerClient,
    config: CosmosDbConfig,
}

impl CosmosDbClient {
    /// Create a new Cosmos DB client
    ///
    /// Only the configured credential source is used. Developer tool and
    /// environment-variable credentials are never consulted.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] if the endpoint or key is
    /// missing and [`HarnessError::StoreConnection`] if the credential or
    /// client cannot be constructed.
    pub fn new(config: CosmosDbConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                HarnessError::Configuration("cosmosdb.endpoint is required".to_string())
            })?
            .to_string();

        let options = Some(CosmosClientOptions::default());

        let client = match config.auth {
            CosmosAuth::Key => {
                use secrecy::ExposeSecret;

                let key = config.key.as_ref().ok_or_else(|| {
                    HarnessError::Configuration(
                        "cosmosdb.key is required when auth = 'key'".to_string(),
                    )
                })?;
                let key = Secret::new(key.expose_secret().as_ref().to_string());
                CosmosClient::with_key(&endpoint, key, options)
            }
            CosmosAuth::AzureCli | CosmosAuth::ManagedIdentity => {
                let credential = build_credential(&config)?;
                CosmosClient::new(&endpoint, credential, options)
            }
        }
        .map_err(|e| {
            HarnessError::StoreConnection(format!("Failed to create Cosmos client: {e}"))
        })?;

        let database = client.database_client(&config.database_name);
        let container = database.container_client(&config.container_name);

        tracing::debug!(
            endpoint = %endpoint,
            auth = ?config.auth,
            database = %config.database_name,
            container = %config.container_name,
            "Cosmos DB client created"
        );

        Ok(Self {
            client,
            database,
            container,
            config,
        })
    }

    /// Ensure the database exists, creating it if necessary
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read or created.
    pub async fn ensure_database_exists(&self) -> std::result::Result<(), StoreError> {
        let name = &self.config.database_name;

        match self.database.read(None).await {
            Ok(_) => {
                tracing::info!(database = %name, "Database already exists");
                Ok(())
            }
            Err(e) if status_of(&e) == Some(404) => {
                tracing::info!(database = %name, "Creating database");

                self.client
                    .create_database(name, None)
                    .await
                    .map_err(|e| {
                        StoreError::DatabaseCreationFailed(format!(
                            "Failed to create database {name}: {e}"
                        ))
                    })?;

                tracing::info!(database = %name, "Database created successfully");
                Ok(())
            }
            Err(e) => Err(classify_error(&e, "Failed to read database")),
        }
    }

    /// Ensure the container exists, creating it if necessary
    ///
    /// The partition key path comes from `cosmosdb.partition_key_path`.
    /// Per-document `ttl` values only take effect when TTL is enabled on the
    /// container, which is left to the operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be read or created.
    pub async fn ensure_container_exists(&self) -> std::result::Result<(), StoreError> {
        let name = &self.config.container_name;

        match self.container.read(None).await {
            Ok(_) => {
                tracing::info!(container = %name, "Container already exists");
                Ok(())
            }
            Err(e) if status_of(&e) == Some(404) => {
                tracing::info!(
                    container = %name,
                    partition_key_path = %self.config.partition_key_path,
                    "Creating container"
                );

                let properties = ContainerProperties {
                    id: Cow::Owned(name.clone()),
                    partition_key: PartitionKeyDefinition {
                        paths: vec![self.config.partition_key_path.clone()],
                        kind: PartitionKeyKind::Hash,
                        version: None,
                    },
                    indexing_policy: Some(IndexingPolicy::default()),
                    ..Default::default()
                };

                self.database
                    .create_container(properties, None)
                    .await
                    .map_err(|e| {
                        StoreError::ContainerCreationFailed(format!(
                            "Failed to create container {name}: {e}"
                        ))
                    })?;

                tracing::info!(container = %name, "Container created successfully");
                Ok(())
            }
            Err(e) => Err(classify_error(&e, "Failed to read container")),
        }
    }

    /// Client for the configured container
    pub fn container(&self) -> &ContainerClient {
        &self.container
    }

    pub fn database_name(&self) -> &str {
        &self.config.database_name
    }

    pub fn container_name(&self) -> &str {
        &self.config.container_name
    }
}

/// Build the Entra ID credential selected by `cosmosdb.auth`
fn build_credential(config: &CosmosDbConfig) -> Result<Arc<dyn TokenCredential>> {
    let credential: Arc<dyn TokenCredential> = match config.auth {
        CosmosAuth::AzureCli => {
            let options = AzureCliCredentialOptions {
                tenant_id: config.tenant_id.clone(),
                ..Default::default()
            };
            AzureCliCredential::new(Some(options)).map_err(|e| {
                HarnessError::StoreConnection(format!("Failed to create Azure CLI credential: {e}"))
            })?
        }
        CosmosAuth::ManagedIdentity => ManagedIdentityCredential::new(None).map_err(|e| {
            HarnessError::StoreConnection(format!(
                "Failed to create managed identity credential: {e}"
            ))
        })?,
        CosmosAuth::Key => {
            return Err(HarnessError::Configuration(
                "Key authentication does not use a token credential".to_string(),
            ))
        }
    };

    Ok(credential)
}

/// HTTP status carried by an SDK error, if any
pub(crate) fn status_of(err: &azure_core::Error) -> Option<u16> {
    err.http_status().map(u16::from)
}

/// Map an SDK error onto a [`StoreError`] by its HTTP status
pub(crate) fn classify_error(err: &azure_core::Error, context: &str) -> StoreError {
    let message = format!("{context}: {err}");
    match status_of(err) {
        Some(status) => StoreError::from_status(status, message),
        None => StoreError::Transient {
            status: None,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(auth: CosmosAuth) -> CosmosDbConfig {
        CosmosDbConfig {
            endpoint: Some("https://harness-test.documents.azure.com:443/".to_string()),
            auth,
            key: Some(secret_string("dGVzdC1rZXk=".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_endpoint_is_configuration_error() {
        let mut config = config(CosmosAuth::Key);
        config.endpoint = Some("  ".to_string());
        let err = CosmosDbClient::new(config).err().unwrap();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }

    #[test]
    fn test_key_auth_without_key_is_configuration_error() {
        let mut config = config(CosmosAuth::Key);
        config.key = None;
        let err = CosmosDbClient::new(config).err().unwrap();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }

    #[test]
    fn test_key_client_uses_configured_names() {
        let mut config = config(CosmosAuth::Key);
        config.database_name = "people_db".to_string();
        config.container_name = "people".to_string();

        let client = CosmosDbClient::new(config).unwrap();
        assert_eq!(client.database_name(), "people_db");
        assert_eq!(client.container_name(), "people");
    }
}
