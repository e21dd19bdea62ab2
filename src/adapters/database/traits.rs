//! Document store abstraction
//!
//! This module defines the capability interface every store backend
//! implements. The harness only talks to stores through [`DocumentStore`],
//! so it never depends on a particular client library's types.

use crate::domain::{Document, ETag, PartitionKeyValue, StoreError};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

/// Result type for store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Successful store response with its metrics
#[derive(Debug, Clone)]
pub struct StoreResponse<T> {
    /// Response payload
    pub value: T,

    /// HTTP-like status code (200, 201, ...)
    pub status_code: u16,

    /// Request units charged for the call
    pub request_charge: f64,

    /// Version token of the document after the call, if the store returned one
    pub etag: Option<ETag>,
}

impl<T> StoreResponse<T> {
    pub fn new(value: T, status_code: u16, request_charge: f64, etag: Option<ETag>) -> Self {
        Self {
            value,
            status_code,
            request_charge,
            etag,
        }
    }
}

/// A single replace-field patch
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPatch {
    /// JSON pointer to the field, e.g. `/firstName`
    pub path: String,

    /// New value
    pub value: Value,
}

impl FieldPatch {
    /// Create a patch, prefixing the path with `/` when missing
    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            path,
            value: value.into(),
        }
    }
}

/// Query text with named parameters
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Query text, e.g. `SELECT * FROM c WHERE c.email = @email`
    pub text: String,

    /// Named parameters, names including the leading `@`
    pub parameters: Vec<(String, Value)>,

    /// Scope the query to one partition; `None` fans out across partitions
    pub partition_key: Option<PartitionKeyValue>,
}

impl QuerySpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
            partition_key: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn with_partition_key(mut self, partition_key: PartitionKeyValue) -> Self {
        self.partition_key = Some(partition_key);
        self
    }

    /// Whether the query spans every partition
    pub fn is_cross_partition(&self) -> bool {
        self.partition_key.is_none()
    }
}

/// One page of query results
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub items: Vec<Value>,
    pub request_charge: f64,
    pub continuation: Option<String>,
}

/// Document store capability interface
///
/// Implementations must be safe to share across concurrent requests; a
/// single store handle is created per process and reused by every operation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logs (e.g. "cosmosdb", "memory")
    fn backend_name(&self) -> &str;

    /// Ensure the database exists, creating it if necessary
    async fn ensure_database_exists(&self) -> StoreResult<()>;

    /// Ensure the container exists, creating it if necessary
    async fn ensure_container_exists(&self) -> StoreResult<()>;

    /// Create a new document
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the id is taken within
    /// the document's partition.
    async fn create_item(&self, document: Document) -> StoreResult<StoreResponse<()>>;

    /// Point-read a document by id and partition key
    async fn read_item(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> StoreResult<StoreResponse<Document>>;

    /// Apply a single replace-field patch
    async fn patch_item(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        patch: &FieldPatch,
    ) -> StoreResult<StoreResponse<()>>;

    /// Replace a whole document
    ///
    /// When `if_match` is given, the store must reject the write with
    /// [`StoreError::Conflict`] unless the stored version token matches.
    async fn replace_item(
        &self,
        document: Document,
        if_match: Option<&ETag>,
    ) -> StoreResult<StoreResponse<()>>;

    /// Run a query, yielding one item per result page
    fn query_items(&self, query: QuerySpec) -> BoxStream<'_, StoreResult<QueryPage>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_patch_normalizes_path() {
        let patch = FieldPatch::replace("firstName", "Eve");
        assert_eq!(patch.path, "/firstName");
        assert_eq!(patch.value, json!("Eve"));

        let patch = FieldPatch::replace("/address/city", "Bedrock");
        assert_eq!(patch.path, "/address/city");
    }

    #[test]
    fn test_query_spec_builder() {
        let spec = QuerySpec::new("SELECT * FROM c WHERE c.userName = @userName")
            .with_parameter("@userName", "wilma62");
        assert!(spec.is_cross_partition());
        assert_eq!(spec.parameters, vec![("@userName".to_string(), json!("wilma62"))]);

        let scoped = spec.with_partition_key(PartitionKeyValue::new("1").unwrap());
        assert!(!scoped.is_cross_partition());
    }
}
