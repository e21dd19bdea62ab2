//! Cosmos DB adapter implementing [`DocumentStore`]
//!
//! Translates store calls into container operations, reads the request
//! charge and version token from response headers, and classifies SDK
//! failures by HTTP status.

use crate::adapters::cosmosdb::client::{classify_error, CosmosDbClient};
use crate::adapters::database::traits::{
    DocumentStore, FieldPatch, QueryPage, QuerySpec, StoreResponse, StoreResult,
};
use crate::domain::{Document, ETag, PartitionKeyValue, StoreError};
use async_trait::async_trait;
use azure_core::http::headers::{HeaderName, Headers};
use azure_core::http::Etag;
use azure_data_cosmos::models::PatchDocument;
use azure_data_cosmos::{ItemOptions, PartitionKey, Query};
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use std::sync::Arc;

const REQUEST_CHARGE: HeaderName = HeaderName::from_static("x-ms-request-charge");
const ETAG: HeaderName = HeaderName::from_static("etag");

/// Cosmos DB implementation of the store interface
pub struct CosmosDbAdapter {
    client: Arc<CosmosDbClient>,
}

impl CosmosDbAdapter {
    pub fn new(client: CosmosDbClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<CosmosDbClient> {
        &self.client
    }
}

#[async_trait]
impl DocumentStore for CosmosDbAdapter {
    fn backend_name(&self) -> &str {
        "cosmosdb"
    }

    async fn ensure_database_exists(&self) -> StoreResult<()> {
        self.client.ensure_database_exists().await
    }

    async fn ensure_container_exists(&self) -> StoreResult<()> {
        self.client.ensure_container_exists().await
    }

    async fn create_item(&self, document: Document) -> StoreResult<StoreResponse<()>> {
        let partition_key = PartitionKey::from(document.partition_key().to_string());
        let body = document.without_system_properties();

        let response = self
            .client
            .container()
            .create_item(partition_key, body, None)
            .await
            .map_err(|e| classify_error(&e, "Failed to create item"))?;

        let status = u16::from(response.status());
        let (charge, etag) = response_metrics(response.headers());
        Ok(StoreResponse::new((), status, charge, etag))
    }

    async fn read_item(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> StoreResult<StoreResponse<Document>> {
        let response = self
            .client
            .container()
            .read_item::<Value>(partition_key.as_str().to_string(), id, None)
            .await
            .map_err(|e| classify_error(&e, "Failed to read item"))?;

        let status = u16::from(response.status());
        let (charge, etag) = response_metrics(response.headers());

        let body = response
            .into_body()
            .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
        let document = Document::try_from(body)
            .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;

        // Prefer the header token; fall back to the `_etag` property
        let etag = etag.or_else(|| document.etag());
        Ok(StoreResponse::new(document, status, charge, etag))
    }

    async fn patch_item(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        patch: &FieldPatch,
    ) -> StoreResult<StoreResponse<()>> {
        let operations = patch_document(patch)?;

        let response = self
            .client
            .container()
            .patch_item(partition_key.as_str().to_string(), id, operations, None)
            .await
            .map_err(|e| classify_error(&e, "Failed to patch item"))?;

        let status = u16::from(response.status());
        let (charge, etag) = response_metrics(response.headers());
        Ok(StoreResponse::new((), status, charge, etag))
    }

    async fn replace_item(
        &self,
        document: Document,
        if_match: Option<&ETag>,
    ) -> StoreResult<StoreResponse<()>> {
        let id = document.id().to_string();
        let partition_key = document.partition_key().to_string();
        let body = document.without_system_properties();

        let options = if_match.map(|etag| ItemOptions {
            if_match_etag: Some(Etag::from(etag.as_str().to_string())),
            ..Default::default()
        });

        let response = self
            .client
            .container()
            .replace_item(partition_key, &id, body, options)
            .await
            .map_err(|e| classify_error(&e, "Failed to replace item"))?;

        let status = u16::from(response.status());
        let (charge, etag) = response_metrics(response.headers());
        Ok(StoreResponse::new((), status, charge, etag))
    }

    fn query_items(&self, query: QuerySpec) -> BoxStream<'_, StoreResult<QueryPage>> {
        let mut cosmos_query = Query::from(query.text.clone());
        for (name, value) in &query.parameters {
            cosmos_query = match cosmos_query.with_parameter(name.clone(), value.clone()) {
                Ok(q) => q,
                Err(e) => {
                    let err = StoreError::InvalidRequest(format!(
                        "Invalid query parameter {name}: {e}"
                    ));
                    return stream::iter(std::iter::once(Err(err))).boxed();
                }
            };
        }

        let container = self.client.container();
        let pager = match &query.partition_key {
            Some(pk) => container.query_items::<Value>(
                cosmos_query,
                PartitionKey::from(pk.as_str().to_string()),
                None,
            ),
            None => container.query_items::<Value>(cosmos_query, (), None),
        };

        match pager {
            Ok(pager) => pager
                .into_pages()
                .map(|page| {
                    let page = page.map_err(|e| classify_error(&e, "Query page failed"))?;
                    let (request_charge, _) = response_metrics(page.headers());
                    Ok(QueryPage {
                        request_charge,
                        continuation: page.continuation().map(str::to_string),
                        items: page.into_items(),
                    })
                })
                .boxed(),
            Err(e) => {
                let err = classify_error(&e, "Failed to start query");
                stream::iter(std::iter::once(Err(err))).boxed()
            }
        }
    }
}

/// Single replace operation for the patch endpoint
fn patch_document(patch: &FieldPatch) -> StoreResult<PatchDocument> {
    PatchDocument::default()
        .with_replace(patch.path.clone(), patch.value.clone())
        .map_err(|e| StoreError::InvalidRequest(format!("Invalid patch value: {e}")))
}

/// Request charge and version token from response headers
fn response_metrics(headers: &Headers) -> (f64, Option<ETag>) {
    let charge = headers
        .get_optional_str(&REQUEST_CHARGE)
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or_default();
    let etag = headers.get_optional_str(&ETAG).map(ETag::new);
    (charge, etag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_metrics_reads_headers() {
        let mut headers = Headers::new();
        headers.insert(REQUEST_CHARGE, "5.71");
        headers.insert(ETAG, "\"00000000-0000-0000-1234-000000000000\"");

        let (charge, etag) = response_metrics(&headers);
        assert!((charge - 5.71).abs() < f64::EPSILON);
        assert_eq!(
            etag.unwrap().as_str(),
            "\"00000000-0000-0000-1234-000000000000\""
        );
    }

    #[test]
    fn test_patch_document_holds_one_replace() {
        let patch = FieldPatch::replace("firstName", "Eve");
        let body = serde_json::to_value(patch_document(&patch).unwrap()).unwrap();

        let text = body.to_string();
        assert!(text.contains("\"replace\""));
        assert!(text.contains("/firstName"));
        assert!(text.contains("Eve"));
    }

    #[test]
    fn test_response_metrics_defaults() {
        let (charge, etag) = response_metrics(&Headers::new());
        assert_eq!(charge, 0.0);
        assert!(etag.is_none());
    }
}
