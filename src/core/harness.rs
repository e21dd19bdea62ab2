//! Operation harness
//!
//! Wraps a [`DocumentStore`] with the demo operations. Every operation
//! returns a structured outcome instead of an error: store failures are
//! classified, logged and reported, and never escape to the caller.
//!
//! Shutdown is observed through a `watch::Receiver<bool>`. It is checked
//! before an operation starts and between query pages; requests already in
//! flight are allowed to finish.

use crate::adapters::database::{DocumentStore, FieldPatch, QuerySpec};
use crate::domain::{
    BulkOutcome, Document, ETag, ErrorClass, HarnessError, OperationKind, OperationOutcome,
    PartitionKeyValue, Person, QueryOutcome, Result, TtlSeconds,
};
use crate::generator::PersonGenerator;
use crate::{log_error_with_context, log_operation_outcome};
use chrono::Utc;
use futures::future::join_all;
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Executes store operations and reports their outcomes
pub struct OperationHarness {
    store: Arc<dyn DocumentStore>,
    shutdown: watch::Receiver<bool>,
}

impl OperationHarness {
    pub fn new(store: Arc<dyn DocumentStore>, shutdown: watch::Receiver<bool>) -> Self {
        Self { store, shutdown }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Whether a shutdown signal has been received
    pub fn is_shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Ensure the database and container exist
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Store`] if either cannot be read or created.
    pub async fn prepare(&self) -> Result<()> {
        tracing::info!(backend = self.store.backend_name(), "Preparing store");
        self.store.ensure_database_exists().await?;
        self.store.ensure_container_exists().await?;
        Ok(())
    }

    /// Create one document
    pub async fn create(&self, document: Document) -> OperationOutcome {
        let outcome = self.create_unlogged(document).await;
        log_operation_outcome!(&outcome);
        outcome
    }

    /// Serialize a record and create it
    pub async fn create_record<T: Serialize>(&self, record: &T) -> OperationOutcome {
        match Document::from_record(record) {
            Ok(document) => self.create(document).await,
            Err(e) => {
                let outcome = OperationOutcome::failed(OperationKind::Create, None, None, &e);
                log_operation_outcome!(&outcome);
                outcome
            }
        }
    }

    /// Create all documents concurrently
    ///
    /// Every create is issued before any is awaited and every result is
    /// collected, so the outcome holds exactly one entry per input document
    /// in input order. Individual failures are logged and never abort the
    /// batch.
    pub async fn bulk_create(&self, documents: Vec<Document>) -> BulkOutcome {
        let start = Instant::now();
        let total = documents.len();

        if self.is_shutdown_requested() {
            tracing::warn!(total, "Shutdown requested, skipping bulk create");
            let outcomes = (0..total)
                .map(|_| OperationOutcome::cancelled(OperationKind::Create))
                .collect();
            return BulkOutcome::new(outcomes, start.elapsed());
        }

        tracing::info!(total, backend = self.store.backend_name(), "Starting bulk create");

        let outcomes = join_all(documents.into_iter().map(|d| self.create_unlogged(d))).await;

        for outcome in outcomes.iter().filter(|o| !o.success) {
            log_operation_outcome!(outcome);
        }

        let bulk = BulkOutcome::new(outcomes, start.elapsed());
        tracing::info!(
            total = bulk.total(),
            succeeded = bulk.success_count(),
            failed = bulk.failure_count(),
            throttled = bulk.throttled_count(),
            request_charge = bulk.total_request_charge(),
            duration_ms = bulk.duration.as_millis() as u64,
            "Bulk create completed"
        );
        bulk
    }

    /// Read one document by id and partition key
    pub async fn point_read(&self, id: &str, partition_key: &PartitionKeyValue) -> OperationOutcome {
        if self.is_shutdown_requested() {
            return OperationOutcome::cancelled(OperationKind::PointRead);
        }

        let outcome = match self.store.read_item(id, partition_key).await {
            Ok(response) => {
                let document = response.value;
                tracing::info!(
                    document_id = document.id(),
                    partition_key = document.partition_key(),
                    first_name = ?document.get("/firstName"),
                    last_name = ?document.get("/lastName"),
                    email = ?document.get("/email"),
                    "Read document"
                );
                OperationOutcome::succeeded(
                    OperationKind::PointRead,
                    id,
                    partition_key.as_str(),
                    response.status_code,
                    response.request_charge,
                )
                .with_etag(response.etag.map(|e| e.as_str().to_string()))
                .with_document(document)
            }
            Err(e) => failed(OperationKind::PointRead, id, partition_key, e.into()),
        };

        log_operation_outcome!(&outcome);
        outcome
    }

    /// Replace one field of an existing document
    ///
    /// The document is read first; a missing document ends the operation
    /// without issuing the patch.
    pub async fn patch_field(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        path: &str,
        value: Value,
    ) -> OperationOutcome {
        if self.is_shutdown_requested() {
            return OperationOutcome::cancelled(OperationKind::Patch);
        }

        let outcome = self.patch_field_inner(id, partition_key, path, value).await;
        log_operation_outcome!(&outcome);
        outcome
    }

    async fn patch_field_inner(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        path: &str,
        value: Value,
    ) -> OperationOutcome {
        let read = match self.store.read_item(id, partition_key).await {
            Ok(read) => read,
            Err(e) => return failed(OperationKind::Patch, id, partition_key, e.into()),
        };

        let patch = FieldPatch::replace(path, value);
        tracing::debug!(document_id = id, path = %patch.path, "Patching document");

        match self.store.patch_item(id, partition_key, &patch).await {
            Ok(response) => OperationOutcome::succeeded(
                OperationKind::Patch,
                id,
                partition_key.as_str(),
                response.status_code,
                response.request_charge,
            )
            .with_additional_charge(read.request_charge)
            .with_etag(response.etag.map(|e| e.as_str().to_string())),
            Err(e) => failed(OperationKind::Patch, id, partition_key, e.into())
                .with_additional_charge(read.request_charge),
        }
    }

    /// Read, modify one field locally and replace under the read version
    ///
    /// If the document changed between the read and the replace, the store
    /// rejects the write and the outcome carries a conflict. There is no
    /// retry.
    pub async fn replace_with_concurrency_check(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        field: &str,
        value: Value,
    ) -> OperationOutcome {
        if self.is_shutdown_requested() {
            return OperationOutcome::cancelled(OperationKind::ConcurrencyReplace);
        }

        let read = match self.store.read_item(id, partition_key).await {
            Ok(read) => read,
            Err(e) => {
                let outcome = failed(OperationKind::ConcurrencyReplace, id, partition_key, e.into());
                log_operation_outcome!(&outcome);
                return outcome;
            }
        };

        let read_charge = read.request_charge;
        let Some(etag) = read.etag.clone().or_else(|| read.value.etag()) else {
            let err = HarnessError::Validation(format!("Document '{id}' has no version token"));
            let outcome = failed(OperationKind::ConcurrencyReplace, id, partition_key, err)
                .with_additional_charge(read_charge);
            log_operation_outcome!(&outcome);
            return outcome;
        };

        let mut document = read.value;
        let pointer = FieldPatch::replace(field, Value::Null).path;
        if let Err(e) = document.replace_field(&pointer, value) {
            let outcome = failed(OperationKind::ConcurrencyReplace, id, partition_key, e)
                .with_additional_charge(read_charge);
            log_operation_outcome!(&outcome);
            return outcome;
        }

        tracing::debug!(document_id = id, etag = %etag, "Replacing with version check");
        self.replace_with_version(document, &etag)
            .await
            .with_additional_charge(read_charge)
    }

    /// Replace a document only if its stored version matches `etag`
    pub async fn replace_with_version(&self, document: Document, etag: &ETag) -> OperationOutcome {
        if self.is_shutdown_requested() {
            return OperationOutcome::cancelled(OperationKind::ConcurrencyReplace);
        }

        let id = document.id().to_string();
        let partition_key = document.partition_key().to_string();

        let outcome = match self.store.replace_item(document, Some(etag)).await {
            Ok(response) => OperationOutcome::succeeded(
                OperationKind::ConcurrencyReplace,
                &id,
                &partition_key,
                response.status_code,
                response.request_charge,
            )
            .with_etag(response.etag.map(|e| e.as_str().to_string())),
            Err(e) => OperationOutcome::failed(
                OperationKind::ConcurrencyReplace,
                Some(id),
                Some(partition_key),
                &HarnessError::from(e),
            ),
        };

        if outcome.is_conflict() {
            tracing::warn!(
                document_id = outcome.document_id.as_deref().unwrap_or("-"),
                expected_etag = %etag,
                "Document was modified by another writer, replace rejected"
            );
        }
        log_operation_outcome!(&outcome);
        outcome
    }

    /// Set the per-document time-to-live
    ///
    /// Reports the expected expiry, measured from now. The store evicts the
    /// document some time after that instant.
    pub async fn set_ttl(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        ttl: TtlSeconds,
    ) -> OperationOutcome {
        if self.is_shutdown_requested() {
            return OperationOutcome::cancelled(OperationKind::SetTtl);
        }

        let outcome = self.set_ttl_inner(id, partition_key, ttl).await;
        log_operation_outcome!(&outcome);
        outcome
    }

    async fn set_ttl_inner(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        ttl: TtlSeconds,
    ) -> OperationOutcome {
        let read = match self.store.read_item(id, partition_key).await {
            Ok(read) => read,
            Err(e) => return failed(OperationKind::SetTtl, id, partition_key, e.into()),
        };

        let mut document = read.value;
        document.set_ttl(ttl);

        match self.store.replace_item(document, None).await {
            Ok(response) => {
                let outcome = OperationOutcome::succeeded(
                    OperationKind::SetTtl,
                    id,
                    partition_key.as_str(),
                    response.status_code,
                    response.request_charge,
                )
                .with_additional_charge(read.request_charge)
                .with_etag(response.etag.map(|e| e.as_str().to_string()));

                if ttl.expires() {
                    let expires_at = Utc::now() + chrono::Duration::seconds(i64::from(ttl.as_secs()));
                    tracing::info!(document_id = id, ttl = %ttl, expires_at = %expires_at, "TTL set");
                    outcome.with_expiry(expires_at)
                } else {
                    tracing::info!(document_id = id, "TTL disabled for document");
                    outcome
                }
            }
            Err(e) => failed(OperationKind::SetTtl, id, partition_key, e.into())
                .with_additional_charge(read.request_charge),
        }
    }

    /// Run a query to completion, page by page
    ///
    /// A page error stops the iteration; the outcome keeps the totals of the
    /// pages read so far.
    pub async fn query(&self, spec: QuerySpec) -> QueryOutcome {
        let mut outcome = QueryOutcome::new(spec.text.clone());

        if self.is_shutdown_requested() {
            outcome.cancelled = true;
            outcome.error = Some(ErrorClass::Cancelled);
            return outcome;
        }

        tracing::info!(
            query = %spec.text,
            cross_partition = spec.is_cross_partition(),
            "Running query"
        );

        let mut pages = self.store.query_items(spec);

        loop {
            if outcome.pages > 0 && self.is_shutdown_requested() {
                tracing::warn!(pages = outcome.pages, "Shutdown requested, stopping query");
                outcome.cancelled = true;
                outcome.error = Some(ErrorClass::Cancelled);
                break;
            }

            match pages.next().await {
                Some(Ok(page)) => {
                    outcome.pages += 1;
                    outcome.item_count += page.items.len();
                    outcome.request_charge += page.request_charge;

                    for item in &page.items {
                        tracing::debug!(
                            id = ?item.get("id"),
                            partition_key = ?item.get("partitionKey"),
                            "Query result"
                        );
                    }
                    tracing::info!(
                        page = outcome.pages,
                        items = page.items.len(),
                        request_charge = page.request_charge,
                        total_items = outcome.item_count,
                        total_request_charge = outcome.request_charge,
                        "Query page"
                    );
                }
                Some(Err(e)) => {
                    let err = HarnessError::from(e);
                    log_error_with_context!(&err, "Query page failed");
                    outcome.error = Some(err.class());
                    outcome.message = Some(err.to_string());
                    break;
                }
                None => {
                    outcome.completed = true;
                    break;
                }
            }
        }

        tracing::info!(
            pages = outcome.pages,
            items = outcome.item_count,
            request_charge = outcome.request_charge,
            completed = outcome.completed,
            "Query finished"
        );
        outcome
    }

    /// Generate `count` people and create them concurrently
    pub async fn bulk_create_distributed(
        &self,
        generator: &mut PersonGenerator,
        count: usize,
    ) -> BulkOutcome {
        let start = Instant::now();
        let (documents, rejected) = Self::documents_from_people(generator.generate_many(count));

        let mut bulk = self.bulk_create(documents).await;
        if !rejected.is_empty() {
            bulk.outcomes.extend(rejected);
            bulk.duration = start.elapsed();
        }
        bulk
    }

    /// Convert generated people into documents
    ///
    /// People that fail to convert become failed create outcomes carrying
    /// their id and partition key.
    pub fn documents_from_people(people: Vec<Person>) -> (Vec<Document>, Vec<OperationOutcome>) {
        let mut documents = Vec::with_capacity(people.len());
        let mut rejected = Vec::new();

        for person in people {
            match Document::from_record(&person) {
                Ok(document) => documents.push(document),
                Err(e) => rejected.push(OperationOutcome::failed(
                    OperationKind::Create,
                    Some(person.id),
                    Some(person.partition_key),
                    &e,
                )),
            }
        }

        (documents, rejected)
    }

    /// Force every document onto one partition key, then bulk create them
    ///
    /// Demonstrates the throughput ceiling of a single hot partition.
    pub async fn hot_partition_demo(
        &self,
        mut documents: Vec<Document>,
        partition_key: &PartitionKeyValue,
    ) -> BulkOutcome {
        for document in &mut documents {
            document.set_partition_key(partition_key);
        }

        tracing::warn!(
            partition_key = %partition_key,
            count = documents.len(),
            "Writing every document to a single partition"
        );

        self.bulk_create(documents).await
    }

    async fn create_unlogged(&self, document: Document) -> OperationOutcome {
        if self.is_shutdown_requested() {
            return OperationOutcome::cancelled(OperationKind::Create);
        }

        let id = document.id().to_string();
        let partition_key = document.partition_key().to_string();

        match self.store.create_item(document).await {
            Ok(response) => OperationOutcome::succeeded(
                OperationKind::Create,
                id,
                partition_key,
                response.status_code,
                response.request_charge,
            )
            .with_etag(response.etag.map(|e| e.as_str().to_string())),
            Err(e) => OperationOutcome::failed(
                OperationKind::Create,
                Some(id),
                Some(partition_key),
                &HarnessError::from(e),
            ),
        }
    }
}

fn failed(
    operation: OperationKind,
    id: &str,
    partition_key: &PartitionKeyValue,
    error: HarnessError,
) -> OperationOutcome {
    OperationOutcome::failed(
        operation,
        Some(id.to_string()),
        Some(partition_key.as_str().to_string()),
        &error,
    )
}
