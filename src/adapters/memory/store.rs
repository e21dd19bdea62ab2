//! In-memory [`DocumentStore`] implementation
//!
//! Documents live in a map keyed by partition key and id behind a
//! `tokio::sync::RwLock`. The store reproduces the behaviors the harness
//! depends on: version tokens on every write, conditional replace, lazy TTL
//! expiry, simple equality queries and optional per-partition throttling.

use crate::adapters::database::traits::{
    DocumentStore, FieldPatch, QueryPage, QuerySpec, StoreResponse, StoreResult,
};
use crate::config::MemoryStoreConfig;
use crate::domain::document::{ETAG_FIELD, TIMESTAMP_FIELD};
use crate::domain::{Document, ETag, PartitionKeyValue, StoreError};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Synthetic cost of a write (create, replace, patch)
pub const WRITE_CHARGE: f64 = 5.71;

/// Synthetic cost of a point read
pub const READ_CHARGE: f64 = 1.0;

/// Synthetic base cost of a query page
pub const QUERY_PAGE_CHARGE: f64 = 2.31;

/// Synthetic cost per item returned by a query
pub const QUERY_ITEM_CHARGE: f64 = 0.05;

/// Supported query shape: everything, or one equality on a parameter
const QUERY_PATTERN: &str = r"(?i)^\s*SELECT\s+\*\s+FROM\s+c(?:\s+WHERE\s+c\.([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*(@[A-Za-z_][A-Za-z0-9_]*))?\s*$";

/// Source of the current time in epoch seconds
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Default)]
struct StoreState {
    database_created: bool,
    container_created: bool,

    /// partition key -> id -> document
    partitions: BTreeMap<String, BTreeMap<String, Document>>,

    /// partition key -> (epoch second, requests in that second)
    request_windows: HashMap<String, (i64, u32)>,
}

/// Process-local document store
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    page_size: usize,
    partition_rate_limit: Option<u32>,
    clock: Clock,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new(config: &MemoryStoreConfig) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            page_size: config.page_size.max(1),
            partition_rate_limit: config.partition_rate_limit,
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
        }
    }

    /// Replace the wall clock, e.g. to step time in tests
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Number of live documents in a partition
    pub async fn partition_len(&self, partition_key: &str) -> usize {
        let now = self.now();
        let state = self.state.read().await;
        state
            .partitions
            .get(partition_key)
            .map(|docs| docs.values().filter(|d| !is_expired(d, now)).count())
            .unwrap_or(0)
    }

    /// Number of live documents across all partitions
    pub async fn len(&self) -> usize {
        let now = self.now();
        let state = self.state.read().await;
        state
            .partitions
            .values()
            .flat_map(|docs| docs.values())
            .filter(|d| !is_expired(d, now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    /// Count a request against its partition's one-second window
    fn admit(&self, state: &mut StoreState, partition_key: &str, now: i64) -> StoreResult<()> {
        let Some(limit) = self.partition_rate_limit else {
            return Ok(());
        };

        let window = state
            .request_windows
            .entry(partition_key.to_string())
            .or_insert((now, 0));
        if window.0 != now {
            *window = (now, 0);
        }
        window.1 += 1;

        if window.1 > limit {
            return Err(StoreError::Throttled(format!(
                "Partition '{partition_key}' exceeded {limit} requests per second"
            )));
        }
        Ok(())
    }

    /// Stamp a document with a fresh version token and timestamp
    fn stamp(document: &Document, now: i64) -> (Document, ETag) {
        let etag = ETag::new(format!("\"{}\"", uuid::Uuid::new_v4()));
        let mut stored = document.without_system_properties();
        stored.set_system_property(ETAG_FIELD, Value::String(etag.as_str().to_string()));
        stored.set_system_property(TIMESTAMP_FIELD, Value::from(now));
        (stored, etag)
    }

    /// Evict the document if it has expired, then return the live one
    fn live_document<'a>(
        state: &'a mut StoreState,
        id: &str,
        partition_key: &str,
        now: i64,
    ) -> StoreResult<&'a mut Document> {
        let partition = state
            .partitions
            .get_mut(partition_key)
            .ok_or_else(|| not_found(id, partition_key))?;

        if partition.get(id).is_some_and(|d| is_expired(d, now)) {
            partition.remove(id);
            tracing::debug!(document_id = id, partition_key, "Evicted expired document");
        }

        partition
            .get_mut(id)
            .ok_or_else(|| not_found(id, partition_key))
    }

    async fn collect_matches(&self, query: &QuerySpec) -> StoreResult<Vec<Value>> {
        let filter = Self::parse_query(query)?;
        let now = self.now();
        let state = self.state.read().await;

        let partitions: Vec<&BTreeMap<String, Document>> = match &query.partition_key {
            Some(pk) => state.partitions.get(pk.as_str()).into_iter().collect(),
            None => state.partitions.values().collect(),
        };

        Ok(partitions
            .into_iter()
            .flat_map(|docs| docs.values())
            .filter(|d| !is_expired(d, now))
            .filter(|d| match &filter {
                Some((pointer, expected)) => d.get(pointer) == Some(expected),
                None => true,
            })
            .map(|d| Value::from(d.clone()))
            .collect())
    }

    /// Parse the supported query shape into an optional equality filter
    fn parse_query(query: &QuerySpec) -> StoreResult<Option<(String, Value)>> {
        let pattern = Regex::new(QUERY_PATTERN)
            .map_err(|e| StoreError::InvalidRequest(format!("Invalid query pattern: {e}")))?;
        let caps = pattern.captures(&query.text).ok_or_else(|| {
            StoreError::InvalidRequest(format!(
                "Unsupported query '{}': expected SELECT * FROM c [WHERE c.<field> = @param]",
                query.text
            ))
        })?;

        let (Some(field), Some(param)) = (caps.get(1), caps.get(2)) else {
            return Ok(None);
        };

        let value = query
            .parameters
            .iter()
            .find(|(name, _)| name == param.as_str())
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                StoreError::InvalidRequest(format!(
                    "Query parameter {} has no value",
                    param.as_str()
                ))
            })?;

        Ok(Some((format!("/{}", field.as_str().replace('.', "/")), value)))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn ensure_database_exists(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.database_created {
            state.database_created = true;
            tracing::info!("Created in-memory database");
        }
        Ok(())
    }

    async fn ensure_container_exists(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.database_created {
            return Err(StoreError::ContainerCreationFailed(
                "Database does not exist".to_string(),
            ));
        }
        if !state.container_created {
            state.container_created = true;
            tracing::info!("Created in-memory container");
        }
        Ok(())
    }

    async fn create_item(&self, document: Document) -> StoreResult<StoreResponse<()>> {
        let now = self.now();
        let id = document.id().to_string();
        let partition_key = document.partition_key().to_string();

        let mut state = self.state.write().await;
        self.admit(&mut state, &partition_key, now)?;

        let partition = state.partitions.entry(partition_key.clone()).or_default();
        if partition.get(&id).is_some_and(|d| !is_expired(d, now)) {
            return Err(StoreError::AlreadyExists(format!(
                "Document '{id}' already exists in partition '{partition_key}'"
            )));
        }

        let (stored, etag) = Self::stamp(&document, now);
        partition.insert(id, stored);

        Ok(StoreResponse::new((), 201, WRITE_CHARGE, Some(etag)))
    }

    async fn read_item(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
    ) -> StoreResult<StoreResponse<Document>> {
        let now = self.now();
        let mut state = self.state.write().await;
        self.admit(&mut state, partition_key.as_str(), now)?;

        let document = Self::live_document(&mut state, id, partition_key.as_str(), now)?.clone();
        let etag = document.etag();

        Ok(StoreResponse::new(document, 200, READ_CHARGE, etag))
    }

    async fn patch_item(
        &self,
        id: &str,
        partition_key: &PartitionKeyValue,
        patch: &FieldPatch,
    ) -> StoreResult<StoreResponse<()>> {
        let now = self.now();
        let mut state = self.state.write().await;
        self.admit(&mut state, partition_key.as_str(), now)?;

        let current = Self::live_document(&mut state, id, partition_key.as_str(), now)?;

        let mut patched = current.clone();
        patched
            .replace_field(&patch.path, patch.value.clone())
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;

        let (stored, etag) = Self::stamp(&patched, now);
        *current = stored;

        Ok(StoreResponse::new((), 200, WRITE_CHARGE, Some(etag)))
    }

    async fn replace_item(
        &self,
        document: Document,
        if_match: Option<&ETag>,
    ) -> StoreResult<StoreResponse<()>> {
        let now = self.now();
        let id = document.id().to_string();
        let partition_key = document.partition_key().to_string();

        let mut state = self.state.write().await;
        self.admit(&mut state, &partition_key, now)?;

        let current = Self::live_document(&mut state, &id, &partition_key, now)?;

        if let Some(expected) = if_match {
            if current.etag().as_ref() != Some(expected) {
                return Err(StoreError::Conflict(format!(
                    "Document '{id}' was modified since version {expected}"
                )));
            }
        }

        let (stored, etag) = Self::stamp(&document, now);
        *current = stored;

        Ok(StoreResponse::new((), 200, WRITE_CHARGE, Some(etag)))
    }

    fn query_items(&self, query: QuerySpec) -> BoxStream<'_, StoreResult<QueryPage>> {
        let page_size = self.page_size;

        stream::once(async move { self.collect_matches(&query).await })
            .flat_map(move |result| match result {
                Ok(items) => stream::iter(paginate(items, page_size).into_iter().map(Ok)).boxed(),
                Err(e) => stream::iter(std::iter::once(Err(e))).boxed(),
            })
            .boxed()
    }
}

/// Split results into pages; an empty result still yields one empty page
fn paginate(items: Vec<Value>, page_size: usize) -> Vec<QueryPage> {
    if items.is_empty() {
        return vec![QueryPage {
            items,
            request_charge: QUERY_PAGE_CHARGE,
            continuation: None,
        }];
    }

    let chunks: Vec<Vec<Value>> = items.chunks(page_size).map(<[Value]>::to_vec).collect();
    let last = chunks.len() - 1;

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, items)| QueryPage {
            request_charge: QUERY_PAGE_CHARGE + QUERY_ITEM_CHARGE * items.len() as f64,
            continuation: (index < last).then(|| (index + 1).to_string()),
            items,
        })
        .collect()
}

fn is_expired(document: &Document, now: i64) -> bool {
    match (document.ttl(), document.timestamp()) {
        (Some(ttl), Some(ts)) if ttl.expires() => now >= ts + i64::from(ttl.as_secs()),
        _ => false,
    }
}

fn not_found(id: &str, partition_key: &str) -> StoreError {
    StoreError::NotFound(format!(
        "Document '{id}' not found in partition '{partition_key}'"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn doc(id: &str, pk: &str) -> Document {
        Document::try_from(json!({
            "id": id,
            "partitionKey": pk,
            "firstName": "Wilma",
            "email": format!("{id}@example.com"),
            "address": { "city": "Bedrock" }
        }))
        .unwrap()
    }

    fn pk(value: &str) -> PartitionKeyValue {
        PartitionKeyValue::new(value).unwrap()
    }

    fn manual_clock(start: i64) -> (Arc<AtomicI64>, Clock) {
        let now = Arc::new(AtomicI64::new(start));
        let handle = now.clone();
        (now, Arc::new(move || handle.load(Ordering::SeqCst)))
    }

    async fn store() -> InMemoryStore {
        let store = InMemoryStore::new(&MemoryStoreConfig::default());
        store.ensure_database_exists().await.unwrap();
        store.ensure_container_exists().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let store = store().await;
        let created = store.create_item(doc("a", "1")).await.unwrap();
        assert_eq!(created.status_code, 201);
        assert_eq!(created.request_charge, WRITE_CHARGE);

        let read = store.read_item("a", &pk("1")).await.unwrap();
        assert_eq!(read.status_code, 200);
        assert_eq!(read.value.get("/firstName"), Some(&json!("Wilma")));
        assert_eq!(read.etag, created.etag);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let store = store().await;
        store.create_item(doc("a", "1")).await.unwrap();
        let err = store.create_item(doc("a", "1")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        // Same id in another partition is a different document
        assert!(store.create_item(doc("a", "2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_read_missing_and_wrong_partition() {
        let store = store().await;
        store.create_item(doc("a", "1")).await.unwrap();

        let err = store.read_item("missing", &pk("1")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));

        let err = store.read_item("a", &pk("2")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stale_etag_replace_leaves_document_unchanged() {
        let store = store().await;
        let created = store.create_item(doc("a", "1")).await.unwrap();
        let stale = created.etag.unwrap();

        store
            .patch_item("a", &pk("1"), &FieldPatch::replace("firstName", "Eve"))
            .await
            .unwrap();
        let before = store.read_item("a", &pk("1")).await.unwrap().value;

        let mut update = before.clone();
        update.replace_field("/email", json!("new@example.com")).unwrap();
        let err = store.replace_item(update, Some(&stale)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let after = store.read_item("a", &pk("1")).await.unwrap().value;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_replace_with_current_etag_succeeds() {
        let store = store().await;
        store.create_item(doc("a", "1")).await.unwrap();
        let read = store.read_item("a", &pk("1")).await.unwrap();

        let mut update = read.value.clone();
        update.replace_field("/email", json!("new@example.com")).unwrap();
        let replaced = store
            .replace_item(update, read.etag.as_ref())
            .await
            .unwrap();
        assert_ne!(replaced.etag, read.etag);

        let after = store.read_item("a", &pk("1")).await.unwrap().value;
        assert_eq!(after.get("/email"), Some(&json!("new@example.com")));
    }

    #[tokio::test]
    async fn test_patch_missing_path_is_invalid() {
        let store = store().await;
        store.create_item(doc("a", "1")).await.unwrap();

        let err = store
            .patch_item("a", &pk("1"), &FieldPatch::replace("nickname", "Willy"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(400));

        let err = store
            .patch_item("a", &pk("1"), &FieldPatch::replace("id", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_patch_nested_field() {
        let store = store().await;
        store.create_item(doc("a", "1")).await.unwrap();
        store
            .patch_item("a", &pk("1"), &FieldPatch::replace("/address/city", "Rockvegas"))
            .await
            .unwrap();

        let read = store.read_item("a", &pk("1")).await.unwrap().value;
        assert_eq!(read.get("/address/city"), Some(&json!("Rockvegas")));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let (now, clock) = manual_clock(1_000);
        let store = InMemoryStore::new(&MemoryStoreConfig::default()).with_clock(clock);

        let mut document = doc("a", "1");
        document.set_ttl(crate::domain::TtlSeconds::new(60).unwrap());
        store.create_item(document).await.unwrap();

        now.store(1_059, Ordering::SeqCst);
        assert!(store.read_item("a", &pk("1")).await.is_ok());

        now.store(1_060, Ordering::SeqCst);
        let err = store.read_item("a", &pk("1")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.partition_len("1").await, 0);
    }

    #[tokio::test]
    async fn test_ttl_never_expires() {
        let (now, clock) = manual_clock(0);
        let store = InMemoryStore::new(&MemoryStoreConfig::default()).with_clock(clock);

        let mut document = doc("a", "1");
        document.set_ttl(crate::domain::TtlSeconds::NEVER);
        store.create_item(document).await.unwrap();

        now.store(i64::from(i32::MAX), Ordering::SeqCst);
        assert!(store.read_item("a", &pk("1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_query_equality_across_partitions() {
        let store = InMemoryStore::new(&MemoryStoreConfig {
            page_size: 2,
            partition_rate_limit: None,
        });
        for (id, pk) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "1"), ("e", "2")] {
            store.create_item(doc(id, pk)).await.unwrap();
        }

        let pages: Vec<_> = store
            .query_items(QuerySpec::new("SELECT * FROM c"))
            .collect()
            .await;
        assert_eq!(pages.len(), 3);
        let total: usize = pages.iter().map(|p| p.as_ref().unwrap().items.len()).sum();
        assert_eq!(total, 5);
        assert!(pages[0].as_ref().unwrap().continuation.is_some());
        assert!(pages[2].as_ref().unwrap().continuation.is_none());

        let pages: Vec<_> = store
            .query_items(
                QuerySpec::new("SELECT * FROM c WHERE c.email = @email")
                    .with_parameter("@email", "c@example.com"),
            )
            .collect()
            .await;
        assert_eq!(pages.len(), 1);
        let items = &pages[0].as_ref().unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], json!("c"));
    }

    #[tokio::test]
    async fn test_query_scoped_to_partition_and_nested_field() {
        let store = store().await;
        store.create_item(doc("a", "1")).await.unwrap();
        store.create_item(doc("b", "2")).await.unwrap();

        let pages: Vec<_> = store
            .query_items(
                QuerySpec::new("select * from c where c.address.city = @city")
                    .with_parameter("@city", "Bedrock")
                    .with_partition_key(pk("2")),
            )
            .collect()
            .await;
        let items = &pages[0].as_ref().unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], json!("b"));
    }

    #[tokio::test]
    async fn test_unsupported_query_is_invalid() {
        let store = store().await;
        let pages: Vec<_> = store
            .query_items(QuerySpec::new("SELECT c.id FROM c ORDER BY c.id"))
            .collect()
            .await;
        assert_eq!(pages.len(), 1);
        assert!(matches!(pages[0], Err(StoreError::InvalidRequest(_))));

        let pages: Vec<_> = store
            .query_items(QuerySpec::new("SELECT * FROM c WHERE c.userName = @userName"))
            .collect()
            .await;
        assert!(matches!(pages[0], Err(StoreError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_empty_query_yields_one_empty_page() {
        let store = store().await;
        let pages: Vec<_> = store
            .query_items(QuerySpec::new("SELECT * FROM c"))
            .collect()
            .await;
        assert_eq!(pages.len(), 1);
        assert!(pages[0].as_ref().unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_partition_rate_limit_throttles_hot_partition() {
        let (_now, clock) = manual_clock(5);
        let store = InMemoryStore::new(&MemoryStoreConfig {
            page_size: 100,
            partition_rate_limit: Some(2),
        })
        .with_clock(clock);

        assert!(store.create_item(doc("a", "3")).await.is_ok());
        assert!(store.create_item(doc("b", "3")).await.is_ok());
        let err = store.create_item(doc("c", "3")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(429));

        // Other partitions have their own budget
        assert!(store.create_item(doc("d", "1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_container_requires_database() {
        let store = InMemoryStore::new(&MemoryStoreConfig::default());
        let err = store.ensure_container_exists().await.unwrap_err();
        assert!(matches!(err, StoreError::ContainerCreationFailed(_)));
    }

    #[test]
    fn test_system_properties_are_restamped() {
        let mut incoming = doc("a", "1");
        incoming.set_system_property("_etag", json!("\"client-supplied\""));
        incoming.set_system_property("_rid", json!("abc"));

        let (stored, etag) = InMemoryStore::stamp(&incoming, 42);
        assert_eq!(stored.etag(), Some(etag));
        assert_eq!(stored.timestamp(), Some(42));
        assert!(stored.get("/_rid").is_none());
    }
}
