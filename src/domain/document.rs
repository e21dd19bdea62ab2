//! Generic document representation
//!
//! A [`Document`] is the key-value tree exchanged with every store backend.
//! Typed records such as [`crate::domain::Person`] convert to and from it,
//! so stores never depend on a particular record shape.

use crate::domain::ids::{ETag, PartitionKeyValue, TtlSeconds};
use crate::domain::{HarnessError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Field holding the document identifier
pub const ID_FIELD: &str = "id";

/// Field holding the partition key value
pub const PARTITION_KEY_FIELD: &str = "partitionKey";

/// Field holding the per-document time-to-live
pub const TTL_FIELD: &str = "ttl";

/// System property carrying the version token
pub const ETAG_FIELD: &str = "_etag";

/// System property carrying the last-modified epoch seconds
pub const TIMESTAMP_FIELD: &str = "_ts";

/// A stored document
///
/// Always carries a non-empty string `id` and `partitionKey`. Properties
/// whose names start with `_` are store-managed and are stripped before the
/// document is written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Build a document from any serializable record
    ///
    /// # Errors
    ///
    /// Returns a validation error if the record does not serialize to an
    /// object with `id` and `partitionKey` string fields.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self> {
        let value = serde_json::to_value(record)?;
        Self::try_from(value)
    }

    /// Convert the document into a typed record
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0)).map_err(HarnessError::from)
    }

    /// Document identifier
    pub fn id(&self) -> &str {
        self.string_field(ID_FIELD)
    }

    /// Partition key value
    pub fn partition_key(&self) -> &str {
        self.string_field(PARTITION_KEY_FIELD)
    }

    /// Overwrite the partition key
    ///
    /// Only valid before the document is first written; moving a stored
    /// document between partitions requires delete and recreate.
    pub fn set_partition_key(&mut self, partition_key: &PartitionKeyValue) {
        self.0.insert(
            PARTITION_KEY_FIELD.to_string(),
            Value::String(partition_key.as_str().to_string()),
        );
    }

    /// Look up a value by JSON pointer (e.g. `/address/city`)
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        let (head, rest) = split_pointer(pointer)?;
        let value = self.0.get(&head)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(rest)
        }
    }

    /// Replace the value of an existing field addressed by JSON pointer
    ///
    /// # Errors
    ///
    /// Fails if the pointer is malformed, addresses `id`, `partitionKey` or a
    /// system property, or the field does not exist.
    pub fn replace_field(&mut self, pointer: &str, value: Value) -> Result<()> {
        let (head, rest) = split_pointer(pointer).ok_or_else(|| {
            HarnessError::Validation(format!("Invalid field path '{pointer}'"))
        })?;

        if head == ID_FIELD || head == PARTITION_KEY_FIELD || head.starts_with('_') {
            return Err(HarnessError::Validation(format!(
                "Field '{head}' cannot be modified"
            )));
        }

        let target = match self.0.get_mut(&head) {
            Some(v) if rest.is_empty() => Some(v),
            Some(v) => v.pointer_mut(rest),
            None => None,
        };

        match target {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(HarnessError::Validation(format!(
                "Field '{pointer}' does not exist on document {}",
                self.id()
            ))),
        }
    }

    /// Time-to-live, if set
    pub fn ttl(&self) -> Option<TtlSeconds> {
        self.0
            .get(TTL_FIELD)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
            .and_then(|v| TtlSeconds::new(v).ok())
    }

    /// Set the time-to-live
    pub fn set_ttl(&mut self, ttl: TtlSeconds) {
        self.0
            .insert(TTL_FIELD.to_string(), Value::from(ttl.as_secs()));
    }

    /// Version token carried in the `_etag` system property
    pub fn etag(&self) -> Option<ETag> {
        self.0
            .get(ETAG_FIELD)
            .and_then(Value::as_str)
            .map(ETag::new)
    }

    /// Last-modified time in epoch seconds, from the `_ts` system property
    pub fn timestamp(&self) -> Option<i64> {
        self.0.get(TIMESTAMP_FIELD).and_then(Value::as_i64)
    }

    /// Set a store-managed property
    ///
    /// Names without a leading underscore are ignored.
    pub fn set_system_property(&mut self, name: &str, value: Value) {
        if name.starts_with('_') {
            self.0.insert(name.to_string(), value);
        }
    }

    /// Copy of this document with all store-managed properties removed
    pub fn without_system_properties(&self) -> Document {
        Document(
            self.0
                .iter()
                .filter(|(k, _)| !k.starts_with('_'))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Underlying key-value tree
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn string_field(&self, name: &str) -> &str {
        // Presence is checked on construction
        self.0.get(name).and_then(Value::as_str).unwrap_or_default()
    }
}

impl TryFrom<Value> for Document {
    type Error = HarnessError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::try_from(map),
            other => Err(HarnessError::Validation(format!(
                "Document must be a JSON object, got {other}"
            ))),
        }
    }
}

impl TryFrom<Map<String, Value>> for Document {
    type Error = HarnessError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        for field in [ID_FIELD, PARTITION_KEY_FIELD] {
            match map.get(field).and_then(Value::as_str) {
                Some(s) if !s.trim().is_empty() => {}
                _ => {
                    return Err(HarnessError::Validation(format!(
                        "Document is missing a non-empty '{field}' string"
                    )))
                }
            }
        }
        Ok(Document(map))
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Value::Object(document.0)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Document::try_from(map).map_err(serde::de::Error::custom)
    }
}

/// Split a JSON pointer into its first (unescaped) token and the remainder
fn split_pointer(pointer: &str) -> Option<(String, &str)> {
    let path = pointer.strip_prefix('/')?;
    let (head, rest) = match path.find('/') {
        Some(idx) => (&path[..idx], &path[idx..]),
        None => (path, ""),
    };
    if head.is_empty() {
        return None;
    }
    Some((head.replace("~1", "/").replace("~0", "~"), rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::try_from(json!({
            "id": "doc-1",
            "partitionKey": "2",
            "firstName": "Wilma",
            "address": { "city": "Bedrock", "geo": { "lat": 1.5 } },
            "_etag": "\"00000001\"",
            "_ts": 1700000000
        }))
        .unwrap()
    }

    #[test]
    fn test_requires_id_and_partition_key() {
        assert!(Document::try_from(json!({ "id": "x" })).is_err());
        assert!(Document::try_from(json!({ "id": "", "partitionKey": "1" })).is_err());
        assert!(Document::try_from(json!(["not", "an", "object"])).is_err());
        assert!(Document::try_from(json!({ "id": "x", "partitionKey": "1" })).is_ok());
    }

    #[test]
    fn test_accessors() {
        let doc = sample();
        assert_eq!(doc.id(), "doc-1");
        assert_eq!(doc.partition_key(), "2");
        assert_eq!(doc.get("/address/city"), Some(&json!("Bedrock")));
        assert_eq!(doc.get("/address/geo/lat"), Some(&json!(1.5)));
        assert_eq!(doc.get("/missing"), None);
        assert_eq!(doc.etag(), Some(ETag::new("\"00000001\"")));
        assert_eq!(doc.timestamp(), Some(1700000000));
    }

    #[test]
    fn test_replace_field_changes_only_target() {
        let mut doc = sample();
        let before = doc.clone();
        doc.replace_field("/firstName", json!("Eve")).unwrap();

        assert_eq!(doc.get("/firstName"), Some(&json!("Eve")));
        for (key, value) in before.as_map() {
            if key != "firstName" {
                assert_eq!(doc.as_map().get(key), Some(value));
            }
        }
    }

    #[test]
    fn test_replace_nested_field() {
        let mut doc = sample();
        doc.replace_field("/address/city", json!("Rock Vegas")).unwrap();
        assert_eq!(doc.get("/address/city"), Some(&json!("Rock Vegas")));
    }

    #[test]
    fn test_replace_field_rejections() {
        let mut doc = sample();
        assert!(doc.replace_field("/lastName", json!("Flintstone")).is_err());
        assert!(doc.replace_field("/id", json!("other")).is_err());
        assert!(doc.replace_field("/partitionKey", json!("1")).is_err());
        assert!(doc.replace_field("/_etag", json!("forged")).is_err());
        assert!(doc.replace_field("firstName", json!("Eve")).is_err());
    }

    #[test]
    fn test_ttl_round_trip() {
        let mut doc = sample();
        assert!(doc.ttl().is_none());
        doc.set_ttl(TtlSeconds::new(60).unwrap());
        assert_eq!(doc.ttl(), Some(TtlSeconds::new(60).unwrap()));
        assert_eq!(doc.as_map().get("ttl"), Some(&json!(60)));
    }

    #[test]
    fn test_without_system_properties() {
        let doc = sample().without_system_properties();
        assert!(doc.as_map().keys().all(|k| !k.starts_with('_')));
        assert_eq!(doc.id(), "doc-1");
    }

    #[test]
    fn test_set_partition_key() {
        let mut doc = sample();
        doc.set_partition_key(&PartitionKeyValue::new("3").unwrap());
        assert_eq!(doc.partition_key(), "3");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: std::result::Result<Document, _> =
            serde_json::from_str(r#"{"id":"a","partitionKey":"1"}"#);
        assert!(ok.is_ok());
        let bad: std::result::Result<Document, _> = serde_json::from_str(r#"{"id":"a"}"#);
        assert!(bad.is_err());
    }
}
