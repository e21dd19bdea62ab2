//! Identifier types with validation
//!
//! Newtype wrappers for document identifiers, partition key values and
//! version tokens. Each type keeps ids from being mixed up with each other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document identifier
///
/// Unique within a partition. Generated documents use UUID v4 strings.
///
/// # Examples
///
/// ```
/// use cosmos_harness::domain::ids::DocumentId;
/// use std::str::FromStr;
///
/// let id = DocumentId::from_str("0b0e6d6c-43a5-4bb6-8d44-2a37c7a1f1a3").unwrap();
/// assert_eq!(id.as_str(), "0b0e6d6c-43a5-4bb6-8d44-2a37c7a1f1a3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a new DocumentId, trimming surrounding whitespace
    ///
    /// Returns `Err` if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err("Document ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Partition key value
///
/// The store routes and co-locates documents by this value. Skewed
/// distributions concentrate load on a single physical partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKeyValue(String);

impl PartitionKeyValue {
    /// Creates a new partition key value, trimming surrounding whitespace
    ///
    /// Returns `Err` if the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err("Partition key cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// Returns the value as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PartitionKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PartitionKeyValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PartitionKeyValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque version token returned with every read and write
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ETag(String);

impl ETag {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time-to-live in seconds
///
/// `-1` disables expiry for the document; any non-negative value expires the
/// document that many seconds after its last modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlSeconds(i32);

impl TtlSeconds {
    /// Never expire
    pub const NEVER: TtlSeconds = TtlSeconds(-1);

    pub fn new(seconds: i32) -> Result<Self, String> {
        if seconds < -1 {
            return Err(format!(
                "TTL must be -1 (never expire) or a non-negative number of seconds, got {seconds}"
            ));
        }
        Ok(Self(seconds))
    }

    pub fn as_secs(&self) -> i32 {
        self.0
    }

    /// Whether this TTL schedules an expiry
    pub fn expires(&self) -> bool {
        self.0 >= 0
    }
}

impl FromStr for TtlSeconds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds: i32 = s
            .trim()
            .parse()
            .map_err(|_| format!("TTL must be an integer number of seconds, got '{}'", s.trim()))?;
        Self::new(seconds)
    }
}

impl fmt::Display for TtlSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
