//! Structured operation outcomes
//!
//! Every harness call produces one of these instead of returning an error,
//! so a failed operation never cascades into the next one.

use crate::domain::document::Document;
use crate::domain::errors::{ErrorClass, HarnessError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Operation kinds exposed by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    PointRead,
    Patch,
    ConcurrencyReplace,
    SetTtl,
    Query,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Create => "create",
            OperationKind::PointRead => "point_read",
            OperationKind::Patch => "patch",
            OperationKind::ConcurrencyReplace => "concurrency_replace",
            OperationKind::SetTtl => "set_ttl",
            OperationKind::Query => "query",
        };
        f.write_str(name)
    }
}

/// Result of a single harness operation
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub operation: OperationKind,
    pub success: bool,
    pub document_id: Option<String>,
    pub partition_key: Option<String>,

    /// HTTP-like status code reported by the store
    pub status_code: Option<u16>,

    /// Request units consumed, summed over every store call the operation made
    pub request_charge: f64,

    /// Version token after the operation
    pub etag: Option<String>,

    pub error: Option<ErrorClass>,
    pub message: Option<String>,

    /// Document returned by point reads
    pub document: Option<Document>,

    /// Expected expiry for TTL updates
    pub expires_at: Option<DateTime<Utc>>,
}

impl OperationOutcome {
    /// Successful outcome for a document
    pub fn succeeded(
        operation: OperationKind,
        document_id: impl Into<String>,
        partition_key: impl Into<String>,
        status_code: u16,
        request_charge: f64,
    ) -> Self {
        Self {
            operation,
            success: true,
            document_id: Some(document_id.into()),
            partition_key: Some(partition_key.into()),
            status_code: Some(status_code),
            request_charge,
            etag: None,
            error: None,
            message: None,
            document: None,
            expires_at: None,
        }
    }

    /// Failed outcome classified from a harness error
    pub fn failed(
        operation: OperationKind,
        document_id: Option<String>,
        partition_key: Option<String>,
        error: &HarnessError,
    ) -> Self {
        Self {
            operation,
            success: false,
            document_id,
            partition_key,
            status_code: error.status_code(),
            request_charge: 0.0,
            etag: None,
            error: Some(error.class()),
            message: Some(error.to_string()),
            document: None,
            expires_at: None,
        }
    }

    /// Outcome for an operation skipped because shutdown was requested
    pub fn cancelled(operation: OperationKind) -> Self {
        Self {
            operation,
            success: false,
            document_id: None,
            partition_key: None,
            status_code: None,
            request_charge: 0.0,
            etag: None,
            error: Some(ErrorClass::Cancelled),
            message: Some("Shutdown requested before the operation started".to_string()),
            document: None,
            expires_at: None,
        }
    }

    pub fn with_etag(mut self, etag: Option<String>) -> Self {
        self.etag = etag;
        self
    }

    /// Add the cost of an earlier store call made by the same operation
    pub fn with_additional_charge(mut self, charge: f64) -> Self {
        self.request_charge += charge;
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the store rejected a stale version token
    pub fn is_conflict(&self) -> bool {
        self.error == Some(ErrorClass::Conflict)
    }
}

/// Aggregate result of a concurrent batch of creates
#[derive(Debug, Clone)]
pub struct BulkOutcome {
    /// One outcome per input document, in input order
    pub outcomes: Vec<OperationOutcome>,
    pub duration: Duration,
}

impl BulkOutcome {
    pub fn new(outcomes: Vec<OperationOutcome>, duration: Duration) -> Self {
        Self { outcomes, duration }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    pub fn throttled_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.error == Some(ErrorClass::Throttled))
            .count()
    }

    pub fn total_request_charge(&self) -> f64 {
        self.outcomes.iter().map(|o| o.request_charge).sum()
    }

    /// Success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 100.0;
        }
        (self.success_count() as f64 / self.total() as f64) * 100.0
    }
}

/// Result of iterating a paged query
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub query: String,
    pub pages: usize,
    pub item_count: usize,
    pub request_charge: f64,

    /// All pages were read without error
    pub completed: bool,

    /// Pagination stopped because shutdown was requested
    pub cancelled: bool,

    pub error: Option<ErrorClass>,
    pub message: Option<String>,
}

impl QueryOutcome {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.completed && self.error.is_none()
    }
}
