//! Domain error types
//!
//! This module defines the error hierarchy for the harness.
//! All errors are domain-specific and don't expose third-party SDK types.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main harness error type
///
/// Configuration and connection errors are fatal at startup. Store errors are
/// caught at the harness boundary and turned into operation outcomes.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration-related errors (missing endpoint, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The store client could not be constructed
    #[error("Store connection error: {0}")]
    StoreConnection(String),

    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Document store errors
///
/// Every backend maps its native failures onto these variants so the harness
/// can classify outcomes without knowing which client produced them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found (404)
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Version token mismatch on a conditional write (412)
    #[error("Version conflict: {0}")]
    Conflict(String),

    /// A document with the same id already exists in the partition (409)
    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    /// Request rate too large (429)
    #[error("Request rate too large (429): {0}")]
    Throttled(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other store-surfaced failure
    #[error("Transient store error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Transient {
        status: Option<u16>,
        message: String,
    },

    /// Failed to create database
    #[error("Failed to create database: {0}")]
    DatabaseCreationFailed(String),

    /// Failed to create container
    #[error("Failed to create container: {0}")]
    ContainerCreationFailed(String),

    /// Failed to deserialize a store response
    #[error("Failed to deserialize response: {0}")]
    DeserializationFailed(String),
}

impl StoreError {
    /// Map an HTTP-like status code and message onto a store error
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => StoreError::InvalidRequest(message),
            404 => StoreError::NotFound(message),
            409 => StoreError::AlreadyExists(message),
            412 => StoreError::Conflict(message),
            429 => StoreError::Throttled(message),
            _ => StoreError::Transient {
                status: Some(status),
                message,
            },
        }
    }

    /// HTTP-like status code for this error, when one is known
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StoreError::InvalidRequest(_) => Some(400),
            StoreError::NotFound(_) => Some(404),
            StoreError::AlreadyExists(_) => Some(409),
            StoreError::Conflict(_) => Some(412),
            StoreError::Throttled(_) => Some(429),
            StoreError::Transient { status, .. } => *status,
            StoreError::DatabaseCreationFailed(_)
            | StoreError::ContainerCreationFailed(_)
            | StoreError::DeserializationFailed(_) => None,
        }
    }

    /// Classification reported in operation outcomes
    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::NotFound(_) => ErrorClass::NotFound,
            StoreError::Conflict(_) => ErrorClass::Conflict,
            StoreError::AlreadyExists(_) => ErrorClass::AlreadyExists,
            StoreError::Throttled(_) => ErrorClass::Throttled,
            StoreError::InvalidRequest(_) => ErrorClass::InvalidRequest,
            StoreError::Transient { .. }
            | StoreError::DatabaseCreationFailed(_)
            | StoreError::ContainerCreationFailed(_)
            | StoreError::DeserializationFailed(_) => ErrorClass::Transient,
        }
    }
}

/// Error classification carried by operation outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    NotFound,
    Conflict,
    AlreadyExists,
    Throttled,
    InvalidRequest,
    Transient,
    Validation,
    Cancelled,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::NotFound => "not_found",
            ErrorClass::Conflict => "conflict",
            ErrorClass::AlreadyExists => "already_exists",
            ErrorClass::Throttled => "throttled",
            ErrorClass::InvalidRequest => "invalid_request",
            ErrorClass::Transient => "transient",
            ErrorClass::Validation => "validation",
            ErrorClass::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl HarnessError {
    /// Classification of this error for outcome reporting
    pub fn class(&self) -> ErrorClass {
        match self {
            HarnessError::Store(e) => e.class(),
            HarnessError::Validation(_) => ErrorClass::Validation,
            _ => ErrorClass::Transient,
        }
    }

    /// Status code of the underlying store error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HarnessError::Store(e) => e.status_code(),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        HarnessError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HarnessError {
    fn from(err: toml::de::Error) -> Self {
        HarnessError::Configuration(format!("TOML parse error: {err}"))
    }
}
