//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and optional
//! JSON files with daily or hourly rotation.
//!
//! # Example
//!
//! ```no_run
//! use cosmos_harness::config::LoggingConfig;
//! use cosmos_harness::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default())?;
//! tracing::info!(document_id = "abc", "Document created");
//! # Ok::<(), cosmos_harness::domain::HarnessError>(())
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the result of a single store operation
///
/// Failures are logged at warn level with their error class.
///
/// # Example
///
/// ```no_run
/// use cosmos_harness::domain::{OperationKind, OperationOutcome};
/// use cosmos_harness::log_operation_outcome;
///
/// let outcome = OperationOutcome::succeeded(OperationKind::Create, "id-1", "1", 201, 5.71);
/// log_operation_outcome!(&outcome);
/// ```
#[macro_export]
macro_rules! log_operation_outcome {
    ($outcome:expr) => {{
        let outcome = $outcome;
        if outcome.success {
            tracing::info!(
                operation = %outcome.operation,
                document_id = outcome.document_id.as_deref().unwrap_or("-"),
                partition_key = outcome.partition_key.as_deref().unwrap_or("-"),
                status_code = ?outcome.status_code,
                request_charge = outcome.request_charge,
                "Operation succeeded"
            );
        } else {
            tracing::warn!(
                operation = %outcome.operation,
                document_id = outcome.document_id.as_deref().unwrap_or("-"),
                partition_key = outcome.partition_key.as_deref().unwrap_or("-"),
                status_code = ?outcome.status_code,
                error_class = %outcome.error.map(|c| c.to_string()).unwrap_or_default(),
                message = outcome.message.as_deref().unwrap_or(""),
                "Operation failed"
            );
        }
    }};
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cosmos_harness::domain::HarnessError;
/// use cosmos_harness::log_error_with_context;
///
/// let error = HarnessError::Configuration("cosmosdb.endpoint is required".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
