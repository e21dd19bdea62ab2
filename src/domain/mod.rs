//! Domain models and types for the harness.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DocumentId`], [`PartitionKeyValue`], [`ETag`], [`TtlSeconds`])
//! - **Documents** ([`Document`], the generic key-value tree, and [`Person`], the demo record)
//! - **Outcomes** ([`OperationOutcome`], [`BulkOutcome`], [`QueryOutcome`])
//! - **Error types** ([`HarnessError`], [`StoreError`], [`ErrorClass`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use cosmos_harness::domain::{Document, Person};
//!
//! # fn example(person: Person) -> cosmos_harness::domain::Result<()> {
//! let document = Document::from_record(&person)?;
//! assert_eq!(document.id(), person.id);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod person;
pub mod result;

// Re-export commonly used types for convenience
pub use document::Document;
pub use errors::{ErrorClass, HarnessError, StoreError};
pub use ids::{DocumentId, ETag, PartitionKeyValue, TtlSeconds};
pub use outcome::{BulkOutcome, OperationKind, OperationOutcome, QueryOutcome};
pub use person::{Address, Company, Geo, Person};
pub use result::Result;
