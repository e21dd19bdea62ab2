//! Harness commands
//!
//! Each menu action is a [`HarnessCommand`] value dispatched to the
//! matching [`OperationHarness`] method, so the presentation loop only
//! builds commands and renders reports.

use crate::adapters::database::QuerySpec;
use crate::core::harness::OperationHarness;
use crate::domain::{
    BulkOutcome, DocumentId, OperationOutcome, PartitionKeyValue, QueryOutcome, TtlSeconds,
};
use crate::generator::{PartitionStrategy, PersonGenerator};
use serde_json::Value;
use std::fmt;

/// Query text for listing every document
pub const QUERY_ALL: &str = "SELECT * FROM c";

/// Parameterized query by user name
pub const QUERY_BY_USER_NAME: &str = "SELECT * FROM c WHERE c.userName = @userName";

/// Parameterized query by email; email is not the partition key, so this
/// fans out across partitions
pub const QUERY_BY_EMAIL: &str = "SELECT * FROM c WHERE c.email = @email";

/// A single harness action with its inputs
#[derive(Debug, Clone, PartialEq)]
pub enum HarnessCommand {
    /// Generate and create one person
    WritePerson,

    /// Generate and create `count` people concurrently
    BulkWrite { count: usize },

    /// Patch the first name of a document
    PatchFirstName {
        id: DocumentId,
        partition_key: PartitionKeyValue,
        first_name: String,
    },

    /// Replace the email of a document under a version check
    UpdateEmail {
        id: DocumentId,
        partition_key: PartitionKeyValue,
        email: String,
    },

    /// Set the time-to-live of a document
    SetTtl {
        id: DocumentId,
        partition_key: PartitionKeyValue,
        ttl: TtlSeconds,
    },

    /// Read a document by id and partition key
    PointRead {
        id: DocumentId,
        partition_key: PartitionKeyValue,
    },

    /// List every document
    QueryAll,

    /// Find documents by user name
    QueryByUserName { user_name: String },

    /// Find documents by email across partitions
    QueryByEmail { email: String },

    /// Generate `count` people and write them all to one partition
    HotPartitionDemo {
        count: usize,
        partition_key: PartitionKeyValue,
    },
}

impl HarnessCommand {
    /// Run the command against the harness
    ///
    /// `generator` supplies records for the write commands. Bulk writes use
    /// the generator's own strategy; the hot-partition demo overrides every
    /// key regardless.
    pub async fn execute(
        self,
        harness: &OperationHarness,
        generator: &mut PersonGenerator,
    ) -> CommandReport {
        tracing::debug!(command = %self, "Executing command");

        match self {
            HarnessCommand::WritePerson => {
                let person = generator.generate();
                tracing::info!(
                    document_id = %person.id,
                    partition_key = %person.partition_key,
                    name = %person.display_name(),
                    "Writing person"
                );
                CommandReport::Operation(harness.create_record(&person).await)
            }
            HarnessCommand::BulkWrite { count } => {
                if matches!(generator.strategy(), PartitionStrategy::Hot(_)) {
                    tracing::warn!("Bulk write is using a hot partition strategy");
                }
                CommandReport::Bulk(harness.bulk_create_distributed(generator, count).await)
            }
            HarnessCommand::PatchFirstName {
                id,
                partition_key,
                first_name,
            } => CommandReport::Operation(
                harness
                    .patch_field(id.as_str(), &partition_key, "/firstName", Value::from(first_name))
                    .await,
            ),
            HarnessCommand::UpdateEmail {
                id,
                partition_key,
                email,
            } => CommandReport::Operation(
                harness
                    .replace_with_concurrency_check(
                        id.as_str(),
                        &partition_key,
                        "email",
                        Value::from(email),
                    )
                    .await,
            ),
            HarnessCommand::SetTtl {
                id,
                partition_key,
                ttl,
            } => CommandReport::Operation(harness.set_ttl(id.as_str(), &partition_key, ttl).await),
            HarnessCommand::PointRead { id, partition_key } => {
                CommandReport::Operation(harness.point_read(id.as_str(), &partition_key).await)
            }
            HarnessCommand::QueryAll => {
                CommandReport::Query(harness.query(QuerySpec::new(QUERY_ALL)).await)
            }
            HarnessCommand::QueryByUserName { user_name } => CommandReport::Query(
                harness
                    .query(QuerySpec::new(QUERY_BY_USER_NAME).with_parameter("@userName", user_name))
                    .await,
            ),
            HarnessCommand::QueryByEmail { email } => CommandReport::Query(
                harness
                    .query(QuerySpec::new(QUERY_BY_EMAIL).with_parameter("@email", email))
                    .await,
            ),
            HarnessCommand::HotPartitionDemo {
                count,
                partition_key,
            } => {
                let (documents, rejected) =
                    OperationHarness::documents_from_people(generator.generate_many(count));

                let mut bulk = harness.hot_partition_demo(documents, &partition_key).await;
                bulk.outcomes.extend(rejected);
                CommandReport::Bulk(bulk)
            }
        }
    }
}

impl fmt::Display for HarnessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarnessCommand::WritePerson => "write_person",
            HarnessCommand::BulkWrite { .. } => "bulk_write",
            HarnessCommand::PatchFirstName { .. } => "patch_first_name",
            HarnessCommand::UpdateEmail { .. } => "update_email",
            HarnessCommand::SetTtl { .. } => "set_ttl",
            HarnessCommand::PointRead { .. } => "point_read",
            HarnessCommand::QueryAll => "query_all",
            HarnessCommand::QueryByUserName { .. } => "query_by_user_name",
            HarnessCommand::QueryByEmail { .. } => "query_by_email",
            HarnessCommand::HotPartitionDemo { .. } => "hot_partition_demo",
        };
        f.write_str(name)
    }
}

/// Result of a command
#[derive(Debug, Clone)]
pub enum CommandReport {
    Operation(OperationOutcome),
    Bulk(BulkOutcome),
    Query(QueryOutcome),
}

impl CommandReport {
    /// Whether the command fully succeeded
    pub fn success(&self) -> bool {
        match self {
            CommandReport::Operation(o) => o.success,
            CommandReport::Bulk(b) => b.failure_count() == 0,
            CommandReport::Query(q) => q.success(),
        }
    }

    /// Short human-readable summary for the console
    pub fn summary(&self) -> String {
        match self {
            CommandReport::Operation(o) if o.success => {
                let mut line = format!(
                    "{} succeeded: id={} partitionKey={} status={} RU={:.2}",
                    o.operation,
                    o.document_id.as_deref().unwrap_or("-"),
                    o.partition_key.as_deref().unwrap_or("-"),
                    o.status_code.map(|s| s.to_string()).unwrap_or_default(),
                    o.request_charge
                );
                if let Some(expires_at) = o.expires_at {
                    line.push_str(&format!(" expiresAt={}", expires_at.to_rfc3339()));
                }
                line
            }
            CommandReport::Operation(o) => format!(
                "{} failed ({}): {}",
                o.operation,
                o.error.map(|c| c.to_string()).unwrap_or_default(),
                o.message.as_deref().unwrap_or("")
            ),
            CommandReport::Bulk(b) => format!(
                "Bulk: {} total, {} succeeded, {} failed ({} throttled), RU={:.2}, {:.2}s, {:.1}% success",
                b.total(),
                b.success_count(),
                b.failure_count(),
                b.throttled_count(),
                b.total_request_charge(),
                b.duration.as_secs_f64(),
                b.success_rate()
            ),
            CommandReport::Query(q) => {
                let status = if q.success() {
                    "completed".to_string()
                } else if q.cancelled {
                    "cancelled".to_string()
                } else {
                    format!(
                        "failed ({})",
                        q.message.as_deref().unwrap_or("unknown error")
                    )
                };
                format!(
                    "Query {status}: {} items in {} pages, RU={:.2}",
                    q.item_count, q.pages, q.request_charge
                )
            }
        }
    }
}
