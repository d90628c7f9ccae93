//! Issue persistence.
//!
//! The service only talks to the [`IssueStore`] trait. Two backends exist:
//! PostgreSQL for deployments and an in-memory collection for development
//! and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::models::{Issue, IssuePatch, IssueQuery, NewIssue};

pub use memory::MemoryIssueStore;
pub use postgres::PgIssueStore;

/// Persistence failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store for issues
///
/// Identifiers are opaque strings to callers. A malformed identifier never
/// resolves, it is not an error.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Persists a new issue, assigning `id` and setting `created_on` and
    /// `updated_on` to the same instant.
    async fn insert(&self, issue: NewIssue) -> StoreResult<Issue>;

    /// All issues matching the query, in insertion order
    async fn find_many(&self, query: &IssueQuery) -> StoreResult<Vec<Issue>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Issue>>;

    /// Applies the patch and advances `updated_on`. No-op when the id does
    /// not resolve.
    async fn patch_by_id(&self, id: &str, patch: &IssuePatch) -> StoreResult<()>;

    /// Removes the issue. No-op when the id does not resolve.
    async fn delete_by_id(&self, id: &str) -> StoreResult<()>;

    /// Whether the backend can currently serve requests
    async fn ping(&self) -> bool;
}

/// Current time at the precision PostgreSQL stores
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Next `updated_on` value, strictly after the previous one
pub(crate) fn next_updated_on(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + Duration::microseconds(1))
}
