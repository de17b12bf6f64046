//! CommitSource trait definition

use async_trait::async_trait;

use super::{ApiError, Commit, CommitQuery};

/// Read-only access to a repository's commit history
///
/// Implementations are shared across concurrent repository checks, so they
/// must not need mutation after construction.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Commits matching the query, newest first
    async fn list_commits(&self, query: &CommitQuery) -> Result<Vec<Commit>, ApiError>;
}
