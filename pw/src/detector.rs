//! Per-repository change detection
//!
//! Each watched path is checked on its own: query the commits since the
//! cutoff, fold them into one [`ChangeRecord`], and hand that to the notifier.
//! Paths run one after another so a path's alert goes out before the next
//! path is queried. A failure on one path is logged and the next path is
//! still checked.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::WatchedRepo;
use crate::github::{ApiError, Commit, CommitQuery, CommitSource};
use crate::notify::{Notifier, NotifyError};
use crate::repo::{RepoIdentity, RepoUrlError};

/// Reasons a whole repository is skipped
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    InvalidUrl(#[from] RepoUrlError),

    #[error("Invalid lookback window: {0} hours")]
    InvalidLookback(u64),
}

/// Failure while checking one repository path
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Commit query failed: {0}")]
    Query(#[from] ApiError),

    #[error("Notification failed: {0}")]
    Notify(#[from] NotifyError),
}

/// Aggregated matching commits for one repository path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub repo: RepoIdentity,
    pub path: String,
    /// Every commit message, newline-joined, newest first
    pub combined_message: String,
    /// Author date of the newest commit
    pub most_recent: String,
}

impl ChangeRecord {
    /// Build a record from a newest-first commit list
    ///
    /// Returns `None` for an empty list. The newest commit must carry an
    /// author date.
    pub fn from_commits(repo: &RepoIdentity, path: &str, commits: &[Commit]) -> Result<Option<Self>, ApiError> {
        let Some(newest) = commits.first() else {
            return Ok(None);
        };

        let most_recent = newest
            .authored_at
            .clone()
            .ok_or_else(|| ApiError::InvalidResponse(format!("commit {} has no author date", newest.sha)))?;

        let combined_message = commits
            .iter()
            .map(|c| c.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Some(Self {
            repo: repo.clone(),
            path: path.to_string(),
            combined_message,
            most_recent,
        }))
    }
}

/// Outcome counts for one repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoReport {
    pub paths_checked: usize,
    pub changes: usize,
    pub failures: usize,
}

/// `now - hours`, as an RFC 3339 instant with millisecond precision
pub fn lookback_cutoff(now: DateTime<Utc>, hours: u64) -> Result<String, RepoError> {
    if hours == 0 {
        return Err(RepoError::InvalidLookback(hours));
    }
    let cutoff = i64::try_from(hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or(RepoError::InvalidLookback(hours))?;

    Ok(cutoff.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Checks watched repositories against a commit source
#[derive(Clone)]
pub struct ChangeDetector {
    source: Arc<dyn CommitSource>,
    notifier: Arc<dyn Notifier>,
}

impl ChangeDetector {
    pub fn new(source: Arc<dyn CommitSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self { source, notifier }
    }

    /// Check every path of one watched repository
    ///
    /// The cutoff is computed once from `now`, so every path shares it.
    pub async fn check_repo(&self, repo: &WatchedRepo, now: DateTime<Utc>) -> Result<RepoReport, RepoError> {
        debug!(url = %repo.url, branch = %repo.branch, since = repo.since, "check_repo: called");
        let identity = RepoIdentity::parse(&repo.url)?;
        let since = lookback_cutoff(now, repo.since)?;
        Ok(self.check_paths(&identity, &repo.branch, &repo.paths, &since).await)
    }

    /// Check paths in order; failures are logged and counted, never returned
    pub async fn check_paths(&self, repo: &RepoIdentity, branch: &str, paths: &[String], since: &str) -> RepoReport {
        let mut report = RepoReport::default();

        for path in paths {
            info!("Checking {} for changes in {}", repo, path);
            report.paths_checked += 1;
            match self.check_path(repo, branch, path, since).await {
                Ok(Some(_)) => report.changes += 1,
                Ok(None) => debug!(%repo, %path, "check_paths: no changes"),
                Err(e) => {
                    error!(owner = %repo.owner, repo = %repo.name, %path, error = %e, "Error checking path");
                    report.failures += 1;
                }
            }
        }

        report
    }

    /// Query one path and notify if anything matched
    pub async fn check_path(
        &self,
        repo: &RepoIdentity,
        branch: &str,
        path: &str,
        since: &str,
    ) -> Result<Option<ChangeRecord>, DetectError> {
        let query = CommitQuery {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            branch: branch.to_string(),
            path: path.to_string(),
            since: since.to_string(),
        };

        let commits = self.source.list_commits(&query).await?;
        let Some(record) = ChangeRecord::from_commits(repo, path, &commits)? else {
            return Ok(None);
        };

        info!(%repo, %path, commits = commits.len(), "Changes detected");
        self.notifier.notify(&record).await?;
        Ok(Some(record))
    }
}
