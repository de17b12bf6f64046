//! Run orchestration
//!
//! One pass: load configuration, resolve secrets, build the shared clients,
//! then check every watched repository concurrently. Each repository runs in
//! its own task; the pass ends when every task has finished.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, EnvSnapshot, Secrets, WatchedRepo, load_dir};
use crate::detector::{ChangeDetector, RepoReport};
use crate::github::{ApiError, CommitSource, GitHubClient};
use crate::notify::{Notifier, NotifyError, TeamsWebhook};

/// Failures that abort a run before any repository is checked
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build API client: {0}")]
    ApiClient(#[from] ApiError),

    #[error("Failed to build webhook client: {0}")]
    Webhook(#[from] NotifyError),
}

/// Totals for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub repos: usize,
    pub repos_skipped: usize,
    pub repos_crashed: usize,
    pub paths_checked: usize,
    pub paths_failed: usize,
    pub notifications: usize,
}

impl RunSummary {
    fn absorb(&mut self, report: RepoReport) {
        self.paths_checked += report.paths_checked;
        self.paths_failed += report.failures;
        self.notifications += report.changes;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} repos ({} skipped, {} crashed), {} paths checked ({} failed), {} notifications sent",
            self.repos,
            self.repos_skipped,
            self.repos_crashed,
            self.paths_checked,
            self.paths_failed,
            self.notifications
        )
    }
}

/// Fans change detection out over every watched repository
pub struct Orchestrator {
    detector: ChangeDetector,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn CommitSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            detector: ChangeDetector::new(source, notifier),
        }
    }

    /// Check all repositories concurrently and wait for every one of them
    ///
    /// Nothing a single repository does can fail the run: skipped repos,
    /// failed paths and panicking tasks are logged and counted.
    pub async fn run(&self, repos: Vec<WatchedRepo>) -> RunSummary {
        debug!(count = repos.len(), "Orchestrator::run: called");
        let now = Utc::now();
        let mut summary = RunSummary {
            repos: repos.len(),
            ..Default::default()
        };

        let mut tasks = JoinSet::new();
        for repo in repos {
            let detector = self.detector.clone();
            tasks.spawn(async move {
                let result = detector.check_repo(&repo, now).await;
                (repo.url, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, Ok(report))) => {
                    debug!(%url, ?report, "Orchestrator::run: repository done");
                    summary.absorb(report);
                }
                Ok((url, Err(e))) => {
                    warn!(%url, error = %e, "Skipping repository");
                    summary.repos_skipped += 1;
                }
                Err(e) => {
                    error!(error = %e, "Repository check crashed");
                    summary.repos_crashed += 1;
                }
            }
        }

        info!(%summary, "Run complete");
        summary
    }
}

/// Perform one full pass over the configuration in `config_dir`
pub async fn run_once(config_dir: &Path, env: &EnvSnapshot) -> Result<RunSummary, RunError> {
    let config = load_dir(config_dir)?;
    let secrets = Secrets::resolve(&config, env)?;

    info!("TEAMS_WEBHOOK_URL: {}", secrets.webhook_url);
    info!("GITHUB_TOKEN: {}", secrets.masked_token());
    info!("GITHUB_API_BASE_URL: {}", secrets.api_base_url);
    if secrets.accept_invalid_certs {
        warn!("TLS certificate verification is disabled for the API client");
    }

    let source = Arc::new(GitHubClient::from_secrets(&secrets)?);
    let notifier = Arc::new(TeamsWebhook::new(&secrets.webhook_url)?);

    Ok(Orchestrator::new(source, notifier).run(config.repos).await)
}
