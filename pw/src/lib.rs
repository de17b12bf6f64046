//! PathWatch - repository path change notifier
//!
//! A single pass over a configured watch-list: for every watched repository,
//! query the commit history of each watched path within a lookback window and
//! post a message card to a chat webhook when anything changed.
//!
//! # Flow
//!
//! ```text
//! configs/*.yml ──► CombinedConfig ──► Secrets
//!                         │
//!                         ▼
//!                   Orchestrator ──(one task per repo)──► ChangeDetector
//!                                                             │ per path, in order
//!                                                             ▼
//!                                          CommitSource ──► Notifier
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration documents, merging and secret resolution
//! - [`repo`] - Repository URL parsing
//! - [`github`] - Commit history client
//! - [`notify`] - Message card rendering and webhook delivery
//! - [`detector`] - Per-repository change detection
//! - [`runner`] - Run orchestration
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod detector;
pub mod github;
pub mod notify;
pub mod repo;
pub mod runner;

pub use config::{CombinedConfig, ConfigError, EnvSnapshot, Secrets, WatchedRepo, load_dir};
pub use detector::{ChangeDetector, ChangeRecord, DetectError, RepoError, RepoReport, lookback_cutoff};
pub use github::{ApiError, Commit, CommitQuery, CommitSource, GitHubClient};
pub use notify::{MessageCard, NotifyError, Notifier, TeamsWebhook};
pub use repo::{RepoIdentity, RepoUrlError};
pub use runner::{Orchestrator, RunError, RunSummary, run_once};

/// Default configuration directory, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "./configs";
