//! REST client for the commits endpoint

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::CommitItem;
use super::{ApiError, Commit, CommitQuery, CommitSource};
use crate::config::{Secrets, mask_secret};

/// Page size requested from the commits endpoint; only the first page is read
pub const COMMITS_PER_PAGE: u32 = 100;

const USER_AGENT: &str = concat!("pathwatch/", env!("CARGO_PKG_VERSION"));

/// GitHub (or GitHub Enterprise) commits client
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for `base_url`, e.g. `https://api.github.com`
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::build(base_url, token, false)
    }

    /// Create a client from resolved secrets
    pub fn from_secrets(secrets: &Secrets) -> Result<Self, ApiError> {
        debug!(?secrets, "GitHubClient::from_secrets: called");
        Self::build(&secrets.api_base_url, &secrets.token, secrets.accept_invalid_certs)
    }

    fn build(base_url: &str, token: &str, accept_invalid_certs: bool) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn commits_url(&self, query: &CommitQuery) -> String {
        format!("{}/repos/{}/{}/commits", self.base_url, query.owner, query.repo)
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

#[async_trait]
impl CommitSource for GitHubClient {
    async fn list_commits(&self, query: &CommitQuery) -> Result<Vec<Commit>, ApiError> {
        let url = self.commits_url(query);
        debug!(%url, branch = %query.branch, path = %query.path, since = %query.since, "list_commits: called");

        let per_page = COMMITS_PER_PAGE.to_string();
        let resp = self
            .http
            .get(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .query(&[
                ("sha", query.branch.as_str()),
                ("path", query.path.as_str()),
                ("since", query.since.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "list_commits: error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let items: Vec<CommitItem> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::InvalidResponse(format!("commits payload: {}", e)))?;

        debug!(count = items.len(), "list_commits: received");
        Ok(items.into_iter().map(Commit::from).collect())
    }
}
