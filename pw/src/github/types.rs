//! Commit query and response types

use serde::Deserialize;

/// Parameters of one "list commits" call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitQuery {
    pub owner: String,
    pub repo: String,
    /// Branch name or other ref
    pub branch: String,
    /// Only commits touching this path
    pub path: String,
    /// Inclusive lower bound, ISO-8601
    pub since: String,
}

/// A commit as far as change detection cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    /// Author date, ISO-8601
    pub authored_at: Option<String>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>, authored_at: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            authored_at: Some(authored_at.into()),
        }
    }
}

/// Partial API response item for `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Deserialize)]
pub(crate) struct CommitItem {
    #[serde(default)]
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<String>,
}

impl From<CommitItem> for Commit {
    fn from(item: CommitItem) -> Self {
        Self {
            sha: item.sha,
            message: item.commit.message,
            authored_at: item.commit.author.and_then(|a| a.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_item_conversion() {
        let items: Vec<CommitItem> = serde_json::from_value(serde_json::json!([
            {
                "sha": "abc123",
                "commit": {
                    "message": "fix bug",
                    "author": {"name": "Ada", "email": "ada@example.com", "date": "2024-01-02T10:00:00Z"},
                    "committer": {"name": "Ada", "date": "2024-01-02T10:05:00Z"}
                },
                "html_url": "https://github.com/acme/widgets/commit/abc123"
            },
            {
                "sha": "def456",
                "commit": {"message": "orphan", "author": null}
            }
        ]))
        .unwrap();

        let commits: Vec<Commit> = items.into_iter().map(Commit::from).collect();
        assert_eq!(commits[0], Commit::new("abc123", "fix bug", "2024-01-02T10:00:00Z"));
        assert_eq!(commits[1].authored_at, None);
    }
}
