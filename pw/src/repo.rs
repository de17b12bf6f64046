//! Repository URL parsing

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://([^/?#]+)/([^/?#]+)/([^/?#]+)").expect("repository URL pattern is valid")
});

/// Raised when a repository address is not `scheme://host/owner/name...`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoUrlError {
    #[error("Invalid repository URL: {0}")]
    InvalidShape(String),
}

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentity {
    pub owner: String,
    pub name: String,
}

impl RepoIdentity {
    /// Extract `{owner, name}` from a repository URL
    ///
    /// Anything after the name segment is ignored, and a trailing `.git` is
    /// dropped from the name.
    pub fn parse(url: &str) -> Result<Self, RepoUrlError> {
        let caps = REPO_URL
            .captures(url.trim())
            .ok_or_else(|| RepoUrlError::InvalidShape(url.to_string()))?;

        let owner = caps[2].to_string();
        let name = caps[3].strip_suffix(".git").unwrap_or(&caps[3]).to_string();
        if name.is_empty() {
            return Err(RepoUrlError::InvalidShape(url.to_string()));
        }

        Ok(Self { owner, name })
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_url() {
        let id = RepoIdentity::parse("https://github.com/acme/widgets").unwrap();
        assert_eq!(id.owner, "acme");
        assert_eq!(id.name, "widgets");
        assert_eq!(id.to_string(), "acme/widgets");
    }

    #[test]
    fn test_parse_ignores_trailing_segments() {
        let id = RepoIdentity::parse("http://ghe.example.com/platform/api/tree/main/src").unwrap();
        assert_eq!(id, RepoIdentity {
            owner: "platform".to_string(),
            name: "api".to_string(),
        });
    }

    #[test]
    fn test_parse_strips_git_suffix_and_query() {
        let id = RepoIdentity::parse("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(id.name, "widgets");

        let id = RepoIdentity::parse("https://github.com/acme/widgets?tab=readme").unwrap();
        assert_eq!(id.name, "widgets");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for url in [
            "not-a-valid-url",
            "https://github.com/acme",
            "https://github.com/acme/",
            "ftp://github.com/acme/widgets",
            "github.com/acme/widgets",
            "https://github.com/acme/.git",
            "",
        ] {
            assert_eq!(
                RepoIdentity::parse(url),
                Err(RepoUrlError::InvalidShape(url.to_string())),
                "{url} should be rejected"
            );
        }
    }
}
