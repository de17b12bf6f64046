//! Configuration documents, merging and secret resolution
//!
//! Any number of YAML documents in one directory are folded into a single
//! [`CombinedConfig`]. Each document may carry an `env` mapping and a `repos`
//! list; both are optional and merged tolerantly.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Key for the notification webhook endpoint
pub const TEAMS_WEBHOOK_URL: &str = "TEAMS_WEBHOOK_URL";

/// Key for the API access token
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Key for the API base URL
pub const GITHUB_API_BASE_URL: &str = "GITHUB_API_BASE_URL";

/// Optional key that disables TLS certificate verification for the API client
pub const GITHUB_ACCEPT_INVALID_CERTS: &str = "GITHUB_ACCEPT_INVALID_CERTS";

/// Errors raised while loading configuration or resolving secrets
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),
}

/// One repository-level watch entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchedRepo {
    /// Repository address, e.g. `https://github.com/owner/name`
    pub url: String,

    /// Branch whose history is queried
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Paths checked in order
    #[serde(default)]
    pub paths: Vec<String>,

    /// Lookback window in hours
    #[serde(deserialize_with = "deserialize_hours")]
    pub since: u64,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Reads the leading whole number of hours: `24`, `"24"`, `"24h"` and `24.5`
/// all give 24
fn deserialize_hours<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hours {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Hours::deserialize(deserializer)? {
        Hours::Int(h) => Ok(h),
        Hours::Float(h) if h.is_finite() && h >= 0.0 => Ok(h.trunc() as u64),
        Hours::Float(h) => Err(serde::de::Error::custom(format!("invalid lookback hours: {}", h))),
        Hours::Text(s) => leading_hours(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid lookback hours: '{}'", s))),
    }
}

fn leading_hours(text: &str) -> Option<u64> {
    let trimmed = text.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// A single parsed configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub env: BTreeMap<String, String>,
    pub repos: Vec<WatchedRepo>,
}

impl ConfigDocument {
    /// Parse YAML text, keeping whatever parts of it have the expected shape
    ///
    /// Only invalid YAML is an error. A document that is not a mapping yields
    /// an empty document; malformed `env` values and `repos` entries are
    /// dropped individually.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(content)?;
        let mut doc = Self::default();

        let Value::Mapping(root) = value else {
            debug!("ConfigDocument::parse: document is not a mapping");
            return Ok(doc);
        };

        match root.get("env") {
            Some(Value::Mapping(env)) => {
                for (key, val) in env {
                    let Some(key) = scalar_to_string(key) else {
                        warn!(?key, "Ignoring env entry with non-scalar key");
                        continue;
                    };
                    match val {
                        // A null entry still overrides earlier documents
                        Value::Null => {
                            doc.env.insert(key, String::new());
                        }
                        other => match scalar_to_string(other) {
                            Some(v) => {
                                doc.env.insert(key, v);
                            }
                            None => warn!(%key, "Ignoring env entry with non-scalar value"),
                        },
                    }
                }
            }
            Some(Value::Null) | None => {}
            Some(_) => warn!("Ignoring 'env': expected a mapping"),
        }

        match root.get("repos") {
            Some(Value::Sequence(repos)) => {
                for (idx, entry) in repos.iter().enumerate() {
                    match serde_yaml::from_value::<WatchedRepo>(entry.clone()) {
                        Ok(repo) => doc.repos.push(repo),
                        Err(e) => warn!(index = idx, error = %e, "Ignoring malformed repos entry"),
                    }
                }
            }
            Some(Value::Null) | None => {}
            Some(_) => warn!("Ignoring 'repos': expected a sequence"),
        }

        Ok(doc)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The merged view of every configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedConfig {
    pub env: BTreeMap<String, String>,
    pub repos: Vec<WatchedRepo>,
}

impl CombinedConfig {
    /// Fold one document in: `env` is last-writer-wins, `repos` appends
    pub fn merge(&mut self, doc: ConfigDocument) {
        self.env.extend(doc.env);
        self.repos.extend(doc.repos);
    }
}

/// Load and merge every regular file directly inside `dir`
///
/// Files are visited in file-name order. Unreadable or unparseable files are
/// logged and skipped; only an unlistable directory is an error.
pub fn load_dir(dir: &Path) -> Result<CombinedConfig, ConfigError> {
    debug!(dir = %dir.display(), "load_dir: called");
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut combined = CombinedConfig::default();
    for path in files {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable config file");
                continue;
            }
        };
        match ConfigDocument::parse(&content) {
            Ok(doc) => {
                debug!(file = %path.display(), env = doc.env.len(), repos = doc.repos.len(), "load_dir: merged");
                combined.merge(doc);
            }
            Err(e) => warn!(file = %path.display(), error = %e, "Skipping unparseable config file"),
        }
    }

    info!(
        dir = %dir.display(),
        repos = combined.repos.len(),
        "Loaded configuration"
    );
    Ok(combined)
}

/// Snapshot of the process environment, taken once at startup
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot(BTreeMap<String, String>);

impl EnvSnapshot {
    /// Capture the current process environment
    pub fn capture() -> Self {
        Self(std::env::vars().collect())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// The endpoints and credentials a run needs
#[derive(Clone)]
pub struct Secrets {
    pub webhook_url: String,
    pub token: String,
    pub api_base_url: String,
    pub accept_invalid_certs: bool,
}

impl Secrets {
    /// Resolve from merged config, falling back to the environment snapshot
    ///
    /// Empty values count as absent. Every missing key is reported at once.
    pub fn resolve(config: &CombinedConfig, env: &EnvSnapshot) -> Result<Self, ConfigError> {
        let lookup = |key: &str| -> Option<String> {
            config
                .env
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .or_else(|| env.get(key).filter(|v| !v.is_empty()))
                .map(str::to_string)
        };

        let webhook_url = lookup(TEAMS_WEBHOOK_URL);
        let token = lookup(GITHUB_TOKEN);
        let api_base_url = lookup(GITHUB_API_BASE_URL);

        let (Some(webhook_url), Some(token), Some(api_base_url)) = (&webhook_url, &token, &api_base_url) else {
            let missing: Vec<&'static str> = [
                (TEAMS_WEBHOOK_URL, webhook_url.is_none()),
                (GITHUB_TOKEN, token.is_none()),
                (GITHUB_API_BASE_URL, api_base_url.is_none()),
            ]
            .into_iter()
            .filter_map(|(key, absent)| absent.then_some(key))
            .collect();
            return Err(ConfigError::MissingSecrets(missing));
        };

        let accept_invalid_certs = lookup(GITHUB_ACCEPT_INVALID_CERTS)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            webhook_url: webhook_url.clone(),
            token: token.clone(),
            api_base_url: api_base_url.clone(),
            accept_invalid_certs,
        })
    }

    /// Token in a form safe to log
    pub fn masked_token(&self) -> String {
        mask_secret(&self.token)
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("webhook_url", &self.webhook_url)
            .field("token", &self.masked_token())
            .field("api_base_url", &self.api_base_url)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// Show the first and last four characters only
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
