//! Commit history client
//!
//! One operation matters here: list the commits on a branch that touch a path
//! since a given instant, newest first.

mod client;
mod error;
mod rest;
mod types;

pub use client::CommitSource;
pub use error::ApiError;
pub use rest::{COMMITS_PER_PAGE, GitHubClient};
pub use types::{Commit, CommitQuery};

#[cfg(test)]
pub use client::mock;
