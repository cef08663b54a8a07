//! GitHub access for resolving Lean toolchain repositories.
//!
//! [`RepoClient::build`] is the entry point: it validates the optional access
//! token, then resolves the `lean4` and `lean4-nightly` repositories that the
//! rest of the toolkit relies on.

mod client;
mod http;
mod repos;
mod types;

pub use client::{GitHubApi, RepoHost};
pub use repos::{normalize_url, repo_full_name, RepoClient};
pub use types::{ApiError, Repository, User};

#[cfg(test)]
pub(crate) use repos::testing;
