//! Process-scoped set of opened repositories, one per domain.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::domain;
use crate::error::RepoError;
use crate::repository::Repository;
use crate::resolver::Preference;

/// Opened repositories keyed by normalised domain.
///
/// The registry is an ordinary value: its lifetime is whatever scope the
/// caller keeps it in. Looking a repository up may open it, which performs
/// network I/O.
#[derive(Debug)]
pub struct RepositoryRegistry {
    client: Client,
    repos_root: PathBuf,
    preference: Preference,
    repos: HashMap<String, Arc<Repository>>,
}

impl RepositoryRegistry {
    /// Create an empty registry caching indexes under `repos_root`.
    pub fn new(client: Client, repos_root: impl Into<PathBuf>) -> Self {
        Self::with_storage(client, repos_root, HashMap::new())
    }

    /// Create a registry over existing storage.
    pub fn with_storage(
        client: Client,
        repos_root: impl Into<PathBuf>,
        repos: HashMap<String, Arc<Repository>>,
    ) -> Self {
        Self {
            client,
            repos_root: repos_root.into(),
            preference: Preference::default(),
            repos,
        }
    }

    /// Version preference for repositories opened from now on.
    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preference = preference;
        self
    }

    pub fn repos_root(&self) -> &Path {
        &self.repos_root
    }

    /// Return the repository for `url`'s domain, opening and registering it
    /// first if this is the first request for that domain.
    ///
    /// An existing repository is returned as-is, even when `url` names a
    /// different path on the same domain; its index is not re-fetched.
    ///
    /// # Errors
    ///
    /// [`RepoError::InvalidUrl`] for an unusable URL, or any error from
    /// [`Repository::open`]. Nothing is registered on failure.
    pub async fn get_or_create(&mut self, url: &str) -> Result<Arc<Repository>, RepoError> {
        let domain = domain::normalize(url)?;

        if let Some(repo) = self.repos.get(&domain) {
            debug!("Reusing repository {} for {url}", repo.url());
            return Ok(Arc::clone(repo));
        }

        let repo = Arc::new(
            Repository::open(self.client.clone(), url, &self.repos_root, self.preference).await?,
        );
        self.repos.insert(domain, Arc::clone(&repo));
        Ok(repo)
    }

    /// Look up an already opened repository without any I/O.
    pub fn get(&self, url: &str) -> Option<Arc<Repository>> {
        let domain = domain::normalize(url).ok()?;
        self.repos.get(&domain).cloned()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}
