//! A repository with its index loaded.

use std::path::{Path, PathBuf};

use droidrepo_schema::Arch;
use reqwest::Client;
use tracing::info;

use crate::catalog::Catalog;
use crate::domain::RepositoryIdentity;
use crate::error::RepoError;
use crate::resolver::{self, Preference, ResolvedVersion};
use crate::{artifact, index_cache};

/// One remote repository, fully initialised.
///
/// Construction fetches and parses the index; a `Repository` value therefore
/// always has a usable catalog. The catalog is never refreshed afterwards.
#[derive(Debug)]
pub struct Repository {
    identity: RepositoryIdentity,
    cache_dir: PathBuf,
    index_path: PathBuf,
    catalog: Catalog,
    preference: Preference,
    client: Client,
}

impl Repository {
    /// Open the repository at `url`, caching its index under
    /// `{repos_root}/{domain}/`.
    ///
    /// # Errors
    ///
    /// Any [`RepoError`] from URL normalisation, the index cache, or catalog
    /// parsing. No partially initialised repository is returned.
    pub async fn open(
        client: Client,
        url: &str,
        repos_root: &Path,
        preference: Preference,
    ) -> Result<Self, RepoError> {
        let identity = RepositoryIdentity::new(url)?;
        let cache_dir = repos_root.join(identity.domain());

        let cached = index_cache::ensure_fresh(&client, identity.url(), &cache_dir).await?;
        let catalog = Catalog::parse(identity.url(), &cached.bytes)?;
        info!(
            "Loaded {} ({} apps, index {})",
            identity,
            catalog.len(),
            cached.file_name
        );

        Ok(Self {
            identity,
            cache_dir,
            index_path: cached.path,
            catalog,
            preference,
            client,
        })
    }

    pub fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    pub fn url(&self) -> &str {
        self.identity.url()
    }

    pub fn domain(&self) -> &str {
        self.identity.domain()
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Location of the cached index file.
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Choose the version of `app_id` for an `arch` device.
    ///
    /// # Errors
    ///
    /// See [`resolver::resolve`].
    pub fn resolve(&self, app_id: &str, arch: Arch) -> Result<ResolvedVersion, RepoError> {
        resolver::resolve(&self.catalog, app_id, arch, self.preference)
    }

    /// Resolve `app_id` for `arch` and make sure its artifact is in `dest_dir`.
    ///
    /// Returns the local path of the artifact.
    ///
    /// # Errors
    ///
    /// Resolution errors (recoverable, see [`RepoError::is_recoverable`]) or
    /// fetch/IO errors from the download.
    pub async fn resolve_and_download(
        &self,
        app_id: &str,
        arch: Arch,
        dest_dir: &Path,
    ) -> Result<PathBuf, RepoError> {
        let version = self.resolve(app_id, arch)?;
        info!("Resolved {app_id} to {} for {arch}", version.label());
        artifact::fetch_if_absent(
            &self.client,
            self.url(),
            version.entry.artifact_path(),
            dest_dir,
        )
        .await
    }
}
