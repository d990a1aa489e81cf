//! Local mirror of a repository's index document.
//!
//! Every call fetches `entry.json` (the descriptor is never cached), then
//! trusts the local copy only if its SHA256 matches the advertised one.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use droidrepo_schema::{ENTRY_FILE, EntryDescriptor, Sha256Digest};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{ParseError, RepoError};
use crate::http;

/// An index document known to match what the repository currently advertises.
#[derive(Debug, Clone)]
pub struct CachedIndex {
    /// Raw index bytes, exactly as served.
    pub bytes: Bytes,
    /// Index path from the entry descriptor, e.g. `/index-v2.json`.
    pub file_name: String,
    /// Where the bytes live on disk.
    pub path: PathBuf,
    /// `true` if the index was downloaded by this call.
    pub refreshed: bool,
}

/// Make sure `cache_dir` holds the repository's current index and return it.
///
/// Issues one GET for the entry descriptor and, only when the cached file is
/// missing or its hash differs, a second GET for the index. A refreshed index
/// is written verbatim, replacing the stale copy.
///
/// # Errors
///
/// - [`RepoError::Fetch`] if either request fails.
/// - [`RepoError::Parse`] if the descriptor is not valid or names an unsafe
///   index path.
/// - [`RepoError::Io`] if the cache directory or file cannot be written.
pub async fn ensure_fresh(
    client: &Client,
    repo_url: &str,
    cache_dir: &Path,
) -> Result<CachedIndex, RepoError> {
    std::fs::create_dir_all(cache_dir).map_err(|e| RepoError::io(cache_dir, e))?;

    let entry_url = format!("{repo_url}/{ENTRY_FILE}");
    debug!("Fetching entry descriptor {entry_url}");
    let entry: EntryDescriptor = http::get_json(client, &entry_url, repo_url, ENTRY_FILE).await?;

    let file_name = entry.index_file_name().to_string();
    let path = cache_file_path(cache_dir, &file_name)
        .ok_or_else(|| RepoError::parse(repo_url, ParseError::InvalidPath(file_name.clone())))?;

    if let Some(bytes) = read_if_matching(&path, entry.index_sha256())? {
        debug!("Cached index {} is current", path.display());
        return Ok(CachedIndex {
            bytes,
            file_name,
            path,
            refreshed: false,
        });
    }

    info!("Updating repository index for {repo_url}");
    let index_url = format!("{repo_url}{file_name}");
    let bytes = http::get_bytes(client, &index_url).await?;

    let actual = Sha256Digest::compute(&bytes);
    if &actual != entry.index_sha256() {
        warn!(
            "Index from {index_url} hashes to {actual}, descriptor advertised {}",
            entry.index_sha256()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RepoError::io(parent, e))?;
    }
    http::write_atomic(&path, &bytes)?;

    Ok(CachedIndex {
        bytes,
        file_name,
        path,
        refreshed: true,
    })
}

/// Read `path` if it exists and hashes to `expected`.
fn read_if_matching(path: &Path, expected: &Sha256Digest) -> Result<Option<Bytes>, RepoError> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RepoError::io(path, e)),
    };

    if &Sha256Digest::compute(&data) == expected {
        Ok(Some(Bytes::from(data)))
    } else {
        debug!("Cached index {} is stale", path.display());
        Ok(None)
    }
}

/// Map a remote index path onto the cache directory.
///
/// Returns `None` for paths that are empty or would escape `cache_dir`.
pub fn cache_file_path(cache_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let relative = file_name.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }

    let mut path = cache_dir.to_path_buf();
    for segment in relative.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}
