//! Download artifacts once.
//!
//! Presence of the destination file is the only cache check. Nothing is
//! re-hashed, so a file placed there by hand is trusted.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{debug, info};

use crate::error::{ParseError, RepoError};
use crate::http;

/// Local file name for an artifact path: its last `/`-separated segment.
pub fn file_name(artifact_path: &str) -> Option<&str> {
    artifact_path
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Download `{repo_url}{artifact_path}` into `dest_dir` unless a file with the
/// same name is already there. Returns the local path either way.
///
/// # Errors
///
/// - [`RepoError::Parse`] if `artifact_path` has no usable file name.
/// - [`RepoError::Fetch`] if the download fails.
/// - [`RepoError::Io`] if `dest_dir` or the file cannot be written.
pub async fn fetch_if_absent(
    client: &Client,
    repo_url: &str,
    artifact_path: &str,
    dest_dir: &Path,
) -> Result<PathBuf, RepoError> {
    let name = file_name(artifact_path).ok_or_else(|| {
        RepoError::parse(repo_url, ParseError::InvalidPath(artifact_path.to_string()))
    })?;
    let dest = dest_dir.join(name);

    if dest.exists() {
        debug!("{} already downloaded", dest.display());
        return Ok(dest);
    }

    std::fs::create_dir_all(dest_dir).map_err(|e| RepoError::io(dest_dir, e))?;

    let url = format!("{repo_url}{artifact_path}");
    info!("Downloading {url}");
    let size = http::download_to(client, &url, &dest).await?;
    debug!("Wrote {size} bytes to {}", dest.display());

    Ok(dest)
}
